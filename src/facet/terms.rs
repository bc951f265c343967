//! Sorted distinct-value lists with typed comparison.
//!
//! A [`TermValueList`] is the ordinal dictionary of one facet field in one
//! segment. Raw index terms are parsed into a [`TermValue`] of the field's
//! [`TermType`], sorted by the domain's natural order and deduplicated, so
//! that comparing two ordinals is the same as comparing the two values.
//!
//! Ordinal 0 is always the "no value" marker ([`TermValue::Missing`]).

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};

/// Date format used when a date field does not configure one.
pub const DEFAULT_DATE_FORMAT: &str = crate::data::DATETIME_TERM_FORMAT;

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

/// Value domain of a facet field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TermType {
    /// Lexical order.
    #[default]
    String,
    Int32,
    Int64,
    /// Chronological order. `format` is a `chrono` format string; date-only
    /// formats are read as midnight UTC.
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },
}

impl TermType {
    pub fn date(format: impl Into<String>) -> Self {
        TermType::Date {
            format: format.into(),
        }
    }

    /// Parse a raw term into this domain.
    pub fn parse(&self, raw: &str) -> Result<TermValue> {
        let invalid =
            || FacetError::invalid_argument(format!("'{raw}' is not a valid {self} term"));
        match self {
            TermType::String => Ok(TermValue::String(raw.to_string())),
            TermType::Int32 => raw
                .trim()
                .parse::<i32>()
                .map(TermValue::Int32)
                .map_err(|_| invalid()),
            TermType::Int64 => raw
                .trim()
                .parse::<i64>()
                .map(TermValue::Int64)
                .map_err(|_| invalid()),
            TermType::Date { format } => {
                let raw = raw.trim();
                NaiveDateTime::parse_from_str(raw, format)
                    .or_else(|_| {
                        NaiveDate::parse_from_str(raw, format).map(|d| d.and_time(NaiveTime::MIN))
                    })
                    .map(|dt| TermValue::Date(dt.and_utc()))
                    .map_err(|_| invalid())
            }
        }
    }

    /// Render a value back to its term form.
    pub fn format(&self, value: &TermValue) -> String {
        match (self, value) {
            (_, TermValue::Missing) => String::new(),
            (TermType::Date { format }, TermValue::Date(dt)) => dt.format(format).to_string(),
            (_, other) => other.to_string(),
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermType::String => write!(f, "string"),
            TermType::Int32 => write!(f, "int32"),
            TermType::Int64 => write!(f, "int64"),
            TermType::Date { format } => write!(f, "date({format})"),
        }
    }
}

/// A parsed facet value.
///
/// `Missing` orders before every real value, so it always lands on ordinal 0.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermValue {
    Missing,
    String(String),
    Int32(i32),
    Int64(i64),
    Date(DateTime<Utc>),
}

impl fmt::Display for TermValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermValue::Missing => Ok(()),
            TermValue::String(s) => write!(f, "{s}"),
            TermValue::Int32(v) => write!(f, "{v}"),
            TermValue::Int64(v) => write!(f, "{v}"),
            TermValue::Date(dt) => write!(f, "{}", dt.format(DEFAULT_DATE_FORMAT)),
        }
    }
}

/// Outcome of a binary search over a [`TermValueList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermPosition {
    /// The value is present at this ordinal.
    Exact(usize),
    /// The value is absent; this is the ordinal it would be inserted at.
    Insertion(usize),
}

/// Ordered, deduplicated values of one field in one segment.
#[derive(Debug, Clone)]
pub struct TermValueList {
    term_type: TermType,
    values: Vec<TermValue>,
}

impl TermValueList {
    /// Create a list holding only the "no value" marker.
    pub fn new(term_type: TermType) -> Self {
        TermValueList {
            term_type,
            values: vec![TermValue::Missing],
        }
    }

    /// Build a list from raw terms in any order, possibly with duplicates.
    pub fn from_terms<I, S>(term_type: TermType, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = vec![TermValue::Missing];
        for term in terms {
            values.push(term_type.parse(term.as_ref())?);
        }
        values.sort_unstable();
        values.dedup();
        Ok(TermValueList { term_type, values })
    }

    /// Add a value if absent. Only used while a cache is being built.
    pub(crate) fn insert(&mut self, value: TermValue) -> usize {
        match self.values.binary_search(&value) {
            Ok(ord) => ord,
            Err(ord) => {
                self.values.insert(ord, value);
                ord
            }
        }
    }

    pub fn term_type(&self) -> &TermType {
        &self.term_type
    }

    /// Number of ordinals, including the marker.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the list holds only the marker.
    pub fn is_empty(&self) -> bool {
        self.values.len() <= 1
    }

    pub fn get(&self, ordinal: usize) -> Option<&TermValue> {
        self.values.get(ordinal)
    }

    /// Formatted value at `ordinal`. The marker and out-of-range ordinals
    /// format as the empty string.
    pub fn format(&self, ordinal: usize) -> String {
        self.values
            .get(ordinal)
            .map(|v| self.term_type.format(v))
            .unwrap_or_default()
    }

    /// Locate a raw term, parsing it into the list's domain first.
    pub fn index_of(&self, raw: &str) -> Result<TermPosition> {
        let value = self.term_type.parse(raw)?;
        Ok(self.index_of_value(&value))
    }

    pub fn index_of_value(&self, value: &TermValue) -> TermPosition {
        match self.values.binary_search(value) {
            Ok(ord) => TermPosition::Exact(ord),
            Err(ord) => TermPosition::Insertion(ord),
        }
    }

    /// Ordinal order is value order.
    pub fn compare_ordinals(&self, a: usize, b: usize) -> Ordering {
        a.cmp(&b)
    }

    /// Iterate `(ordinal, value)` pairs, marker first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TermValue)> {
        self.values.iter().enumerate()
    }
}
