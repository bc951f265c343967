//! Range expressions and their ordinal intervals.
//!
//! # Syntax
//!
//! ```text
//! [low TO high]   both bounds inclusive
//! (low TO high)   both bounds exclusive
//! [low TO high)   mixed forms are allowed
//! [* TO high]     `*` leaves a side unbounded
//! ```
//!
//! Bounds are resolved against a segment's [`TermValueList`] into an
//! inclusive [`OrdinalRange`]. A bound missing from the data snaps to the
//! nearest ordinal inside the range, so a value present in the data between
//! the bounds is never dropped.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{FacetError, Result};
use crate::facet::terms::{TermPosition, TermValueList};

lazy_static! {
    static ref RANGE_RE: Regex = Regex::new(r"^([\[(])\s*(.*?)\s+TO\s+(.*?)\s*([\])])$").unwrap();
}

const WILDCARD: &str = "*";

/// A parsed range expression, not yet bound to any segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExpr {
    raw: String,
    lower: Option<String>,
    upper: Option<String>,
    include_lower: bool,
    include_upper: bool,
}

impl RangeExpr {
    /// Parse `[low TO high]` style syntax.
    pub fn parse(range: &str) -> Result<Self> {
        let trimmed = range.trim();
        let reject = |reason: &str| {
            log::debug!("rejected range expression '{range}': {reason}");
            Err(FacetError::range_syntax(range, reason))
        };

        if trimmed.is_empty() {
            return reject("empty range expression");
        }
        if !trimmed.starts_with(['[', '(']) {
            return reject("missing opening '[' or '('");
        }
        if !trimmed.ends_with([']', ')']) {
            return reject("missing closing ']' or ')'");
        }

        let Some(caps) = RANGE_RE.captures(trimmed) else {
            return reject("expected '<low> TO <high>' between the brackets");
        };
        let lower = &caps[2];
        let upper = &caps[3];
        if lower.is_empty() {
            return reject("empty lower bound");
        }
        if upper.is_empty() {
            return reject("empty upper bound");
        }

        Ok(RangeExpr {
            raw: range.to_string(),
            lower: (lower != WILDCARD).then(|| lower.to_string()),
            upper: (upper != WILDCARD).then(|| upper.to_string()),
            include_lower: &caps[1] == "[",
            include_upper: &caps[4] == "]",
        })
    }

    /// A range matching exactly one value.
    pub fn exact(value: impl Into<String>) -> Self {
        let value = value.into();
        RangeExpr {
            raw: value.clone(),
            lower: Some(value.clone()),
            upper: Some(value),
            include_lower: true,
            include_upper: true,
        }
    }

    /// Parse a range expression, or read a bare value as `[v TO v]`.
    ///
    /// Anything that looks like a range (an opening bracket, or ` TO `)
    /// must be a well-formed one. A value may end in a bracket, as in
    /// `Large (XL)`.
    pub fn parse_or_value(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let looks_like_range = trimmed.starts_with(['[', '(']) || trimmed.contains(" TO ");
        if looks_like_range {
            Self::parse(input)
        } else {
            Ok(Self::exact(trimmed))
        }
    }

    /// The expression as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn lower(&self) -> Option<&str> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&str> {
        self.upper.as_deref()
    }

    pub fn include_lower(&self) -> bool {
        self.include_lower
    }

    pub fn include_upper(&self) -> bool {
        self.include_upper
    }

    /// True if built from a bare value rather than bracket syntax.
    pub fn is_value(&self) -> bool {
        !self.raw.trim_start().starts_with(['[', '('])
    }

    /// Map the bounds onto ordinals of `values`.
    ///
    /// The marker ordinal is never part of the result. A bound that cannot be
    /// read in the list's value domain is a syntax error.
    pub fn resolve(&self, values: &TermValueList) -> Result<OrdinalRange> {
        let locate = |bound: &str| {
            values.index_of(bound).map_err(|e| {
                log::debug!("rejected range expression '{}': {e}", self.raw);
                FacetError::range_syntax(
                    &self.raw,
                    format!("bound '{bound}' is not a valid {} value", values.term_type()),
                )
            })
        };

        let start = match &self.lower {
            None => 1,
            Some(bound) => match locate(bound)? {
                TermPosition::Exact(ord) if self.include_lower => ord,
                TermPosition::Exact(ord) => ord + 1,
                TermPosition::Insertion(ord) => ord,
            },
        };

        // Every real value sorts after the marker, so positions here are >= 1.
        let end = match &self.upper {
            None => values.len() - 1,
            Some(bound) => match locate(bound)? {
                TermPosition::Exact(ord) if self.include_upper => ord,
                TermPosition::Exact(ord) | TermPosition::Insertion(ord) => ord - 1,
            },
        };

        Ok(OrdinalRange::new(start, end))
    }
}

impl fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Inclusive ordinal interval. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalRange {
    pub start: usize,
    pub end: usize,
}

impl OrdinalRange {
    pub fn new(start: usize, end: usize) -> Self {
        OrdinalRange { start, end }
    }

    #[inline]
    pub fn contains(&self, ordinal: usize) -> bool {
        ordinal >= self.start && ordinal <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of ordinals covered.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}
