use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Term format used when a `DateTime` value is rendered as an index term.
pub const DATETIME_TERM_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The value stored for a field in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// Explicitly empty. Indexed like an absent field.
    Null,
    Int64(i64),

    /// Keyword content, indexed as a single untokenized term.
    String(String),

    /// Date and time in UTC.
    DateTime(chrono::DateTime<chrono::Utc>),
}

impl DataValue {
    /// Render the value as the raw index term a segment would store.
    ///
    /// `Null` has no term.
    pub fn to_term(&self) -> Option<String> {
        match self {
            DataValue::Null => None,
            DataValue::Int64(i) => Some(i.to_string()),
            DataValue::String(s) => Some(s.clone()),
            DataValue::DateTime(dt) => Some(dt.format(DATETIME_TERM_FORMAT).to_string()),
        }
    }
}

// --- Conversions ---

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::String(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::String(v.to_string())
    }
}

/// A document is a collection of named fields, each containing a `DataValue`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Field data.
    pub fields: HashMap<String, DataValue>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the document.
    pub fn add_field(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add an integer field.
    pub fn add_integer(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.insert(name.into(), DataValue::Int64(value));
        self
    }

    /// Add a datetime field.
    pub fn add_datetime(
        mut self,
        name: impl Into<String>,
        value: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.fields.insert(name.into(), DataValue::DateTime(value));
        self
    }

    /// Get a reference to a field's value.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }
}
