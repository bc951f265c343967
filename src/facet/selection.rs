use serde::{Deserialize, Serialize};

/// User-specified constraint on one facet.
///
/// A document passes if it matches any of `values` (or `values` is empty)
/// and none of `not_values`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSelection {
    pub field: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub not_values: Vec<String>,
}

impl FacetSelection {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            values: Vec::new(),
            not_values: Vec::new(),
        }
    }

    pub fn add_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn add_not_value(mut self, value: impl Into<String>) -> Self {
        self.not_values.push(value.into());
        self
    }

    /// True when the selection constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.not_values.is_empty()
    }
}
