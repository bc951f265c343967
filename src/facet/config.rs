use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};
use crate::facet::range::RangeExpr;
use crate::facet::terms::TermType;

/// How documents without a value are mapped to ordinals.
///
/// Ordinal 0 is the "no value" marker either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValue {
    /// Documents without a value sit on the marker ordinal and never match
    /// a range.
    #[default]
    Marker,
    /// Documents without a value take this value instead.
    Substitute(String),
}

/// Configuration of a range facet handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFacetConfig {
    /// Facet name used in selections and results.
    pub name: String,
    /// Index field the values are read from. Defaults to `name`.
    #[serde(default)]
    pub index_field: Option<String>,
    /// Value domain of the field.
    #[serde(default)]
    pub term_type: TermType,
    /// Named ranges counted instead of individual values, in presentation
    /// order. Ranges may overlap.
    #[serde(default)]
    pub predefined_ranges: Option<Vec<String>>,
    #[serde(default)]
    pub missing: MissingValue,
}

impl RangeFacetConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index_field: None,
            term_type: TermType::default(),
            predefined_ranges: None,
            missing: MissingValue::default(),
        }
    }

    pub fn builder(name: impl Into<String>) -> RangeFacetConfigBuilder {
        RangeFacetConfigBuilder {
            config: Self::new(name),
        }
    }

    /// Load a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn index_field(&self) -> &str {
        self.index_field.as_deref().unwrap_or(&self.name)
    }

    /// Check the name, every predefined range's syntax and the substitute
    /// value's domain.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FacetError::invalid_config("facet name must not be empty"));
        }
        if let Some(ranges) = &self.predefined_ranges {
            for range in ranges {
                RangeExpr::parse(range).map_err(|e| {
                    FacetError::invalid_config(format!("facet '{}': {e}", self.name))
                })?;
            }
        }
        if let MissingValue::Substitute(raw) = &self.missing {
            self.term_type.parse(raw).map_err(|e| {
                FacetError::invalid_config(format!("facet '{}' substitute: {e}", self.name))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RangeFacetConfigBuilder {
    config: RangeFacetConfig,
}

impl RangeFacetConfigBuilder {
    pub fn index_field(mut self, field: impl Into<String>) -> Self {
        self.config.index_field = Some(field.into());
        self
    }

    pub fn term_type(mut self, term_type: TermType) -> Self {
        self.config.term_type = term_type;
        self
    }

    pub fn predefined_ranges<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.predefined_ranges = Some(ranges.into_iter().map(Into::into).collect());
        self
    }

    pub fn missing(mut self, missing: MissingValue) -> Self {
        self.config.missing = missing;
        self
    }

    pub fn build(self) -> Result<RangeFacetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Result ordering of a facet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetOrder {
    /// Value order, or configured order for predefined ranges.
    #[default]
    ValueAsc,
    /// Highest count first; ties in value order.
    HitsDesc,
}

/// Per-request shaping of facet results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Entries with fewer hits are dropped.
    #[serde(default = "default_min_hit_count")]
    pub min_hit_count: u32,
    /// Maximum number of entries returned. 0 means unlimited.
    #[serde(default)]
    pub max_count: usize,
    #[serde(default)]
    pub order_by: FacetOrder,
}

fn default_min_hit_count() -> u32 {
    1
}

impl Default for FacetSpec {
    fn default() -> Self {
        FacetSpec {
            min_hit_count: default_min_hit_count(),
            max_count: 0,
            order_by: FacetOrder::ValueAsc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = RangeFacetConfig::builder("price").build().unwrap();
        assert_eq!(config.index_field(), "price");
        assert_eq!(config.term_type, TermType::String);
        assert_eq!(config.missing, MissingValue::Marker);
        assert!(config.predefined_ranges.is_none());
    }

    #[test]
    fn test_builder_rejects_bad_range() {
        let result = RangeFacetConfig::builder("price")
            .predefined_ranges(["[0 TO 10]", "10 TO 20"])
            .build();
        match result {
            Err(FacetError::InvalidConfig(msg)) => assert!(msg.contains("10 TO 20")),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json() {
        let config = RangeFacetConfig::from_json(
            r#"{
                "name": "idRange",
                "index_field": "id",
                "term_type": {"type": "int32"},
                "predefined_ranges": ["[10 TO 10]", "[* TO 20)"],
                "missing": {"substitute": "0"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.index_field(), "id");
        assert_eq!(config.term_type, TermType::Int32);
        assert_eq!(
            config.predefined_ranges,
            Some(vec!["[10 TO 10]".to_string(), "[* TO 20)".to_string()])
        );
        assert_eq!(config.missing, MissingValue::Substitute("0".to_string()));
    }

    #[test]
    fn test_from_json_rejects_bad_substitute() {
        let result = RangeFacetConfig::from_json(
            r#"{"name": "n", "term_type": {"type": "int64"}, "missing": {"substitute": "x"}}"#,
        );
        assert!(matches!(result, Err(FacetError::InvalidConfig(_))));
    }

    #[test]
    fn test_facet_spec_defaults() {
        let spec: FacetSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, FacetSpec::default());
        assert_eq!(spec.min_hit_count, 1);

        let spec: FacetSpec = serde_json::from_str(r#"{"order_by": "hits_desc"}"#).unwrap();
        assert_eq!(spec.order_by, FacetOrder::HitsDesc);
    }
}
