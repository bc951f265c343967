//! Range faceting over segment-local ordinals.
//!
//! Each facet field of each segment is mapped onto a dense ordinal space:
//! the sorted distinct values of the field get ordinals `1..M`, ordinal 0
//! stands for "no value", and every document carries one ordinal. Filters,
//! collectors and scorers then work on ordinals alone.
//!
//! # Module Structure
//!
//! - `terms`: Typed value domains and the sorted value list
//! - `ordinals`: Compact document → ordinal array
//! - `cache`: Per-segment facet data (values, ordinals, frequencies)
//! - `range`: Range expression parsing and ordinal resolution
//! - `filter`: Random-access selection filters
//! - `collector`: Facet counting and results
//! - `scorer`: Ordinal-based document scoring
//! - `registry`: Lazily built caches per segment
//! - `selection`: User selections on a facet
//! - `config`: Handler configuration and result shaping
//! - `handler`: The range facet handler tying these together

pub mod cache;
pub mod collector;
pub mod config;
pub mod filter;
pub mod handler;
pub mod ordinals;
pub mod range;
pub mod registry;
pub mod scorer;
pub mod selection;
pub mod terms;

pub use cache::FacetDataCache;
pub use collector::{BrowseFacet, FacetCounts, RangeFacetCountCollector};
pub use config::{FacetOrder, FacetSpec, MissingValue, RangeFacetConfig, RangeFacetConfigBuilder};
pub use filter::RandomAccessFilter;
pub use handler::RangeFacetHandler;
pub use ordinals::OrdinalArray;
pub use range::{OrdinalRange, RangeExpr};
pub use registry::FacetSegment;
pub use scorer::{
    DefaultFacetTermScoring, FacetDocScorer, FacetTermScoringFunction, InverseFrequencyScoring,
    TermStats,
};
pub use selection::FacetSelection;
pub use terms::{TermPosition, TermType, TermValue, TermValueList};
