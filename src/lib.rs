//! # Iris Facets
//!
//! Range faceting for segmented search indexes.
//!
//! ## Features
//!
//! - Per-segment ordinal caches built in one pass over the segment
//! - Typed value domains (strings, integers, dates)
//! - Range expressions with inclusive, exclusive and open bounds
//! - O(1) per-document filters, including negated and multi-value selections
//! - Facet counting per value or per predefined (possibly overlapping) range
//! - Ordinal-based document scoring

pub mod data;
mod error;
pub mod facet;
pub mod segment;

// Re-exports for the public API
pub use data::{DataValue, Document};
pub use error::{FacetError, Result};
pub use facet::{
    BrowseFacet, FacetCounts, FacetDataCache, FacetSegment, FacetSelection, FacetSpec,
    RandomAccessFilter, RangeExpr, RangeFacetConfig, RangeFacetHandler, TermType,
};
pub use segment::{DocId, MemorySegment, SegmentReader};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
