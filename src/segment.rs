//! Boundary with the underlying index.
//!
//! The facet core never reads index files itself. Everything it needs from a
//! segment goes through [`SegmentReader`]: the distinct terms of a field, the
//! stored term of a document, and the segment's document count.
//!
//! # Module Structure
//!
//! - `memory`: In-memory segment built from [`Document`](crate::data::Document)s

pub mod memory;

use crate::error::Result;

pub use memory::{MemorySegment, MemorySegmentBuilder};

/// Segment-local document id. Ids are dense in `0..doc_count()`.
pub type DocId = u32;

/// Read access to one index segment.
pub trait SegmentReader: Send + Sync + std::fmt::Debug {
    /// Name used in log and error messages.
    fn name(&self) -> &str;

    /// Number of documents in the segment.
    fn doc_count(&self) -> u32;

    /// Enumerate the distinct raw terms of `field`.
    ///
    /// Order and duplicates are unspecified. Fails if the field is not part of
    /// the segment or the segment cannot be read.
    fn distinct_values(&self, field: &str) -> Result<Vec<String>>;

    /// The raw term stored for `doc` in `field`, or `None` when the document
    /// has no value.
    fn stored_value(&self, doc: DocId, field: &str) -> Result<Option<String>>;
}
