//! Random-access selection filters.
//!
//! A [`RandomAccessFilter`] answers "does this document satisfy the
//! selection" from the document's ordinal alone, in O(1). The variants form
//! a closed set:
//!
//! - `Range`: ordinal inside one inclusive interval (single value or range)
//! - `BitSet`: ordinal set in a per-ordinal bitset (OR / NOR of many values)
//! - `Not`: inverts the inner filter's answer
//! - `And`: every inner filter accepts
//!
//! Negation never removes ordinals from the cache; it only changes which
//! documents are admitted, so counts for other facets stay correct.

use std::sync::Arc;

use bit_vec::BitVec;

use crate::error::{FacetError, Result};
use crate::facet::cache::FacetDataCache;
use crate::facet::range::OrdinalRange;
use crate::segment::DocId;

#[derive(Debug, Clone)]
pub enum RandomAccessFilter {
    Range {
        cache: Arc<FacetDataCache>,
        range: OrdinalRange,
    },
    BitSet {
        cache: Arc<FacetDataCache>,
        bits: BitVec,
    },
    Not(Box<RandomAccessFilter>),
    /// Never empty; build with [`RandomAccessFilter::and`].
    And(Vec<RandomAccessFilter>),
}

impl RandomAccessFilter {
    pub fn range(cache: Arc<FacetDataCache>, range: OrdinalRange) -> Self {
        RandomAccessFilter::Range { cache, range }
    }

    /// Materialize the OR of `ranges` over every ordinal, then flip every
    /// bit when `negate` is set. With no ranges this matches nothing, or
    /// everything when negated.
    pub fn bitset(cache: Arc<FacetDataCache>, ranges: &[OrdinalRange], negate: bool) -> Self {
        let num_ordinals = cache.num_ordinals();
        let mut bits = BitVec::from_elem(num_ordinals, false);
        for range in ranges {
            for ordinal in range.iter().take_while(|&o| o < num_ordinals) {
                bits.set(ordinal, true);
            }
        }
        if negate {
            bits.negate();
        }
        RandomAccessFilter::BitSet { cache, bits }
    }

    pub fn not(inner: RandomAccessFilter) -> Self {
        RandomAccessFilter::Not(Box::new(inner))
    }

    /// Conjunction of `filters`. A single filter is returned unwrapped.
    ///
    /// Fails on an empty list, which would have no segment to iterate.
    pub fn and(mut filters: Vec<RandomAccessFilter>) -> Result<Self> {
        match filters.len() {
            0 => Err(FacetError::invalid_argument(
                "a conjunction needs at least one filter",
            )),
            1 => Ok(filters.remove(0)),
            _ => Ok(RandomAccessFilter::And(filters)),
        }
    }

    /// Whether `doc` is admitted. `doc` must be below the segment's document
    /// count.
    #[inline]
    pub fn accept(&self, doc: DocId) -> bool {
        match self {
            RandomAccessFilter::Range { cache, range } => range.contains(cache.ordinal(doc)),
            RandomAccessFilter::BitSet { cache, bits } => {
                bits.get(cache.ordinal(doc)).unwrap_or(false)
            }
            RandomAccessFilter::Not(inner) => !inner.accept(doc),
            RandomAccessFilter::And(filters) => filters.iter().all(|f| f.accept(doc)),
        }
    }

    /// Fraction of the segment's documents this filter admits, computed from
    /// the frequency table. `And` reports its most selective clause.
    pub fn selectivity(&self) -> f64 {
        match self {
            RandomAccessFilter::Range { cache, range } => {
                let freqs = cache.freqs();
                let hits: u64 = range
                    .iter()
                    .filter_map(|o| freqs.get(o))
                    .map(|&f| f as u64)
                    .sum();
                ratio(hits, cache.doc_count())
            }
            RandomAccessFilter::BitSet { cache, bits } => {
                let hits: u64 = cache
                    .freqs()
                    .iter()
                    .zip(bits.iter())
                    .filter(|(_, set)| *set)
                    .map(|(&f, _)| f as u64)
                    .sum();
                ratio(hits, cache.doc_count())
            }
            RandomAccessFilter::Not(inner) => 1.0 - inner.selectivity(),
            RandomAccessFilter::And(filters) => filters
                .iter()
                .map(|f| f.selectivity())
                .fold(1.0, f64::min),
        }
    }

    /// Admitted documents in ascending order.
    pub fn matching_docs(&self) -> impl Iterator<Item = DocId> + '_ {
        let (start, end) = self.scan_bounds();
        (start..end).filter(move |&doc| self.accept(doc))
    }

    /// Half-open doc-id window outside which no document can be admitted.
    fn scan_bounds(&self) -> (DocId, DocId) {
        match self {
            RandomAccessFilter::Range { cache, range } => ordinal_doc_bounds(cache, range.iter()),
            RandomAccessFilter::BitSet { cache, bits } => {
                let ordinals = bits.iter().enumerate().filter(|(_, set)| *set).map(|(o, _)| o);
                ordinal_doc_bounds(cache, ordinals)
            }
            RandomAccessFilter::Not(inner) => (0, inner.segment_doc_count()),
            RandomAccessFilter::And(filters) => filters
                .iter()
                .map(|f| f.scan_bounds())
                .reduce(|(s1, e1), (s2, e2)| (s1.max(s2), e1.min(e2)))
                .unwrap_or((0, 0)),
        }
    }

    fn segment_doc_count(&self) -> DocId {
        match self {
            RandomAccessFilter::Range { cache, .. } | RandomAccessFilter::BitSet { cache, .. } => {
                cache.doc_count()
            }
            RandomAccessFilter::Not(inner) => inner.segment_doc_count(),
            RandomAccessFilter::And(filters) => filters
                .iter()
                .map(|f| f.segment_doc_count())
                .max()
                .unwrap_or(0),
        }
    }
}

fn ratio(hits: u64, doc_count: u32) -> f64 {
    if doc_count == 0 {
        0.0
    } else {
        hits as f64 / doc_count as f64
    }
}

fn ordinal_doc_bounds(
    cache: &FacetDataCache,
    ordinals: impl Iterator<Item = usize>,
) -> (DocId, DocId) {
    let mut start = DocId::MAX;
    let mut end = 0;
    for ordinal in ordinals {
        if let (Some(min), Some(max)) = (cache.min_doc_id(ordinal), cache.max_doc_id(ordinal)) {
            start = start.min(min);
            end = end.max(max + 1);
        }
    }
    if start >= end { (0, 0) } else { (start, end) }
}
