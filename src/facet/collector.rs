//! Facet counting over a stream of matching documents.
//!
//! A [`RangeFacetCountCollector`] is driven by the query engine, one
//! `collect(doc)` per matching document of one segment. Counting is always
//! per ordinal, which is O(1) per document; predefined ranges are rolled up
//! from the ordinal counts when collection finishes, so a document whose
//! value falls in several overlapping ranges is counted in each of them.
//!
//! [`FacetCounts`] is the read-only result. Results from different segments
//! of the same facet merge by summing counts per value or per range.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};
use crate::facet::cache::FacetDataCache;
use crate::facet::config::{FacetOrder, FacetSpec};
use crate::facet::range::{OrdinalRange, RangeExpr};
use crate::facet::terms::{TermType, TermValue};
use crate::segment::DocId;

/// One entry of a facet result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseFacet {
    pub value: String,
    pub count: u32,
}

impl BrowseFacet {
    pub fn new(value: impl Into<String>, count: u32) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Counts matching documents per value, or per predefined range, for one
/// facet on one segment.
///
/// Not safe for concurrent `collect` calls; use one collector per segment.
#[derive(Debug)]
pub struct RangeFacetCountCollector {
    name: String,
    spec: FacetSpec,
    cache: Arc<FacetDataCache>,
    ranges: Option<Vec<(String, OrdinalRange)>>,
    counts: Vec<u32>,
}

impl RangeFacetCountCollector {
    /// Create a collector. Predefined ranges are resolved against the
    /// segment's values here and keep their given order.
    pub fn new(
        name: impl Into<String>,
        cache: Arc<FacetDataCache>,
        spec: FacetSpec,
        predefined_ranges: Option<&[RangeExpr]>,
    ) -> Result<Self> {
        let ranges = predefined_ranges
            .map(|exprs| {
                exprs
                    .iter()
                    .map(|expr| Ok((expr.as_str().to_string(), expr.resolve(cache.val_array())?)))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(RangeFacetCountCollector {
            name: name.into(),
            spec,
            counts: vec![0; cache.num_ordinals()],
            cache,
            ranges,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Count one matching document.
    #[inline]
    pub fn collect(&mut self, doc: DocId) {
        let ordinal = self.cache.ordinal(doc);
        self.counts[ordinal] += 1;
    }

    /// Count every document of the segment, as for a match-all query.
    pub fn collect_all(&mut self) {
        self.counts.copy_from_slice(self.cache.freqs());
    }

    /// Per-ordinal counts so far, marker included.
    pub fn count_distribution(&self) -> &[u32] {
        &self.counts
    }

    /// Finish collection and produce the count table.
    pub fn finish(self) -> FacetCounts {
        let table = match self.ranges {
            Some(ranges) => {
                let (labels, counts) = ranges
                    .into_iter()
                    .map(|(label, range)| {
                        let count = range
                            .iter()
                            .filter_map(|o| self.counts.get(o))
                            .sum::<u32>();
                        (label, count)
                    })
                    .unzip();
                CountTable::Ranges { labels, counts }
            }
            None => {
                let values = self.cache.val_array();
                let counts = values
                    .iter()
                    .skip(1)
                    .map(|(ordinal, value)| (value.clone(), self.counts[ordinal]))
                    .collect();
                CountTable::Values {
                    term_type: values.term_type().clone(),
                    counts,
                }
            }
        };

        FacetCounts {
            name: self.name,
            spec: self.spec,
            table,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CountTable {
    Values {
        term_type: TermType,
        counts: BTreeMap<TermValue, u32>,
    },
    Ranges {
        labels: Vec<String>,
        counts: Vec<u32>,
    },
}

/// Read-only facet counts for one facet.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetCounts {
    name: String,
    spec: FacetSpec,
    table: CountTable,
}

impl FacetCounts {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &FacetSpec {
        &self.spec
    }

    /// True if the counts are per predefined range.
    pub fn is_ranged(&self) -> bool {
        matches!(self.table, CountTable::Ranges { .. })
    }

    /// Facet entries shaped by the spec: entries under `min_hit_count` are
    /// dropped, then ordered, then cut to `max_count`.
    pub fn facets(&self) -> Vec<BrowseFacet> {
        let min = self.spec.min_hit_count;
        let mut facets: Vec<BrowseFacet> = match &self.table {
            CountTable::Values { term_type, counts } => counts
                .iter()
                .filter(|(_, count)| **count >= min)
                .map(|(value, count)| BrowseFacet::new(term_type.format(value), *count))
                .collect(),
            CountTable::Ranges { labels, counts } => labels
                .iter()
                .zip(counts)
                .filter(|(_, count)| **count >= min)
                .map(|(label, count)| BrowseFacet::new(label.clone(), *count))
                .collect(),
        };

        if self.spec.order_by == FacetOrder::HitsDesc {
            facets.sort_by(|a, b| b.count.cmp(&a.count));
        }
        if self.spec.max_count > 0 {
            facets.truncate(self.spec.max_count);
        }
        facets
    }

    /// Count for one value, a range expression over the values, or a
    /// predefined range label. `None` when a bare value or a label is
    /// unknown; a range expression always has a count.
    pub fn facet(&self, value: &str) -> Result<Option<BrowseFacet>> {
        match &self.table {
            CountTable::Ranges { labels, counts } => Ok(labels
                .iter()
                .position(|label| label == value)
                .map(|i| BrowseFacet::new(value, counts[i]))),
            CountTable::Values { term_type, counts } => {
                let expr = RangeExpr::parse_or_value(value)?;
                let bound = |raw: Option<&str>, inclusive: bool| -> Result<Bound<TermValue>> {
                    let Some(raw) = raw else {
                        return Ok(Bound::Unbounded);
                    };
                    let parsed = term_type
                        .parse(raw)
                        .map_err(|e| FacetError::range_syntax(value, e.to_string()))?;
                    Ok(if inclusive {
                        Bound::Included(parsed)
                    } else {
                        Bound::Excluded(parsed)
                    })
                };
                let lower = bound(expr.lower(), expr.include_lower())?;
                let upper = bound(expr.upper(), expr.include_upper())?;

                if expr.is_value() {
                    if let Bound::Included(v) = &lower {
                        return Ok(counts.get(v).map(|c| BrowseFacet::new(value, *c)));
                    }
                }
                let count = if is_empty_interval(&lower, &upper) {
                    0
                } else {
                    counts.range((lower, upper)).map(|(_, c)| *c).sum()
                };
                Ok(Some(BrowseFacet::new(value, count)))
            }
        }
    }

    /// Add the counts of another segment's result for the same facet.
    pub fn merge(&mut self, other: &FacetCounts) -> Result<()> {
        if self.name != other.name {
            return Err(FacetError::invalid_argument(format!(
                "cannot merge facet '{}' into '{}'",
                other.name, self.name
            )));
        }
        match (&mut self.table, &other.table) {
            (
                CountTable::Values { term_type, counts },
                CountTable::Values {
                    term_type: other_type,
                    counts: other_counts,
                },
            ) if term_type == other_type => {
                for (value, count) in other_counts {
                    *counts.entry(value.clone()).or_insert(0) += count;
                }
                Ok(())
            }
            (
                CountTable::Ranges { labels, counts },
                CountTable::Ranges {
                    labels: other_labels,
                    counts: other_counts,
                },
            ) if labels == other_labels => {
                for (count, other) in counts.iter_mut().zip(other_counts) {
                    *count += other;
                }
                Ok(())
            }
            _ => Err(FacetError::invalid_argument(format!(
                "facet '{}' results have incompatible layouts",
                self.name
            ))),
        }
    }
}

fn is_empty_interval(lower: &Bound<TermValue>, upper: &Bound<TermValue>) -> bool {
    let (lo, lo_inclusive) = match lower {
        Bound::Included(v) => (v, true),
        Bound::Excluded(v) => (v, false),
        Bound::Unbounded => return false,
    };
    let (hi, hi_inclusive) = match upper {
        Bound::Included(v) => (v, true),
        Bound::Excluded(v) => (v, false),
        Bound::Unbounded => return false,
    };
    lo > hi || (lo == hi && !(lo_inclusive && hi_inclusive))
}
