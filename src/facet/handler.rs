//! Range facet handler.
//!
//! [`RangeFacetHandler`] is the entry point for one configured facet. It
//! loads the facet's [`FacetDataCache`] per segment and, against a loaded
//! cache, builds filters for selections, count collectors and doc scorers.
//!
//! # Filter construction
//!
//! A single value or range becomes a `Range` filter; negating it wraps the
//! filter in `Not`. Several values are resolved up front into one bitset over
//! all ordinals, flipped when negated, so each document check stays O(1)
//! regardless of how many values were selected.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::Result;
use crate::facet::cache::FacetDataCache;
use crate::facet::collector::RangeFacetCountCollector;
use crate::facet::config::{FacetSpec, RangeFacetConfig};
use crate::facet::filter::RandomAccessFilter;
use crate::facet::range::{OrdinalRange, RangeExpr};
use crate::facet::registry::FacetSegment;
use crate::facet::scorer::{FacetDocScorer, FacetTermScoringFunction};
use crate::facet::selection::FacetSelection;
use crate::segment::{DocId, SegmentReader};

#[derive(Debug, Clone)]
pub struct RangeFacetHandler {
    config: RangeFacetConfig,
    predefined: Option<Vec<RangeExpr>>,
    cache_key: String,
}

impl RangeFacetHandler {
    /// Create a handler. Predefined ranges are parsed here, so a malformed
    /// one fails construction.
    pub fn new(config: RangeFacetConfig) -> Result<Self> {
        config.validate()?;
        let predefined = config
            .predefined_ranges
            .as_ref()
            .map(|ranges| ranges.iter().map(|r| RangeExpr::parse(r)).collect::<Result<Vec<_>>>())
            .transpose()?;
        let cache_key = format!(
            "{}/{}/{:?}",
            config.index_field(),
            config.term_type,
            config.missing
        );
        Ok(RangeFacetHandler {
            config,
            predefined,
            cache_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &RangeFacetConfig {
        &self.config
    }

    pub fn has_predefined_ranges(&self) -> bool {
        self.predefined.is_some()
    }

    /// Predefined ranges in configured order.
    pub fn predefined_ranges(&self) -> Option<&[RangeExpr]> {
        self.predefined.as_deref()
    }

    /// Build this facet's cache for one segment.
    pub fn load(&self, reader: &dyn SegmentReader) -> Result<FacetDataCache> {
        FacetDataCache::load(
            self.config.index_field(),
            reader,
            &self.config.term_type,
            &self.config.missing,
        )
    }

    /// Registry key of this facet's cache. Everything the cache is built
    /// from goes into the key, so handlers agreeing on index field, term type
    /// and missing policy share a cache whatever their names.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// This facet's cache for `segment`, built on first use.
    pub fn facet_data(&self, segment: &FacetSegment) -> Result<Arc<FacetDataCache>> {
        segment.get_or_load(&self.cache_key, |reader| self.load(reader))
    }

    /// Build this facet's cache on every segment in parallel.
    ///
    /// Stops at the first failure; caches already built stay registered.
    pub fn load_segments(&self, segments: &[FacetSegment]) -> Result<Vec<Arc<FacetDataCache>>> {
        segments
            .par_iter()
            .map(|segment| self.facet_data(segment))
            .collect()
    }

    /// Filter admitting documents whose value is `value`, or within it when
    /// `value` is a range expression.
    pub fn build_random_access_filter(
        &self,
        cache: &Arc<FacetDataCache>,
        value: &str,
    ) -> Result<RandomAccessFilter> {
        let range = resolve(cache, value)?;
        Ok(RandomAccessFilter::range(Arc::clone(cache), range))
    }

    /// Filter admitting documents matching any of `values`, or none of them
    /// when `is_not` is set.
    pub fn build_random_access_or_filter(
        &self,
        cache: &Arc<FacetDataCache>,
        values: &[String],
        is_not: bool,
    ) -> Result<RandomAccessFilter> {
        if let [value] = values {
            let filter = self.build_random_access_filter(cache, value)?;
            return Ok(if is_not {
                RandomAccessFilter::not(filter)
            } else {
                filter
            });
        }

        let ranges = values
            .iter()
            .map(|value| resolve(cache, value))
            .collect::<Result<Vec<OrdinalRange>>>()?;
        Ok(RandomAccessFilter::bitset(Arc::clone(cache), &ranges, is_not))
    }

    /// Filter for a whole selection: any positive value and no negated one.
    /// `None` when the selection constrains nothing.
    pub fn build_filter(
        &self,
        cache: &Arc<FacetDataCache>,
        selection: &FacetSelection,
    ) -> Result<Option<RandomAccessFilter>> {
        let mut clauses = Vec::with_capacity(2);
        if !selection.values.is_empty() {
            clauses.push(self.build_random_access_or_filter(cache, &selection.values, false)?);
        }
        if !selection.not_values.is_empty() {
            clauses.push(self.build_random_access_or_filter(cache, &selection.not_values, true)?);
        }
        if clauses.is_empty() {
            return Ok(None);
        }
        RandomAccessFilter::and(clauses).map(Some)
    }

    /// Collector counting per value, or per predefined range when configured.
    pub fn facet_count_collector(
        &self,
        cache: &Arc<FacetDataCache>,
        spec: FacetSpec,
    ) -> Result<RangeFacetCountCollector> {
        RangeFacetCountCollector::new(
            self.name(),
            Arc::clone(cache),
            spec,
            self.predefined_ranges(),
        )
    }

    pub fn doc_scorer(
        &self,
        cache: &Arc<FacetDataCache>,
        scoring: Arc<dyn FacetTermScoringFunction>,
        boosts: &HashMap<String, f32>,
    ) -> FacetDocScorer {
        FacetDocScorer::new(Arc::clone(cache), scoring, boosts)
    }

    /// Formatted values of `doc`: empty, or one value.
    pub fn field_values(&self, cache: &FacetDataCache, doc: DocId) -> Vec<String> {
        match cache.num_items(doc) {
            0 => Vec::new(),
            _ => vec![cache.value(doc)],
        }
    }

    pub fn num_items(&self, cache: &FacetDataCache, doc: DocId) -> usize {
        cache.num_items(doc)
    }

    pub fn compare_docs(&self, cache: &FacetDataCache, a: DocId, b: DocId) -> std::cmp::Ordering {
        cache.compare_docs(a, b)
    }
}

fn resolve(cache: &FacetDataCache, value: &str) -> Result<OrdinalRange> {
    RangeExpr::parse_or_value(value)?.resolve(cache.val_array())
}
