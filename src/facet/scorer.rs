//! Document scoring from facet ordinals.
//!
//! A [`FacetDocScorer`] looks up a document's ordinal, its frequency and a
//! per-ordinal boost, then hands them to a pluggable
//! [`FacetTermScoringFunction`]. The output depends only on those three
//! inputs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::facet::cache::FacetDataCache;
use crate::facet::terms::{TermPosition, TermValueList};
use crate::segment::DocId;

/// Statistics of one term in one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermStats {
    /// Documents holding the term.
    pub doc_freq: u32,
    /// Documents in the segment.
    pub num_docs: u32,
}

/// Turns term statistics and a boost into a score.
pub trait FacetTermScoringFunction: Send + Sync + Debug {
    fn score(&self, stats: TermStats, boost: f32) -> f32;

    /// Human-readable account of `score`.
    fn explain(&self, stats: TermStats, boost: f32) -> String;
}

/// Score is the boost.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFacetTermScoring;

impl FacetTermScoringFunction for DefaultFacetTermScoring {
    fn score(&self, _stats: TermStats, boost: f32) -> f32 {
        boost
    }

    fn explain(&self, stats: TermStats, boost: f32) -> String {
        format!("{} = boost({boost})", self.score(stats, boost))
    }
}

/// Boost weighted by `1 + ln((num_docs + 1) / (doc_freq + 1))`, so rare
/// values score higher.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseFrequencyScoring;

impl InverseFrequencyScoring {
    fn idf(stats: TermStats) -> f32 {
        1.0 + ((stats.num_docs as f32 + 1.0) / (stats.doc_freq as f32 + 1.0)).ln()
    }
}

impl FacetTermScoringFunction for InverseFrequencyScoring {
    fn score(&self, stats: TermStats, boost: f32) -> f32 {
        boost * Self::idf(stats)
    }

    fn explain(&self, stats: TermStats, boost: f32) -> String {
        format!(
            "{} = boost({boost}) * idf({}, docFreq={}, numDocs={})",
            self.score(stats, boost),
            Self::idf(stats),
            stats.doc_freq,
            stats.num_docs
        )
    }
}

/// Per-ordinal boosts from a map keyed by formatted value. Values absent from
/// the list are ignored; ordinals without a boost get 0.
pub fn build_boost_list(values: &TermValueList, boosts: &HashMap<String, f32>) -> Vec<f32> {
    let mut list = vec![0.0; values.len()];
    for (raw, &boost) in boosts {
        match values.index_of(raw) {
            Ok(TermPosition::Exact(ordinal)) if ordinal > 0 => list[ordinal] = boost,
            Ok(_) => {}
            Err(e) => log::trace!("ignoring boost for '{raw}': {e}"),
        }
    }
    list
}

#[derive(Debug, Clone)]
pub struct FacetDocScorer {
    cache: Arc<FacetDataCache>,
    scoring: Arc<dyn FacetTermScoringFunction>,
    boosts: Vec<f32>,
}

impl FacetDocScorer {
    pub fn new(
        cache: Arc<FacetDataCache>,
        scoring: Arc<dyn FacetTermScoringFunction>,
        boosts: &HashMap<String, f32>,
    ) -> Self {
        let boosts = build_boost_list(cache.val_array(), boosts);
        FacetDocScorer {
            cache,
            scoring,
            boosts,
        }
    }

    fn stats(&self, ordinal: usize) -> TermStats {
        TermStats {
            doc_freq: self.cache.freqs()[ordinal],
            num_docs: self.cache.doc_count(),
        }
    }

    pub fn score(&self, doc: DocId) -> f32 {
        let ordinal = self.cache.ordinal(doc);
        self.scoring.score(self.stats(ordinal), self.boosts[ordinal])
    }

    pub fn explain(&self, doc: DocId) -> String {
        let ordinal = self.cache.ordinal(doc);
        format!(
            "{}: {}",
            self.cache.val_array().format(ordinal),
            self.scoring.explain(self.stats(ordinal), self.boosts[ordinal])
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Document;
    use crate::facet::config::MissingValue;
    use crate::facet::terms::TermType;
    use crate::segment::MemorySegment;

    fn create_test_cache() -> Arc<FacetDataCache> {
        let docs = ["red", "green", "red", "blue"]
            .into_iter()
            .map(|c| Document::new().add_field("color", c))
            .chain(std::iter::once(Document::new()))
            .collect();
        let segment = MemorySegment::from_documents("seg", docs);
        Arc::new(
            FacetDataCache::load("color", &segment, &TermType::String, &MissingValue::Marker)
                .unwrap(),
        )
    }

    fn boosts(entries: &[(&str, f32)]) -> HashMap<String, f32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_boost_list() {
        let values = TermValueList::from_terms(TermType::Int32, ["1", "5", "9"]).unwrap();
        let list = build_boost_list(&values, &boosts(&[("5", 2.0), ("7", 3.0), ("x", 1.0)]));
        assert_eq!(list, vec![0.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_default_scoring() {
        let scorer = FacetDocScorer::new(
            create_test_cache(),
            Arc::new(DefaultFacetTermScoring),
            &boosts(&[("red", 1.5), ("blue", 0.5)]),
        );
        assert_eq!(scorer.score(0), 1.5);
        assert_eq!(scorer.score(1), 0.0);
        assert_eq!(scorer.score(3), 0.5);
        assert_eq!(scorer.score(4), 0.0);
        assert!(scorer.explain(0).starts_with("red: 1.5"));
    }

    #[test]
    fn test_inverse_frequency_prefers_rare_values() {
        let scorer = FacetDocScorer::new(
            create_test_cache(),
            Arc::new(InverseFrequencyScoring),
            &boosts(&[("red", 1.0), ("blue", 1.0)]),
        );
        assert!(scorer.score(3) > scorer.score(0));
        assert_eq!(scorer.score(0), scorer.score(2));
        assert!(scorer.explain(3).contains("docFreq=1"));
    }
}
