//! Per-segment facet data cache.
//!
//! A [`FacetDataCache`] is built once when a segment is opened and read by
//! every filter and collector for that segment afterwards. It holds three
//! arrays with one lifetime:
//!
//! - `val_array`: the sorted distinct values ([`TermValueList`], size M)
//! - `order_array`: document id → ordinal ([`OrdinalArray`], one slot per document)
//! - `freqs`: ordinal → number of documents holding it (size M)
//!
//! plus the first and last document id holding each ordinal, which lets
//! filters bound doc-id iteration without scanning the whole segment.

use std::cmp::Ordering;

use crate::error::{FacetError, Result};
use crate::facet::config::MissingValue;
use crate::facet::ordinals::OrdinalArray;
use crate::facet::terms::{TermPosition, TermType, TermValueList};
use crate::segment::{DocId, SegmentReader};

const NO_DOC: DocId = DocId::MAX;

/// Ordinal dictionary and derived arrays for one field in one segment.
///
/// Immutable after [`load`](Self::load); safe to share across threads.
#[derive(Debug)]
pub struct FacetDataCache {
    field: String,
    val_array: TermValueList,
    order_array: OrdinalArray,
    freqs: Vec<u32>,
    min_doc_ids: Vec<DocId>,
    max_doc_ids: Vec<DocId>,
}

impl FacetDataCache {
    /// Build the cache for `field` from a segment.
    ///
    /// Enumerates the distinct terms, sorts them into the value list, then
    /// resolves every document's stored term to its ordinal in one pass.
    /// Fails if the segment cannot be read, a term does not belong to
    /// `term_type`, or a document holds a term the enumeration did not report.
    pub fn load(
        field: &str,
        reader: &dyn SegmentReader,
        term_type: &TermType,
        missing: &MissingValue,
    ) -> Result<Self> {
        Self::build(field, reader, term_type, missing).inspect_err(|e| {
            log::warn!(
                "failed to load facet data for field '{field}' on segment {}: {e}",
                reader.name()
            );
        })
    }

    fn build(
        field: &str,
        reader: &dyn SegmentReader,
        term_type: &TermType,
        missing: &MissingValue,
    ) -> Result<Self> {
        let segment = reader.name();
        let terms = reader.distinct_values(field)?;
        let mut val_array = TermValueList::from_terms(term_type.clone(), &terms)
            .map_err(|e| FacetError::index(format!("segment {segment}, field '{field}': {e}")))?;

        let missing_ordinal = match missing {
            MissingValue::Marker => 0,
            MissingValue::Substitute(raw) => {
                let value = term_type.parse(raw).map_err(|e| {
                    FacetError::invalid_config(format!("substitute for field '{field}': {e}"))
                })?;
                val_array.insert(value)
            }
        };

        let num_ordinals = val_array.len();
        let doc_count = reader.doc_count();
        let mut order_array = OrdinalArray::new(doc_count as usize, num_ordinals);
        let mut freqs = vec![0u32; num_ordinals];
        let mut min_doc_ids = vec![NO_DOC; num_ordinals];
        let mut max_doc_ids = vec![NO_DOC; num_ordinals];

        for doc in 0..doc_count {
            let ordinal = match reader.stored_value(doc, field)? {
                None => missing_ordinal,
                Some(raw) => {
                    let value = term_type.parse(&raw).map_err(|e| {
                        FacetError::index(format!(
                            "segment {segment}, field '{field}', document {doc}: {e}"
                        ))
                    })?;
                    match val_array.index_of_value(&value) {
                        TermPosition::Exact(ord) => ord,
                        TermPosition::Insertion(_) => {
                            return Err(FacetError::index(format!(
                                "segment {segment}, field '{field}': document {doc} holds '{raw}' \
                                 which is not among the enumerated terms"
                            )));
                        }
                    }
                }
            };

            order_array.set(doc as usize, ordinal);
            freqs[ordinal] += 1;
            if min_doc_ids[ordinal] == NO_DOC {
                min_doc_ids[ordinal] = doc;
            }
            max_doc_ids[ordinal] = doc;
        }

        log::debug!(
            "built facet data for field '{field}' on segment {segment}: {} values, {doc_count} docs, {}-bit ordinals",
            num_ordinals - 1,
            order_array.bits_per_value()
        );

        Ok(FacetDataCache {
            field: field.to_string(),
            val_array,
            order_array,
            freqs,
            min_doc_ids,
            max_doc_ids,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn val_array(&self) -> &TermValueList {
        &self.val_array
    }

    pub fn order_array(&self) -> &OrdinalArray {
        &self.order_array
    }

    pub fn freqs(&self) -> &[u32] {
        &self.freqs
    }

    pub fn doc_count(&self) -> u32 {
        self.order_array.len() as u32
    }

    /// Number of ordinals, including the marker.
    pub fn num_ordinals(&self) -> usize {
        self.val_array.len()
    }

    #[inline]
    pub fn ordinal(&self, doc: DocId) -> usize {
        self.order_array.get(doc as usize)
    }

    /// Formatted value of `doc`; empty when the document has no value.
    pub fn value(&self, doc: DocId) -> String {
        self.val_array.format(self.ordinal(doc))
    }

    /// 1 if `doc` holds a value, 0 otherwise.
    pub fn num_items(&self, doc: DocId) -> usize {
        usize::from(self.ordinal(doc) != 0)
    }

    /// First document holding `ordinal`.
    pub fn min_doc_id(&self, ordinal: usize) -> Option<DocId> {
        self.min_doc_ids.get(ordinal).copied().filter(|&d| d != NO_DOC)
    }

    /// Last document holding `ordinal`.
    pub fn max_doc_id(&self, ordinal: usize) -> Option<DocId> {
        self.max_doc_ids.get(ordinal).copied().filter(|&d| d != NO_DOC)
    }

    /// Order two documents by their values.
    pub fn compare_docs(&self, a: DocId, b: DocId) -> Ordering {
        self.val_array
            .compare_ordinals(self.ordinal(a), self.ordinal(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Document;
    use crate::segment::MemorySegment;

    fn create_test_segment() -> MemorySegment {
        let nums = [30, 10, 20, 10, 30, 10];
        let docs = nums
            .iter()
            .map(|n| Document::new().add_integer("num", *n))
            .chain(std::iter::once(Document::new()))
            .collect();
        MemorySegment::from_documents("seg_0", docs)
    }

    fn load(segment: &MemorySegment, missing: &MissingValue) -> FacetDataCache {
        FacetDataCache::load("num", segment, &TermType::Int32, missing).unwrap()
    }

    #[test]
    fn test_load_builds_ordinals() {
        let segment = create_test_segment();
        let cache = load(&segment, &MissingValue::Marker);

        assert_eq!(cache.num_ordinals(), 4);
        assert_eq!(cache.doc_count(), 7);
        assert_eq!(cache.freqs(), &[1, 3, 1, 2]);
        assert_eq!(cache.ordinal(0), 3);
        assert_eq!(cache.ordinal(1), 1);
        assert_eq!(cache.ordinal(6), 0);
        assert_eq!(cache.value(2), "20");
        assert_eq!(cache.value(6), "");
        assert_eq!(cache.num_items(0), 1);
        assert_eq!(cache.num_items(6), 0);
    }

    #[test]
    fn test_freqs_match_order_array() {
        let segment = create_test_segment();
        let cache = load(&segment, &MissingValue::Marker);

        let total: u32 = cache.freqs().iter().sum();
        assert_eq!(total, cache.doc_count());

        for ord in 0..cache.num_ordinals() {
            let count = (0..cache.doc_count())
                .filter(|&d| cache.ordinal(d) == ord)
                .count() as u32;
            assert_eq!(cache.freqs()[ord], count);
        }
    }

    #[test]
    fn test_min_max_doc_ids() {
        let segment = create_test_segment();
        let cache = load(&segment, &MissingValue::Marker);

        assert_eq!(cache.min_doc_id(1), Some(1));
        assert_eq!(cache.max_doc_id(1), Some(5));
        assert_eq!(cache.min_doc_id(0), Some(6));
        assert_eq!(cache.min_doc_id(9), None);
    }

    #[test]
    fn test_substitute_missing_value() {
        let segment = create_test_segment();
        let cache = load(&segment, &MissingValue::Substitute("15".to_string()));

        assert_eq!(cache.num_ordinals(), 5);
        assert_eq!(cache.value(6), "15");
        assert_eq!(cache.freqs()[0], 0);
        assert_eq!(cache.freqs()[2], 1);
        assert_eq!(cache.num_items(6), 1);
    }

    #[test]
    fn test_invalid_substitute_is_config_error() {
        let segment = create_test_segment();
        let result = FacetDataCache::load(
            "num",
            &segment,
            &TermType::Int32,
            &MissingValue::Substitute("n/a".to_string()),
        );
        assert!(matches!(result, Err(FacetError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_field() {
        let segment = MemorySegment::builder("seg_0")
            .with_field("num")
            .add_document(Document::new())
            .add_document(Document::new())
            .build();
        let cache = load(&segment, &MissingValue::Marker);

        assert_eq!(cache.num_ordinals(), 1);
        assert_eq!(cache.freqs(), &[2]);
    }

    #[test]
    fn test_out_of_domain_term_fails_load() {
        let segment = MemorySegment::from_documents(
            "seg_0",
            vec![Document::new().add_field("num", "ten")],
        );
        let result = FacetDataCache::load("num", &segment, &TermType::Int32, &MissingValue::Marker);
        assert!(matches!(result, Err(FacetError::Index(_))));
    }

    #[test]
    fn test_compare_docs() {
        let segment = create_test_segment();
        let cache = load(&segment, &MissingValue::Marker);

        assert_eq!(cache.compare_docs(1, 0), Ordering::Less);
        assert_eq!(cache.compare_docs(1, 3), Ordering::Equal);
        assert_eq!(cache.compare_docs(6, 1), Ordering::Less);
    }

    #[derive(Debug)]
    struct InconsistentSegment;

    impl SegmentReader for InconsistentSegment {
        fn name(&self) -> &str {
            "broken"
        }

        fn doc_count(&self) -> u32 {
            2
        }

        fn distinct_values(&self, _field: &str) -> Result<Vec<String>> {
            Ok(vec!["a".to_string()])
        }

        fn stored_value(&self, doc: DocId, _field: &str) -> Result<Option<String>> {
            match doc {
                0 => Ok(Some("a".to_string())),
                _ => Ok(Some("b".to_string())),
            }
        }
    }

    #[test]
    fn test_unenumerated_term_fails_load() {
        let result = FacetDataCache::load(
            "color",
            &InconsistentSegment,
            &TermType::String,
            &MissingValue::Marker,
        );
        match result {
            Err(FacetError::Index(msg)) => assert!(msg.contains("document 1")),
            other => panic!("expected index error, got {other:?}"),
        }
    }
}
