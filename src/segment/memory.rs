//! In-memory segment implementation.

use ahash::AHashSet;

use crate::data::Document;
use crate::error::{FacetError, Result};
use crate::segment::{DocId, SegmentReader};

/// A segment held entirely in memory.
///
/// Document ids are assigned in insertion order. A field is part of the
/// segment if it was declared on the builder or appears in any document.
#[derive(Debug, Clone)]
pub struct MemorySegment {
    name: String,
    docs: Vec<Document>,
    fields: AHashSet<String>,
}

impl MemorySegment {
    pub fn builder(name: impl Into<String>) -> MemorySegmentBuilder {
        MemorySegmentBuilder {
            name: name.into(),
            docs: Vec::new(),
            fields: AHashSet::new(),
        }
    }

    /// Create a segment from documents.
    pub fn from_documents(name: impl Into<String>, docs: Vec<Document>) -> Self {
        let mut builder = Self::builder(name);
        for doc in docs {
            builder = builder.add_document(doc);
        }
        builder.build()
    }

    fn check_field(&self, field: &str) -> Result<()> {
        if self.fields.contains(field) {
            Ok(())
        } else {
            Err(FacetError::index(format!(
                "field '{field}' is not present in segment {}",
                self.name
            )))
        }
    }
}

impl SegmentReader for MemorySegment {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc_count(&self) -> u32 {
        self.docs.len() as u32
    }

    fn distinct_values(&self, field: &str) -> Result<Vec<String>> {
        self.check_field(field)?;

        let seen: AHashSet<String> = self
            .docs
            .iter()
            .filter_map(|doc| doc.get(field).and_then(|v| v.to_term()))
            .collect();
        Ok(seen.into_iter().collect())
    }

    fn stored_value(&self, doc: DocId, field: &str) -> Result<Option<String>> {
        self.check_field(field)?;

        let document = self.docs.get(doc as usize).ok_or_else(|| {
            FacetError::index(format!(
                "document {doc} is out of range [0, {}) for segment {}",
                self.docs.len(),
                self.name
            ))
        })?;
        Ok(document.get(field).and_then(|v| v.to_term()))
    }
}

#[derive(Debug)]
pub struct MemorySegmentBuilder {
    name: String,
    docs: Vec<Document>,
    fields: AHashSet<String>,
}

impl MemorySegmentBuilder {
    /// Declare a field even if no document carries it.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into());
        self
    }

    pub fn add_document(mut self, doc: Document) -> Self {
        self.fields.extend(doc.fields.keys().cloned());
        self.docs.push(doc);
        self
    }

    pub fn build(self) -> MemorySegment {
        MemorySegment {
            name: self.name,
            docs: self.docs,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataValue;

    fn create_test_segment() -> MemorySegment {
        MemorySegment::builder("seg_0")
            .with_field("price")
            .add_document(Document::new().add_field("color", "red"))
            .add_document(Document::new().add_field("color", "green"))
            .add_document(Document::new().add_field("color", "red"))
            .add_document(Document::new())
            .build()
    }

    #[test]
    fn test_distinct_values() {
        let segment = create_test_segment();
        let mut values = segment.distinct_values("color").unwrap();
        values.sort();
        assert_eq!(values, vec!["green".to_string(), "red".to_string()]);
        assert_eq!(segment.doc_count(), 4);
    }

    #[test]
    fn test_declared_field_without_values() {
        let segment = create_test_segment();
        assert!(segment.distinct_values("price").unwrap().is_empty());
        assert_eq!(segment.stored_value(0, "price").unwrap(), None);
    }

    #[test]
    fn test_null_value_has_no_term() {
        let segment = MemorySegment::builder("seg_1")
            .add_document(Document::new().add_field("color", DataValue::Null))
            .add_document(Document::new().add_field("color", "blue"))
            .build();
        assert_eq!(segment.distinct_values("color").unwrap(), vec!["blue".to_string()]);
        assert_eq!(segment.stored_value(0, "color").unwrap(), None);
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let segment = create_test_segment();
        assert!(matches!(
            segment.distinct_values("size"),
            Err(FacetError::Index(_))
        ));
    }

    #[test]
    fn test_stored_value_out_of_range() {
        let segment = create_test_segment();
        assert_eq!(
            segment.stored_value(1, "color").unwrap(),
            Some("green".to_string())
        );
        assert_eq!(segment.stored_value(3, "color").unwrap(), None);
        assert!(segment.stored_value(4, "color").is_err());
    }
}
