//! Document → ordinal storage.

/// Per-document ordinal array, stored at the narrowest width that can hold
/// every ordinal of the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdinalArray {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl OrdinalArray {
    /// Allocate `doc_count` zeroed slots (every document on the marker) for
    /// a field with `num_ordinals` ordinals.
    pub fn new(doc_count: usize, num_ordinals: usize) -> Self {
        let max_ordinal = num_ordinals.saturating_sub(1);
        if max_ordinal <= u8::MAX as usize {
            OrdinalArray::U8(vec![0; doc_count])
        } else if max_ordinal <= u16::MAX as usize {
            OrdinalArray::U16(vec![0; doc_count])
        } else {
            OrdinalArray::U32(vec![0; doc_count])
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OrdinalArray::U8(v) => v.len(),
            OrdinalArray::U16(v) => v.len(),
            OrdinalArray::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordinal of `doc`. Panics if `doc` is out of range.
    #[inline]
    pub fn get(&self, doc: usize) -> usize {
        match self {
            OrdinalArray::U8(v) => v[doc] as usize,
            OrdinalArray::U16(v) => v[doc] as usize,
            OrdinalArray::U32(v) => v[doc] as usize,
        }
    }

    /// Ordinal of `doc`, or `None` past the end.
    #[inline]
    pub fn try_get(&self, doc: usize) -> Option<usize> {
        (doc < self.len()).then(|| self.get(doc))
    }

    /// The caller guarantees `ordinal` fits the width chosen in [`new`](Self::new).
    pub(crate) fn set(&mut self, doc: usize, ordinal: usize) {
        match self {
            OrdinalArray::U8(v) => v[doc] = ordinal as u8,
            OrdinalArray::U16(v) => v[doc] = ordinal as u16,
            OrdinalArray::U32(v) => v[doc] = ordinal as u32,
        }
    }

    pub fn bits_per_value(&self) -> u32 {
        match self {
            OrdinalArray::U8(_) => 8,
            OrdinalArray::U16(_) => 16,
            OrdinalArray::U32(_) => 32,
        }
    }
}
