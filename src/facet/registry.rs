//! Per-segment registry of facet data caches.
//!
//! A [`FacetSegment`] pairs a segment reader with the caches built for it,
//! keyed by the caller's cache key (see
//! [`RangeFacetHandler::cache_key`](crate::facet::handler::RangeFacetHandler::cache_key)).
//! Callers sharing a key share the cache, so the key has to cover everything
//! the cache is built from. Each cache is built at most once: concurrent callers
//! asking for the same facet wait on that facet's build lock and then share
//! the result. A failed build is not remembered, so a later call retries.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};

use crate::error::{FacetError, Result};
use crate::facet::cache::FacetDataCache;
use crate::segment::SegmentReader;

type CacheSlot = Arc<Mutex<Option<Arc<FacetDataCache>>>>;

#[derive(Debug)]
pub struct FacetSegment {
    reader: Arc<dyn SegmentReader>,
    caches: RwLock<AHashMap<String, CacheSlot>>,
}

impl FacetSegment {
    pub fn new(reader: Arc<dyn SegmentReader>) -> Self {
        FacetSegment {
            reader,
            caches: RwLock::new(AHashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.reader.name()
    }

    pub fn reader(&self) -> &Arc<dyn SegmentReader> {
        &self.reader
    }

    /// Return the cache registered under `facet`, building it with `load`
    /// if it does not exist yet.
    pub fn get_or_load<F>(&self, facet: &str, load: F) -> Result<Arc<FacetDataCache>>
    where
        F: FnOnce(&dyn SegmentReader) -> Result<FacetDataCache>,
    {
        let slot = self.slot(facet);
        let mut guard = slot.lock();
        if let Some(cache) = guard.as_ref() {
            return Ok(Arc::clone(cache));
        }

        let cache = Arc::new(load(self.reader.as_ref())?);
        log::trace!("registered facet '{facet}' on segment {}", self.name());
        *guard = Some(Arc::clone(&cache));
        Ok(cache)
    }

    fn slot(&self, facet: &str) -> CacheSlot {
        if let Some(slot) = self.caches.read().get(facet) {
            return Arc::clone(slot);
        }
        Arc::clone(self.caches.write().entry(facet.to_string()).or_default())
    }

    /// The cache for `facet` if it has been built.
    pub fn cached(&self, facet: &str) -> Option<Arc<FacetDataCache>> {
        let slot = self.caches.read().get(facet).cloned()?;
        let guard = slot.lock();
        guard.clone()
    }

    /// Like [`cached`](Self::cached), but a missing cache is an error.
    pub fn loaded(&self, facet: &str) -> Result<Arc<FacetDataCache>> {
        self.cached(facet).ok_or_else(|| {
            FacetError::not_found(format!(
                "facet '{facet}' is not loaded on segment {}",
                self.name()
            ))
        })
    }

    /// Drop the cache for `facet`. Handles already given out stay valid.
    pub fn evict(&self, facet: &str) -> bool {
        self.caches
            .write()
            .remove(facet)
            .is_some_and(|slot| slot.lock().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::data::Document;
    use crate::facet::config::MissingValue;
    use crate::facet::terms::TermType;
    use crate::segment::MemorySegment;

    fn create_test_segment() -> FacetSegment {
        let docs = (0..10)
            .map(|i| Document::new().add_integer("num", i % 3))
            .collect();
        FacetSegment::new(Arc::new(MemorySegment::from_documents("seg_0", docs)))
    }

    fn load_num(reader: &dyn SegmentReader) -> Result<FacetDataCache> {
        FacetDataCache::load("num", reader, &TermType::Int64, &MissingValue::Marker)
    }

    #[test]
    fn test_builds_once_under_contention() {
        let segment = create_test_segment();
        let builds = AtomicUsize::new(0);

        let caches: Vec<Arc<FacetDataCache>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        segment
                            .get_or_load("num", |reader| {
                                builds.fetch_add(1, Ordering::SeqCst);
                                load_num(reader)
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(caches.iter().all(|c| Arc::ptr_eq(c, &caches[0])));
    }

    #[test]
    fn test_failed_build_is_retried() {
        let segment = create_test_segment();
        let result = segment.get_or_load("num", |_| Err(FacetError::index("boom")));
        assert!(result.is_err());
        assert!(segment.cached("num").is_none());
        assert!(matches!(segment.loaded("num"), Err(FacetError::NotFound(_))));

        let cache = segment.get_or_load("num", load_num).unwrap();
        assert_eq!(cache.doc_count(), 10);
        assert!(Arc::ptr_eq(&segment.loaded("num").unwrap(), &cache));
    }

    #[test]
    fn test_evict() {
        let segment = create_test_segment();
        let first = segment.get_or_load("num", load_num).unwrap();
        assert!(segment.evict("num"));
        assert!(!segment.evict("num"));

        let second = segment.get_or_load("num", load_num).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.freqs(), second.freqs());
    }
}
