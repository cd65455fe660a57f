//! Materialized array cache.
//!
//! Each property collection owns one cache keyed by descriptor uuid. An
//! array is loaded at most once per collection until it is explicitly
//! invalidated; there is no size-driven eviction.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::util::PropertyArray;

/// Thread-safe cache of materialized property arrays.
///
/// Uses `parking_lot::RwLock` for non-poisoning locks and `AtomicUsize`
/// for lock-free size tracking.
#[derive(Default)]
pub struct ArrayCache {
    entries: RwLock<HashMap<Uuid, Arc<PropertyArray>>>,
    bytes: AtomicUsize,
    loads: AtomicUsize,
}

impl ArrayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached array if present.
    #[inline]
    pub fn get(&self, key: &Uuid) -> Option<Arc<PropertyArray>> {
        self.entries.read().get(key).cloned()
    }

    /// Insert an array, replacing any previous entry, and return the shared copy.
    pub fn insert(&self, key: Uuid, array: PropertyArray) -> Arc<PropertyArray> {
        let size = array.size_bytes();
        let array = Arc::new(array);
        let previous = self.entries.write().insert(key, Arc::clone(&array));
        if let Some(old) = previous {
            self.sub_bytes(old.size_bytes());
        }
        self.bytes.fetch_add(size, Ordering::Relaxed);
        self.loads.fetch_add(1, Ordering::Relaxed);
        array
    }

    /// Drop one entry. Returns true if something was cached.
    pub fn invalidate(&self, key: &Uuid) -> bool {
        match self.entries.write().remove(key) {
            Some(old) => {
                self.sub_bytes(old.size_bytes());
                true
            }
            None => false,
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.bytes.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn contains(&self, key: &Uuid) -> bool {
        self.entries.read().contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate bytes held.
    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Number of inserts since construction.
    #[inline]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn sub_bytes(&self, n: usize) {
        let _ = self
            .bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| Some(x.saturating_sub(n)));
    }
}

impl std::fmt::Debug for ArrayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayCache")
            .field("entries", &self.len())
            .field("bytes", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Shape;

    fn array(n: usize) -> PropertyArray {
        PropertyArray::from_f64(Shape::d1(n), vec![1.0; n]).unwrap()
    }

    #[test]
    fn test_insert_get() {
        let cache = ArrayCache::new();
        let key = Uuid::new_v4();
        assert!(cache.get(&key).is_none());

        cache.insert(key, array(4));
        assert_eq!(cache.get(&key).unwrap().len(), 4);
        assert_eq!(cache.size(), 32);
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_replace_accounts_bytes() {
        let cache = ArrayCache::new();
        let key = Uuid::new_v4();
        cache.insert(key, array(4));
        cache.insert(key, array(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size(), 16);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ArrayCache::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cache.insert(a, array(1));
        cache.insert(b, array(1));

        assert!(cache.invalidate(&a));
        assert!(!cache.invalidate(&a));
        assert!(cache.contains(&b));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_shared_copy_survives_invalidate() {
        let cache = ArrayCache::new();
        let key = Uuid::new_v4();
        let held = cache.insert(key, array(3));
        cache.invalidate(&key);
        assert_eq!(held.len(), 3);
    }
}
