//! Bounded TTL + LRU cache.
//!
//! All workbench caches share this shape: entries expire after a TTL and
//! the least recently used entry is evicted once the capacity is reached.
//! Only the coordinator mutates cache instances.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A TTL-bounded LRU cache.
pub struct TtlLruCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    /// Recency order, most recent at the back.
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlLruCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Workbench default: 50 entries, 24 h TTL.
    pub fn with_defaults() -> Self {
        let cfg = crate::config::get();
        Self::new(cfg.cache.capacity, Duration::from_secs(cfg.cache.ttl_hours * 3600))
    }

    fn touch(&mut self, key: &K) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            self.order.remove(position);
        }
        self.order.push_back(key.clone());
    }

    /// Fetch a live entry, refreshing its recency. Expired entries are
    /// dropped on access.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() > self.ttl,
            None => return None,
        };
        if expired {
            self.remove(key);
            return None;
        }
        self.touch(key);
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key.clone(), Entry { value, inserted_at: Instant::now() });
            self.touch(&key);
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, Entry { value, inserted_at: Instant::now() });
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            self.order.remove(position);
        }
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .map(|e| e.inserted_at.elapsed() <= self.ttl)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_roundtrip() {
        let mut cache = TtlLruCache::new(10, Duration::from_secs(60));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = TtlLruCache::new(3, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        // Touch "a" so "b" becomes the eviction victim.
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("d", 4);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"d"), Some(4));
    }

    #[test]
    fn test_ttl_expiry() {
        let mut cache = TtlLruCache::new(10, Duration::from_millis(20));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_refreshes() {
        let mut cache = TtlLruCache::new(2, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(2));
    }

    #[test]
    fn test_identical_keys_yield_equal_values() {
        let mut cache = TtlLruCache::new(10, Duration::from_secs(60));
        cache.insert("key".to_string(), vec![1, 2, 3]);
        let first = cache.get(&"key".to_string());
        let second = cache.get(&"key".to_string());
        assert_eq!(first, second);
    }
}
