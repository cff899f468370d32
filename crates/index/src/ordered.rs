//! Ordered index implementation for memtab.
//!
//! Keys are kept sorted, so `get_all` walks buckets in key order. Values within
//! a bucket are sorted too.

use crate::stats::IndexStats;
use crate::traits::{Index, IndexError};
use std::collections::{BTreeMap, BTreeSet};

/// A B-tree backed index supporting key-ordered scans.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V> {
    map: BTreeMap<K, BTreeSet<V>>,
    unique: bool,
    stats: IndexStats,
}

impl<K: Ord + Clone, V: Ord + Clone> OrderedIndex<K, V> {
    /// Creates a new ordered index.
    pub fn new(unique: bool) -> Self {
        Self {
            map: BTreeMap::new(),
            unique,
            stats: IndexStats::new(),
        }
    }

    /// Returns the statistics for this index.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

impl<K: Ord + Clone, V: Ord + Clone> Index<K, V> for OrderedIndex<K, V> {
    fn add(&mut self, key: K, value: V) -> Result<(), IndexError> {
        if self.would_conflict(&key, &value) {
            return Err(IndexError::DuplicateKey);
        }

        let bucket = self.map.entry(key).or_default();
        if bucket.insert(value) {
            self.stats.record_add(bucket.len());
        }
        Ok(())
    }

    fn get(&self, key: &K) -> Vec<V> {
        self.map
            .get(key)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn remove(&mut self, key: &K, value: &V) -> bool {
        let Some(bucket) = self.map.get_mut(key) else {
            return false;
        };
        let removed = bucket.remove(value);
        if removed {
            self.stats.record_remove();
            if bucket.is_empty() {
                self.map.remove(key);
            }
        }
        removed
    }

    fn contains_key(&self, key: &K) -> bool {
        self.map.get(key).is_some_and(|bucket| !bucket.is_empty())
    }

    fn contains(&self, key: &K, value: &V) -> bool {
        self.map.get(key).is_some_and(|bucket| bucket.contains(value))
    }

    fn ensure_bucket(&mut self, key: K) {
        self.map.entry(key).or_default();
    }

    fn bucket_count(&self) -> usize {
        self.map.len()
    }

    fn len(&self) -> usize {
        self.stats.total_values()
    }

    fn is_unique(&self) -> bool {
        self.unique
    }

    fn get_all(&self) -> Vec<V> {
        self.map.values().flatten().cloned().collect()
    }

    fn clear(&mut self) {
        self.map.clear();
        self.stats.clear();
    }
}
