//! Hash index implementation for memtab.
//!
//! This module provides a hash-based index for O(1) point queries.

use crate::stats::IndexStats;
use crate::traits::{Index, IndexError};
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};

/// A hash-based index for O(1) point queries.
///
/// This index uses a HashMap internally and supports both unique and non-unique indexes.
/// Values within a bucket are unordered.
#[derive(Debug, Clone)]
pub struct HashIndex<K, V> {
    /// The underlying map from keys to buckets of values.
    map: HashMap<K, HashSet<V>>,
    /// Whether this is a unique index.
    unique: bool,
    /// Statistics for this index.
    stats: IndexStats,
}

impl<K, V> HashIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Creates a new hash index.
    pub fn new(unique: bool) -> Self {
        Self {
            map: HashMap::new(),
            unique,
            stats: IndexStats::new(),
        }
    }

    /// Returns the statistics for this index.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

impl<K, V> Index<K, V> for HashIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut values: Vec<i64>) -> Vec<i64> {
        values.sort_unstable();
        values
    }

    #[test]
    fn test_hash_index_unique() {
        let mut index: HashIndex<i32, i64> = HashIndex::new(true);

        assert!(index.add(1, 100).is_ok());
        assert!(index.add(2, 200).is_ok());
        assert_eq!(index.add(1, 101), Err(IndexError::DuplicateKey));
        // Re-adding the same pair is not a conflict
        assert!(index.add(1, 100).is_ok());

        assert_eq!(index.get(&1), vec![100]);
        assert_eq!(index.get(&2), vec![200]);
        assert_eq!(index.get(&3), Vec::<i64>::new());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_hash_index_non_unique() {
        let mut index: HashIndex<i32, i64> = HashIndex::new(false);

        assert!(index.add(1, 100).is_ok());
        assert!(index.add(1, 101).is_ok());
        assert!(index.add(2, 200).is_ok());

        assert_eq!(sorted(index.get(&1)), vec![100, 101]);
        assert_eq!(index.get(&2), vec![200]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.stats().max_bucket_len(), 2);
    }

    #[test]
    fn test_hash_index_remove_prunes_bucket() {
        let mut index: HashIndex<i32, i64> = HashIndex::new(false);

        index.add(1, 100).unwrap();
        index.add(1, 101).unwrap();

        assert!(index.remove(&1, &100));
        assert!(!index.remove(&1, &100));
        assert_eq!(index.get(&1), vec![101]);

        assert!(index.remove(&1, &101));
        assert!(!index.contains_key(&1));
        assert_eq!(index.bucket_count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_ensure_bucket() {
        let mut index: HashIndex<i32, i64> = HashIndex::new(false);

        index.ensure_bucket(7);
        assert_eq!(index.bucket_count(), 1);
        assert!(!index.contains_key(&7));
        assert!(index.get(&7).is_empty());
        assert!(index.is_empty());

        // Existing buckets are left alone
        index.add(8, 1).unwrap();
        index.ensure_bucket(8);
        assert_eq!(index.get(&8), vec![1]);
    }

    #[test]
    fn test_would_conflict() {
        let mut index: HashIndex<&str, i64> = HashIndex::new(true);
        index.add("Auth", 1).unwrap();

        assert!(index.would_conflict(&"Auth", &2));
        assert!(!index.would_conflict(&"Auth", &1));
        assert!(!index.would_conflict(&"Billing", &2));

        let multi: HashIndex<&str, i64> = HashIndex::new(false);
        assert!(!multi.would_conflict(&"Auth", &2));
    }

    #[test]
    fn test_get_all_and_clear() {
        let mut index: HashIndex<i32, i64> = HashIndex::new(false);
        index.add(1, 10).unwrap();
        index.add(2, 20).unwrap();
        index.add(2, 21).unwrap();

        assert_eq!(sorted(index.get_all()), vec![10, 20, 21]);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.bucket_count(), 0);
    }
}
