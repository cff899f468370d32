//! Index trait definitions for memtab.
//!
//! This module defines the core `Index` trait that all index implementations must satisfy.

use thiserror::Error;

/// Core trait for all index implementations.
///
/// A bucket is the set of values stored under one key. Buckets are removed when
/// their last value is removed, except buckets created explicitly through
/// `ensure_bucket`, which stay until a value is added and removed again.
pub trait Index<K, V> {
    /// Adds a value under a key.
    /// For unique indexes, this fails if the key already holds a different value.
    /// Adding a value that is already present is a no-op.
    fn add(&mut self, key: K, value: V) -> Result<(), IndexError>;

    /// Gets all values associated with a key.
    fn get(&self, key: &K) -> Vec<V>;

    /// Removes a value from a key's bucket. Returns true if it was present.
    fn remove(&mut self, key: &K, value: &V) -> bool;

    /// Checks if the index holds at least one value for the key.
    fn contains_key(&self, key: &K) -> bool;

    /// Checks if the key's bucket contains the value.
    fn contains(&self, key: &K, value: &V) -> bool;

    /// Creates an empty bucket for the key if none exists.
    fn ensure_bucket(&mut self, key: K);

    /// Returns the number of buckets, including empty ones.
    fn bucket_count(&self) -> usize;

    /// Returns the number of values in the index.
    fn len(&self) -> usize;

    /// Returns true if the index holds no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether this is a unique index.
    fn is_unique(&self) -> bool;

    /// Returns all values in the index.
    fn get_all(&self) -> Vec<V>;

    /// Clears all entries from the index.
    fn clear(&mut self);

    /// Returns true if adding `value` under `key` would break uniqueness.
    fn would_conflict(&self, key: &K, value: &V) -> bool {
        self.is_unique() && self.contains_key(key) && !self.contains(key, value)
    }
}

/// Error type for index operations.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum IndexError {
    /// Attempted to insert a duplicate key in a unique index.
    #[error("Duplicate key in unique index")]
    DuplicateKey,
}
