//! Index statistics for memtab.

/// Statistics for an index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Total number of values in the index.
    total_values: usize,
    /// Largest bucket size seen since the last clear.
    max_bucket_len: usize,
}

impl IndexStats {
    /// Creates a new empty stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of values.
    pub fn total_values(&self) -> usize {
        self.total_values
    }

    /// Returns the largest bucket size seen.
    pub fn max_bucket_len(&self) -> usize {
        self.max_bucket_len
    }

    /// Records an added value and the size of the bucket it landed in.
    pub fn record_add(&mut self, bucket_len: usize) {
        self.total_values += 1;
        self.max_bucket_len = self.max_bucket_len.max(bucket_len);
    }

    /// Records a removed value.
    pub fn record_remove(&mut self) {
        self.total_values = self.total_values.saturating_sub(1);
    }

    /// Resets all counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
