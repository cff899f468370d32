//! memtab Index - Index implementations for the memtab record store.
//!
//! An index maps a key to a bucket of values; the storage layer stores primary
//! keys as values. Two implementations share the `Index` trait:
//!
//! - `HashIndex`: O(1) point lookups using a hash map
//! - `OrderedIndex`: point lookups plus key-ordered scans using a B-tree map
//!
//! Both can be unique (at most one value per key) or non-unique.
//!
//! # Example
//!
//! ```rust
//! use memtab_index::{HashIndex, Index};
//!
//! let mut unique: HashIndex<&str, i64> = HashIndex::new(true);
//! unique.add("Auth", 1).unwrap();
//! assert!(unique.add("Auth", 2).is_err());
//! assert_eq!(unique.get(&"Auth"), vec![1]);
//!
//! let mut multi: HashIndex<&str, i64> = HashIndex::new(false);
//! multi.add("blue", 1).unwrap();
//! multi.add("blue", 2).unwrap();
//! assert_eq!(multi.get(&"blue").len(), 2);
//! ```

pub mod hash;
pub mod ordered;
pub mod stats;
pub mod traits;

pub use hash::HashIndex;
pub use ordered::OrderedIndex;
pub use stats::IndexStats;
pub use traits::{Index, IndexError};
