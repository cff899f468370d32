//! Schema module for memtab.
//!
//! This module contains the table definitions the storage engine is configured
//! with: columns, the primary key, secondary indexes and foreign keys.

mod column;
mod constraint;
mod index;
mod table;

pub use column::Column;
pub use constraint::{ConstraintAction, ForeignKey};
pub use index::{IndexDef, IndexType};
pub use table::{TableBuilder, TableDef};
