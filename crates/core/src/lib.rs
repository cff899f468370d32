//! memtab Core - Core types and schema definitions for the memtab record store.
//!
//! This crate provides the foundational types shared by every table:
//!
//! - `DataType` / `Value`: column types and cell values
//! - `Key`: immutable, structurally compared primary and secondary keys
//! - `Record`: one row, with its revision counter and subtype discriminator
//! - `AuthToken`: the opaque capability token passed to every operation
//! - `schema`: table definitions (columns, primary key, indexes, foreign keys)
//! - `Error`: error types for table operations
//!
//! # Example
//!
//! ```rust
//! use memtab_core::schema::TableBuilder;
//! use memtab_core::{DataType, Key, Record, Value};
//!
//! let table = TableBuilder::new("ServiceType")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("description", DataType::String)
//!     .unwrap()
//!     .add_primary_key(&["id"])
//!     .unwrap()
//!     .add_unique("uqDescription", &["description"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let record = Record::new("ServiceType", vec![Value::Int64(1), Value::from("Auth")]);
//! assert_eq!(table.primary_key_of(&record), Key::from(1i64));
//! assert_eq!(record.revision(), 0);
//! ```

mod auth;
mod error;
mod key;
mod record;
pub mod schema;
mod types;
mod value;

pub use auth::AuthToken;
pub use error::{Error, Result};
pub use key::Key;
pub use record::{ClassCode, Record, Revision, INITIAL_REVISION};
pub use types::DataType;
pub use value::Value;
