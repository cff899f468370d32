//! memtab Storage - Indexed tables for the memtab record store.
//!
//! This crate provides the storage layer including:
//!
//! - `IndexedTable`: rows of one table with primary and secondary index maintenance
//! - `RelationValidator`: foreign key checks and cascading delete
//! - `Schema`: the set of tables of one store, with `TableHandle` for table operations
//! - `SchemaOptions`: schema-wide settings
//!
//! # Example
//!
//! ```rust
//! use memtab_core::schema::TableBuilder;
//! use memtab_core::{AuthToken, DataType, Key, Record, Value};
//! use memtab_storage::{Schema, SchemaOptions};
//!
//! let mut schema = Schema::new(SchemaOptions::default());
//! let def = TableBuilder::new("ServiceType")
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
//! schema.add_table(def).unwrap();
//!
//! let auth = AuthToken::system();
//! let table = schema.table("ServiceType").unwrap();
//! let mut record = Record::new("ServiceType", vec![Value::Int64(1), Value::from("Auth")]);
//! table.create(&auth, record.clone()).unwrap();
//!
//! record.set(1, Value::from("AuthV2"));
//! table.update(&auth, &mut record).unwrap();
//! assert_eq!(record.revision(), 1);
//!
//! table.delete(&auth, &record).unwrap();
//! assert!(table.read(&auth, &Key::from(1i64)).is_none());
//! ```

pub mod options;
pub mod relation;
pub mod schema;
pub mod table;

pub use options::SchemaOptions;
pub use relation::{RelationValidator, ReverseEdge};
pub use schema::{Schema, TableHandle};
pub use table::IndexedTable;
