//! memtab Entities - Typed entity tables for the memtab record store.
//!
//! Each entity type implements [`Entity`], which ties it to a table and a
//! subtype tag, and is accessed through an [`EntityTable`]:
//!
//! - `ServiceType`: kinds of service, unique by description
//! - `SysCluster`: system clusters, stored in the shared `Cluster` table
//! - `Service`: services referencing a type, a cluster and a parent service
//!
//! A [`Catalog`] builds the schema holding all three tables.
//!
//! # Example
//!
//! ```rust
//! use memtab_core::AuthToken;
//! use memtab_entities::{Catalog, Service, ServiceType};
//! use memtab_storage::SchemaOptions;
//!
//! let catalog = Catalog::new(SchemaOptions::default()).unwrap();
//! let auth = AuthToken::system();
//!
//! let mut auth_type = ServiceType::new(1, "Auth");
//! catalog.service_types().unwrap().create(&auth, &auth_type).unwrap();
//! catalog.services().unwrap().create(&auth, &Service::new(10, "auth-api", 1)).unwrap();
//!
//! auth_type.description = "AuthV2".into();
//! catalog.service_types().unwrap().update(&auth, &mut auth_type).unwrap();
//! assert_eq!(auth_type.revision, 1);
//!
//! catalog.service_types().unwrap().delete(&auth, &auth_type).unwrap();
//! assert!(catalog.services().unwrap().is_empty());
//! ```

mod catalog;
mod entity;
mod service;
mod service_type;
mod sys_cluster;

pub use catalog::Catalog;
pub use entity::{Entity, EntityTable};
pub use service::{Service, ServiceTable};
pub use service_type::{ServiceType, ServiceTypeTable};
pub use sys_cluster::{SysCluster, SysClusterTable};
