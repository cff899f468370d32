//! The catalog: one schema holding every entity table.

use crate::entity::{Entity, EntityTable};
use crate::service::{Service, ServiceTable};
use crate::service_type::{ServiceType, ServiceTypeTable};
use crate::sys_cluster::{SysCluster, SysClusterTable};
use log::debug;
use memtab_core::Result;
use memtab_storage::{Schema, SchemaOptions};

/// Owns the schema with the `ServiceType`, `Cluster` and `Service` tables.
#[derive(Debug)]
pub struct Catalog {
    schema: Schema,
}

impl Catalog {
    /// Creates a catalog with empty tables.
    pub fn new(options: SchemaOptions) -> Result<Self> {
        let mut schema = Schema::new(options);
        schema.add_table(ServiceType::table_def()?)?;
        schema.add_table(SysCluster::table_def()?)?;
        schema.add_table(Service::table_def()?)?;
        debug!("Catalog ready with tables {:?}", schema.table_names());
        Ok(Self { schema })
    }

    /// Returns the underlying schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Opens the table of any entity type stored in this catalog.
    pub fn table<E: Entity>(&self) -> Result<EntityTable<'_, E>> {
        EntityTable::new(&self.schema)
    }

    pub fn service_types(&self) -> Result<ServiceTypeTable<'_>> {
        self.table()
    }

    pub fn clusters(&self) -> Result<SysClusterTable<'_>> {
        self.table()
    }

    pub fn services(&self) -> Result<ServiceTable<'_>> {
        self.table()
    }
}
