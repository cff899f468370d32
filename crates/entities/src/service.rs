//! `Service`: a deployed service.
//!
//! A service references its `ServiceType`, optionally the `Cluster` it runs on,
//! and optionally a parent service. Deleting any referenced row deletes the
//! service and, in turn, its child services.

use crate::entity::{get_i64, get_opt_i64, get_string, Entity, EntityTable};
use crate::service_type::ServiceType;
use crate::sys_cluster::SysCluster;
use memtab_core::schema::{TableBuilder, TableDef};
use memtab_core::{AuthToken, DataType, Key, Record, Result, Revision, Value, INITIAL_REVISION};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub service_type_id: i64,
    #[serde(default)]
    pub cluster_id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub revision: Revision,
}

impl Service {
    pub const UQ_NAME: &'static str = "uqName";
    pub const FK_SERVICE_TYPE: &'static str = "fkServiceType";
    pub const FK_CLUSTER: &'static str = "fkCluster";
    pub const FK_PARENT: &'static str = "fkParent";

    /// Creates a top-level service without a cluster.
    pub fn new(id: i64, name: impl Into<String>, service_type_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            service_type_id,
            cluster_id: None,
            parent_id: None,
            revision: INITIAL_REVISION,
        }
    }

    /// Places the service on a cluster.
    pub fn on_cluster(mut self, cluster_id: i64) -> Self {
        self.cluster_id = Some(cluster_id);
        self
    }

    /// Makes the service a child of another service.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

impl Entity for Service {
    const TABLE: &'static str = "Service";
    const CLASS_CODE: &'static str = "Service";

    fn table_def() -> Result<TableDef> {
        TableBuilder::new(Self::TABLE)?
            .add_column("id", DataType::Int64)?
            .add_column("name", DataType::String)?
            .add_column("service_type_id", DataType::Int64)?
            .add_column("cluster_id", DataType::Int64)?
            .add_column("parent_id", DataType::Int64)?
            .add_nullable(&["cluster_id", "parent_id"])
            .add_primary_key(&["id"])?
            .add_unique(Self::UQ_NAME, &["name"])?
            .add_foreign_key(Self::FK_SERVICE_TYPE, &["service_type_id"], ServiceType::TABLE)?
            .add_foreign_key(Self::FK_CLUSTER, &["cluster_id"], SysCluster::TABLE)?
            .add_foreign_key(Self::FK_PARENT, &["parent_id"], Self::TABLE)?
            .build()
    }

    fn primary_key(&self) -> Key {
        Key::from(self.id)
    }

    fn to_record(&self) -> Record {
        Record::with_revision(
            Self::CLASS_CODE,
            self.revision,
            vec![
                Value::Int64(self.id),
                Value::from(self.name.as_str()),
                Value::Int64(self.service_type_id),
                Value::from(self.cluster_id),
                Value::from(self.parent_id),
            ],
        )
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: get_i64(record, 0, "id")?,
            name: get_string(record, 1, "name")?,
            service_type_id: get_i64(record, 2, "service_type_id")?,
            cluster_id: get_opt_i64(record, 3, "cluster_id")?,
            parent_id: get_opt_i64(record, 4, "parent_id")?,
            revision: record.revision(),
        })
    }

    fn revision(&self) -> Revision {
        self.revision
    }

    fn set_revision(&mut self, revision: Revision) {
        self.revision = revision;
    }
}

/// Typed access to the `Service` table.
pub type ServiceTable<'a> = EntityTable<'a, Service>;

impl EntityTable<'_, Service> {
    /// Reads the service with the given name.
    pub fn read_by_name(&self, auth: &AuthToken, name: &str) -> Result<Option<Service>> {
        self.read_by_unique_index(auth, Service::UQ_NAME, name)
    }

    /// Reads every service of a service type.
    pub fn read_by_service_type(&self, auth: &AuthToken, service_type_id: i64) -> Result<Vec<Service>> {
        self.read_by_index(auth, Service::FK_SERVICE_TYPE, service_type_id)
    }

    /// Reads every service running on a cluster.
    pub fn read_by_cluster(&self, auth: &AuthToken, cluster_id: i64) -> Result<Vec<Service>> {
        self.read_by_index(auth, Service::FK_CLUSTER, cluster_id)
    }

    /// Reads the direct children of a service.
    pub fn read_children(&self, auth: &AuthToken, parent_id: i64) -> Result<Vec<Service>> {
        self.read_by_index(auth, Service::FK_PARENT, parent_id)
    }

    /// Deletes every service of a service type, with their child services.
    /// Returns the number of services of that type removed.
    pub fn delete_by_service_type(&self, auth: &AuthToken, service_type_id: i64) -> Result<usize> {
        self.delete_by_index(auth, Service::FK_SERVICE_TYPE, service_type_id)
    }
}
