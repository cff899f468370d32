//! `ServiceType`: a kind of service, identified by a unique description.

use crate::entity::{get_i64, get_string, Entity, EntityTable};
use memtab_core::schema::{TableBuilder, TableDef};
use memtab_core::{AuthToken, DataType, Key, Record, Result, Revision, Value, INITIAL_REVISION};
use serde::{Deserialize, Serialize};

/// A kind of service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub revision: Revision,
}

impl ServiceType {
    pub const UQ_DESCRIPTION: &'static str = "uqDescription";

    /// Creates a service type at the initial revision.
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            revision: INITIAL_REVISION,
        }
    }
}

impl Entity for ServiceType {
    const TABLE: &'static str = "ServiceType";
    const CLASS_CODE: &'static str = "ServiceType";

    fn table_def() -> Result<TableDef> {
        TableBuilder::new(Self::TABLE)?
            .add_column("id", DataType::Int64)?
            .add_column("description", DataType::String)?
            .add_primary_key(&["id"])?
            .add_unique(Self::UQ_DESCRIPTION, &["description"])?
            .build()
    }

    fn primary_key(&self) -> Key {
        Key::from(self.id)
    }

    fn to_record(&self) -> Record {
        Record::with_revision(
            Self::CLASS_CODE,
            self.revision,
            vec![Value::Int64(self.id), Value::from(self.description.as_str())],
        )
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: get_i64(record, 0, "id")?,
            description: get_string(record, 1, "description")?,
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

/// Typed access to the `ServiceType` table.
pub type ServiceTypeTable<'a> = EntityTable<'a, ServiceType>;

impl EntityTable<'_, ServiceType> {
    /// Reads the service type with the given description.
    pub fn read_by_description(&self, auth: &AuthToken, description: &str) -> Result<Option<ServiceType>> {
        self.read_by_unique_index(auth, ServiceType::UQ_DESCRIPTION, description)
    }
}
