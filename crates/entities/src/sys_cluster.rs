//! `SysCluster`: a system cluster, stored in the shared `Cluster` table.
//!
//! The `Cluster` table can hold several kinds of cluster. Rows written through
//! this entity carry the `SysCluster` class code, and reads through it skip
//! rows of any other kind.

use crate::entity::{get_i64, get_string, Entity, EntityTable};
use memtab_core::schema::{TableBuilder, TableDef};
use memtab_core::{AuthToken, DataType, Key, Record, Result, Revision, Value, INITIAL_REVISION};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysCluster {
    pub id: i64,
    pub name: String,
    pub tag: String,
    #[serde(default)]
    pub revision: Revision,
}

impl SysCluster {
    pub const IDX_TAG: &'static str = "idxTag";

    pub fn new(id: i64, name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tag: tag.into(),
            revision: INITIAL_REVISION,
        }
    }
}

impl Entity for SysCluster {
    const TABLE: &'static str = "Cluster";
    const CLASS_CODE: &'static str = "SysCluster";

    fn table_def() -> Result<TableDef> {
        TableBuilder::new(Self::TABLE)?
            .add_column("id", DataType::Int64)?
            .add_column("name", DataType::String)?
            .add_column("tag", DataType::String)?
            .add_primary_key(&["id"])?
            .add_index(Self::IDX_TAG, &["tag"], false)?
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
                Value::from(self.tag.as_str()),
            ],
        )
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: get_i64(record, 0, "id")?,
            name: get_string(record, 1, "name")?,
            tag: get_string(record, 2, "tag")?,
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

/// Typed access to the system clusters of the `Cluster` table.
pub type SysClusterTable<'a> = EntityTable<'a, SysCluster>;

impl EntityTable<'_, SysCluster> {
    /// Reads every system cluster carrying the tag.
    pub fn read_by_tag(&self, auth: &AuthToken, tag: &str) -> Result<Vec<SysCluster>> {
        self.read_by_index(auth, SysCluster::IDX_TAG, tag)
    }
}
