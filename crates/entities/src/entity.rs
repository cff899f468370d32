//! The `Entity` trait and typed table access.
//!
//! An entity type knows its table, its subtype tag and how to convert itself
//! to and from a [`Record`]. [`EntityTable`] wraps a [`TableHandle`] and speaks
//! in entities instead of records. Every read is subtype-aware: rows of the same
//! table carrying another class code are invisible through it.

use core::marker::PhantomData;
use memtab_core::schema::TableDef;
use memtab_core::{AuthToken, ClassCode, DataType, Error, Key, Record, Result, Revision, Value};
use memtab_storage::{Schema, TableHandle};

/// A typed row of one table.
pub trait Entity: Sized {
    /// Name of the table storing this entity.
    const TABLE: &'static str;
    /// Subtype tag stored with every record of this entity.
    const CLASS_CODE: &'static str;

    /// Returns the definition of the table storing this entity.
    fn table_def() -> Result<TableDef>;

    /// Returns the primary key of this entity.
    fn primary_key(&self) -> Key;

    /// Converts this entity to a record, carrying its revision.
    fn to_record(&self) -> Record;

    /// Builds an entity from a stored record.
    fn from_record(record: &Record) -> Result<Self>;

    /// Returns the revision this entity was read or last written at.
    fn revision(&self) -> Revision;

    /// Sets the revision.
    fn set_revision(&mut self, revision: Revision);

    /// Returns the subtype tag as a class code.
    fn class_code() -> ClassCode {
        ClassCode::from_static(Self::CLASS_CODE)
    }
}

/// Typed access to the table of entity `E`.
pub struct EntityTable<'a, E> {
    handle: TableHandle<'a>,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> EntityTable<'a, E> {
    /// Opens the table of `E` in the schema.
    pub fn new(schema: &'a Schema) -> Result<Self> {
        Ok(Self {
            handle: schema.table(E::TABLE)?,
            _entity: PhantomData,
        })
    }

    /// Returns the underlying record table.
    pub fn handle(&self) -> TableHandle<'a> {
        self.handle
    }

    /// Stores a new entity.
    pub fn create(&self, auth: &AuthToken, entity: &E) -> Result<()> {
        self.handle.create(auth, entity.to_record())
    }

    /// Reads the entity with the given primary key.
    pub fn read(&self, auth: &AuthToken, pk: impl Into<Key>) -> Result<Option<E>> {
        self.handle
            .read_by_subtype(auth, &pk.into(), &E::class_code())
            .map(|r| E::from_record(&r))
            .transpose()
    }

    /// Reads the stored version of `entity`, for instance after its update lost
    /// a revision race.
    pub fn reload(&self, auth: &AuthToken, entity: &E) -> Result<Option<E>> {
        self.read(auth, entity.primary_key())
    }

    /// Reads every entity of this type.
    pub fn read_all(&self, auth: &AuthToken) -> Result<Vec<E>> {
        self.handle
            .read_all_by_subtype(auth, &E::class_code())
            .iter()
            .map(E::from_record)
            .collect()
    }

    /// Reads the entity stored under `key` in a unique index.
    pub fn read_by_unique_index(
        &self,
        auth: &AuthToken,
        index: &str,
        key: impl Into<Key>,
    ) -> Result<Option<E>> {
        self.handle
            .read_by_unique_index(auth, index, &key.into())?
            .filter(|r| r.is_subtype(&E::class_code()))
            .map(|r| E::from_record(&r))
            .transpose()
    }

    /// Reads every entity stored under `key` in an index.
    pub fn read_by_index(&self, auth: &AuthToken, index: &str, key: impl Into<Key>) -> Result<Vec<E>> {
        let class_code = E::class_code();
        self.handle
            .read_by_index(auth, index, &key.into())?
            .iter()
            .filter(|r| r.is_subtype(&class_code))
            .map(E::from_record)
            .collect()
    }

    /// Replaces the stored entity. On success the entity's revision is advanced.
    ///
    /// A row of another subtype under the same key counts as missing.
    pub fn update(&self, auth: &AuthToken, entity: &mut E) -> Result<()> {
        let mut record = entity.to_record();
        self.handle
            .update_by_subtype(auth, &mut record, &E::class_code())?;
        entity.set_revision(record.revision());
        Ok(())
    }

    /// Deletes the stored entity and, through cascading foreign keys, its dependents.
    /// A row of another subtype under the same key is left alone.
    pub fn delete(&self, auth: &AuthToken, entity: &E) -> Result<()> {
        self.handle
            .delete_by_subtype(auth, &entity.to_record(), &E::class_code())
    }

    /// Deletes every entity stored under `key` in an index. Returns the number removed.
    pub fn delete_by_index(&self, auth: &AuthToken, index: &str, key: impl Into<Key>) -> Result<usize> {
        self.handle
            .delete_by_index_and_subtype(auth, index, &key.into(), &E::class_code())
    }

    /// Returns the number of rows in the table, of any subtype.
    pub fn len(&self) -> usize {
        self.handle.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }
}

impl<E> Clone for EntityTable<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EntityTable<'_, E> {}

/// Reads a column value from a record, failing if the column is missing.
fn column<'r>(record: &'r Record, position: usize, name: &str) -> Result<&'r Value> {
    record
        .get(position)
        .ok_or_else(|| Error::invalid_operation(format!("Record has no column {}", name)))
}

fn mismatch(name: &str, expected: DataType, got: &Value) -> Error {
    match got.data_type() {
        Some(got) => Error::TypeMismatch {
            column: name.to_string(),
            expected,
            got,
        },
        None => Error::NullConstraint {
            column: name.to_string(),
        },
    }
}

/// Reads a non-null `Int64` column.
pub(crate) fn get_i64(record: &Record, position: usize, name: &str) -> Result<i64> {
    let value = column(record, position, name)?;
    value
        .as_i64()
        .ok_or_else(|| mismatch(name, DataType::Int64, value))
}

/// Reads a nullable `Int64` column.
pub(crate) fn get_opt_i64(record: &Record, position: usize, name: &str) -> Result<Option<i64>> {
    match column(record, position, name)? {
        Value::Null => Ok(None),
        value => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| mismatch(name, DataType::Int64, value)),
    }
}

/// Reads a non-null `String` column.
pub(crate) fn get_string(record: &Record, position: usize, name: &str) -> Result<String> {
    let value = column(record, position, name)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(name, DataType::String, value))
}
