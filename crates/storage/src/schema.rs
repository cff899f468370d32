//! Multi-table registry.
//!
//! A `Schema` owns every table of one store, the foreign key registry and the
//! options. Table operations go through a [`TableHandle`], which pairs a table
//! with the schema so that writes can check and cascade across tables.
//!
//! Writes are serialized through one schema-wide gate taken before any table
//! lock. Table locks are only held for the duration of a single table step and
//! never while another table's lock is taken.

use crate::options::SchemaOptions;
use crate::relation::{RelationValidator, Visited};
use crate::table::IndexedTable;
use log::{debug, trace};
use memtab_core::schema::{ForeignKey, TableDef};
use memtab_core::{AuthToken, ClassCode, Error, Key, Record, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// A set of related tables.
#[derive(Debug, Default)]
pub struct Schema {
    options: SchemaOptions,
    tables: BTreeMap<String, IndexedTable>,
    relations: RelationValidator,
    write_gate: Mutex<()>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(options: SchemaOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns the options.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Returns the foreign key registry.
    pub fn relations(&self) -> &RelationValidator {
        &self.relations
    }

    /// Adds a table.
    ///
    /// Every foreign key must reference a table added earlier, or the table
    /// itself, and match that table's primary key column for column.
    pub fn add_table(&mut self, def: TableDef) -> Result<()> {
        self.add_tables(vec![def])
    }

    /// Adds several tables at once.
    ///
    /// Foreign keys may reference any table of the batch, so tables referencing
    /// each other can be added together. Nothing is added if any table is invalid.
    pub fn add_tables(&mut self, defs: Vec<TableDef>) -> Result<()> {
        for (i, def) in defs.iter().enumerate() {
            if self.tables.contains_key(def.name())
                || defs[..i].iter().any(|d| d.name() == def.name())
            {
                return Err(Error::invalid_schema(format!(
                    "Table already exists: {}",
                    def.name()
                )));
            }
        }

        for def in &defs {
            for fk in def.foreign_keys() {
                let parent = self
                    .tables
                    .get(&fk.parent_table)
                    .map(IndexedTable::def)
                    .or_else(|| defs.iter().find(|d| d.name() == fk.parent_table))
                    .ok_or_else(|| {
                        Error::invalid_schema(format!(
                            "Foreign key {} references unknown table {}",
                            fk.name, fk.parent_table
                        ))
                    })?;
                check_foreign_key(def, fk, parent)?;
            }
        }

        let mut relations = self.relations.clone();
        for def in &defs {
            relations.register(def)?;
        }
        self.relations = relations;

        for def in defs {
            debug!(
                "Added table {} ({} columns, {} indexes, {} foreign keys)",
                def.name(),
                def.columns().len(),
                def.indices().len(),
                def.foreign_keys().len()
            );
            self.tables
                .insert(def.name().to_string(), IndexedTable::new(def));
        }
        Ok(())
    }

    /// Returns a handle for operating on the named table.
    pub fn table(&self, name: &str) -> Result<TableHandle<'_>> {
        let table = self
            .tables
            .get(name)
            .ok_or_else(|| Error::table_not_found(name))?;
        Ok(TableHandle {
            schema: self,
            table,
        })
    }

    /// Returns the named table's storage.
    pub fn get_table(&self, name: &str) -> Option<&IndexedTable> {
        self.tables.get(name)
    }

    /// Returns the number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Returns the table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Checks if a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the number of rows across all tables.
    pub fn total_row_count(&self) -> usize {
        self.tables.values().map(IndexedTable::len).sum()
    }

    /// Removes every row from every table.
    pub fn clear(&self) {
        let _gate = self.write_gate.lock();
        for table in self.tables.values() {
            table.clear();
        }
    }
}

/// Checks that a foreign key matches the parent's primary key column for column.
fn check_foreign_key(child: &TableDef, fk: &ForeignKey, parent: &TableDef) -> Result<()> {
    let parent_pk = parent.primary_key().positions();
    if parent_pk.len() != fk.positions().len() {
        return Err(Error::invalid_schema(format!(
            "Foreign key {} has {} columns, primary key of {} has {}",
            fk.name,
            fk.positions().len(),
            parent.name(),
            parent_pk.len()
        )));
    }
    for (&child_pos, &parent_pos) in fk.positions().iter().zip(parent_pk) {
        let child_col = &child.columns()[child_pos];
        let parent_col = &parent.columns()[parent_pos];
        if child_col.data_type() != parent_col.data_type() {
            return Err(Error::invalid_schema(format!(
                "Foreign key {}: column {} is {}, {}.{} is {}",
                fk.name,
                child_col.name(),
                child_col.data_type(),
                parent.name(),
                parent_col.name(),
                parent_col.data_type()
            )));
        }
    }
    Ok(())
}

/// Operations on one table of a [`Schema`].
///
/// Reads return copies of the stored rows. Every operation receives the
/// caller's [`AuthToken`], which is only recorded in trace logs.
#[derive(Clone, Copy)]
pub struct TableHandle<'a> {
    schema: &'a Schema,
    table: &'a IndexedTable,
}

impl<'a> TableHandle<'a> {
    /// Returns the table name.
    pub fn name(&self) -> &'a str {
        self.table.name()
    }

    /// Returns the table definition.
    pub fn def(&self) -> &'a TableDef {
        self.table.def()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Checks if a row exists under the primary key.
    pub fn contains_key(&self, _auth: &AuthToken, pk: &Key) -> bool {
        self.table.contains_key(pk)
    }

    /// Stores a new record.
    ///
    /// The record is checked for layout, key conflicts and unresolved foreign
    /// keys before anything is written. Its revision is stored as given.
    pub fn create(&self, auth: &AuthToken, record: Record) -> Result<()> {
        let def = self.table.def();
        def.validate(&record, self.schema.options.validate_types)?;

        let _gate = self.schema.write_gate.lock();
        self.table.check_insert(&record)?;
        self.schema
            .relations
            .check_references(&self.schema.tables, def, &record)?;

        let revision = record.revision();
        let pk = self.table.insert(record)?;
        trace!(
            "create {}[{}] rev {} by {}",
            self.name(),
            pk,
            revision,
            auth.subject()
        );
        Ok(())
    }

    /// Reads the record stored under the primary key.
    pub fn read(&self, _auth: &AuthToken, pk: &Key) -> Option<Record> {
        self.table.get(pk)
    }

    /// Reads the record stored under the primary key if it is of the given subtype.
    pub fn read_by_subtype(
        &self,
        _auth: &AuthToken,
        pk: &Key,
        class_code: &ClassCode,
    ) -> Option<Record> {
        self.table.get(pk).filter(|r| r.is_subtype(class_code))
    }

    /// Reads every record, in no particular order.
    pub fn read_all(&self, _auth: &AuthToken) -> Vec<Record> {
        self.table.scan()
    }

    /// Reads every record of the given subtype.
    pub fn read_all_by_subtype(&self, _auth: &AuthToken, class_code: &ClassCode) -> Vec<Record> {
        self.table.scan_subtype(class_code)
    }

    /// Reads the record stored under `key` in a unique index.
    pub fn read_by_unique_index(
        &self,
        _auth: &AuthToken,
        index: &str,
        key: &Key,
    ) -> Result<Option<Record>> {
        let position = self.index_position(index)?;
        if !self.def().indices()[position].is_unique() {
            return Err(Error::invalid_operation(format!(
                "Index {}.{} is not unique",
                self.name(),
                index
            )));
        }
        Ok(self
            .table
            .get_by_index(position, key, false)
            .into_iter()
            .next())
    }

    /// Reads every record stored under `key` in an index.
    ///
    /// Misses on non-unique indexes leave an empty bucket behind when the schema
    /// memoizes them.
    pub fn read_by_index(&self, _auth: &AuthToken, index: &str, key: &Key) -> Result<Vec<Record>> {
        let position = self.index_position(index)?;
        let memoize = self.schema.options.memoize_empty_buckets
            && !self.def().indices()[position].is_unique();
        Ok(self.table.get_by_index(position, key, memoize))
    }

    /// Replaces the stored record with the same primary key.
    ///
    /// The record has to carry the stored revision. On success its revision is
    /// advanced to match the new stored revision.
    pub fn update(&self, auth: &AuthToken, record: &mut Record) -> Result<()> {
        self.update_scoped(auth, record, None)
    }

    /// As [`update`](Self::update), but a stored record of another subtype counts
    /// as missing.
    pub fn update_by_subtype(
        &self,
        auth: &AuthToken,
        record: &mut Record,
        class_code: &ClassCode,
    ) -> Result<()> {
        self.update_scoped(auth, record, Some(class_code))
    }

    fn update_scoped(
        &self,
        auth: &AuthToken,
        record: &mut Record,
        class_code: Option<&ClassCode>,
    ) -> Result<()> {
        let def = self.table.def();
        def.validate(record, self.schema.options.validate_types)?;

        let _gate = self.schema.write_gate.lock();
        if let Some(class_code) = class_code {
            let pk = def.primary_key_of(record);
            if !self.stored_as(&pk, class_code) {
                return Err(Error::record_not_found(self.name(), pk));
            }
        }
        let pk = self.table.check_replace(record)?;
        self.schema
            .relations
            .check_references(&self.schema.tables, def, record)?;

        let revision = self.table.replace(record.clone())?;
        record.set_revision(revision);
        trace!(
            "update {}[{}] rev {} by {}",
            self.name(),
            pk,
            revision,
            auth.subject()
        );
        Ok(())
    }

    /// Deletes the stored record with the same primary key, after its dependents.
    ///
    /// Deleting a record that is not stored succeeds without effect. The record
    /// has to carry the stored revision.
    pub fn delete(&self, auth: &AuthToken, record: &Record) -> Result<()> {
        self.delete_scoped(auth, record, None)
    }

    /// As [`delete`](Self::delete), but a stored record of another subtype is
    /// left alone. Dependents reached through foreign keys are deleted whatever
    /// their subtype.
    pub fn delete_by_subtype(
        &self,
        auth: &AuthToken,
        record: &Record,
        class_code: &ClassCode,
    ) -> Result<()> {
        self.delete_scoped(auth, record, Some(class_code))
    }

    fn delete_scoped(
        &self,
        auth: &AuthToken,
        record: &Record,
        class_code: Option<&ClassCode>,
    ) -> Result<()> {
        let pk = self.def().primary_key_of(record);
        let _gate = self.schema.write_gate.lock();
        if class_code.is_some_and(|cc| !self.stored_as(&pk, cc)) {
            return Ok(());
        }
        let deleted = self.schema.relations.delete_cascading(
            &self.schema.tables,
            self.name(),
            &pk,
            Some(record.revision()),
            &mut Visited::new(),
        )?;
        if deleted {
            trace!(
                "delete {}[{}] rev {} by {}",
                self.name(),
                pk,
                record.revision(),
                auth.subject()
            );
        }
        Ok(())
    }

    /// Deletes every record stored under `key` in an index, each at its current
    /// revision. Returns the number of matching records removed.
    ///
    /// Records already removed by the cascade of an earlier match are skipped.
    pub fn delete_by_index(&self, auth: &AuthToken, index: &str, key: &Key) -> Result<usize> {
        self.delete_by_index_scoped(auth, index, key, None)
    }

    /// As [`delete_by_index`](Self::delete_by_index), restricted to matching
    /// records of the given subtype.
    pub fn delete_by_index_and_subtype(
        &self,
        auth: &AuthToken,
        index: &str,
        key: &Key,
        class_code: &ClassCode,
    ) -> Result<usize> {
        self.delete_by_index_scoped(auth, index, key, Some(class_code))
    }

    fn delete_by_index_scoped(
        &self,
        auth: &AuthToken,
        index: &str,
        key: &Key,
        class_code: Option<&ClassCode>,
    ) -> Result<usize> {
        let position = self.index_position(index)?;
        let _gate = self.schema.write_gate.lock();
        let matches = self.table.lookup(position, key, false);

        let mut removed = 0;
        for pk in matches {
            let current = match class_code {
                Some(cc) => self
                    .table
                    .get(&pk)
                    .filter(|r| r.is_subtype(cc))
                    .map(|r| r.revision()),
                None => self.table.revision_of(&pk),
            };
            let Some(revision) = current else {
                continue;
            };
            if self.schema.relations.delete_cascading(
                &self.schema.tables,
                self.name(),
                &pk,
                Some(revision),
                &mut Visited::new(),
            )? {
                removed += 1;
            }
        }
        trace!(
            "delete_by_index {}.{}[{}] removed {} by {}",
            self.name(),
            index,
            key,
            removed,
            auth.subject()
        );
        Ok(removed)
    }

    /// Removes every row of this table. Dependent rows in other tables are kept.
    pub fn clear(&self, auth: &AuthToken) -> usize {
        let _gate = self.schema.write_gate.lock();
        let count = self.table.clear();
        debug!("clear {} dropped {} rows by {}", self.name(), count, auth.subject());
        count
    }

    fn stored_as(&self, pk: &Key, class_code: &ClassCode) -> bool {
        self.table.get(pk).is_some_and(|r| r.is_subtype(class_code))
    }

    fn index_position(&self, index: &str) -> Result<usize> {
        self.def()
            .get_index_position(index)
            .ok_or_else(|| Error::index_not_found(self.name(), index))
    }
}

impl core::fmt::Debug for TableHandle<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("TableHandle").field(&self.name()).finish()
    }
}
