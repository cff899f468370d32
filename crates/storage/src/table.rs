//! Row storage for a single table.
//!
//! This module provides the `IndexedTable` struct which holds the rows of one table
//! keyed by primary key, together with one index per secondary index definition.
//! Secondary indexes map an index key to the primary keys of the matching rows.
//!
//! The rows and every index live behind one `RwLock`, so a reader never sees a row
//! whose index entries are only partly written. Relation checks and write ordering
//! across tables are handled by [`Schema`](crate::Schema).

use hashbrown::HashMap;
use memtab_core::schema::{IndexDef, IndexType, TableDef};
use memtab_core::{ClassCode, Error, Key, Record, Result, Revision};
use memtab_index::{HashIndex, Index, OrderedIndex};
use parking_lot::RwLock;

type BoxedIndex = Box<dyn Index<Key, Key> + Send + Sync>;

fn new_index(def: &IndexDef) -> BoxedIndex {
    match def.kind() {
        IndexType::Hash => Box::new(HashIndex::new(def.is_unique())),
        IndexType::Ordered => Box::new(OrderedIndex::new(def.is_unique())),
    }
}

/// Rows and secondary indexes of one table.
///
/// `indices[i]` belongs to `def.indices()[i]`. Keys containing a null are never
/// indexed.
struct TableState {
    rows: HashMap<Key, Record>,
    indices: Vec<BoxedIndex>,
}

impl TableState {
    /// Fails if a unique index already maps one of the record's keys to another row.
    fn check_unique(&self, def: &TableDef, record: &Record, pk: &Key) -> Result<()> {
        for (idx_def, index) in def.indices().iter().zip(&self.indices) {
            if !idx_def.is_unique() {
                continue;
            }
            let key = def.index_key_of(idx_def, record);
            if !key.has_null() && index.would_conflict(&key, pk) {
                return Err(Error::unique_index_violation(def.name(), idx_def.name(), key));
            }
        }
        Ok(())
    }

    fn check_insert(&self, def: &TableDef, record: &Record, pk: &Key) -> Result<()> {
        if self.rows.contains_key(pk) {
            return Err(Error::primary_key_conflict(def.name(), pk.clone()));
        }
        self.check_unique(def, record, pk)
    }

    /// Returns the stored revision, or an error if the row is missing or the
    /// revision differs from `expected`.
    fn check_revision(&self, def: &TableDef, pk: &Key, expected: Revision) -> Result<Revision> {
        let stored = self
            .rows
            .get(pk)
            .ok_or_else(|| Error::record_not_found(def.name(), pk.clone()))?
            .revision();
        if stored != expected {
            return Err(Error::revision_conflict(def.name(), pk.clone(), expected, stored));
        }
        Ok(stored)
    }

    /// Adds the record's keys to every secondary index.
    fn index_record(&mut self, def: &TableDef, record: &Record, pk: &Key) -> Result<()> {
        for (pos, idx_def) in def.indices().iter().enumerate() {
            let key = def.index_key_of(idx_def, record);
            if key.has_null() {
                continue;
            }
            if self.indices[pos].add(key.clone(), pk.clone()).is_err() {
                self.rollback_index(def, record, pk, pos);
                return Err(Error::unique_index_violation(def.name(), idx_def.name(), key));
            }
        }
        Ok(())
    }

    /// Undoes `index_record` for the first `upto` indexes.
    fn rollback_index(&mut self, def: &TableDef, record: &Record, pk: &Key, upto: usize) {
        for (idx_def, index) in def.indices().iter().zip(&mut self.indices).take(upto) {
            index.remove(&def.index_key_of(idx_def, record), pk);
        }
    }

    fn unindex_record(&mut self, def: &TableDef, record: &Record, pk: &Key) {
        for (idx_def, index) in def.indices().iter().zip(&mut self.indices) {
            index.remove(&def.index_key_of(idx_def, record), pk);
        }
    }
}

/// One table: its definition, rows and secondary indexes.
pub struct IndexedTable {
    def: TableDef,
    state: RwLock<TableState>,
}

impl IndexedTable {
    /// Creates an empty table with one index per secondary index definition.
    pub fn new(def: TableDef) -> Self {
        let indices = def.indices().iter().map(new_index).collect();
        Self {
            def,
            state: RwLock::new(TableState {
                rows: HashMap::new(),
                indices,
            }),
        }
    }

    /// Returns the table definition.
    #[inline]
    pub fn def(&self) -> &TableDef {
        &self.def
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.state.read().rows.is_empty()
    }

    /// Checks if a row exists under the primary key.
    pub fn contains_key(&self, pk: &Key) -> bool {
        self.state.read().rows.contains_key(pk)
    }

    /// Returns a copy of the row stored under the primary key.
    pub fn get(&self, pk: &Key) -> Option<Record> {
        self.state.read().rows.get(pk).cloned()
    }

    /// Returns the revision of the row stored under the primary key.
    pub fn revision_of(&self, pk: &Key) -> Option<Revision> {
        self.state.read().rows.get(pk).map(Record::revision)
    }

    /// Returns copies of all rows, in no particular order.
    pub fn scan(&self) -> Vec<Record> {
        self.state.read().rows.values().cloned().collect()
    }

    /// Returns copies of all rows of the given subtype.
    pub fn scan_subtype(&self, class_code: &ClassCode) -> Vec<Record> {
        self.state
            .read()
            .rows
            .values()
            .filter(|r| r.is_subtype(class_code))
            .cloned()
            .collect()
    }

    /// Returns the primary keys stored under `key` in the index at `position`.
    ///
    /// With `memoize` set, a miss leaves an empty bucket for the key behind.
    pub fn lookup(&self, position: usize, key: &Key, memoize: bool) -> Vec<Key> {
        let pks = match self.state.read().indices.get(position) {
            Some(index) => index.get(key),
            None => return Vec::new(),
        };
        if pks.is_empty() && memoize {
            self.memoize_bucket(position, key);
        }
        pks
    }

    /// Returns copies of the rows stored under `key` in the index at `position`.
    ///
    /// Keys and rows are resolved under one read guard, so every returned row
    /// still carries `key`.
    pub fn get_by_index(&self, position: usize, key: &Key, memoize: bool) -> Vec<Record> {
        {
            let state = self.state.read();
            let Some(index) = state.indices.get(position) else {
                return Vec::new();
            };
            let rows: Vec<Record> = index
                .get(key)
                .iter()
                .filter_map(|pk| state.rows.get(pk).cloned())
                .collect();
            if !rows.is_empty() || !memoize {
                return rows;
            }
        }
        self.memoize_bucket(position, key);
        Vec::new()
    }

    fn memoize_bucket(&self, position: usize, key: &Key) {
        if key.has_null() {
            return;
        }
        if let Some(index) = self.state.write().indices.get_mut(position) {
            index.ensure_bucket(key.clone());
        }
    }

    /// Returns the number of buckets held by the named index, including empty ones.
    pub fn bucket_count(&self, index: &str) -> Option<usize> {
        let position = self.def.get_index_position(index)?;
        Some(self.state.read().indices[position].bucket_count())
    }

    /// Checks the record for primary and unique key conflicts without storing it.
    pub(crate) fn check_insert(&self, record: &Record) -> Result<Key> {
        let pk = self.def.primary_key_of(record);
        self.state.read().check_insert(&self.def, record, &pk)?;
        Ok(pk)
    }

    /// Checks that the record's row exists at the record's revision and that its
    /// new keys do not clash with other rows.
    pub(crate) fn check_replace(&self, record: &Record) -> Result<Key> {
        let pk = self.def.primary_key_of(record);
        let state = self.state.read();
        state.check_revision(&self.def, &pk, record.revision())?;
        state.check_unique(&self.def, record, &pk)?;
        Ok(pk)
    }

    /// Stores a new row. Nothing is changed if the row conflicts with another.
    pub(crate) fn insert(&self, record: Record) -> Result<Key> {
        let pk = self.def.primary_key_of(&record);
        let mut state = self.state.write();
        state.check_insert(&self.def, &record, &pk)?;
        state.index_record(&self.def, &record, &pk)?;
        state.rows.insert(pk.clone(), record);
        Ok(pk)
    }

    /// Replaces the row carrying the record's primary key and returns the new
    /// revision. The record's revision must match the stored one.
    ///
    /// Only the index entries whose key changed are moved.
    pub(crate) fn replace(&self, mut record: Record) -> Result<Revision> {
        let pk = self.def.primary_key_of(&record);
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.check_revision(&self.def, &pk, record.revision())?;
        state.check_unique(&self.def, &record, &pk)?;

        let revision = record
            .increment_revision()
            .ok_or_else(|| Error::revision_exhausted(self.def.name(), pk.clone()))?;
        let old = match state.rows.insert(pk.clone(), record) {
            Some(old) => old,
            None => return Err(Error::record_not_found(self.def.name(), pk)),
        };
        let new = &state.rows[&pk];

        // Uniqueness was checked under this guard, so the adds cannot fail.
        for (idx_def, index) in self.def.indices().iter().zip(&mut state.indices) {
            let from = self.def.index_key_of(idx_def, &old);
            let to = self.def.index_key_of(idx_def, new);
            if from == to {
                continue;
            }
            index.remove(&from, &pk);
            if !to.has_null() {
                index
                    .add(to.clone(), pk.clone())
                    .map_err(|_| Error::unique_index_violation(self.def.name(), idx_def.name(), to))?;
            }
        }
        Ok(revision)
    }

    /// Removes the row under the primary key from the table and every index.
    pub(crate) fn remove(&self, pk: &Key) -> Option<Record> {
        let mut state = self.state.write();
        let record = state.rows.remove(pk)?;
        state.unindex_record(&self.def, &record, pk);
        Some(record)
    }

    /// Removes every row and index entry. Returns the number of rows dropped.
    pub(crate) fn clear(&self) -> usize {
        let mut state = self.state.write();
        let count = state.rows.len();
        state.rows.clear();
        for index in &mut state.indices {
            index.clear();
        }
        count
    }
}

impl core::fmt::Debug for IndexedTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IndexedTable")
            .field("name", &self.def.name())
            .field("rows", &self.len())
            .finish()
    }
}
