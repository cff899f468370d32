//! Foreign key validation and cascading delete.
//!
//! The `RelationValidator` keeps the declared foreign keys of every table as reverse
//! edges grouped by parent table. Writes check the forward direction (each
//! non-null reference resolves to a parent row); deletes walk the reverse edges
//! and remove or protect dependent rows.

use crate::table::IndexedTable;
use log::debug;
use memtab_core::schema::{ConstraintAction, TableDef};
use hashbrown::HashSet;
use memtab_core::{Error, Key, Record, Result, Revision};
use std::collections::BTreeMap;

/// Rows already visited by one top-level delete, as `(table, primary key)` pairs.
pub(crate) type Visited = HashSet<(String, Key)>;

/// A foreign key seen from the parent table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReverseEdge {
    /// Table declaring the foreign key.
    pub child_table: String,
    /// Foreign key constraint name.
    pub constraint: String,
    /// Position of the child index used to find dependents.
    pub index_position: usize,
    /// What happens to dependents when a parent row is deleted.
    pub action: ConstraintAction,
}

/// Registry of foreign key edges, grouped by parent table.
#[derive(Clone, Debug, Default)]
pub struct RelationValidator {
    edges: BTreeMap<String, Vec<ReverseEdge>>,
}

impl RelationValidator {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the foreign keys declared by a table.
    pub fn register(&mut self, child: &TableDef) -> Result<()> {
        for fk in child.foreign_keys() {
            let index_position = child.get_index_position(&fk.index).ok_or_else(|| {
                Error::invalid_schema(format!(
                    "Foreign key {} uses unknown index {}.{}",
                    fk.name,
                    child.name(),
                    fk.index
                ))
            })?;
            debug!(
                "Registering relation {}: {} -> {} ({:?})",
                fk.name,
                child.name(),
                fk.parent_table,
                fk.action
            );
            self.edges
                .entry(fk.parent_table.clone())
                .or_default()
                .push(ReverseEdge {
                    child_table: child.name().to_string(),
                    constraint: fk.name.clone(),
                    index_position,
                    action: fk.action,
                });
        }
        Ok(())
    }

    /// Returns the edges pointing at rows of the parent table.
    pub fn edges_of(&self, parent: &str) -> &[ReverseEdge] {
        self.edges.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the number of registered edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Checks that every non-null foreign key of the record resolves to a parent row.
    ///
    /// A row referencing its own primary key resolves against itself, so a
    /// self-referencing row can be created in one step.
    pub fn check_references(
        &self,
        tables: &BTreeMap<String, IndexedTable>,
        def: &TableDef,
        record: &Record,
    ) -> Result<()> {
        for fk in def.foreign_keys() {
            let key = def.foreign_key_of(fk, record);
            if key.has_null() {
                continue;
            }
            if fk.is_self_referencing() && key == def.primary_key_of(record) {
                continue;
            }
            let parent = tables
                .get(&fk.parent_table)
                .ok_or_else(|| Error::table_not_found(&fk.parent_table))?;
            if !parent.contains_key(&key) {
                return Err(Error::UnresolvedRelation {
                    constraint: fk.name.clone(),
                    table: def.name().to_string(),
                    key,
                    parent_table: fk.parent_table.clone(),
                });
            }
        }
        Ok(())
    }

    /// Deletes a row after its dependents.
    ///
    /// Returns false if the row is absent or was already visited by this delete.
    /// With `expected` set, the stored revision has to match it. Dependents are
    /// deleted at their current revision. A failure stops the walk; rows removed
    /// before it stay removed.
    pub(crate) fn delete_cascading(
        &self,
        tables: &BTreeMap<String, IndexedTable>,
        table_name: &str,
        pk: &Key,
        expected: Option<Revision>,
        visited: &mut Visited,
    ) -> Result<bool> {
        let table = tables
            .get(table_name)
            .ok_or_else(|| Error::table_not_found(table_name))?;

        let Some(stored) = table.revision_of(pk) else {
            return Ok(false);
        };
        if let Some(expected) = expected {
            if expected != stored {
                return Err(Error::revision_conflict(table_name, pk.clone(), expected, stored));
            }
        }
        if !visited.insert((table_name.to_string(), pk.clone())) {
            return Ok(false);
        }

        let edges = self.edges_of(table_name);

        for edge in edges.iter().filter(|e| e.action == ConstraintAction::Restrict) {
            let dependents = self.dependents(tables, edge, pk, visited)?;
            if !dependents.is_empty() {
                return Err(Error::RestrictViolation {
                    constraint: edge.constraint.clone(),
                    table: edge.child_table.clone(),
                    dependents: dependents.len(),
                });
            }
        }

        for edge in edges.iter().filter(|e| e.action == ConstraintAction::Cascade) {
            let dependents = self.dependents(tables, edge, pk, visited)?;
            if dependents.is_empty() {
                continue;
            }
            debug!(
                "Cascading delete of {}[{}] to {} rows of {} via {}",
                table_name,
                pk,
                dependents.len(),
                edge.child_table,
                edge.constraint
            );
            let child = tables
                .get(&edge.child_table)
                .ok_or_else(|| Error::table_not_found(&edge.child_table))?;
            for dependent in dependents {
                // An earlier branch of this walk may have removed or visited it.
                let Some(revision) = child.revision_of(&dependent) else {
                    continue;
                };
                self.delete_cascading(
                    tables,
                    &edge.child_table,
                    &dependent,
                    Some(revision),
                    visited,
                )?;
            }
        }

        table.remove(pk);
        Ok(true)
    }

    /// Materializes the child rows referencing `pk` through the edge, leaving out
    /// rows this delete has already visited.
    fn dependents(
        &self,
        tables: &BTreeMap<String, IndexedTable>,
        edge: &ReverseEdge,
        pk: &Key,
        visited: &Visited,
    ) -> Result<Vec<Key>> {
        let child = tables
            .get(&edge.child_table)
            .ok_or_else(|| Error::table_not_found(&edge.child_table))?;
        Ok(child
            .lookup(edge.index_position, pk, false)
            .into_iter()
            .filter(|d| !visited.contains(&(edge.child_table.clone(), d.clone())))
            .collect())
    }
}
