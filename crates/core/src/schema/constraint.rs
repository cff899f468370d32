//! Constraint definitions for memtab schemas.

/// What happens to dependent rows when the referenced row is deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ConstraintAction {
    /// Delete dependent rows first.
    #[default]
    Cascade,
    /// Reject the delete while dependent rows exist.
    Restrict,
}

/// Foreign key definition.
///
/// The child columns reference the parent table's primary key. `index` names the
/// child-side secondary index used to find dependents during a delete.
#[derive(Clone, Debug)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Child table name.
    pub child_table: String,
    /// Child column names.
    pub child_columns: Vec<String>,
    /// Parent table name.
    pub parent_table: String,
    /// Child index used for reverse lookups.
    pub index: String,
    /// Action on parent row delete.
    pub action: ConstraintAction,
    /// Child column positions, resolved when the table is built.
    pub(crate) positions: Vec<usize>,
}

impl ForeignKey {
    /// Creates a cascading foreign key whose child index shares its name.
    pub(crate) fn new(
        name: impl Into<String>,
        child_table: impl Into<String>,
        child_columns: Vec<String>,
        parent_table: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            index: name.clone(),
            name,
            child_table: child_table.into(),
            child_columns,
            parent_table: parent_table.into(),
            action: ConstraintAction::Cascade,
            positions: Vec::new(),
        }
    }

    /// Returns the child column positions.
    #[inline]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Returns true if the child table references itself.
    #[inline]
    pub fn is_self_referencing(&self) -> bool {
        self.child_table == self.parent_table
    }
}
