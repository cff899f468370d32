/// Storage structure behind a secondary index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// Point lookups only.
    #[default]
    Hash,
    /// Point lookups; buckets are kept in key order.
    Ordered,
}

/// A named index over one or more columns of a table.
///
/// `positions` is empty until the owning table is built, then holds the record
/// position of each column in `columns`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDef {
    name: String,
    columns: Vec<String>,
    positions: Vec<usize>,
    unique: bool,
    kind: IndexType,
}

impl IndexDef {
    pub(crate) fn new(name: String, columns: Vec<String>, unique: bool, kind: IndexType) -> Self {
        Self {
            name,
            columns,
            positions: Vec::new(),
            unique,
            kind,
        }
    }

    pub(crate) fn resolve(mut self, positions: Vec<usize>) -> Self {
        debug_assert_eq!(positions.len(), self.columns.len());
        self.positions = positions;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    #[inline]
    pub fn kind(&self) -> IndexType {
        self.kind
    }

    /// True if the index is over exactly `columns`, in that order.
    pub fn covers(&self, columns: &[&str]) -> bool {
        self.columns.iter().map(String::as_str).eq(columns.iter().copied())
    }
}
