//! Record structure for memtab.
//!
//! A `Record` is one row of a table: its column values, the revision used for
//! optimistic concurrency, and the subtype discriminator ("class code").

use crate::value::Value;
use std::borrow::Cow;
use std::fmt;

/// Revision counter carried by every record.
pub type Revision = u64;

/// Revision of a freshly constructed record.
pub const INITIAL_REVISION: Revision = 0;

/// Subtype discriminator of a record.
///
/// Several logical subtypes may share one physical table; subtype-aware reads
/// compare this tag explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassCode(Cow<'static, str>);

impl ClassCode {
    /// Creates a class code from a static name.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a class code from an owned name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the class code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ClassCode {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record in a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Subtype this record represents.
    class_code: ClassCode,
    /// Version number for optimistic concurrency. Incremented on each update.
    revision: Revision,
    /// Values stored in this record, indexed by column position.
    values: Vec<Value>,
}

impl Record {
    /// Creates a new record at the initial revision.
    pub fn new(class_code: impl Into<ClassCode>, values: Vec<Value>) -> Self {
        Self {
            class_code: class_code.into(),
            revision: INITIAL_REVISION,
            values,
        }
    }

    /// Creates a record with an explicit revision.
    pub fn with_revision(
        class_code: impl Into<ClassCode>,
        revision: Revision,
        values: Vec<Value>,
    ) -> Self {
        Self {
            class_code: class_code.into(),
            revision,
            values,
        }
    }

    /// Returns the class code.
    #[inline]
    pub fn class_code(&self) -> &ClassCode {
        &self.class_code
    }

    /// Returns true if this record is of the given subtype.
    #[inline]
    pub fn is_subtype(&self, class_code: &ClassCode) -> bool {
        &self.class_code == class_code
    }

    /// Returns the revision.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Sets the revision.
    #[inline]
    pub fn set_revision(&mut self, revision: Revision) {
        self.revision = revision;
    }

    /// Increments the revision and returns the new value, or None if the counter
    /// is exhausted.
    #[inline]
    pub fn increment_revision(&mut self) -> Option<Revision> {
        self.revision = self.revision.checked_add(1)?;
        Some(self.revision)
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Gets a value at the given column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets a value at the given column index.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
            true
        } else {
            false
        }
    }

    /// Returns the number of values in this record.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this record has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
