//! Error types for memtab.

use crate::key::Key;
use crate::record::Revision;
use crate::types::DataType;
use thiserror::Error;

/// Result type alias for memtab operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for table operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A record with the same primary key already exists.
    #[error("Primary key {key} already exists in table `{table}`")]
    PrimaryKeyConflict { table: String, key: Key },
    /// A unique secondary index already maps the key to another record.
    #[error("Unique index `{table}.{index}` already holds key {key}")]
    UniqueIndexViolation {
        table: String,
        index: String,
        key: Key,
    },
    /// A foreign key does not resolve to an existing parent record.
    #[error("Foreign key `{constraint}` on `{table}`: key {key} does not exist in `{parent_table}`")]
    UnresolvedRelation {
        constraint: String,
        table: String,
        key: Key,
        parent_table: String,
    },
    /// No record exists under the primary key.
    #[error("Record {key} not found in table `{table}`")]
    RecordNotFound { table: String, key: Key },
    /// The stored revision differs from the one presented by the caller.
    #[error("Revision conflict on `{table}` record {key}: expected {expected}, stored {actual}")]
    RevisionConflict {
        table: String,
        key: Key,
        expected: Revision,
        actual: Revision,
    },
    /// The record's revision counter cannot be advanced any further.
    #[error("Revision of `{table}` record {key} is exhausted")]
    RevisionExhausted { table: String, key: Key },
    /// A restricting foreign key still has dependents.
    #[error("Foreign key `{constraint}`: cannot delete, referenced by {dependents} rows in `{table}`")]
    RestrictViolation {
        constraint: String,
        table: String,
        dependents: usize,
    },
    /// Table not found.
    #[error("Table not found: {name}")]
    TableNotFound { name: String },
    /// Index not found.
    #[error("Index {index} not found in table {table}")]
    IndexNotFound { table: String, index: String },
    /// Column not found.
    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    /// Invalid schema definition.
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },
    /// A record does not carry one value per column.
    #[error("Table `{table}` expects {expected} values, got {got}")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        got: usize,
    },
    /// Type mismatch error.
    #[error("Type mismatch on column {column}: expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        got: DataType,
    },
    /// Null constraint violation.
    #[error("Null constraint violation on column: {column}")]
    NullConstraint { column: String },
    /// Invalid operation.
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl Error {
    /// Creates a primary key conflict error.
    pub fn primary_key_conflict(table: impl Into<String>, key: Key) -> Self {
        Error::PrimaryKeyConflict {
            table: table.into(),
            key,
        }
    }

    /// Creates a unique index violation error.
    pub fn unique_index_violation(
        table: impl Into<String>,
        index: impl Into<String>,
        key: Key,
    ) -> Self {
        Error::UniqueIndexViolation {
            table: table.into(),
            index: index.into(),
            key,
        }
    }

    /// Creates a record not found error.
    pub fn record_not_found(table: impl Into<String>, key: Key) -> Self {
        Error::RecordNotFound {
            table: table.into(),
            key,
        }
    }

    /// Creates a revision conflict error.
    pub fn revision_conflict(
        table: impl Into<String>,
        key: Key,
        expected: Revision,
        actual: Revision,
    ) -> Self {
        Error::RevisionConflict {
            table: table.into(),
            key,
            expected,
            actual,
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates an index not found error.
    pub fn index_not_found(table: impl Into<String>, index: impl Into<String>) -> Self {
        Error::IndexNotFound {
            table: table.into(),
            index: index.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a revision exhausted error.
    pub fn revision_exhausted(table: impl Into<String>, key: Key) -> Self {
        Error::RevisionExhausted {
            table: table.into(),
            key,
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for failures caused by the data rather than by API misuse:
    /// key conflicts, unresolved relations, missing records and stale revisions.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::PrimaryKeyConflict { .. }
                | Error::UniqueIndexViolation { .. }
                | Error::UnresolvedRelation { .. }
                | Error::RecordNotFound { .. }
                | Error::RevisionConflict { .. }
                | Error::RevisionExhausted { .. }
                | Error::RestrictViolation { .. }
        )
    }
}
