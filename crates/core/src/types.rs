//! Data type definitions for memtab.
//!
//! This module defines the column types a record can carry.

use core::fmt;

/// Supported column types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
    /// Binary data
    Bytes,
}

impl DataType {
    /// Returns whether this type can be used as an index key.
    pub fn is_indexable(&self) -> bool {
        !matches!(self, DataType::Bytes)
    }

    /// Returns whether this type can take part in a foreign key.
    pub fn is_relational(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::String => "string",
            DataType::DateTime => "datetime",
            DataType::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Int32, DataType::Int32);
        assert_ne!(DataType::Int32, DataType::Int64);
    }

    #[test]
    fn test_indexable() {
        assert!(DataType::Int64.is_indexable());
        assert!(DataType::String.is_indexable());
        assert!(!DataType::Bytes.is_indexable());
    }

    #[test]
    fn test_relational() {
        assert!(DataType::Int64.is_relational());
        assert!(!DataType::Float64.is_relational());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::DateTime.to_string(), "datetime");
    }
}
