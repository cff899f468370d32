//! Table definition for memtab schemas.

use super::column::Column;
use super::constraint::{ConstraintAction, ForeignKey};
use super::index::{IndexDef, IndexType};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::record::Record;
use crate::types::DataType;
use crate::value::Value;

/// A table definition: columns, primary key, secondary indexes and foreign keys.
///
/// Besides describing the table, the definition is the key factory for it: every
/// primary, secondary and foreign key is derived from a record through here.
#[derive(Clone, Debug)]
pub struct TableDef {
    /// Table name.
    name: String,
    /// Column definitions.
    columns: Vec<Column>,
    /// Primary key index.
    primary_key: IndexDef,
    /// Secondary index definitions (includes foreign key indexes).
    indices: Vec<IndexDef>,
    /// Foreign keys declared by this table.
    foreign_keys: Vec<ForeignKey>,
}

impl TableDef {
    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the primary key index.
    #[inline]
    pub fn primary_key(&self) -> &IndexDef {
        &self.primary_key
    }

    /// Returns the secondary indices.
    #[inline]
    pub fn indices(&self) -> &[IndexDef] {
        &self.indices
    }

    /// Returns the foreign keys.
    #[inline]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a secondary index by name.
    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.name() == name)
    }

    /// Gets the position of a secondary index by name.
    pub fn get_index_position(&self, name: &str) -> Option<usize> {
        self.indices.iter().position(|i| i.name() == name)
    }

    /// Derives the primary key of a record.
    pub fn primary_key_of(&self, record: &Record) -> Key {
        extract_key(record, self.primary_key.positions())
    }

    /// Derives the key a record has under the given index.
    pub fn index_key_of(&self, index: &IndexDef, record: &Record) -> Key {
        extract_key(record, index.positions())
    }

    /// Derives the parent key a record references through a foreign key.
    pub fn foreign_key_of(&self, fk: &ForeignKey, record: &Record) -> Key {
        extract_key(record, fk.positions())
    }

    /// Checks that a record fits the column layout of this table.
    ///
    /// The column count always has to match. With `check_types` each non-null
    /// value must also have its column's type.
    pub fn validate(&self, record: &Record, check_types: bool) -> Result<()> {
        if record.len() != self.columns.len() {
            return Err(Error::ColumnCountMismatch {
                table: self.name.clone(),
                expected: self.columns.len(),
                got: record.len(),
            });
        }

        for (column, value) in self.columns.iter().zip(record.values()) {
            match value.data_type() {
                None if !column.is_nullable() => {
                    return Err(Error::NullConstraint {
                        column: column.name().to_string(),
                    });
                }
                Some(got) if check_types && got != column.data_type() => {
                    return Err(Error::TypeMismatch {
                        column: column.name().to_string(),
                        expected: column.data_type(),
                        got,
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Extracts the key value from a record for the given column positions.
fn extract_key(record: &Record, positions: &[usize]) -> Key {
    Key::new(
        positions
            .iter()
            .map(|&i| record.get(i).cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    indices: Vec<IndexDef>,
    pk_columns: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            indices: Vec::new(),
            pk_columns: Vec::new(),
            foreign_keys: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let Some(first) = name.chars().next() else {
            return Err(Error::invalid_schema("Name cannot be empty"));
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    fn check_index_name_free(&self, name: &str) -> Result<()> {
        if self.indices.iter().any(|i| i.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Index already exists: {}.{}",
                self.name, name
            )));
        }
        Ok(())
    }

    fn check_indexable_columns(&self, columns: &[&str]) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::invalid_schema("Index needs at least one column"));
        }
        for name in columns {
            match self.columns.iter().find(|c| c.name() == *name) {
                None => return Err(Error::column_not_found(&self.name, *name)),
                Some(c) if !c.data_type().is_indexable() => {
                    return Err(Error::invalid_schema(format!(
                        "Column is not indexable: {}",
                        name
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Adds a column to the table.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Column already exists: {}",
                name
            )));
        }
        self.columns.push(Column::new(self.columns.len(), name, data_type));
        Ok(self)
    }

    /// Marks columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| c.name() == *name) {
                col.mark_nullable();
            }
        }
        self
    }

    /// Sets the primary key.
    pub fn add_primary_key(mut self, columns: &[&str]) -> Result<Self> {
        if !self.pk_columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Primary key already defined for {}",
                self.name
            )));
        }
        self.check_indexable_columns(columns)?;
        self.pk_columns = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    /// Adds a unique constraint.
    pub fn add_unique(self, name: impl Into<String>, columns: &[&str]) -> Result<Self> {
        self.add_index(name, columns, true)
    }

    /// Adds a hash index.
    pub fn add_index(
        self,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
    ) -> Result<Self> {
        self.add_index_with_type(name, columns, unique, IndexType::Hash)
    }

    /// Adds an ordered index.
    pub fn add_ordered_index(
        self,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
    ) -> Result<Self> {
        self.add_index_with_type(name, columns, unique, IndexType::Ordered)
    }

    fn add_index_with_type(
        mut self,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
        index_type: IndexType,
    ) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        self.check_index_name_free(&name)?;
        self.check_indexable_columns(columns)?;

        let idx = IndexDef::new(
            name,
            columns.iter().map(|c| c.to_string()).collect(),
            unique,
            index_type,
        );
        self.indices.push(idx);
        Ok(self)
    }

    /// Adds a foreign key referencing the primary key of `parent_table`.
    ///
    /// A non-unique index over the child columns is added under the constraint
    /// name, unless a secondary index over exactly those columns already exists.
    pub fn add_foreign_key(
        mut self,
        name: impl Into<String>,
        child_columns: &[&str],
        parent_table: &str,
    ) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.foreign_keys.iter().any(|fk| fk.name == name) {
            return Err(Error::invalid_schema(format!(
                "Foreign key already exists: {}",
                name
            )));
        }
        self.check_indexable_columns(child_columns)?;
        if let Some(col) = self
            .columns
            .iter()
            .find(|c| child_columns.contains(&c.name()) && !c.data_type().is_relational())
        {
            return Err(Error::invalid_schema(format!(
                "Column cannot take part in a foreign key: {}",
                col.name()
            )));
        }

        let mut fk = ForeignKey::new(
            &name,
            &self.name,
            child_columns.iter().map(|c| c.to_string()).collect(),
            parent_table,
        );

        let existing = self
            .indices
            .iter()
            .find(|i| i.covers(child_columns))
            .map(|i| i.name().to_string());
        match existing {
            Some(index) => fk.index = index,
            None => self = self.add_index(&name, child_columns, false)?,
        }

        self.foreign_keys.push(fk);
        Ok(self)
    }

    /// Sets the delete action of a previously added foreign key.
    pub fn on_delete(mut self, name: &str, action: ConstraintAction) -> Result<Self> {
        let fk = self
            .foreign_keys
            .iter_mut()
            .find(|fk| fk.name == name)
            .ok_or_else(|| Error::invalid_schema(format!("Foreign key not found: {}", name)))?;
        fk.action = action;
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<TableDef> {
        if self.pk_columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table {} has no primary key",
                self.name
            )));
        }

        let columns = self.columns;

        let positions_of = |names: &[String]| -> Result<Vec<usize>> {
            names
                .iter()
                .map(|n| {
                    columns
                        .iter()
                        .position(|c| c.name() == n)
                        .ok_or_else(|| Error::column_not_found(&self.name, n))
                })
                .collect()
        };

        let pk_positions = positions_of(&self.pk_columns)?;
        if let Some(&pos) = pk_positions.iter().find(|&&p| columns[p].is_nullable()) {
            return Err(Error::invalid_schema(format!(
                "Primary key column cannot be nullable: {}",
                columns[pos].name()
            )));
        }
        let primary_key = IndexDef::new(
            format!("pk{}", capitalize(&self.name)),
            self.pk_columns.clone(),
            true,
            IndexType::Hash,
        )
        .resolve(pk_positions);

        let indices = self
            .indices
            .into_iter()
            .map(|idx| {
                let positions = positions_of(idx.columns())?;
                Ok(idx.resolve(positions))
            })
            .collect::<Result<Vec<_>>>()?;

        let foreign_keys = self
            .foreign_keys
            .into_iter()
            .map(|mut fk| {
                fk.positions = positions_of(&fk.child_columns)?;
                Ok(fk)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TableDef {
            name: self.name,
            columns,
            primary_key,
            indices,
            foreign_keys,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_table() -> TableDef {
        TableBuilder::new("Service")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .add_column("service_type_id", DataType::Int64)
            .unwrap()
            .add_column("parent_id", DataType::Int64)
            .unwrap()
            .add_nullable(&["parent_id"])
            .add_primary_key(&["id"])
            .unwrap()
            .add_unique("uqName", &["name"])
            .unwrap()
            .add_foreign_key("fkServiceType", &["service_type_id"], "ServiceType")
            .unwrap()
            .add_foreign_key("fkParent", &["parent_id"], "Service")
            .unwrap()
            .on_delete("fkParent", ConstraintAction::Restrict)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_table_builder() {
        let table = service_table();

        assert_eq!(table.name(), "Service");
        assert_eq!(table.columns().len(), 4);
        assert_eq!(table.primary_key().name(), "pkService");
        assert_eq!(table.primary_key().positions(), &[0]);
        assert_eq!(table.foreign_keys().len(), 2);
        // uqName plus one index per foreign key
        assert_eq!(table.indices().len(), 3);
        assert_eq!(table.get_index("fkParent").unwrap().positions(), &[3]);
        assert_eq!(table.foreign_keys()[1].action, ConstraintAction::Restrict);
    }

    #[test]
    fn test_foreign_key_reuses_matching_index() {
        let table = TableBuilder::new("Service")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("service_type_id", DataType::Int64)
            .unwrap()
            .add_primary_key(&["id"])
            .unwrap()
            .add_index("idxType", &["service_type_id"], false)
            .unwrap()
            .add_foreign_key("fkServiceType", &["service_type_id"], "ServiceType")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(table.indices().len(), 1);
        assert_eq!(table.foreign_keys()[0].index, "idxType");
    }

    #[test]
    fn test_key_derivation() {
        let table = service_table();
        let record = Record::new(
            "Service",
            vec![
                Value::Int64(7),
                Value::from("auth-api"),
                Value::Int64(1),
                Value::Null,
            ],
        );

        assert_eq!(table.primary_key_of(&record), Key::from(7i64));
        let idx = table.get_index("uqName").unwrap();
        assert_eq!(table.index_key_of(idx, &record), Key::from("auth-api"));
        let fk = &table.foreign_keys()[0];
        assert_eq!(table.foreign_key_of(fk, &record), Key::from(1i64));
        assert!(table.foreign_key_of(&table.foreign_keys()[1], &record).has_null());
    }

    #[test]
    fn test_validate() {
        let table = service_table();
        let ok = Record::new(
            "Service",
            vec![Value::Int64(1), Value::from("a"), Value::Int64(1), Value::Null],
        );
        assert!(table.validate(&ok, true).is_ok());

        let short = Record::new("Service", vec![Value::Int64(1)]);
        assert!(matches!(
            table.validate(&short, true),
            Err(Error::ColumnCountMismatch { expected: 4, got: 1, .. })
        ));

        let null_name = Record::new(
            "Service",
            vec![Value::Int64(1), Value::Null, Value::Int64(1), Value::Null],
        );
        assert!(matches!(
            table.validate(&null_name, true),
            Err(Error::NullConstraint { .. })
        ));

        let wrong_type = Record::new(
            "Service",
            vec![Value::Int32(1), Value::from("a"), Value::Int64(1), Value::Null],
        );
        assert!(matches!(
            table.validate(&wrong_type, true),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(table.validate(&wrong_type, false).is_ok());
    }

    #[test]
    fn test_foreign_key_needs_relational_column() {
        let result = TableBuilder::new("Reading")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("value", DataType::Float64)
            .unwrap()
            .add_primary_key(&["id"])
            .unwrap()
            .add_foreign_key("fkValue", &["value"], "Sensor");
        assert!(matches!(result, Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_missing_primary_key() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_nullable_primary_key_rejected() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_nullable(&["id"])
            .add_primary_key(&["id"])
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_column_name() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("123invalid", DataType::Int32);

        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_column() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("id", DataType::Int64);

        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_index() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .add_index("idx", &["name"], false)
            .unwrap()
            .add_index("idx", &["name"], true);

        assert!(result.is_err());
    }

    #[test]
    fn test_index_on_unknown_column() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_index("idx", &["missing"], false);

        assert!(matches!(result, Err(Error::ColumnNotFound { .. })));
    }
}
