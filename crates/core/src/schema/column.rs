use crate::types::DataType;

/// One column of a table: its name, type and whether it accepts `Null`.
///
/// Columns are not nullable unless the table builder marks them so.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
    position: usize,
}

impl Column {
    pub(crate) fn new(position: usize, name: String, data_type: DataType) -> Self {
        Self {
            name,
            data_type,
            nullable: false,
            position,
        }
    }

    pub(crate) fn mark_nullable(&mut self) {
        self.nullable = true;
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Position of the column in a record.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}
