use arrow_schema::{ArrowError, DataType};
use tertulia_core::{StorageError, Table};
use thiserror::Error;

/// Failures raised while reading or writing a Parquet table.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParquetStoreError {
    #[error("column `{column}` of table `{table}` must hold text or integers but found {actual:?}")]
    InvalidColumnType {
        table: Table,
        column: String,
        actual: DataType,
    },
    #[error("table `{table}` has {actual} columns but {expected} were written")]
    ColumnCount {
        table: Table,
        expected: usize,
        actual: usize,
    },
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParquetStoreError {
    /// Whether the error reports an absent file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(error) if error.kind() == std::io::ErrorKind::NotFound)
    }

    /// Converts into the storage error reported to sessions.
    #[must_use]
    pub fn into_storage(self, table: Table) -> StorageError {
        if self.is_not_found() {
            StorageError::Missing { table }
        } else {
            StorageError::backend(table, self)
        }
    }
}
