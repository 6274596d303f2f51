//! Conversion between Arrow record batches and rows of text fields.
use std::sync::Arc;

use arrow_array::{
    Array, ArrayRef, Int32Array, Int64Array, LargeStringArray, RecordBatch, StringArray,
    UInt64Array,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use tertulia_core::Table;

use crate::errors::ParquetStoreError;

/// Raw fields of one stored row, aligned with [`Table::columns`].
pub(crate) type TextRow = Vec<Option<String>>;

/// Schema written for `table`: one nullable UTF-8 column per field.
pub(crate) fn text_schema(table: Table) -> SchemaRef {
    Arc::new(Schema::new(
        table
            .columns()
            .iter()
            .map(|column| Field::new(*column, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

/// Appends the rows of `batch` to `out`, projecting onto the columns of
/// `table`. A column missing from the batch reads as null in every row.
pub(crate) fn append_text_rows(
    batch: &RecordBatch,
    table: Table,
    out: &mut Vec<TextRow>,
) -> Result<(), ParquetStoreError> {
    let schema = batch.schema();
    let columns = table
        .columns()
        .iter()
        .map(|column| match schema.index_of(column) {
            Ok(index) => text_values(batch.column(index).as_ref(), table, column),
            Err(_) => Ok(vec![None; batch.num_rows()]),
        })
        .collect::<Result<Vec<_>, _>>()?;

    out.reserve(batch.num_rows());
    for row in 0..batch.num_rows() {
        out.push(
            columns
                .iter()
                .map(|values| values.get(row).cloned().flatten())
                .collect(),
        );
    }
    Ok(())
}

fn text_values(
    array: &dyn Array,
    table: Table,
    column: &str,
) -> Result<Vec<Option<String>>, ParquetStoreError> {
    let mismatch = || ParquetStoreError::InvalidColumnType {
        table,
        column: column.to_owned(),
        actual: array.data_type().clone(),
    };
    let any = array.as_any();
    match array.data_type() {
        DataType::Utf8 => Ok(any
            .downcast_ref::<StringArray>()
            .ok_or_else(mismatch)?
            .iter()
            .map(|value| value.map(ToOwned::to_owned))
            .collect()),
        DataType::LargeUtf8 => Ok(any
            .downcast_ref::<LargeStringArray>()
            .ok_or_else(mismatch)?
            .iter()
            .map(|value| value.map(ToOwned::to_owned))
            .collect()),
        DataType::Int64 => Ok(any
            .downcast_ref::<Int64Array>()
            .ok_or_else(mismatch)?
            .iter()
            .map(|value| value.map(|number| number.to_string()))
            .collect()),
        DataType::Int32 => Ok(any
            .downcast_ref::<Int32Array>()
            .ok_or_else(mismatch)?
            .iter()
            .map(|value| value.map(|number| number.to_string()))
            .collect()),
        DataType::UInt64 => Ok(any
            .downcast_ref::<UInt64Array>()
            .ok_or_else(mismatch)?
            .iter()
            .map(|value| value.map(|number| number.to_string()))
            .collect()),
        DataType::Null => Ok(vec![None; array.len()]),
        _ => Err(mismatch()),
    }
}

/// Builds a record batch for `table` from rows of text fields.
pub(crate) fn text_batch(table: Table, rows: &[TextRow]) -> Result<RecordBatch, ParquetStoreError> {
    let width = table.columns().len();
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        return Err(ParquetStoreError::ColumnCount {
            table,
            expected: width,
            actual: row.len(),
        });
    }
    let arrays = (0..width)
        .map(|index| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|row| row.get(index).and_then(Option::as_deref))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();
    Ok(RecordBatch::try_new(text_schema(table), arrays)?)
}
