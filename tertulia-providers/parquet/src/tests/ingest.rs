use std::sync::Arc;

use arrow_array::{Array, ArrayRef, Int32Array, LargeStringArray, NullArray, UInt64Array};
use rstest::rstest;
use tertulia_core::Table;

use super::support::batch;
use crate::{
    ParquetStoreError,
    ingest::{TextRow, append_text_rows, text_batch},
};

fn rows_of(batch: &arrow_array::RecordBatch, table: Table) -> Vec<TextRow> {
    let mut rows = Vec::new();
    append_text_rows(batch, table, &mut rows).expect("supported columns");
    rows
}

#[rstest]
#[case::int32(Arc::new(Int32Array::from(vec![Some(5), None])) as ArrayRef)]
#[case::uint64(Arc::new(UInt64Array::from(vec![Some(5), None])) as ArrayRef)]
#[case::large_utf8(Arc::new(LargeStringArray::from(vec![Some("5"), None])) as ArrayRef)]
fn numeric_and_large_text_columns_render_as_text(#[case] ids: ArrayRef) {
    let rows = rows_of(&batch(vec![("id1", ids)]), Table::Friendships);
    assert_eq!(rows, [vec![Some("5".to_owned()), None], vec![None, None]]);
}

#[rstest]
fn null_typed_columns_read_as_absent() {
    let column = Arc::new(NullArray::new(2)) as ArrayRef;
    let rows = rows_of(&batch(vec![("post", column)]), Table::Users);
    assert_eq!(rows, [vec![None, None, None], vec![None, None, None]]);
}

#[rstest]
fn written_batches_are_text_columns_in_storage_order() {
    let rows = vec![vec![Some("1".to_owned()), None, Some("u".to_owned())]];
    let built = text_batch(Table::Likes, &rows).expect("width matches");
    let names: Vec<String> = built
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    assert_eq!(names, ["like_id", "user_id", "post_id"]);
    assert_eq!(built.num_rows(), 1);
    assert_eq!(built.column(1).null_count(), 1);
    assert_eq!(rows_of(&built, Table::Likes), rows);
}

#[rstest]
fn written_rows_must_match_table_width() {
    let err = text_batch(Table::Friendships, &[vec![Some("a".to_owned())]])
        .expect_err("row is too short");
    assert!(matches!(
        err,
        ParquetStoreError::ColumnCount {
            table: Table::Friendships,
            expected: 2,
            actual: 1,
        }
    ));
}
