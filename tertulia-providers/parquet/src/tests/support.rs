use std::{fs::File, path::Path, sync::Arc};

use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{Field, Schema};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;
use tertulia_core::{FriendshipRecord, User};

use crate::ParquetTableStore;

pub(crate) fn user(id: &str, name: &str, post: Option<&str>) -> User {
    User::from_fields(Some(id), Some(name), post).expect("valid user row")
}

pub(crate) fn friendship(left: &str, right: &str) -> FriendshipRecord {
    FriendshipRecord::from_fields(Some(left), Some(right)).expect("valid friendship row")
}

/// A fresh data directory seeded with three users and two friendships.
pub(crate) fn seeded() -> (TempDir, ParquetTableStore) {
    let dir = TempDir::new().expect("temp dir");
    let mut store = ParquetTableStore::open(dir.path()).expect("open temp dir");
    store
        .write_users(&[
            user("a", "Ana", None),
            user("b", "Beto", Some("hola")),
            user("c", "Carla", None),
        ])
        .expect("write users");
    store
        .write_friendships(&[friendship("a", "b"), friendship("b", "c")])
        .expect("write friendships");
    (dir, store)
}

/// Builds a batch from named columns, each nullable.
pub(crate) fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).expect("consistent batch")
}

/// Writes `batch` as a Parquet file at `path`, bypassing the store.
pub(crate) fn write_raw(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("writer");
    writer.write(batch).expect("write batch");
    writer.close().expect("close writer");
}
