//! Directory of Parquet files implementing [`TableStore`].
use std::{
    fmt,
    path::{Path, PathBuf},
};

use cap_std::{ambient_authority, fs::Dir};
use parquet::arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder};
use tertulia_core::{
    CommunityRecord, FriendshipRecord, Like, Post, StorageError, Table, TableStore, User,
};
use tracing::{debug, instrument};

use crate::{
    errors::ParquetStoreError,
    ingest::{TextRow, append_text_rows, text_batch},
};

/// Table storage backed by one Parquet file per table.
///
/// All access goes through a capability handle on the data directory, so
/// table names can never escape it.
///
/// # Examples
/// ```no_run
/// use tertulia_core::{Session, TableStore};
/// use tertulia_providers_parquet::ParquetTableStore;
///
/// let store = ParquetTableStore::open("Dataset")?;
/// let session = Session::load(store)?;
/// println!("{} users", session.users().len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ParquetTableStore {
    dir: Dir,
    path: PathBuf,
}

impl fmt::Debug for ParquetTableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParquetTableStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn file_name(table: Table) -> String {
    format!("{}.parquet", table.as_str())
}

fn temp_name(table: Table) -> String {
    format!(".{}.parquet.tmp", table.as_str())
}

fn field(row: &TextRow, index: usize) -> Option<&str> {
    row.get(index).and_then(Option::as_deref)
}

impl ParquetTableStore {
    /// Opens an existing data directory.
    ///
    /// # Errors
    /// Returns [`ParquetStoreError::Io`] when the directory cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParquetStoreError> {
        let path = path.as_ref().to_path_buf();
        let dir = Dir::open_ambient_dir(&path, ambient_authority())?;
        Ok(Self { dir, path })
    }

    /// Opens a data directory, creating it and its parents when absent.
    ///
    /// # Errors
    /// Returns [`ParquetStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ParquetStoreError> {
        let path = path.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&path, ambient_authority())?;
        Self::open(path)
    }

    /// Path the store was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the user table. Sessions never write users; this seeds a
    /// data directory.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table cannot be written.
    pub fn write_users(&mut self, rows: &[User]) -> Result<(), StorageError> {
        let rows: Vec<TextRow> = rows
            .iter()
            .map(|user| {
                vec![
                    Some(user.id.as_str().to_owned()),
                    Some(user.name.clone()),
                    user.legacy_post.clone(),
                ]
            })
            .collect();
        self.write_table(Table::Users, &rows)
    }

    /// Replaces the friendship table. Sessions never write friendships;
    /// this seeds a data directory.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table cannot be written.
    pub fn write_friendships(&mut self, rows: &[FriendshipRecord]) -> Result<(), StorageError> {
        let rows: Vec<TextRow> = rows
            .iter()
            .map(|edge| {
                vec![
                    Some(edge.left.as_str().to_owned()),
                    Some(edge.right.as_str().to_owned()),
                ]
            })
            .collect();
        self.write_table(Table::Friendships, &rows)
    }

    fn read_rows(&self, table: Table) -> Result<Vec<TextRow>, ParquetStoreError> {
        let file = self.dir.open(file_name(table))?.into_std();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let mut rows = Vec::new();
        for batch in reader {
            append_text_rows(&batch?, table, &mut rows)?;
        }
        Ok(rows)
    }

    #[instrument(name = "parquet.read", err, skip(self, parse), fields(table = %table))]
    fn read_records<T>(
        &self,
        table: Table,
        parse: impl Fn(&TextRow) -> Option<T>,
    ) -> Result<Vec<T>, StorageError> {
        let rows = self
            .read_rows(table)
            .map_err(|error| error.into_storage(table))?;
        let records: Vec<T> = rows.iter().filter_map(&parse).collect();
        let skipped = rows.len() - records.len();
        if skipped > 0 {
            debug!(skipped, "skipped rows with missing or malformed keys");
        }
        debug!(rows = records.len(), "table read");
        Ok(records)
    }

    #[instrument(
        name = "parquet.write",
        err,
        skip(self, rows),
        fields(table = %table, rows = rows.len()),
    )]
    fn write_table(&mut self, table: Table, rows: &[TextRow]) -> Result<(), StorageError> {
        let temp = temp_name(table);
        let written = self.write_file(&temp, table, rows).and_then(|()| {
            self.dir
                .rename(&temp, &self.dir, file_name(table))
                .map_err(ParquetStoreError::from)
        });
        if let Err(error) = written {
            if let Err(cleanup) = self.dir.remove_file(&temp) {
                debug!(error = %cleanup, "temporary table file not removed");
            }
            return Err(error.into_storage(table));
        }
        Ok(())
    }

    fn write_file(
        &self,
        name: &str,
        table: Table,
        rows: &[TextRow],
    ) -> Result<(), ParquetStoreError> {
        let batch = text_batch(table, rows)?;
        let file = self.dir.create(name)?.into_std();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.into_inner()?.sync_all()?;
        Ok(())
    }
}

impl TableStore for ParquetTableStore {
    fn read_users(&self) -> Result<Vec<User>, StorageError> {
        self.read_records(Table::Users, |row| {
            User::from_fields(field(row, 0), field(row, 1), field(row, 2))
        })
    }

    fn read_friendships(&self) -> Result<Vec<FriendshipRecord>, StorageError> {
        self.read_records(Table::Friendships, |row| {
            FriendshipRecord::from_fields(field(row, 0), field(row, 1))
        })
    }

    fn read_communities(&self) -> Result<Vec<CommunityRecord>, StorageError> {
        self.read_records(Table::Communities, |row| {
            CommunityRecord::from_fields(field(row, 0), field(row, 1), field(row, 2))
        })
    }

    fn read_posts(&self) -> Result<Vec<Post>, StorageError> {
        self.read_records(Table::Posts, |row| {
            Post::from_fields(field(row, 0), field(row, 1), field(row, 2))
        })
    }

    fn read_likes(&self) -> Result<Vec<Like>, StorageError> {
        self.read_records(Table::Likes, |row| {
            Like::from_fields(field(row, 0), field(row, 1), field(row, 2))
        })
    }

    fn write_communities(&mut self, rows: &[CommunityRecord]) -> Result<(), StorageError> {
        let rows: Vec<TextRow> = rows
            .iter()
            .map(|row| {
                vec![
                    Some(row.community.get().to_string()),
                    Some(row.name.clone()),
                    Some(row.user.as_str().to_owned()),
                ]
            })
            .collect();
        self.write_table(Table::Communities, &rows)
    }

    fn write_posts(&mut self, rows: &[Post]) -> Result<(), StorageError> {
        let rows: Vec<TextRow> = rows
            .iter()
            .map(|post| {
                vec![
                    Some(post.id.get().to_string()),
                    Some(post.author.as_str().to_owned()),
                    Some(post.content.clone()),
                ]
            })
            .collect();
        self.write_table(Table::Posts, &rows)
    }

    fn write_likes(&mut self, rows: &[Like]) -> Result<(), StorageError> {
        let rows: Vec<TextRow> = rows
            .iter()
            .map(|like| {
                vec![
                    Some(like.id.get().to_string()),
                    Some(like.user.as_str().to_owned()),
                    Some(like.post.get().to_string()),
                ]
            })
            .collect();
        self.write_table(Table::Likes, &rows)
    }
}
