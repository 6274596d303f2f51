//! Parquet-backed table storage for tertulia sessions.
//!
//! Each table lives in its own file inside a data directory
//! (`users.parquet`, `friendships.parquet`, and so on). Every column is
//! nullable UTF-8 text; numeric identifiers are stored as their decimal
//! rendering. Rewrites go to a temporary file that is renamed over the
//! table, so readers never observe a partially written table.

mod errors;
mod ingest;
mod provider;

pub use errors::ParquetStoreError;
pub use provider::ParquetTableStore;

#[cfg(test)]
mod tests;
