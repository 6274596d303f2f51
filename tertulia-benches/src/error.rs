//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of using
//! `.expect()`.

use crate::network::SyntheticError;
use tertulia_core::TertuliaError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic network generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Loading or querying a session failed.
    #[error("session operation failed: {0}")]
    Session(#[from] TertuliaError),
}
