//! Benchmark support crate for tertulia.
//!
//! Provides seeded synthetic networks and like tables used by the Criterion
//! benchmarks for breadth-first queries and popularity ranking.

pub mod error;
pub mod network;
pub mod params;
