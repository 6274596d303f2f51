//! Benchmark parameter types.

use std::fmt;

/// Parameters for a graph query benchmark run.
#[derive(Clone, Debug)]
pub struct NetworkBenchParams {
    /// Number of users in the network.
    pub user_count: usize,
    /// Number of friendship rows generated.
    pub friendship_count: usize,
}

impl fmt::Display for NetworkBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},e={}", self.user_count, self.friendship_count)
    }
}

/// Parameters for a ranking benchmark run.
#[derive(Clone, Debug)]
pub struct RankingBenchParams {
    /// Number of like rows.
    pub like_count: usize,
    /// Number of posts the likes are spread across.
    pub post_count: u64,
}

impl fmt::Display for RankingBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "likes={},posts={}", self.like_count, self.post_count)
    }
}
