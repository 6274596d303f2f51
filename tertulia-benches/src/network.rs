//! Seeded synthetic networks.
//!
//! Users are named `u0..u{n-1}`; friendship endpoints are drawn uniformly,
//! so duplicates and self-loops occur exactly as they would in a hand-edited
//! table and exercise the graph's deduplication.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tertulia_core::{
    FriendshipGraph, FriendshipRecord, Like, LikeId, MemoryStore, PostId, User, UserId,
};
use thiserror::Error;

/// Errors raised while generating synthetic data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntheticError {
    /// A network needs at least one user.
    #[error("user_count must be greater than zero")]
    ZeroUsers,
    /// Likes need at least one post to point at.
    #[error("post_count must be greater than zero")]
    ZeroPosts,
}

/// Shape of a generated network.
#[derive(Clone, Debug)]
pub struct SyntheticNetworkConfig {
    /// Number of users.
    pub user_count: usize,
    /// Number of friendship rows to draw.
    pub friendship_count: usize,
    /// RNG seed.
    pub seed: u64,
}

/// A generated user table and friendship table.
#[derive(Clone, Debug)]
pub struct SyntheticNetwork {
    users: Vec<User>,
    friendships: Vec<FriendshipRecord>,
}

fn user_id(index: usize) -> UserId {
    UserId::new(&format!("u{index}"))
}

impl SyntheticNetwork {
    /// Draws a network from `config`.
    ///
    /// # Errors
    /// Returns [`SyntheticError::ZeroUsers`] when `user_count` is zero.
    pub fn generate(config: &SyntheticNetworkConfig) -> Result<Self, SyntheticError> {
        if config.user_count == 0 {
            return Err(SyntheticError::ZeroUsers);
        }
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let users = (0..config.user_count)
            .map(|index| User {
                id: user_id(index),
                name: format!("User {index}"),
                legacy_post: None,
            })
            .collect();
        let friendships = (0..config.friendship_count)
            .map(|_| FriendshipRecord {
                left: user_id(rng.gen_range(0..config.user_count)),
                right: user_id(rng.gen_range(0..config.user_count)),
            })
            .collect();
        Ok(Self { users, friendships })
    }

    /// Generated user rows.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Generated friendship rows.
    #[must_use]
    pub fn friendships(&self) -> &[FriendshipRecord] {
        &self.friendships
    }

    /// Builds the friendship graph with every user as a node.
    #[must_use]
    pub fn graph(&self) -> FriendshipGraph {
        let mut graph = FriendshipGraph::new();
        for user in &self.users {
            graph.add_node(user.id.clone());
        }
        for edge in &self.friendships {
            graph.add_edge(edge.left.clone(), edge.right.clone());
        }
        graph
    }

    /// An in-memory store holding the two mandatory tables.
    #[must_use]
    pub fn into_store(self) -> MemoryStore {
        MemoryStore::new()
            .with_users(self.users)
            .with_friendships(self.friendships)
    }
}

/// Draws `like_count` likes spread uniformly over posts `1..=post_count`.
///
/// # Errors
/// Returns [`SyntheticError::ZeroPosts`] when `post_count` is zero.
pub fn synthetic_likes(
    like_count: usize,
    post_count: u64,
    seed: u64,
) -> Result<Vec<Like>, SyntheticError> {
    if post_count == 0 {
        return Err(SyntheticError::ZeroPosts);
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    Ok((1..=like_count)
        .map(|index| Like {
            id: LikeId::new(u64::try_from(index).unwrap_or(u64::MAX)),
            user: user_id(index),
            post: PostId::new(rng.gen_range(1..=post_count)),
        })
        .collect())
}
