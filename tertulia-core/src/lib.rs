//! Tertulia core library.
//!
//! An in-memory social network: a friendship graph with breadth-first
//! queries, a community registry backed by a disjoint-set forest, and a
//! post store whose likes feed divide-and-conquer popularity rankings.
//! Tables are exchanged with storage only through [`TableStore`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod community;
mod disjoint_set;
mod error;
mod graph;
#[cfg(feature = "layout")]
mod layout;
mod model;
mod paths;
mod posts;
mod ranking;
mod session;
mod stats;
mod store;
#[cfg(test)]
mod test_utils;
mod users;

#[cfg(feature = "layout")]
#[cfg_attr(docsrs, doc(cfg(feature = "layout")))]
pub use crate::layout::{ForceLayout, NodePosition, Position, layout};
pub use crate::{
    builder::{LayoutBuilder, LayoutConfig, SessionBuilder, SessionConfig},
    community::{CommunityRegistry, CommunitySummary},
    disjoint_set::{DisjointSet, DisjointSetError},
    error::{
        ConfigError, InvalidInput, Result, StorageError, StorageErrorCode, TertuliaError,
        TertuliaErrorCode,
    },
    graph::{EdgeInsertion, FriendshipGraph},
    model::{Community, CommunityId, Like, LikeId, Post, PostId, User, UserId},
    paths::{bfs_distances, path_edges, recommend, shortest_path, subgraph},
    posts::PostStore,
    ranking::{PostLikes, count_likes_by_post, max_by_likes, sort_by_likes_desc, top_k},
    session::{FeedEntry, GraphSnapshot, Session, SnapshotNode},
    stats::{GraphStats, NodeDegree, analyze},
    store::{CommunityRecord, FriendshipRecord, MemoryStore, Table, TableStore},
    users::Users,
};
