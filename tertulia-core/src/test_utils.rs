//! Shared test utilities for `tertulia-core`.

use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use tertulia_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{graph::FriendshipGraph, model::UserId};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROPTEST_CASES` and
/// `TERTULIA_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Borrows identifiers as plain strings for concise assertions.
#[must_use]
pub(crate) fn ids(users: &[UserId]) -> Vec<&str> {
    users.iter().map(UserId::as_str).collect()
}

/// Generates small graphs over the users `u0..u11`, including isolated
/// nodes, duplicate edge attempts, and self-loop attempts.
pub(crate) fn random_graph() -> impl Strategy<Value = FriendshipGraph> {
    (1_usize..12)
        .prop_flat_map(|size| {
            (
                Just(size),
                proptest::collection::vec((0..size, 0..size), 0..size * 2),
            )
        })
        .prop_map(|(size, edges)| {
            let mut graph = FriendshipGraph::new();
            for node in 0..size {
                graph.add_node(format!("u{node}"));
            }
            for (left, right) in edges {
                graph.add_edge(format!("u{left}"), format!("u{right}"));
            }
            graph
        })
}
