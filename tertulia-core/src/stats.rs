//! Summary statistics over a friendship graph.

use std::num::NonZeroUsize;

use crate::{graph::FriendshipGraph, model::UserId};

/// Degree of a single user, as reported by [`GraphStats::top_nodes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDegree {
    /// User identifier.
    pub user: UserId,
    /// Number of friends.
    pub degree: usize,
}

/// Aggregate figures computed by [`analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of undirected edges, derived from the degree sum.
    pub edge_count: usize,
    /// Mean degree; zero for an empty graph.
    pub average_degree: f64,
    /// Smallest degree; zero for an empty graph.
    pub min_degree: usize,
    /// Largest degree; zero for an empty graph.
    pub max_degree: usize,
    /// `2E / (N (N - 1))` for `N > 1`, otherwise zero.
    pub density: f64,
    /// Highest-degree nodes, ties kept in node insertion order.
    pub top_nodes: Vec<NodeDegree>,
}

/// Computes [`GraphStats`] for `graph`, keeping the `top` best-connected
/// nodes.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tertulia_core::{FriendshipGraph, analyze};
///
/// let graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]);
/// let stats = analyze(&graph, NonZeroUsize::new(2).expect("non-zero"));
/// assert_eq!(stats.edge_count, 3);
/// assert_eq!(stats.density, 0.5);
/// assert_eq!(stats.top_nodes[0].user.as_str(), "B");
/// ```
#[expect(
    clippy::cast_precision_loss,
    reason = "node and degree counts are far below 2^52"
)]
#[expect(clippy::float_arithmetic, reason = "average degree and density are ratios")]
#[must_use]
pub fn analyze(graph: &FriendshipGraph, top: NonZeroUsize) -> GraphStats {
    let degrees: Vec<NodeDegree> = graph
        .nodes()
        .map(|user| NodeDegree {
            user: user.clone(),
            degree: graph.degree(user.as_str()),
        })
        .collect();

    let node_count = degrees.len();
    let degree_sum: usize = degrees.iter().map(|entry| entry.degree).sum();
    let edge_count = degree_sum / 2;
    let min_degree = degrees.iter().map(|entry| entry.degree).min().unwrap_or(0);
    let max_degree = degrees.iter().map(|entry| entry.degree).max().unwrap_or(0);
    let average_degree = if node_count == 0 {
        0.0
    } else {
        degree_sum as f64 / node_count as f64
    };
    let density = if node_count > 1 {
        (2 * edge_count) as f64 / (node_count * (node_count - 1)) as f64
    } else {
        0.0
    };

    let mut top_nodes = degrees;
    // Stable sort keeps insertion order among equal degrees.
    top_nodes.sort_by(|left, right| right.degree.cmp(&left.degree));
    top_nodes.truncate(top.get());

    GraphStats {
        node_count,
        edge_count,
        average_degree,
        min_degree,
        max_degree,
        density,
        top_nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn top(count: usize) -> NonZeroUsize {
        NonZeroUsize::new(count).expect("non-zero")
    }

    #[test]
    fn path_graph_figures() {
        let graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]);
        let stats = analyze(&graph, top(5));
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.min_degree, 1);
        assert_eq!(stats.max_degree, 2);
        assert!((stats.average_degree - 1.5).abs() < f64::EPSILON);
        assert!((stats.density - 0.5).abs() < f64::EPSILON);
        let order: Vec<&str> = stats.top_nodes.iter().map(|n| n.user.as_str()).collect();
        assert_eq!(order, ["B", "C", "A", "D"]);
    }

    #[rstest]
    #[case::empty(FriendshipGraph::new(), 0, 0.0)]
    #[case::single({ let mut g = FriendshipGraph::new(); g.add_node("A"); g }, 1, 0.0)]
    #[case::complete(FriendshipGraph::from_edges([("A", "B"), ("B", "C"), ("A", "C")]), 3, 1.0)]
    fn density_edge_cases(
        #[case] graph: FriendshipGraph,
        #[case] nodes: usize,
        #[case] density: f64,
    ) {
        let stats = analyze(&graph, top(1));
        assert_eq!(stats.node_count, nodes);
        assert!((stats.density - density).abs() < f64::EPSILON);
    }

    #[test]
    fn edge_count_agrees_with_graph_after_duplicates() {
        let mut graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C")]);
        graph.add_edge("B", "A");
        graph.add_edge("C", "C");
        let stats = analyze(&graph, top(1));
        assert_eq!(stats.edge_count, graph.edge_count());
        assert_eq!(stats.top_nodes.len(), 1);
    }

    #[test]
    fn isolated_nodes_pull_min_degree_to_zero() {
        let mut graph = FriendshipGraph::from_edges([("A", "B")]);
        graph.add_node("C");
        let stats = analyze(&graph, top(3));
        assert_eq!(stats.min_degree, 0);
        assert_eq!(stats.top_nodes.last().map(|n| n.user.as_str()), Some("C"));
    }
}
