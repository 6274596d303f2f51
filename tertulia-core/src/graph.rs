//! Undirected friendship graph keyed by user identifier.
//!
//! Nodes keep their insertion order and each adjacency list keeps the order
//! in which friendships were added, so traversals are deterministic for a
//! given load order. Edges are deduplicated on insertion and self-loops are
//! ignored, which keeps the symmetry invariant that degree and edge counts
//! rely on.

use std::collections::HashMap;

use crate::model::UserId;

/// Outcome of [`FriendshipGraph::add_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsertion {
    /// Both adjacency lists gained an entry.
    Inserted,
    /// The friendship already existed; nothing changed.
    Duplicate,
    /// Both endpoints were the same user; nothing changed.
    SelfLoop,
}

#[derive(Debug, Clone)]
struct Node {
    id: UserId,
    neighbours: Vec<UserId>,
}

/// Adjacency-list graph of friendships.
///
/// # Examples
/// ```
/// use tertulia_core::{EdgeInsertion, FriendshipGraph};
///
/// let mut graph = FriendshipGraph::new();
/// assert_eq!(graph.add_edge("a", "b"), EdgeInsertion::Inserted);
/// assert_eq!(graph.add_edge("b", "a"), EdgeInsertion::Duplicate);
/// assert_eq!(graph.degree("a"), 1);
/// assert!(graph.neighbours("nobody").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FriendshipGraph {
    index: HashMap<UserId, usize>,
    nodes: Vec<Node>,
    edges: usize,
}

impl FriendshipGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a list of edges.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::FriendshipGraph;
    ///
    /// let graph = FriendshipGraph::from_edges([("a", "b"), ("b", "c")]);
    /// assert_eq!(graph.node_count(), 3);
    /// assert_eq!(graph.edge_count(), 2);
    /// ```
    #[must_use]
    pub fn from_edges<A, B>(edges: impl IntoIterator<Item = (A, B)>) -> Self
    where
        A: Into<UserId>,
        B: Into<UserId>,
    {
        let mut graph = Self::new();
        for (left, right) in edges {
            graph.add_edge(left, right);
        }
        graph
    }

    /// Registers `user` as a node without friendships. Existing nodes are
    /// left untouched.
    pub fn add_node(&mut self, user: impl Into<UserId>) {
        self.slot_or_insert(user.into());
    }

    /// Inserts the undirected friendship `left`–`right`.
    pub fn add_edge(&mut self, left: impl Into<UserId>, right: impl Into<UserId>) -> EdgeInsertion {
        let left_id = left.into();
        let right_id = right.into();
        if left_id == right_id {
            self.slot_or_insert(left_id);
            return EdgeInsertion::SelfLoop;
        }
        let left_slot = self.slot_or_insert(left_id.clone());
        let right_slot = self.slot_or_insert(right_id.clone());
        if self.nodes[left_slot].neighbours.contains(&right_id) {
            return EdgeInsertion::Duplicate;
        }
        self.nodes[left_slot].neighbours.push(right_id);
        self.nodes[right_slot].neighbours.push(left_id);
        self.edges += 1;
        EdgeInsertion::Inserted
    }

    /// Returns the friends of `user` in insertion order; unknown users have
    /// none.
    #[must_use]
    pub fn neighbours(&self, user: &str) -> &[UserId] {
        self.index
            .get(user)
            .and_then(|&slot| self.nodes.get(slot))
            .map(|node| node.neighbours.as_slice())
            .unwrap_or_default()
    }

    /// Number of friends of `user`.
    #[must_use]
    pub fn degree(&self, user: &str) -> usize {
        self.neighbours(user).len()
    }

    /// Returns whether `user` is a node of the graph.
    #[must_use]
    pub fn contains(&self, user: &str) -> bool {
        self.index.contains_key(user)
    }

    /// Returns the stored identifier for `user`, if it is a node.
    #[must_use]
    pub fn node(&self, user: &str) -> Option<&UserId> {
        self.index.get_key_value(user).map(|(id, _)| id)
    }

    /// Returns whether `left` and `right` are friends.
    #[must_use]
    pub fn has_edge(&self, left: &str, right: &str) -> bool {
        self.neighbours(left).iter().any(|friend| friend.as_str() == right)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &UserId> + '_ {
        self.nodes.iter().map(|node| &node.id)
    }

    /// Every undirected edge exactly once, oriented from the endpoint that
    /// was inserted first.
    pub fn edges(&self) -> impl Iterator<Item = (&UserId, &UserId)> + '_ {
        self.nodes.iter().enumerate().flat_map(move |(slot, node)| {
            node.neighbours.iter().filter_map(move |friend| {
                let other = self.index.get(friend).copied()?;
                (other > slot).then_some((&node.id, friend))
            })
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn slot_or_insert(&mut self, user: UserId) -> usize {
        if let Some(&slot) = self.index.get(&user) {
            return slot;
        }
        let slot = self.nodes.len();
        self.index.insert(user.clone(), slot);
        self.nodes.push(Node {
            id: user,
            neighbours: Vec::new(),
        });
        slot
    }
}
