//! Breadth-first traversals over the friendship graph.
//!
//! All routines are iterative and keep a visited set, so cycles terminate
//! and deep graphs cannot overflow the stack. When several shortest paths
//! exist the one discovered first wins, which follows the order of the
//! adjacency lists.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{graph::FriendshipGraph, model::UserId};

/// Returns a minimum-edge path from `start` to `goal`, both inclusive.
///
/// `None` when either endpoint is absent from the graph or `goal` cannot be
/// reached. A path from a node to itself is the single-node path.
///
/// # Examples
/// ```
/// use tertulia_core::{FriendshipGraph, shortest_path};
///
/// let graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]);
/// let path = shortest_path(&graph, "A", "D").expect("D is reachable");
/// let names: Vec<&str> = path.iter().map(|id| id.as_str()).collect();
/// assert_eq!(names, ["A", "B", "C", "D"]);
/// assert!(shortest_path(&graph, "A", "Z").is_none());
/// ```
#[must_use]
pub fn shortest_path(graph: &FriendshipGraph, start: &str, goal: &str) -> Option<Vec<UserId>> {
    if !graph.contains(goal) {
        return None;
    }
    let origin = graph.node(start)?;

    let mut came_from: HashMap<&UserId, Option<&UserId>> = HashMap::new();
    let mut queue = VecDeque::from([origin]);
    came_from.insert(origin, None);

    while let Some(node) = queue.pop_front() {
        if node.as_str() == goal {
            return Some(unwind(&came_from, node));
        }
        for friend in graph.neighbours(node.as_str()) {
            if !came_from.contains_key(friend) {
                came_from.insert(friend, Some(node));
                queue.push_back(friend);
            }
        }
    }
    None
}

fn unwind<'g>(came_from: &HashMap<&'g UserId, Option<&'g UserId>>, goal: &'g UserId) -> Vec<UserId> {
    let mut path = vec![goal.clone()];
    let mut cursor = goal;
    while let Some(Some(previous)) = came_from.get(cursor) {
        path.push((*previous).clone());
        cursor = *previous;
    }
    path.reverse();
    path
}

/// Hop distance from `start` to every node reachable from it, `start`
/// included at distance zero. Empty when `start` is not a node.
///
/// # Examples
/// ```
/// use tertulia_core::{FriendshipGraph, bfs_distances};
///
/// let graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C")]);
/// let distances = bfs_distances(&graph, "A");
/// assert_eq!(distances.get("C"), Some(&2));
/// ```
#[must_use]
pub fn bfs_distances(graph: &FriendshipGraph, start: &str) -> HashMap<UserId, usize> {
    let mut distances = HashMap::new();
    let Some(origin) = graph.node(start) else {
        return distances;
    };
    let mut queue = VecDeque::from([(origin, 0_usize)]);
    distances.insert(origin.clone(), 0);
    while let Some((node, hops)) = queue.pop_front() {
        for friend in graph.neighbours(node.as_str()) {
            if !distances.contains_key(friend) {
                distances.insert(friend.clone(), hops + 1);
                queue.push_back((friend, hops + 1));
            }
        }
    }
    distances
}

/// Friends of friends of `user` who are neither `user` nor already friends.
///
/// The result is deduplicated and ordered by first discovery.
///
/// # Examples
/// ```
/// use tertulia_core::{FriendshipGraph, recommend};
///
/// let graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]);
/// let suggestions: Vec<String> = recommend(&graph, "A")
///     .into_iter()
///     .map(|id| id.to_string())
///     .collect();
/// assert_eq!(suggestions, ["C"]);
/// ```
#[must_use]
pub fn recommend(graph: &FriendshipGraph, user: &str) -> Vec<UserId> {
    let direct = graph.neighbours(user);
    let direct_set: HashSet<&UserId> = direct.iter().collect();
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();
    for friend in direct {
        for candidate in graph.neighbours(friend.as_str()) {
            if candidate.as_str() == user || direct_set.contains(candidate) {
                continue;
            }
            if seen.insert(candidate) {
                suggestions.push(candidate.clone());
            }
        }
    }
    suggestions
}

/// Induced subgraph of every node within `hops` edges of any seed.
///
/// Seeds absent from the graph are ignored. Node order follows the order of
/// discovery: seeds first, then each expansion round.
///
/// # Examples
/// ```
/// use tertulia_core::{FriendshipGraph, subgraph};
///
/// let graph = FriendshipGraph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]);
/// let local = subgraph(&graph, &["A"], 1);
/// assert_eq!(local.node_count(), 2);
/// assert!(local.has_edge("A", "B"));
/// assert_eq!(local.edge_count(), 1);
/// ```
#[must_use]
pub fn subgraph<S: AsRef<str>>(graph: &FriendshipGraph, seeds: &[S], hops: usize) -> FriendshipGraph {
    let mut included: Vec<&UserId> = Vec::new();
    let mut members: HashSet<&UserId> = HashSet::new();
    for id in seeds.iter().filter_map(|seed| graph.node(seed.as_ref())) {
        if members.insert(id) {
            included.push(id);
        }
    }

    let mut frontier: Vec<&UserId> = included.clone();
    for _ in 0..hops {
        let mut next = Vec::new();
        for node in frontier {
            for friend in graph.neighbours(node.as_str()) {
                if members.insert(friend) {
                    included.push(friend);
                    next.push(friend);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    let mut induced = FriendshipGraph::new();
    for node in &included {
        induced.add_node((*node).clone());
    }
    for node in &included {
        for friend in graph.neighbours(node.as_str()) {
            if members.contains(friend) {
                induced.add_edge((*node).clone(), friend.clone());
            }
        }
    }
    induced
}

/// Consecutive pairs of `path`, for highlighting a route.
///
/// # Examples
/// ```
/// use tertulia_core::{UserId, path_edges};
///
/// let path = [UserId::new("A"), UserId::new("B"), UserId::new("C")];
/// assert_eq!(path_edges(&path).count(), 2);
/// ```
pub fn path_edges(path: &[UserId]) -> impl Iterator<Item = (&UserId, &UserId)> + '_ {
    path.windows(2).filter_map(|pair| match pair {
        [from, to] => Some((from, to)),
        _ => None,
    })
}
