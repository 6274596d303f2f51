//! Fruchterman-Reingold force-directed placement.
//!
//! Every pair of nodes repels with force `k² / d` and every friendship
//! attracts with force `d² / k`, where `k` is the preferred edge length.
//! Each step moves a node along its net force by at most the current
//! temperature, which cools linearly to zero over the configured number of
//! iterations. The simulation is driven one step at a time so callers can
//! stop early; positions are only read, never required to converge.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::{builder::LayoutConfig, graph::FriendshipGraph, model::UserId};

const MIN_DISTANCE: f64 = 0.01;
const INITIAL_TEMPERATURE_FRACTION: f64 = 0.1;

/// A point in the layout plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Final placement of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    /// Node identifier.
    pub user: UserId,
    /// Coordinates rescaled into `[-1, 1]`.
    pub position: Position,
}

/// Incremental force-directed simulation over a [`FriendshipGraph`].
///
/// # Examples
/// ```
/// use tertulia_core::{ForceLayout, FriendshipGraph, LayoutConfig};
///
/// let graph = FriendshipGraph::from_edges([("a", "b"), ("b", "c")]);
/// let mut layout = ForceLayout::new(&graph, &LayoutConfig::default());
/// while layout.step() {}
/// let placed = layout.positions();
/// assert_eq!(placed.len(), 3);
/// assert!(placed.iter().all(|node| node.position.x.abs() <= 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct ForceLayout {
    nodes: Vec<UserId>,
    adjacency: Vec<Vec<usize>>,
    positions: Vec<Position>,
    optimal_distance: f64,
    temperature: f64,
    cooling: f64,
    remaining: usize,
}

impl ForceLayout {
    /// Places every node of `graph` uniformly at random in the unit square,
    /// seeded from `config`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "node and iteration counts are far below 2^52"
    )]
    #[must_use]
    pub fn new(graph: &FriendshipGraph, config: &LayoutConfig) -> Self {
        let nodes: Vec<UserId> = graph.nodes().cloned().collect();
        let slots: std::collections::HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(slot, user)| (user.as_str(), slot))
            .collect();
        let adjacency = nodes
            .iter()
            .map(|user| {
                graph
                    .neighbours(user.as_str())
                    .iter()
                    .filter_map(|friend| slots.get(friend.as_str()).copied())
                    .collect()
            })
            .collect();

        let mut rng = SmallRng::seed_from_u64(config.seed());
        let positions: Vec<Position> = nodes
            .iter()
            .map(|_| Position::new(rng.r#gen::<f64>(), rng.r#gen::<f64>()))
            .collect();

        let optimal_distance = config
            .optimal_distance()
            .unwrap_or_else(|| (1.0 / nodes.len().max(1) as f64).sqrt());
        let iterations = config.iterations().get();
        let temperature = span(&positions) * INITIAL_TEMPERATURE_FRACTION;

        Self {
            nodes,
            adjacency,
            positions,
            optimal_distance,
            temperature,
            cooling: temperature / (iterations as f64 + 1.0),
            remaining: iterations,
        }
    }

    /// Advances the simulation by one iteration.
    ///
    /// Returns `false` once the configured iterations are exhausted, in
    /// which case nothing moves.
    pub fn step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        let displacement = self.displacement();
        for (position, delta) in self.positions.iter_mut().zip(displacement) {
            let length = delta.x.hypot(delta.y).max(MIN_DISTANCE);
            let scale = self.temperature / length;
            position.x += delta.x * scale;
            position.y += delta.y * scale;
        }
        self.temperature -= self.cooling;
        self.remaining -= 1;
        true
    }

    /// Iterations left to run.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Current placement, centred on the origin and scaled so the largest
    /// coordinate magnitude is one.
    #[expect(
        clippy::cast_precision_loss,
        reason = "node counts are far below 2^52"
    )]
    #[must_use]
    pub fn positions(&self) -> Vec<NodePosition> {
        let count = self.positions.len().max(1) as f64;
        let centre = Position::new(
            self.positions.iter().map(|p| p.x).sum::<f64>() / count,
            self.positions.iter().map(|p| p.y).sum::<f64>() / count,
        );
        let extent = self
            .positions
            .iter()
            .map(|p| (p.x - centre.x).abs().max((p.y - centre.y).abs()))
            .fold(0.0_f64, f64::max);
        let scale = if extent > 0.0 { 1.0 / extent } else { 1.0 };

        self.nodes
            .iter()
            .zip(&self.positions)
            .map(|(user, p)| NodePosition {
                user: user.clone(),
                position: Position::new((p.x - centre.x) * scale, (p.y - centre.y) * scale),
            })
            .collect()
    }

    fn displacement(&self) -> Vec<Position> {
        let k = self.optimal_distance;
        let k_squared = k * k;
        let mut displacement = vec![Position::default(); self.positions.len()];
        for (slot, here) in self.positions.iter().enumerate() {
            let total = &mut displacement[slot];
            for (other_slot, there) in self.positions.iter().enumerate() {
                if other_slot == slot {
                    continue;
                }
                let dx = here.x - there.x;
                let dy = here.y - there.y;
                let distance = dx.hypot(dy).max(MIN_DISTANCE);
                let repulsion = k_squared / (distance * distance);
                total.x += dx * repulsion;
                total.y += dy * repulsion;
            }
            for &friend in &self.adjacency[slot] {
                let there = self.positions[friend];
                let dx = here.x - there.x;
                let dy = here.y - there.y;
                let distance = dx.hypot(dy).max(MIN_DISTANCE);
                let attraction = distance / k;
                total.x -= dx * attraction;
                total.y -= dy * attraction;
            }
        }
        displacement
    }
}

fn span(positions: &[Position]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in positions {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if positions.is_empty() {
        return 0.0;
    }
    (max_x - min_x).max(max_y - min_y)
}

/// Runs every iteration of a [`ForceLayout`] and returns the final
/// placement in node insertion order.
///
/// # Examples
/// ```
/// use tertulia_core::{FriendshipGraph, LayoutConfig, layout};
///
/// let graph = FriendshipGraph::from_edges([("a", "b")]);
/// let first = layout(&graph, &LayoutConfig::default());
/// let second = layout(&graph, &LayoutConfig::default());
/// assert_eq!(first, second);
/// ```
#[instrument(
    name = "layout.run",
    skip(graph, config),
    fields(nodes = graph.node_count(), iterations = config.iterations().get()),
)]
#[must_use]
pub fn layout(graph: &FriendshipGraph, config: &LayoutConfig) -> Vec<NodePosition> {
    let mut simulation = ForceLayout::new(graph, config);
    while simulation.step() {}
    debug!("layout finished");
    simulation.positions()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::builder::LayoutBuilder;

    fn position_of<'a>(placed: &'a [NodePosition], user: &str) -> &'a Position {
        &placed
            .iter()
            .find(|node| node.user.as_str() == user)
            .expect("node must be placed")
            .position
    }

    #[test]
    fn empty_graph_has_no_positions() {
        assert!(layout(&FriendshipGraph::new(), &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn single_node_sits_at_origin() {
        let mut graph = FriendshipGraph::new();
        graph.add_node("solo");
        let placed = layout(&graph, &LayoutConfig::default());
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].position, Position::default());
    }

    #[rstest]
    #[case(1)]
    #[case(9)]
    #[case(1234)]
    fn positions_are_rescaled_into_unit_box(#[case] seed: u64) {
        let graph = FriendshipGraph::from_edges([("a", "b"), ("b", "c"), ("c", "a"), ("d", "e")]);
        let config = LayoutBuilder::new().with_seed(seed).build().expect("valid");
        let placed = layout(&graph, &config);
        let extent = placed
            .iter()
            .map(|node| node.position.x.abs().max(node.position.y.abs()))
            .fold(0.0_f64, f64::max);
        assert!((extent - 1.0).abs() < 1e-9, "extent was {extent}");
    }

    #[test]
    fn seeds_change_the_placement() {
        let graph = FriendshipGraph::from_edges([("a", "b"), ("b", "c")]);
        let first = layout(&graph, &LayoutBuilder::new().with_seed(1).build().expect("valid"));
        let second = layout(&graph, &LayoutBuilder::new().with_seed(2).build().expect("valid"));
        assert_ne!(first, second);
    }

    #[test]
    fn path_ends_settle_farthest_apart() {
        let graph = FriendshipGraph::from_edges([("a", "b"), ("b", "c")]);
        let config = LayoutBuilder::new().with_iterations(500).build().expect("valid");
        let placed = layout(&graph, &config);
        let (a, b, c) = (
            *position_of(&placed, "a"),
            *position_of(&placed, "b"),
            *position_of(&placed, "c"),
        );
        assert!(a.distance(c) > a.distance(b));
        assert!(a.distance(c) > b.distance(c));
    }

    #[test]
    fn stepping_stops_after_configured_iterations() {
        let graph = FriendshipGraph::from_edges([("a", "b")]);
        let config = LayoutBuilder::new().with_iterations(3).build().expect("valid");
        let mut simulation = ForceLayout::new(&graph, &config);
        let steps = std::iter::from_fn(|| simulation.step().then_some(())).count();
        assert_eq!(steps, 3);
        assert_eq!(simulation.remaining(), 0);
        let frozen = simulation.positions();
        assert!(!simulation.step());
        assert_eq!(simulation.positions(), frozen);
    }
}
