//! Union-find (disjoint set union) keyed by arbitrary hashable elements.
//!
//! The community registry uses this forest as a derived index over explicit
//! membership listings: every member of a listed community is unioned with
//! the first member, so two users share a representative iff a chain of
//! listings connects them. Elements are interned to dense indices so the
//! parent and rank tables stay contiguous.

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use thiserror::Error;

/// Precondition failures raised by [`DisjointSet`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DisjointSetError {
    /// The element was never registered with [`DisjointSet::make_set`].
    #[error("element `{element}` was never registered in the forest")]
    Unregistered {
        /// Debug rendering of the offending element.
        element: String,
    },
}

/// Disjoint-set forest with path compression and union by rank.
///
/// # Examples
/// ```
/// use tertulia_core::DisjointSet;
///
/// let mut forest = DisjointSet::new();
/// for user in ["a", "b", "c"] {
///     forest.make_set(user);
/// }
/// forest.union(&"a", &"b")?;
/// forest.union(&"b", &"c")?;
/// assert_eq!(forest.find(&"a")?, forest.find(&"c")?);
/// assert_eq!(forest.set_count(), 1);
/// # Ok::<(), tertulia_core::DisjointSetError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DisjointSet<K> {
    index: HashMap<K, usize>,
    elements: Vec<K>,
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl<K> Default for DisjointSet<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            elements: Vec::new(),
            parent: Vec::new(),
            rank: Vec::new(),
            sets: 0,
        }
    }
}

impl<K> DisjointSet<K>
where
    K: Clone + Debug + Eq + Hash,
{
    /// Creates an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `element` as a singleton set with rank zero.
    ///
    /// Returns `false` when the element was already registered, in which
    /// case its set is left untouched.
    pub fn make_set(&mut self, element: K) -> bool {
        if self.index.contains_key(&element) {
            return false;
        }
        let slot = self.elements.len();
        self.index.insert(element.clone(), slot);
        self.elements.push(element);
        self.parent.push(slot);
        self.rank.push(0);
        self.sets += 1;
        true
    }

    /// Returns whether `element` has been registered.
    #[must_use]
    pub fn contains(&self, element: &K) -> bool {
        self.index.contains_key(element)
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns whether no element has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of disjoint sets currently tracked.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Returns the representative of the set containing `element`.
    ///
    /// Every node visited on the way to the root is re-pointed directly at
    /// the root.
    ///
    /// # Errors
    /// Returns [`DisjointSetError::Unregistered`] when `element` was never
    /// passed to [`Self::make_set`].
    pub fn find(&mut self, element: &K) -> Result<K, DisjointSetError> {
        let slot = self.slot(element)?;
        let root = self.find_slot(slot);
        Ok(self.elements[root].clone())
    }

    /// Merges the sets containing `left` and `right`.
    ///
    /// The root with the lower rank is attached beneath the other. On a tie
    /// the root of `left` survives and its rank grows by one. Returns
    /// `false` when both elements already shared a representative.
    ///
    /// # Errors
    /// Returns [`DisjointSetError::Unregistered`] when either element was
    /// never registered.
    pub fn union(&mut self, left: &K, right: &K) -> Result<bool, DisjointSetError> {
        let left_slot = self.slot(left)?;
        let right_slot = self.slot(right)?;
        let mut survivor = self.find_slot(left_slot);
        let mut absorbed = self.find_slot(right_slot);
        if survivor == absorbed {
            return Ok(false);
        }
        let survivor_rank = self.rank[survivor];
        let absorbed_rank = self.rank[absorbed];
        if survivor_rank < absorbed_rank {
            std::mem::swap(&mut survivor, &mut absorbed);
        }
        self.parent[absorbed] = survivor;
        if survivor_rank == absorbed_rank {
            self.rank[survivor] = survivor_rank.saturating_add(1);
        }
        self.sets -= 1;
        Ok(true)
    }

    /// Returns whether both elements are registered and share a
    /// representative. Unregistered elements yield `false`.
    pub fn connected(&mut self, left: &K, right: &K) -> bool {
        match (self.index.get(left).copied(), self.index.get(right).copied()) {
            (Some(left_slot), Some(right_slot)) => {
                self.find_slot(left_slot) == self.find_slot(right_slot)
            }
            _ => false,
        }
    }

    fn slot(&self, element: &K) -> Result<usize, DisjointSetError> {
        self.index
            .get(element)
            .copied()
            .ok_or_else(|| DisjointSetError::Unregistered {
                element: format!("{element:?}"),
            })
    }

    fn find_slot(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    #[cfg(test)]
    fn parent_of(&self, element: &K) -> Option<&K> {
        let slot = *self.index.get(element)?;
        self.elements.get(self.parent[slot])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::test_utils::suite_proptest_config;

    fn forest_of(elements: &[&'static str]) -> DisjointSet<&'static str> {
        let mut forest = DisjointSet::new();
        for element in elements {
            forest.make_set(*element);
        }
        forest
    }

    #[test]
    fn make_set_is_idempotent() {
        let mut forest = forest_of(&["a", "b"]);
        forest.union(&"a", &"b").expect("both registered");
        assert!(!forest.make_set("a"));
        assert_eq!(forest.len(), 2);
        assert!(forest.connected(&"a", &"b"), "re-registering must not split");
    }

    #[test]
    fn find_returns_self_for_singletons() {
        let mut forest = forest_of(&["solo"]);
        assert_eq!(forest.find(&"solo"), Ok("solo"));
        assert_eq!(forest.find(&"solo"), Ok("solo"));
    }

    #[test]
    fn find_rejects_unregistered_elements() {
        let mut forest = forest_of(&["a"]);
        let err = forest.find(&"ghost").expect_err("ghost is unregistered");
        assert!(matches!(err, DisjointSetError::Unregistered { .. }));
        assert!(forest.union(&"a", &"ghost").is_err());
    }

    #[test]
    fn union_on_tie_keeps_left_root() {
        let mut forest = forest_of(&["a", "b"]);
        assert_eq!(forest.union(&"a", &"b"), Ok(true));
        assert_eq!(forest.find(&"b"), Ok("a"));
    }

    #[test]
    fn union_attaches_lower_rank_beneath_higher() {
        let mut forest = forest_of(&["a", "b", "c"]);
        forest.union(&"a", &"b").expect("registered");
        // `c` has rank zero, so it must join `a` even when named first.
        forest.union(&"c", &"a").expect("registered");
        assert_eq!(forest.find(&"c"), Ok("a"));
    }

    #[test]
    fn union_of_same_set_is_a_no_op() {
        let mut forest = forest_of(&["a", "b"]);
        forest.union(&"a", &"b").expect("registered");
        assert_eq!(forest.union(&"b", &"a"), Ok(false));
        assert_eq!(forest.set_count(), 1);
    }

    #[test]
    fn find_compresses_paths() {
        let mut forest = forest_of(&["a", "b", "c", "d"]);
        forest.union(&"a", &"b").expect("registered");
        forest.union(&"c", &"d").expect("registered");
        forest.union(&"a", &"c").expect("registered");
        assert_eq!(forest.parent_of(&"d"), Some(&"c"));
        assert_eq!(forest.find(&"d"), Ok("a"));
        assert_eq!(forest.parent_of(&"d"), Some(&"a"));
    }

    #[rstest]
    #[case(&[("a", "b"), ("b", "c")], &["a", "b", "c"])]
    #[case(&[("c", "b"), ("a", "b")], &["a", "b", "c"])]
    #[case(&[("a", "b"), ("c", "d"), ("d", "a")], &["a", "b", "c", "d"])]
    fn chained_unions_share_a_representative(
        #[case] unions: &[(&'static str, &'static str)],
        #[case] members: &[&'static str],
    ) {
        let mut forest = forest_of(&["a", "b", "c", "d"]);
        for (left, right) in unions {
            forest.union(left, right).expect("registered");
        }
        let root = forest.find(&members[0]).expect("registered");
        for member in members {
            assert_eq!(forest.find(member), Ok(root));
        }
    }

    #[test]
    fn connected_is_false_for_unregistered() {
        let mut forest = forest_of(&["a"]);
        assert!(!forest.connected(&"a", &"ghost"));
        assert!(!forest.connected(&"ghost", &"ghost"));
        assert!(forest.connected(&"a", &"a"));
    }

    fn naive_components(size: usize, unions: &[(usize, usize)]) -> Vec<usize> {
        let mut label: Vec<usize> = (0..size).collect();
        for &(left, right) in unions {
            let (from, to) = (label[right], label[left]);
            for value in &mut label {
                if *value == from {
                    *value = to;
                }
            }
        }
        label
    }

    proptest! {
        #![proptest_config(suite_proptest_config(128))]

        #[test]
        fn agrees_with_naive_relabelling(
            size in 1_usize..24,
            raw_unions in proptest::collection::vec((0_usize..24, 0_usize..24), 0..40),
        ) {
            let unions: Vec<(usize, usize)> = raw_unions
                .into_iter()
                .map(|(left, right)| (left % size, right % size))
                .collect();
            let mut forest = DisjointSet::new();
            for element in 0..size {
                forest.make_set(element);
            }
            for (left, right) in &unions {
                forest.union(left, right).expect("registered");
            }
            let labels = naive_components(size, &unions);
            for left in 0..size {
                for right in 0..size {
                    let expected = labels[left] == labels[right];
                    prop_assert_eq!(forest.connected(&left, &right), expected);
                }
            }
            let distinct: std::collections::HashSet<usize> = labels.into_iter().collect();
            prop_assert_eq!(forest.set_count(), distinct.len());
        }
    }
}
