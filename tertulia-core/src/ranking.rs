//! Popularity ranking of posts by like count.
//!
//! Both routines divide the input at its midpoint and recurse, so the stack
//! depth grows with the logarithm of the input length, never linearly.

use std::collections::BTreeMap;

use crate::model::{Like, PostId};

/// A post paired with the number of likes it received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostLikes {
    /// Post identifier.
    pub post: PostId,
    /// Number of likes.
    pub likes: usize,
}

impl PostLikes {
    /// Pairs `post` with `likes`.
    #[must_use]
    pub const fn new(post: PostId, likes: usize) -> Self {
        Self { post, likes }
    }
}

/// Counts likes per post, keyed in ascending post order.
///
/// # Examples
/// ```
/// use tertulia_core::{Like, PostId, count_likes_by_post};
///
/// let likes = [
///     Like::from_fields(Some("1"), Some("a"), Some("7")).expect("valid"),
///     Like::from_fields(Some("2"), Some("b"), Some("7")).expect("valid"),
/// ];
/// assert_eq!(count_likes_by_post(&likes).get(&PostId::new(7)), Some(&2));
/// ```
#[must_use]
pub fn count_likes_by_post(likes: &[Like]) -> BTreeMap<PostId, usize> {
    let mut counts = BTreeMap::new();
    for like in likes {
        *counts.entry(like.post).or_insert(0) += 1;
    }
    counts
}

/// Returns the entry with the most likes; the leftmost wins ties.
///
/// # Examples
/// ```
/// use tertulia_core::{PostId, PostLikes, max_by_likes};
///
/// let items = [
///     PostLikes::new(PostId::new(1), 5),
///     PostLikes::new(PostId::new(2), 9),
///     PostLikes::new(PostId::new(3), 3),
/// ];
/// assert_eq!(max_by_likes(&items), Some(PostLikes::new(PostId::new(2), 9)));
/// assert_eq!(max_by_likes(&[]), None);
/// ```
#[must_use]
pub fn max_by_likes(items: &[PostLikes]) -> Option<PostLikes> {
    match items {
        [] => None,
        [only] => Some(*only),
        _ => {
            let (left, right) = items.split_at(items.len() / 2);
            let best_left = max_by_likes(left)?;
            let best_right = max_by_likes(right)?;
            if best_right.likes > best_left.likes {
                Some(best_right)
            } else {
                Some(best_left)
            }
        }
    }
}

/// Merge sort into descending like order, stable with respect to the input.
///
/// # Examples
/// ```
/// use tertulia_core::{PostId, PostLikes, sort_by_likes_desc};
///
/// let sorted = sort_by_likes_desc(&[
///     PostLikes::new(PostId::new(1), 5),
///     PostLikes::new(PostId::new(2), 9),
///     PostLikes::new(PostId::new(3), 9),
/// ]);
/// let order: Vec<u64> = sorted.iter().map(|entry| entry.post.get()).collect();
/// assert_eq!(order, [2, 3, 1]);
/// ```
#[must_use]
pub fn sort_by_likes_desc(items: &[PostLikes]) -> Vec<PostLikes> {
    if items.len() <= 1 {
        return items.to_vec();
    }
    let (left, right) = items.split_at(items.len() / 2);
    merge_desc(&sort_by_likes_desc(left), &sort_by_likes_desc(right))
}

fn merge_desc(left: &[PostLikes], right: &[PostLikes]) -> Vec<PostLikes> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left_iter = left.iter().peekable();
    let mut right_iter = right.iter().peekable();
    while let (Some(l), Some(r)) = (left_iter.peek(), right_iter.peek()) {
        if l.likes >= r.likes {
            merged.push(**l);
            left_iter.next();
        } else {
            merged.push(**r);
            right_iter.next();
        }
    }
    merged.extend(left_iter);
    merged.extend(right_iter);
    merged
}

/// Counts likes per post and returns the `k` most liked posts.
///
/// Posts with equal counts keep ascending post order. Fewer than `k`
/// entries are returned when fewer posts have likes.
///
/// # Examples
/// ```
/// use tertulia_core::{Like, top_k};
///
/// let likes: Vec<Like> = [("1", "a", "4"), ("2", "b", "4"), ("3", "a", "5")]
///     .into_iter()
///     .filter_map(|(id, user, post)| Like::from_fields(Some(id), Some(user), Some(post)))
///     .collect();
/// let top = top_k(&likes, 5);
/// assert_eq!(top.len(), 2);
/// assert_eq!(top[0].post.get(), 4);
/// assert_eq!(top[0].likes, 2);
/// ```
#[must_use]
pub fn top_k(likes: &[Like], k: usize) -> Vec<PostLikes> {
    let counted: Vec<PostLikes> = count_likes_by_post(likes)
        .into_iter()
        .map(|(post, count)| PostLikes::new(post, count))
        .collect();
    let mut ranked = sort_by_likes_desc(&counted);
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::{model::UserId, test_utils::suite_proptest_config};

    fn entries(raw: &[(u64, usize)]) -> Vec<PostLikes> {
        raw.iter()
            .map(|&(post, likes)| PostLikes::new(PostId::new(post), likes))
            .collect()
    }

    fn like(id: u64, user: &str, post: u64) -> Like {
        Like {
            id: crate::model::LikeId::new(id),
            user: UserId::new(user),
            post: PostId::new(post),
        }
    }

    #[rstest]
    #[case(&[(1, 5), (2, 9), (3, 3)], Some((2, 9)))]
    #[case(&[(1, 4)], Some((1, 4)))]
    #[case(&[(1, 4), (2, 4)], Some((1, 4)))]
    #[case(&[(1, 1), (2, 7), (3, 7), (4, 2)], Some((2, 7)))]
    #[case(&[], None)]
    fn max_by_likes_prefers_leftmost(
        #[case] raw: &[(u64, usize)],
        #[case] expected: Option<(u64, usize)>,
    ) {
        let best = max_by_likes(&entries(raw)).map(|entry| (entry.post.get(), entry.likes));
        assert_eq!(best, expected);
    }

    #[rstest]
    #[case(&[(1, 5), (2, 9), (3, 9)], &[(2, 9), (3, 9), (1, 5)])]
    #[case(&[(3, 1), (1, 1), (2, 1)], &[(3, 1), (1, 1), (2, 1)])]
    #[case(&[], &[])]
    #[case(&[(8, 0)], &[(8, 0)])]
    fn sort_is_descending_and_left_biased(
        #[case] raw: &[(u64, usize)],
        #[case] expected: &[(u64, usize)],
    ) {
        assert_eq!(sort_by_likes_desc(&entries(raw)), entries(expected));
    }

    #[test]
    fn top_k_counts_and_truncates() {
        let likes = [like(1, "a", 10), like(2, "b", 11), like(3, "c", 11), like(4, "a", 12)];
        let top = top_k(&likes, 2);
        assert_eq!(top, entries(&[(11, 2), (10, 1)]));
        assert!(top_k(&likes, 0).is_empty());
        assert!(top_k(&[], 3).is_empty());
    }

    proptest! {
        #![proptest_config(suite_proptest_config(128))]

        #[test]
        fn sort_matches_stable_std_sort(raw in proptest::collection::vec((0_u64..50, 0_usize..8), 0..64)) {
            let items = entries(&raw);
            let mut expected = items.clone();
            expected.sort_by(|left, right| right.likes.cmp(&left.likes));
            prop_assert_eq!(sort_by_likes_desc(&items), expected.clone());
            prop_assert_eq!(max_by_likes(&items), expected.first().copied());
        }
    }
}
