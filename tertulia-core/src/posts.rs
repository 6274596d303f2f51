//! Posts and likes with sequential identifiers.

use std::collections::HashSet;

use tracing::{Span, field, info, instrument, warn};

use crate::{
    error::{InvalidInput, Result, TertuliaError},
    model::{Like, LikeId, Post, PostId, UserId},
    store::TableStore,
};

/// Post and like tables held in memory.
///
/// Each mutation rewrites the affected table through a [`TableStore`]
/// before it is applied, so a failed write leaves the store untouched.
///
/// # Examples
/// ```
/// use tertulia_core::{MemoryStore, PostStore, TertuliaError, UserId};
///
/// let mut store = MemoryStore::new();
/// let mut posts = PostStore::default();
/// let ana = UserId::new("ana");
/// let post = posts.create_post(&ana, "hola", &mut store)?;
/// posts.register_like(&ana, post, &mut store)?;
/// let again = posts.register_like(&ana, post, &mut store);
/// assert!(matches!(again, Err(TertuliaError::DuplicateLike { .. })));
/// assert_eq!(posts.likes().len(), 1);
/// # Ok::<(), TertuliaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostStore {
    posts: Vec<Post>,
    likes: Vec<Like>,
    liked: HashSet<(UserId, PostId)>,
}

impl PostStore {
    /// Builds the store from loaded tables.
    ///
    /// Rows are kept as stored; a repeated `(user, post)` like is logged and
    /// still counted, since it already exists in the table.
    #[must_use]
    pub fn from_records(posts: Vec<Post>, likes: Vec<Like>) -> Self {
        let mut liked = HashSet::with_capacity(likes.len());
        for like in &likes {
            if !liked.insert((like.user.clone(), like.post)) {
                warn!(user = %like.user, post = %like.post, "stored like is a duplicate");
            }
        }
        Self {
            posts,
            likes,
            liked,
        }
    }

    /// Appends a post by `author` and returns its identifier.
    ///
    /// The identifier is one greater than the largest existing post
    /// identifier, or `1` for an empty store. Content is trimmed.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyContent`] for blank content and
    /// [`TertuliaError::Storage`] when the post table cannot be written.
    #[instrument(
        name = "posts.create",
        err,
        skip(self, content, store),
        fields(author = %author, post = field::Empty),
    )]
    pub fn create_post<S: TableStore + ?Sized>(
        &mut self,
        author: &UserId,
        content: &str,
        store: &mut S,
    ) -> Result<PostId> {
        let content = content.trim();
        if content.is_empty() {
            return Err(InvalidInput::EmptyContent.into());
        }
        let post = Post {
            id: PostId::next_after(self.posts.iter().map(|post| post.id)),
            author: author.clone(),
            content: content.to_owned(),
        };
        let id = post.id;

        let mut rows = self.posts.clone();
        rows.push(post);
        store.write_posts(&rows)?;
        self.posts = rows;

        Span::current().record("post", id.get());
        info!("post created");
        Ok(id)
    }

    /// Records that `user` likes `post` and returns the like identifier.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownPost`] when `post` does not exist,
    /// [`TertuliaError::DuplicateLike`] when `user` already liked it, and
    /// [`TertuliaError::Storage`] when the like table cannot be written.
    #[instrument(
        name = "posts.like",
        err,
        skip(self, store),
        fields(user = %user, post = %post, like = field::Empty),
    )]
    pub fn register_like<S: TableStore + ?Sized>(
        &mut self,
        user: &UserId,
        post: PostId,
        store: &mut S,
    ) -> Result<LikeId> {
        if self.post(post).is_none() {
            return Err(InvalidInput::UnknownPost { post }.into());
        }
        let key = (user.clone(), post);
        if self.liked.contains(&key) {
            return Err(TertuliaError::DuplicateLike {
                user: user.clone(),
                post,
            });
        }
        let like = Like {
            id: LikeId::next_after(self.likes.iter().map(|like| like.id)),
            user: user.clone(),
            post,
        };
        let id = like.id;

        let mut rows = self.likes.clone();
        rows.push(like);
        store.write_likes(&rows)?;
        self.likes = rows;
        self.liked.insert(key);

        Span::current().record("like", id.get());
        info!("like registered");
        Ok(id)
    }

    /// Returns the post with identifier `id`.
    #[must_use]
    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Posts written by `author`, in creation order.
    pub fn posts_by<'a>(&'a self, author: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts
            .iter()
            .filter(move |post| post.author.as_str() == author)
    }

    /// Whether `user` has liked `post`.
    #[must_use]
    pub fn has_liked(&self, user: &UserId, post: PostId) -> bool {
        self.liked.contains(&(user.clone(), post))
    }

    /// Every post in table order.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Every like in table order.
    #[must_use]
    pub fn likes(&self) -> &[Like] {
        &self.likes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    use crate::{
        error::StorageError,
        model::User,
        store::{CommunityRecord, FriendshipRecord, MemoryStore, Table},
    };

    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_posts: bool,
        fail_likes: bool,
    }

    impl TableStore for FlakyStore {
        fn read_users(&self) -> std::result::Result<Vec<User>, StorageError> {
            self.inner.read_users()
        }

        fn read_friendships(&self) -> std::result::Result<Vec<FriendshipRecord>, StorageError> {
            self.inner.read_friendships()
        }

        fn read_communities(&self) -> std::result::Result<Vec<CommunityRecord>, StorageError> {
            self.inner.read_communities()
        }

        fn read_posts(&self) -> std::result::Result<Vec<Post>, StorageError> {
            self.inner.read_posts()
        }

        fn read_likes(&self) -> std::result::Result<Vec<Like>, StorageError> {
            self.inner.read_likes()
        }

        fn write_communities(
            &mut self,
            rows: &[CommunityRecord],
        ) -> std::result::Result<(), StorageError> {
            self.inner.write_communities(rows)
        }

        fn write_posts(&mut self, rows: &[Post]) -> std::result::Result<(), StorageError> {
            if self.fail_posts {
                return Err(StorageError::backend(Table::Posts, "disk full"));
            }
            self.inner.write_posts(rows)
        }

        fn write_likes(&mut self, rows: &[Like]) -> std::result::Result<(), StorageError> {
            if self.fail_likes {
                return Err(StorageError::backend(Table::Likes, "disk full"));
            }
            self.inner.write_likes(rows)
        }
    }

    #[fixture]
    fn seeded() -> PostStore {
        PostStore::from_records(
            vec![
                Post {
                    id: PostId::new(3),
                    author: UserId::new("ana"),
                    content: "first".to_owned(),
                },
                Post {
                    id: PostId::new(7),
                    author: UserId::new("beto"),
                    content: "second".to_owned(),
                },
            ],
            vec![Like {
                id: LikeId::new(2),
                user: UserId::new("beto"),
                post: PostId::new(3),
            }],
        )
    }

    #[rstest]
    fn identifiers_follow_the_largest_existing(mut seeded: PostStore) {
        let mut store = MemoryStore::new();
        let ana = UserId::new("ana");
        let post = seeded.create_post(&ana, "  third  ", &mut store).expect("create");
        assert_eq!(post, PostId::new(8));
        assert_eq!(seeded.post(post).map(|p| p.content.as_str()), Some("third"));
        let like = seeded.register_like(&ana, post, &mut store).expect("like");
        assert_eq!(like, LikeId::new(3));
        assert_eq!(store.read_posts().expect("written").len(), 3);
        assert_eq!(store.read_likes().expect("written").len(), 2);
    }

    #[test]
    fn empty_store_starts_at_one() {
        let mut posts = PostStore::default();
        let mut store = MemoryStore::new();
        let author = UserId::new("a");
        let id = posts.create_post(&author, "hi", &mut store).expect("create");
        assert_eq!(id, PostId::new(1));
        assert_eq!(posts.register_like(&author, id, &mut store), Ok(LikeId::new(1)));
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace(" \t ")]
    fn blank_content_is_rejected(mut seeded: PostStore, #[case] content: &str) {
        let mut store = MemoryStore::new();
        let err = seeded
            .create_post(&UserId::new("ana"), content, &mut store)
            .expect_err("blank content");
        assert_eq!(err, TertuliaError::InvalidInput(InvalidInput::EmptyContent));
        assert_eq!(store.write_count(Table::Posts), 0);
    }

    #[rstest]
    fn duplicate_like_is_rejected_once_counted(mut seeded: PostStore) {
        let mut store = MemoryStore::new();
        let beto = UserId::new("beto");
        let err = seeded
            .register_like(&beto, PostId::new(3), &mut store)
            .expect_err("beto already liked post 3");
        assert_eq!(
            err,
            TertuliaError::DuplicateLike {
                user: beto.clone(),
                post: PostId::new(3),
            }
        );
        let count = seeded.likes().iter().filter(|like| like.post == PostId::new(3)).count();
        assert_eq!(count, 1);
        assert_eq!(store.write_count(Table::Likes), 0);
    }

    #[rstest]
    fn likes_on_unknown_posts_are_rejected(mut seeded: PostStore) {
        let err = seeded
            .register_like(&UserId::new("ana"), PostId::new(99), &mut MemoryStore::new())
            .expect_err("post 99 does not exist");
        assert_eq!(err.code().as_str(), "TERTULIA_INVALID_INPUT");
    }

    #[rstest]
    fn failed_post_write_keeps_memory_unchanged(mut seeded: PostStore) {
        let mut store = FlakyStore {
            fail_posts: true,
            ..FlakyStore::default()
        };
        let err = seeded
            .create_post(&UserId::new("ana"), "lost", &mut store)
            .expect_err("write fails");
        assert!(matches!(err, TertuliaError::Storage(_)));
        assert_eq!(seeded.posts().len(), 2);
    }

    #[rstest]
    fn failed_like_write_keeps_memory_unchanged(mut seeded: PostStore) {
        let mut store = FlakyStore {
            fail_likes: true,
            ..FlakyStore::default()
        };
        let ana = UserId::new("ana");
        seeded
            .register_like(&ana, PostId::new(7), &mut store)
            .expect_err("write fails");
        assert_eq!(seeded.likes().len(), 1);
        assert!(!seeded.has_liked(&ana, PostId::new(7)));
        store.fail_likes = false;
        assert_eq!(
            seeded.register_like(&ana, PostId::new(7), &mut store),
            Ok(LikeId::new(3))
        );
    }

    #[rstest]
    fn posts_by_filters_on_author(seeded: PostStore) {
        let ids: Vec<u64> = seeded.posts_by("beto").map(|post| post.id.get()).collect();
        assert_eq!(ids, [7]);
        assert_eq!(seeded.posts_by("nobody").count(), 0);
    }
}
