//! Tabular persistence seam.
//!
//! The core never touches files. Everything it loads at startup and rewrites
//! after a mutation flows through [`TableStore`], whose rows are the typed
//! records defined here. Backends read raw text fields and hand them to the
//! `from_fields` constructors, which apply the shared trimming and skipping
//! rules: a row whose key field is missing, blank, or (for numeric keys)
//! unparsable is dropped.

use std::{collections::HashMap, fmt};

use crate::{
    error::StorageError,
    model::{CommunityId, Like, LikeId, Post, PostId, User, UserId},
};

/// Tables exchanged with a [`TableStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// `(id, name, post)` rows; mandatory.
    Users,
    /// `(id1, id2)` rows; mandatory.
    Friendships,
    /// `(community_id, community_name, user_id)` rows; optional.
    Communities,
    /// `(post_id, author_id, content)` rows; optional.
    Posts,
    /// `(like_id, user_id, post_id)` rows; optional.
    Likes,
}

impl Table {
    /// Every table in load order.
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::Friendships,
        Self::Communities,
        Self::Posts,
        Self::Likes,
    ];

    /// Stable lowercase name, used for file stems and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Friendships => "friendships",
            Self::Communities => "communities",
            Self::Posts => "posts",
            Self::Likes => "likes",
        }
    }

    /// Whether a session can start without this table.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::Table;
    ///
    /// assert!(Table::Users.is_mandatory());
    /// assert!(!Table::Likes.is_mandatory());
    /// ```
    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        matches!(self, Self::Users | Self::Friendships)
    }

    /// Column names in storage order.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["id", "name", "post"],
            Self::Friendships => &["id1", "id2"],
            Self::Communities => &["community_id", "community_name", "user_id"],
            Self::Posts => &["post_id", "author_id", "content"],
            Self::Likes => &["like_id", "user_id", "post_id"],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One undirected friendship as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendshipRecord {
    /// First endpoint.
    pub left: UserId,
    /// Second endpoint.
    pub right: UserId,
}

/// One `(community, member)` listing as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityRecord {
    /// Community the member belongs to.
    pub community: CommunityId,
    /// Community name; may be blank on all but one row.
    pub name: String,
    /// Listed member.
    pub user: UserId,
}

fn key(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn numeric(raw: Option<&str>) -> Option<u64> {
    key(raw)?.parse().ok()
}

fn text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_owned()
}

impl User {
    /// Builds a user from raw `(id, name, post)` fields.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::User;
    ///
    /// let user = User::from_fields(Some(" 7 "), Some(" Ana "), None).expect("valid row");
    /// assert_eq!(user.id.as_str(), "7");
    /// assert_eq!(user.name, "Ana");
    /// assert!(User::from_fields(None, Some("ghost"), None).is_none());
    /// ```
    #[must_use]
    pub fn from_fields(id: Option<&str>, name: Option<&str>, post: Option<&str>) -> Option<Self> {
        let id = key(id)?;
        Some(Self {
            id: UserId::new(id),
            name: text(name),
            legacy_post: key(post).map(ToOwned::to_owned),
        })
    }
}

impl FriendshipRecord {
    /// Builds a friendship from raw `(id1, id2)` fields.
    #[must_use]
    pub fn from_fields(left: Option<&str>, right: Option<&str>) -> Option<Self> {
        Some(Self {
            left: UserId::new(key(left)?),
            right: UserId::new(key(right)?),
        })
    }
}

impl CommunityRecord {
    /// Builds a listing from raw `(community_id, community_name, user_id)`
    /// fields.
    #[must_use]
    pub fn from_fields(
        community: Option<&str>,
        name: Option<&str>,
        user: Option<&str>,
    ) -> Option<Self> {
        Some(Self {
            community: CommunityId::new(numeric(community)?),
            name: text(name),
            user: UserId::new(key(user)?),
        })
    }
}

impl Post {
    /// Builds a post from raw `(post_id, author_id, content)` fields.
    #[must_use]
    pub fn from_fields(id: Option<&str>, author: Option<&str>, content: Option<&str>) -> Option<Self> {
        Some(Self {
            id: PostId::new(numeric(id)?),
            author: UserId::new(key(author)?),
            content: text(content),
        })
    }
}

impl Like {
    /// Builds a like from raw `(like_id, user_id, post_id)` fields.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::Like;
    ///
    /// let like = Like::from_fields(Some("3"), Some("u1"), Some(" 9 ")).expect("valid row");
    /// assert_eq!(like.post.get(), 9);
    /// assert!(Like::from_fields(Some("x"), Some("u1"), Some("9")).is_none());
    /// ```
    #[must_use]
    pub fn from_fields(id: Option<&str>, user: Option<&str>, post: Option<&str>) -> Option<Self> {
        Some(Self {
            id: LikeId::new(numeric(id)?),
            user: UserId::new(key(user)?),
            post: PostId::new(numeric(post)?),
        })
    }
}

/// Backing storage for the five tables.
///
/// Reads return [`StorageError::Missing`] when a table does not exist; the
/// session decides whether that is fatal. Writes replace the whole table and
/// must not expose a partially written table to later reads.
pub trait TableStore {
    /// Reads the user table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table is missing or unreadable.
    fn read_users(&self) -> Result<Vec<User>, StorageError>;

    /// Reads the friendship table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table is missing or unreadable.
    fn read_friendships(&self) -> Result<Vec<FriendshipRecord>, StorageError>;

    /// Reads the community table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table is missing or unreadable.
    fn read_communities(&self) -> Result<Vec<CommunityRecord>, StorageError>;

    /// Reads the post table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table is missing or unreadable.
    fn read_posts(&self) -> Result<Vec<Post>, StorageError>;

    /// Reads the like table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table is missing or unreadable.
    fn read_likes(&self) -> Result<Vec<Like>, StorageError>;

    /// Replaces the community table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table cannot be written.
    fn write_communities(&mut self, rows: &[CommunityRecord]) -> Result<(), StorageError>;

    /// Replaces the post table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table cannot be written.
    fn write_posts(&mut self, rows: &[Post]) -> Result<(), StorageError>;

    /// Replaces the like table.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the table cannot be written.
    fn write_likes(&mut self, rows: &[Like]) -> Result<(), StorageError>;
}

/// In-memory [`TableStore`], useful for embedding and tests.
///
/// Tables that were never set read as [`StorageError::Missing`].
///
/// # Examples
/// ```
/// use tertulia_core::{MemoryStore, TableStore, User};
///
/// let store = MemoryStore::new().with_users(vec![
///     User::from_fields(Some("1"), Some("Ana"), None).expect("valid row"),
/// ]);
/// assert_eq!(store.read_users()?.len(), 1);
/// assert!(store.read_likes().is_err());
/// # Ok::<(), tertulia_core::StorageError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Option<Vec<User>>,
    friendships: Option<Vec<FriendshipRecord>>,
    communities: Option<Vec<CommunityRecord>>,
    posts: Option<Vec<Post>>,
    likes: Option<Vec<Like>>,
    writes: HashMap<Table, usize>,
}

impl MemoryStore {
    /// Creates a store with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user table.
    #[must_use]
    pub fn with_users(mut self, rows: Vec<User>) -> Self {
        self.users = Some(rows);
        self
    }

    /// Sets the friendship table.
    #[must_use]
    pub fn with_friendships(mut self, rows: Vec<FriendshipRecord>) -> Self {
        self.friendships = Some(rows);
        self
    }

    /// Sets the community table.
    #[must_use]
    pub fn with_communities(mut self, rows: Vec<CommunityRecord>) -> Self {
        self.communities = Some(rows);
        self
    }

    /// Sets the post table.
    #[must_use]
    pub fn with_posts(mut self, rows: Vec<Post>) -> Self {
        self.posts = Some(rows);
        self
    }

    /// Sets the like table.
    #[must_use]
    pub fn with_likes(mut self, rows: Vec<Like>) -> Self {
        self.likes = Some(rows);
        self
    }

    /// Number of times `table` has been rewritten.
    #[must_use]
    pub fn write_count(&self, table: Table) -> usize {
        self.writes.get(&table).copied().unwrap_or(0)
    }

    fn record_write(&mut self, table: Table) {
        *self.writes.entry(table).or_insert(0) += 1;
    }
}

fn present<T: Clone>(table: Table, rows: Option<&Vec<T>>) -> Result<Vec<T>, StorageError> {
    rows.cloned().ok_or(StorageError::Missing { table })
}

impl TableStore for MemoryStore {
    fn read_users(&self) -> Result<Vec<User>, StorageError> {
        present(Table::Users, self.users.as_ref())
    }

    fn read_friendships(&self) -> Result<Vec<FriendshipRecord>, StorageError> {
        present(Table::Friendships, self.friendships.as_ref())
    }

    fn read_communities(&self) -> Result<Vec<CommunityRecord>, StorageError> {
        present(Table::Communities, self.communities.as_ref())
    }

    fn read_posts(&self) -> Result<Vec<Post>, StorageError> {
        present(Table::Posts, self.posts.as_ref())
    }

    fn read_likes(&self) -> Result<Vec<Like>, StorageError> {
        present(Table::Likes, self.likes.as_ref())
    }

    fn write_communities(&mut self, rows: &[CommunityRecord]) -> Result<(), StorageError> {
        self.communities = Some(rows.to_vec());
        self.record_write(Table::Communities);
        Ok(())
    }

    fn write_posts(&mut self, rows: &[Post]) -> Result<(), StorageError> {
        self.posts = Some(rows.to_vec());
        self.record_write(Table::Posts);
        Ok(())
    }

    fn write_likes(&mut self, rows: &[Like]) -> Result<(), StorageError> {
        self.likes = Some(rows.to_vec());
        self.record_write(Table::Likes);
        Ok(())
    }
}
