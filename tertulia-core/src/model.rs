//! Typed records for the entities of the social network.
//!
//! Identifiers are newtypes so a post identifier cannot be passed where a
//! like identifier is expected. User identifiers are externally assigned
//! text; every other identifier is a sequential integer owned by its store.

use std::{borrow::Borrow, fmt, sync::Arc};

/// Externally assigned identifier of a user.
///
/// Backed by an [`Arc<str>`] so the many copies held by the graph, the
/// registry and the forest share one allocation.
///
/// # Examples
/// ```
/// use tertulia_core::UserId;
///
/// let id = UserId::new(" u1 ");
/// assert_eq!(id.as_str(), "u1");
/// assert_eq!(id, UserId::from("u1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Arc<str>);

impl UserId {
    /// Creates an identifier, trimming surrounding whitespace.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw.trim()))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl Borrow<str> for UserId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            #[rustfmt::skip]
            #[must_use]
            pub const fn new(id: u64) -> Self { Self(id) }

            /// Returns the underlying numeric identifier.
            #[rustfmt::skip]
            #[must_use]
            pub const fn get(self) -> u64 { self.0 }

            /// Returns the identifier that follows the largest of `existing`,
            /// or `1` when `existing` is empty.
            #[must_use]
            pub fn next_after(existing: impl IntoIterator<Item = Self>) -> Self {
                let max = existing.into_iter().map(Self::get).max().unwrap_or(0);
                Self(max.saturating_add(1))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequential_id! {
    /// Identifier assigned to a post by the [`crate::PostStore`].
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::PostId;
    ///
    /// assert_eq!(PostId::next_after([]), PostId::new(1));
    /// assert_eq!(PostId::next_after([PostId::new(4), PostId::new(2)]).get(), 5);
    /// ```
    PostId
}

sequential_id! {
    /// Identifier assigned to a like by the [`crate::PostStore`].
    LikeId
}

sequential_id! {
    /// Identifier assigned to a community by the [`crate::CommunityRegistry`].
    CommunityId
}

/// A member of the network as listed in the user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name, possibly empty.
    pub name: String,
    /// Free-text post stored alongside the user row by older datasets.
    pub legacy_post: Option<String>,
}

/// A post authored by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Sequential identifier.
    pub id: PostId,
    /// Author of the post.
    pub author: UserId,
    /// Text content.
    pub content: String,
}

/// A like registered by a user against a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    /// Sequential identifier.
    pub id: LikeId,
    /// User who liked the post.
    pub user: UserId,
    /// Post that was liked.
    pub post: PostId,
}

/// A named group of users listed in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    /// Sequential identifier.
    pub id: CommunityId,
    /// Display name.
    pub name: String,
    /// Members in listing order.
    pub members: Vec<UserId>,
}

impl Community {
    /// Name used when a stored community has no name.
    #[must_use]
    pub fn fallback_name(id: CommunityId) -> String {
        format!("Community {id}")
    }
}
