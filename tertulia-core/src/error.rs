//! Error types for the Tertulia core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{
    disjoint_set::DisjointSetError,
    model::{PostId, UserId},
    store::Table,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by a [`crate::TableStore`] implementation.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StorageError {
    /// The requested table does not exist in the backing storage.
    #[error("table `{table}` is missing")]
    Missing {
        /// Table that could not be found.
        table: Table,
    },
    /// The storage backend failed while reading or writing a table.
    #[error("table `{table}` backend failure: {message}")]
    Backend {
        /// Table being accessed when the failure occurred.
        table: Table,
        /// Rendered backend error.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`StorageError`] variants.
    enum StorageErrorCode for StorageError {
        /// The requested table does not exist in the backing storage.
        Missing => Missing { .. } => "STORAGE_MISSING_TABLE",
        /// The storage backend failed while reading or writing a table.
        Backend => Backend { .. } => "STORAGE_BACKEND_FAILURE",
    }
}

impl StorageError {
    /// Wraps a backend error raised while accessing `table`.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::{StorageError, Table};
    ///
    /// let err = StorageError::backend(Table::Posts, "disk full");
    /// assert_eq!(err.to_string(), "table `posts` backend failure: disk full");
    /// ```
    #[must_use]
    pub fn backend(table: Table, error: impl fmt::Display) -> Self {
        Self::Backend {
            table,
            message: Arc::from(error.to_string()),
        }
    }

    /// Returns `true` when the error reports an absent table.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Caller-supplied input that the core refuses to act on.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InvalidInput {
    /// A community must list at least one member.
    #[error("a community must include at least one user")]
    EmptyMembers,
    /// A community name must contain visible characters.
    #[error("a community name must not be blank")]
    EmptyName,
    /// A post must contain visible characters.
    #[error("a post must not be blank")]
    EmptyContent,
    /// The referenced user is not part of the session.
    #[error("unknown user `{user}`")]
    UnknownUser {
        /// Identifier that failed to resolve.
        user: UserId,
    },
    /// The referenced post does not exist.
    #[error("unknown post {post}")]
    UnknownPost {
        /// Identifier that failed to resolve.
        post: PostId,
    },
}

/// Rejected tuning parameters for a [`crate::Session`] or its layout.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// The number of top-degree nodes reported by statistics must be positive.
    #[error("top degree count must be at least 1 (got {got})")]
    TopDegreeCount {
        /// Requested count.
        got: usize,
    },
    /// A layout must run at least one iteration.
    #[error("layout iterations must be at least 1")]
    LayoutIterations,
    /// The optimal node distance must be finite and positive.
    #[error("optimal distance must be finite and positive (got {got})")]
    OptimalDistance {
        /// Rendered requested distance.
        got: Arc<str>,
    },
}

/// Error type produced by [`crate::Session`] and the stores it owns.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TertuliaError {
    /// A mandatory table was absent when the session loaded.
    #[error("mandatory table `{table}` is missing")]
    MissingTable {
        /// Table that could not be found.
        table: Table,
    },
    /// The request was rejected before touching any state.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    /// The user already liked the post.
    #[error("user `{user}` already liked post {post}")]
    DuplicateLike {
        /// User who attempted to like the post again.
        user: UserId,
        /// Post that was already liked.
        post: PostId,
    },
    /// Session or layout configuration failed validation.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// A disjoint-set operation referenced an unregistered element.
    #[error(transparent)]
    Forest(#[from] DisjointSetError),
    /// Persisting or loading a table failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

define_error_codes! {
    /// Stable codes describing [`TertuliaError`] variants.
    enum TertuliaErrorCode for TertuliaError {
        /// A mandatory table was absent when the session loaded.
        MissingTable => MissingTable { .. } => "TERTULIA_MISSING_TABLE",
        /// The request was rejected before touching any state.
        InvalidInput => InvalidInput(..) => "TERTULIA_INVALID_INPUT",
        /// The user already liked the post.
        DuplicateLike => DuplicateLike { .. } => "TERTULIA_DUPLICATE_LIKE",
        /// Session or layout configuration failed validation.
        InvalidConfig => InvalidConfig(..) => "TERTULIA_INVALID_CONFIG",
        /// A disjoint-set operation referenced an unregistered element.
        PreconditionViolation => Forest(..) => "TERTULIA_PRECONDITION_VIOLATION",
        /// Persisting or loading a table failed.
        StorageFailure => Storage(..) => "TERTULIA_STORAGE_FAILURE",
    }
}

impl TertuliaError {
    /// Retrieve the inner [`StorageErrorCode`] when the error originated in a
    /// [`crate::TableStore`].
    pub const fn storage_code(&self) -> Option<StorageErrorCode> {
        match self {
            Self::Storage(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TertuliaError>;
