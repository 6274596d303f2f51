//! Session context tying the loaded tables to the query and mutation API.
//!
//! A [`Session`] owns everything loaded from a [`TableStore`] and the store
//! itself, so mutations can persist before they are applied. Independent
//! sessions share nothing and may coexist in one process.

use tracing::{Span, debug, field, info, instrument, warn};

use crate::{
    builder::SessionConfig,
    community::{CommunityRegistry, CommunitySummary},
    error::{InvalidInput, Result, StorageError, TertuliaError},
    graph::{EdgeInsertion, FriendshipGraph},
    model::{CommunityId, LikeId, Post, PostId, UserId},
    paths,
    posts::PostStore,
    ranking::{self, PostLikes},
    stats::{self, GraphStats},
    store::{Table, TableStore},
    users::Users,
};

/// A labelled node of a [`GraphSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNode {
    /// Node identifier.
    pub id: UserId,
    /// Display label.
    pub label: String,
}

/// Nodes and edges of a graph, ready for rendering.
///
/// Each undirected edge appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    /// Nodes in insertion order.
    pub nodes: Vec<SnapshotNode>,
    /// Undirected edges.
    pub edges: Vec<(UserId, UserId)>,
}

impl GraphSnapshot {
    /// Captures `graph`, labelling nodes with names from `users`.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::{FriendshipGraph, GraphSnapshot, Users};
    ///
    /// let graph = FriendshipGraph::from_edges([("1", "2")]);
    /// let snapshot = GraphSnapshot::of(&graph, &Users::default());
    /// assert_eq!(snapshot.nodes[0].label, "User 1");
    /// assert_eq!(snapshot.edges.len(), 1);
    /// ```
    #[must_use]
    pub fn of(graph: &FriendshipGraph, users: &Users) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|id| SnapshotNode {
                    id: id.clone(),
                    label: users.display_name(id.as_str()),
                })
                .collect(),
            edges: graph
                .edges()
                .map(|(left, right)| (left.clone(), right.clone()))
                .collect(),
        }
    }
}

/// One entry of a user's feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEntry {
    /// Free text stored on the user row.
    Legacy(String),
    /// A post authored through the post store.
    Post(Post),
}

impl FeedEntry {
    /// Text of the entry.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Legacy(text) => text,
            Self::Post(post) => &post.content,
        }
    }
}

/// Everything loaded from a [`TableStore`], plus the store.
///
/// # Examples
/// ```
/// use tertulia_core::{FriendshipRecord, MemoryStore, Session, User};
///
/// let store = MemoryStore::new()
///     .with_users(
///         [("a", "Ana"), ("b", "Beto"), ("c", "Carla")]
///             .into_iter()
///             .filter_map(|(id, name)| User::from_fields(Some(id), Some(name), None))
///             .collect(),
///     )
///     .with_friendships(
///         [("a", "b"), ("b", "c")]
///             .into_iter()
///             .filter_map(|(l, r)| FriendshipRecord::from_fields(Some(l), Some(r)))
///             .collect(),
///     );
/// let session = Session::load(store)?;
/// let path = session.shortest_path("a", "c")?.expect("c is reachable");
/// assert_eq!(session.display_names(&path), ["Ana", "Beto", "Carla"]);
/// # Ok::<(), tertulia_core::TertuliaError>(())
/// ```
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    config: SessionConfig,
    users: Users,
    graph: FriendshipGraph,
    communities: CommunityRegistry,
    posts: PostStore,
}

impl<S: TableStore> Session<S> {
    /// Loads a session with the default [`SessionConfig`].
    ///
    /// # Errors
    /// See [`Self::load_with`].
    pub fn load(store: S) -> Result<Self> {
        Self::load_with(store, SessionConfig::default())
    }

    /// Loads every table from `store`.
    ///
    /// Every user becomes a graph node, friends or not. Missing community,
    /// post, and like tables load as empty.
    ///
    /// # Errors
    /// Returns [`TertuliaError::MissingTable`] when the user or friendship
    /// table is absent and [`TertuliaError::Storage`] when any table cannot
    /// be read.
    #[instrument(
        name = "session.load",
        err,
        skip(store, config),
        fields(
            users = field::Empty,
            edges = field::Empty,
            communities = field::Empty,
            posts = field::Empty,
            likes = field::Empty,
        ),
    )]
    pub fn load_with(store: S, config: SessionConfig) -> Result<Self> {
        let users = Users::from_records(mandatory(Table::Users, store.read_users())?);
        let friendships = mandatory(Table::Friendships, store.read_friendships())?;

        let mut graph = FriendshipGraph::new();
        for user in users.iter() {
            graph.add_node(user.id.clone());
        }
        let (mut duplicates, mut self_loops) = (0_usize, 0_usize);
        for record in friendships {
            match graph.add_edge(record.left, record.right) {
                EdgeInsertion::Inserted => {}
                EdgeInsertion::Duplicate => duplicates += 1,
                EdgeInsertion::SelfLoop => self_loops += 1,
            }
        }
        if duplicates + self_loops > 0 {
            debug!(duplicates, self_loops, "ignored friendship rows");
        }

        let communities =
            CommunityRegistry::from_records(optional(Table::Communities, store.read_communities())?)?;
        let posts = PostStore::from_records(
            optional(Table::Posts, store.read_posts())?,
            optional(Table::Likes, store.read_likes())?,
        );

        let span = Span::current();
        span.record("users", users.len());
        span.record("edges", graph.edge_count());
        span.record("communities", communities.len());
        span.record("posts", posts.posts().len());
        span.record("likes", posts.likes().len());
        info!(nodes = graph.node_count(), "session loaded");

        Ok(Self {
            store,
            config,
            users,
            graph,
            communities,
            posts,
        })
    }

    /// Minimum-edge path between two users, both inclusive; `None` when
    /// they are not connected.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`] for an unknown endpoint.
    pub fn shortest_path(&self, from: &str, to: &str) -> Result<Option<Vec<UserId>>> {
        let start = self.require_user(from)?;
        let goal = self.require_user(to)?;
        Ok(paths::shortest_path(&self.graph, start.as_str(), goal.as_str()))
    }

    /// Degrees of separation between two users; `None` when they are not
    /// connected.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`] for an unknown endpoint.
    pub fn separation(&self, from: &str, to: &str) -> Result<Option<usize>> {
        let start = self.require_user(from)?;
        let goal = self.require_user(to)?;
        Ok(paths::bfs_distances(&self.graph, start.as_str())
            .get(goal.as_str())
            .copied())
    }

    /// Friends of friends who are not yet friends of `user`.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`] for an unknown user.
    pub fn recommend(&self, user: &str) -> Result<Vec<UserId>> {
        let user = self.require_user(user)?;
        Ok(paths::recommend(&self.graph, user.as_str()))
    }

    /// Induced subgraph within `hops` friendships of `seeds`.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`] for an unknown seed.
    pub fn subgraph<T: AsRef<str>>(&self, seeds: &[T], hops: usize) -> Result<FriendshipGraph> {
        let seeds = seeds
            .iter()
            .map(|seed| self.require_user(seed.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(paths::subgraph(&self.graph, &seeds, hops))
    }

    /// Degree statistics over the whole graph.
    #[instrument(name = "session.analyze", skip(self))]
    #[must_use]
    pub fn analyze(&self) -> GraphStats {
        stats::analyze(&self.graph, self.config.top_degree_count())
    }

    /// Labelled snapshot of the whole graph.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::of(&self.graph, &self.users)
    }

    /// Labelled snapshot of `graph`, typically a subgraph of this session.
    #[must_use]
    pub fn snapshot_of(&self, graph: &FriendshipGraph) -> GraphSnapshot {
        GraphSnapshot::of(graph, &self.users)
    }

    /// Force-directed placement of every node using the session layout
    /// parameters.
    #[cfg(feature = "layout")]
    #[cfg_attr(docsrs, doc(cfg(feature = "layout")))]
    #[must_use]
    pub fn layout(&self) -> Vec<crate::layout::NodePosition> {
        self.layout_with(self.config.layout())
    }

    /// Force-directed placement of every node using `config`.
    #[cfg(feature = "layout")]
    #[cfg_attr(docsrs, doc(cfg(feature = "layout")))]
    #[must_use]
    pub fn layout_with(
        &self,
        config: &crate::builder::LayoutConfig,
    ) -> Vec<crate::layout::NodePosition> {
        crate::layout::layout(&self.graph, config)
    }

    /// Creates a community and persists the community table.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`] for an unknown member, the
    /// registry's validation errors, and [`TertuliaError::Storage`] when
    /// the write fails. Nothing changes on error.
    pub fn create_community<T: AsRef<str>>(
        &mut self,
        name: &str,
        members: &[T],
    ) -> Result<CommunityId> {
        let members = members
            .iter()
            .map(|member| self.require_user(member.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let id = self.communities.create(name, &members, &mut self.store)?;
        record_community_created();
        Ok(id)
    }

    /// Community that most recently listed `user`.
    #[must_use]
    pub fn community_of(&self, user: &str) -> Option<CommunityId> {
        self.communities.community_of(self.user_key(user).as_str())
    }

    /// Members listed under `community`, empty when the id is unknown.
    #[must_use]
    pub fn members_of(&self, community: CommunityId) -> &[UserId] {
        self.communities.members_of(community)
    }

    /// Whether community listings connect the two users, directly or through
    /// a chain of shared members.
    pub fn same_component(&mut self, left: &str, right: &str) -> bool {
        let left = self.user_key(left);
        let right = self.user_key(right);
        self.communities.same_component(left.as_str(), right.as_str())
    }

    /// Every community with resolved member names.
    #[must_use]
    pub fn communities(&self) -> Vec<CommunitySummary> {
        self.communities.summaries(&self.users)
    }

    /// Publishes a post by `author` and persists the post table.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`], [`InvalidInput::EmptyContent`],
    /// or [`TertuliaError::Storage`]. Nothing changes on error.
    pub fn create_post(&mut self, author: &str, content: &str) -> Result<PostId> {
        let author = self.require_user(author)?;
        let id = self.posts.create_post(&author, content, &mut self.store)?;
        record_post_created();
        Ok(id)
    }

    /// Registers that `user` likes `post` and persists the like table.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`], [`InvalidInput::UnknownPost`],
    /// [`TertuliaError::DuplicateLike`], or [`TertuliaError::Storage`].
    /// Nothing changes on error.
    pub fn register_like(&mut self, user: &str, post: PostId) -> Result<LikeId> {
        let user = self.require_user(user)?;
        match self.posts.register_like(&user, post, &mut self.store) {
            Ok(id) => {
                record_like_registered();
                Ok(id)
            }
            Err(error) => {
                if matches!(error, TertuliaError::DuplicateLike { .. }) {
                    record_like_rejected();
                }
                Err(error)
            }
        }
    }

    /// The `k` most liked posts, most liked first.
    #[must_use]
    pub fn top_posts(&self, k: usize) -> Vec<PostLikes> {
        ranking::top_k(self.posts.likes(), k)
    }

    /// The most liked post; the lowest identifier wins ties.
    #[must_use]
    pub fn most_liked(&self) -> Option<PostLikes> {
        let counted: Vec<PostLikes> = ranking::count_likes_by_post(self.posts.likes())
            .into_iter()
            .map(|(post, likes)| PostLikes::new(post, likes))
            .collect();
        ranking::max_by_likes(&counted)
    }

    /// Returns the post with identifier `id`.
    #[must_use]
    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.post(id)
    }

    /// The user's legacy post, if any, followed by their posts in creation
    /// order.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownUser`] for an unknown user.
    pub fn feed(&self, user: &str) -> Result<Vec<FeedEntry>> {
        let user = self.require_user(user)?;
        let legacy = self
            .users
            .get(user.as_str())
            .and_then(|record| record.legacy_post.clone())
            .map(FeedEntry::Legacy);
        Ok(legacy
            .into_iter()
            .chain(
                self.posts
                    .posts_by(user.as_str())
                    .cloned()
                    .map(FeedEntry::Post),
            )
            .collect())
    }

    /// Display names along `path`, falling back to `User <id>`.
    #[must_use]
    pub fn display_names(&self, path: &[UserId]) -> Vec<String> {
        path.iter()
            .map(|id| self.users.display_name(id.as_str()))
            .collect()
    }

    /// The user directory.
    #[must_use]
    pub fn users(&self) -> &Users {
        &self.users
    }

    /// The friendship graph.
    #[must_use]
    pub fn graph(&self) -> &FriendshipGraph {
        &self.graph
    }

    /// Validated configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the session and returns the backing store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Resolves `raw` as a user identifier, then as a display name.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::{FriendshipRecord, MemoryStore, Session, User};
    ///
    /// let store = MemoryStore::new()
    ///     .with_users(vec![User::from_fields(Some("7"), Some("Ana"), None).expect("valid row")])
    ///     .with_friendships(Vec::<FriendshipRecord>::new());
    /// let session = Session::load(store)?;
    /// assert_eq!(session.resolve_user("7").map(|id| id.to_string()), Some("7".to_owned()));
    /// assert_eq!(session.resolve_user(" Ana ").map(|id| id.to_string()), Some("7".to_owned()));
    /// assert!(session.resolve_user("Zoe").is_none());
    /// # Ok::<(), tertulia_core::TertuliaError>(())
    /// ```
    #[must_use]
    pub fn resolve_user(&self, raw: &str) -> Option<UserId> {
        let wanted = raw.trim();
        self.graph
            .node(wanted)
            .or_else(|| {
                self.users
                    .find_by_name(wanted)
                    .and_then(|user| self.graph.node(user.id.as_str()))
            })
            .cloned()
    }

    fn require_user(&self, raw: &str) -> Result<UserId> {
        self.resolve_user(raw).ok_or_else(|| {
            InvalidInput::UnknownUser {
                user: UserId::new(raw),
            }
            .into()
        })
    }

    fn user_key(&self, raw: &str) -> UserId {
        self.resolve_user(raw).unwrap_or_else(|| UserId::new(raw))
    }
}

fn mandatory<T>(table: Table, rows: std::result::Result<Vec<T>, StorageError>) -> Result<Vec<T>> {
    match rows {
        Ok(rows) => {
            debug!(%table, rows = rows.len(), "table loaded");
            Ok(rows)
        }
        Err(error) if error.is_missing() => Err(TertuliaError::MissingTable { table }),
        Err(error) => Err(error.into()),
    }
}

fn optional<T>(table: Table, rows: std::result::Result<Vec<T>, StorageError>) -> Result<Vec<T>> {
    match rows {
        Ok(rows) => {
            debug!(%table, rows = rows.len(), "table loaded");
            Ok(rows)
        }
        Err(error) if error.is_missing() => {
            warn!(%table, "optional table missing; starting empty");
            Ok(Vec::new())
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(feature = "metrics")]
fn record_community_created() {
    metrics::counter!("tertulia_communities_created").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_community_created() {}

#[cfg(feature = "metrics")]
fn record_post_created() {
    metrics::counter!("tertulia_posts_created").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_post_created() {}

#[cfg(feature = "metrics")]
fn record_like_registered() {
    metrics::counter!("tertulia_likes_registered").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_like_registered() {}

#[cfg(feature = "metrics")]
fn record_like_rejected() {
    metrics::counter!("tertulia_likes_rejected").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_like_rejected() {}
