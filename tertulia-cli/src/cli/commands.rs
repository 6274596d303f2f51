//! Command definitions and execution for the tertulia CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tertulia_core::{
    CommunityId, CommunitySummary, GraphSnapshot, GraphStats, LayoutBuilder, LikeId,
    NodePosition, PostId, Session, SessionBuilder, SessionConfig, TertuliaError, UserId,
};
use tertulia_providers_parquet::{ParquetStoreError, ParquetTableStore};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_DATA_DIR: &str = "Dataset";
const DEFAULT_TOP_COUNT: usize = 10;
const DEFAULT_TOP_POSTS: usize = 5;
const DEFAULT_LAYOUT_ITERATIONS: usize = 50;
const DEFAULT_LAYOUT_SEED: u64 = 42;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "tertulia", about = "Query and update a tertulia social network.")]
pub struct Cli {
    /// Directory holding the network's Parquet tables.
    #[arg(
        long = "data-dir",
        global = true,
        env = "TERTULIA_DATA_DIR",
        default_value = DEFAULT_DATA_DIR,
    )]
    pub data_dir: PathBuf,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Shortest friendship chain between two users.
    Path(PathArgs),
    /// Friends of friends who are not yet friends.
    Recommend(UserArgs),
    /// Users within a number of hops of the seeds.
    Subgraph(SubgraphArgs),
    /// Degree statistics of the whole network.
    Stats(StatsArgs),
    /// List every community.
    Communities,
    /// Create a community and persist it.
    CreateCommunity(CreateCommunityArgs),
    /// Whether two users share a community component.
    SameCommunity(PairArgs),
    /// Publish a post.
    Post(PostArgs),
    /// Like a post.
    Like(LikeArgs),
    /// Most liked posts.
    TopPosts(TopPostsArgs),
    /// A user's legacy post and authored posts.
    Feed(UserArgs),
    /// Force-directed coordinates for every user.
    Layout(LayoutArgs),
}

/// Arguments naming two endpoints of a path.
#[derive(Debug, Args, Clone)]
pub struct PathArgs {
    /// Starting user, by id or display name.
    pub from: String,
    /// Target user, by id or display name.
    pub to: String,
}

/// Arguments naming one user.
#[derive(Debug, Args, Clone)]
pub struct UserArgs {
    /// User id or display name.
    pub user: String,
}

/// Arguments naming a pair of users.
#[derive(Debug, Args, Clone)]
pub struct PairArgs {
    /// First user, by id or display name.
    pub left: String,
    /// Second user, by id or display name.
    pub right: String,
}

/// Options accepted by the `subgraph` command.
#[derive(Debug, Args, Clone)]
pub struct SubgraphArgs {
    /// Seed users, by id or display name.
    #[arg(long = "seed", required = true, num_args = 1..)]
    pub seeds: Vec<String>,
    /// Maximum number of friendships from any seed.
    #[arg(long, default_value_t = 1)]
    pub hops: usize,
}

/// Options accepted by the `stats` command.
#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// Number of highest-degree users to list.
    #[arg(long = "top", default_value_t = DEFAULT_TOP_COUNT)]
    pub top: usize,
}

/// Options accepted by the `create-community` command.
#[derive(Debug, Args, Clone)]
pub struct CreateCommunityArgs {
    /// Community name.
    #[arg(long)]
    pub name: String,
    /// Member users, by id or display name.
    #[arg(long = "member", num_args = 1..)]
    pub members: Vec<String>,
}

/// Options accepted by the `post` command.
#[derive(Debug, Args, Clone)]
pub struct PostArgs {
    /// Author, by id or display name.
    #[arg(long)]
    pub author: String,
    /// Post text.
    #[arg(long)]
    pub content: String,
}

/// Options accepted by the `like` command.
#[derive(Debug, Args, Clone)]
pub struct LikeArgs {
    /// User who likes the post, by id or display name.
    #[arg(long)]
    pub user: String,
    /// Post identifier.
    #[arg(long)]
    pub post: u64,
}

/// Options accepted by the `top-posts` command.
#[derive(Debug, Args, Clone)]
pub struct TopPostsArgs {
    /// Number of posts to list.
    #[arg(long, default_value_t = DEFAULT_TOP_POSTS)]
    pub limit: usize,
}

/// Options accepted by the `layout` command.
#[derive(Debug, Args, Clone)]
pub struct LayoutArgs {
    /// Number of simulation steps.
    #[arg(long, default_value_t = DEFAULT_LAYOUT_ITERATIONS)]
    pub iterations: usize,
    /// Seed for the initial placement.
    #[arg(long, default_value_t = DEFAULT_LAYOUT_SEED)]
    pub seed: u64,
}

/// Errors surfaced while executing CLI commands.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CliError {
    /// The data directory could not be opened.
    #[error("failed to open data directory `{path}`: {source}")]
    DataDir {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying storage failure.
        #[source]
        source: ParquetStoreError,
    },
    /// Session loading, validation, or persistence failed.
    #[error(transparent)]
    Core(#[from] TertuliaError),
}

/// A post with its like count and text, as listed by `top-posts`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPost {
    /// Post identifier.
    pub post: PostId,
    /// Number of likes.
    pub likes: usize,
    /// Author display name.
    pub author: String,
    /// Post text.
    pub content: String,
}

/// Typed result of one command, rendered by
/// [`render_output`](super::render_output).
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Outcome of `path`.
    Path {
        /// Starting user id.
        from: UserId,
        /// Target user id.
        to: UserId,
        /// Display names along the path; `None` when unreachable.
        names: Option<Vec<String>>,
        /// Degrees of separation; `None` when unreachable.
        separation: Option<usize>,
    },
    /// Outcome of `recommend`.
    Recommendations {
        /// User the suggestions are for.
        user: UserId,
        /// Suggested users with display names.
        suggestions: Vec<(UserId, String)>,
    },
    /// Outcome of `subgraph`.
    Subgraph(GraphSnapshot),
    /// Outcome of `stats`.
    Stats(GraphStats),
    /// Outcome of `communities`.
    Communities(Vec<CommunitySummary>),
    /// Outcome of `create-community`.
    CommunityCreated {
        /// New identifier.
        id: CommunityId,
        /// Trimmed community name.
        name: String,
    },
    /// Outcome of `same-community`.
    SameCommunity {
        /// First user id.
        left: UserId,
        /// Second user id.
        right: UserId,
        /// Whether they share a component.
        same: bool,
    },
    /// Outcome of `post`.
    PostCreated(PostId),
    /// Outcome of `like`.
    LikeRegistered {
        /// New like identifier.
        like: LikeId,
        /// Liked post.
        post: PostId,
    },
    /// Outcome of `top-posts`.
    TopPosts(Vec<RankedPost>),
    /// Outcome of `feed`.
    Feed {
        /// User whose feed was read.
        user: UserId,
        /// Entry texts, legacy post first.
        entries: Vec<String>,
    },
    /// Outcome of `layout`.
    Layout(Vec<(NodePosition, String)>),
}

/// Executes the CLI command represented by `cli` against its data
/// directory.
///
/// # Errors
/// Returns [`CliError`] when the directory cannot be opened, the session
/// fails to load, or the command is rejected.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use tertulia_cli::cli::{Cli, Command, CommandOutput, run_cli};
/// # use tertulia_core::{FriendshipRecord, User};
/// # use tertulia_providers_parquet::ParquetTableStore;
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let mut store = ParquetTableStore::open(dir.path())?;
/// store.write_users(&[User::from_fields(Some("a"), Some("Ana"), None).ok_or("row")?])?;
/// store.write_friendships(&[])?;
/// let cli = Cli {
///     data_dir: dir.path().to_path_buf(),
///     command: Command::Communities,
/// };
/// assert_eq!(run_cli(cli)?, CommandOutput::Communities(Vec::new()));
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty, data_dir = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<CommandOutput, CliError> {
    let span = Span::current();
    span.record("command", field::display(command_name(&cli.command)));
    span.record("data_dir", field::display(cli.data_dir.display()));
    let config = session_config(&cli.command)?;
    let session = open_session(cli.data_dir, config)?;
    let output = run_command(session, cli.command)?;
    info!("command completed");
    Ok(output)
}

pub(super) const fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Path(_) => "path",
        Command::Recommend(_) => "recommend",
        Command::Subgraph(_) => "subgraph",
        Command::Stats(_) => "stats",
        Command::Communities => "communities",
        Command::CreateCommunity(_) => "create-community",
        Command::SameCommunity(_) => "same-community",
        Command::Post(_) => "post",
        Command::Like(_) => "like",
        Command::TopPosts(_) => "top-posts",
        Command::Feed(_) => "feed",
        Command::Layout(_) => "layout",
    }
}

fn session_config(command: &Command) -> Result<SessionConfig, CliError> {
    let builder = match command {
        Command::Stats(args) => SessionBuilder::new().with_top_degree_count(args.top),
        _ => SessionBuilder::new(),
    };
    Ok(builder.build()?)
}

fn open_session(
    data_dir: PathBuf,
    config: SessionConfig,
) -> Result<Session<ParquetTableStore>, CliError> {
    let store = ParquetTableStore::open(&data_dir).map_err(|source| CliError::DataDir {
        path: data_dir,
        source,
    })?;
    Ok(Session::load_with(store, config)?)
}

#[instrument(name = "cli.execute", err, skip(session, command))]
pub(super) fn run_command(
    mut session: Session<ParquetTableStore>,
    command: Command,
) -> Result<CommandOutput, CliError> {
    let output = match command {
        Command::Path(args) => path(&session, &args)?,
        Command::Recommend(args) => {
            let suggestions = session
                .recommend(&args.user)?
                .into_iter()
                .map(|id| {
                    let name = session.users().display_name(id.as_str());
                    (id, name)
                })
                .collect();
            CommandOutput::Recommendations {
                user: UserId::new(&args.user),
                suggestions,
            }
        }
        Command::Subgraph(args) => {
            let local = session.subgraph(&args.seeds, args.hops)?;
            CommandOutput::Subgraph(session.snapshot_of(&local))
        }
        Command::Stats(_) => CommandOutput::Stats(session.analyze()),
        Command::Communities => CommandOutput::Communities(session.communities()),
        Command::CreateCommunity(args) => {
            let id = session.create_community(&args.name, &args.members)?;
            CommandOutput::CommunityCreated {
                id,
                name: args.name.trim().to_owned(),
            }
        }
        Command::SameCommunity(args) => CommandOutput::SameCommunity {
            left: UserId::new(&args.left),
            right: UserId::new(&args.right),
            same: session.same_component(&args.left, &args.right),
        },
        Command::Post(args) => {
            CommandOutput::PostCreated(session.create_post(&args.author, &args.content)?)
        }
        Command::Like(args) => {
            let post = PostId::new(args.post);
            let like = session.register_like(&args.user, post)?;
            CommandOutput::LikeRegistered { like, post }
        }
        Command::TopPosts(args) => CommandOutput::TopPosts(top_posts(&session, args.limit)),
        Command::Feed(args) => CommandOutput::Feed {
            user: UserId::new(&args.user),
            entries: session
                .feed(&args.user)?
                .iter()
                .map(|entry| entry.content().to_owned())
                .collect(),
        },
        Command::Layout(args) => {
            let config = LayoutBuilder::new()
                .with_iterations(args.iterations)
                .with_seed(args.seed)
                .build()?;
            let placed = session
                .layout_with(&config)
                .into_iter()
                .map(|node| {
                    let label = session.users().display_name(node.user.as_str());
                    (node, label)
                })
                .collect();
            CommandOutput::Layout(placed)
        }
    };
    Ok(output)
}

fn path(session: &Session<ParquetTableStore>, args: &PathArgs) -> Result<CommandOutput, CliError> {
    let path = session.shortest_path(&args.from, &args.to)?;
    Ok(CommandOutput::Path {
        from: UserId::new(&args.from),
        to: UserId::new(&args.to),
        separation: path.as_ref().map(|hops| hops.len().saturating_sub(1)),
        names: path.map(|hops| session.display_names(&hops)),
    })
}

fn top_posts(session: &Session<ParquetTableStore>, limit: usize) -> Vec<RankedPost> {
    session
        .top_posts(limit)
        .into_iter()
        .map(|ranked| {
            let (author, content) = session.post(ranked.post).map_or_else(
                || (String::new(), String::new()),
                |post| {
                    (
                        session.users().display_name(post.author.as_str()),
                        post.content.clone(),
                    )
                },
            );
            RankedPost {
                post: ranked.post,
                likes: ranked.likes,
                author,
                content,
            }
        })
        .collect()
}
