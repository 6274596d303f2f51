//! Command-line interface orchestration for tertulia.
//!
//! Every command opens the data directory, loads a session from its
//! Parquet tables, runs one query or mutation, and returns a typed
//! [`CommandOutput`] for [`render_output`] to print.

mod commands;
mod output;

pub use commands::{
    Cli, CliError, Command, CommandOutput, CreateCommunityArgs, LayoutArgs, LikeArgs, PairArgs,
    PathArgs, PostArgs, RankedPost, StatsArgs, SubgraphArgs, TopPostsArgs, UserArgs, run_cli,
};
pub use output::render_output;

#[cfg(test)]
mod test_helpers;
