//! Plain-text rendering of command results.

use std::io::{self, Write};

use super::commands::CommandOutput;

/// Renders `output` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use tertulia_cli::cli::{CommandOutput, render_output};
/// # use tertulia_core::UserId;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let output = CommandOutput::Path {
///     from: UserId::new("a"),
///     to: UserId::new("c"),
///     names: Some(vec!["Ana".into(), "Beto".into(), "Carla".into()]),
///     separation: Some(2),
/// };
/// let mut buffer = Vec::new();
/// render_output(&output, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "Ana → Beto → Carla\ndegrees of separation: 2\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_output(output: &CommandOutput, mut writer: impl Write) -> io::Result<()> {
    match output {
        CommandOutput::Path {
            from,
            to,
            names,
            separation,
        } => match (names, separation) {
            (Some(names), Some(hops)) => {
                writeln!(writer, "{}", names.join(" → "))?;
                writeln!(writer, "degrees of separation: {hops}")?;
            }
            _ => writeln!(writer, "no path between {from} and {to}")?,
        },
        CommandOutput::Recommendations { user, suggestions } => {
            if suggestions.is_empty() {
                writeln!(writer, "no recommendations for {user}")?;
            }
            for (id, name) in suggestions {
                writeln!(writer, "{id}\t{name}")?;
            }
        }
        CommandOutput::Subgraph(snapshot) => {
            writeln!(
                writer,
                "nodes: {}, edges: {}",
                snapshot.nodes.len(),
                snapshot.edges.len()
            )?;
            for node in &snapshot.nodes {
                writeln!(writer, "{}\t{}", node.id, node.label)?;
            }
            for (left, right) in &snapshot.edges {
                writeln!(writer, "{left} -- {right}")?;
            }
        }
        CommandOutput::Stats(stats) => {
            writeln!(writer, "nodes: {}", stats.node_count)?;
            writeln!(writer, "edges: {}", stats.edge_count)?;
            writeln!(writer, "average degree: {:.2}", stats.average_degree)?;
            writeln!(writer, "min degree: {}", stats.min_degree)?;
            writeln!(writer, "max degree: {}", stats.max_degree)?;
            writeln!(writer, "density: {:.4}", stats.density)?;
            for (rank, node) in stats.top_nodes.iter().enumerate() {
                writeln!(writer, "{}. {}\t{}", rank + 1, node.user, node.degree)?;
            }
        }
        CommandOutput::Communities(summaries) => {
            if summaries.is_empty() {
                writeln!(writer, "no communities")?;
            }
            for summary in summaries {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    summary.id,
                    summary.name,
                    summary.member_names.join(", ")
                )?;
            }
        }
        CommandOutput::CommunityCreated { id, name } => {
            writeln!(writer, "created community {id}: {name}")?;
        }
        CommandOutput::SameCommunity { left, right, same } => {
            let verdict = if *same { "share" } else { "do not share" };
            writeln!(writer, "{left} and {right} {verdict} a community")?;
        }
        CommandOutput::PostCreated(id) => writeln!(writer, "created post {id}")?,
        CommandOutput::LikeRegistered { like, post } => {
            writeln!(writer, "registered like {like} on post {post}")?;
        }
        CommandOutput::TopPosts(posts) => {
            if posts.is_empty() {
                writeln!(writer, "no liked posts")?;
            }
            for ranked in posts {
                writeln!(
                    writer,
                    "{}\t{} likes\t{}: {}",
                    ranked.post, ranked.likes, ranked.author, ranked.content
                )?;
            }
        }
        CommandOutput::Feed { user, entries } => {
            if entries.is_empty() {
                writeln!(writer, "{user} has not posted")?;
            }
            for entry in entries {
                writeln!(writer, "{entry}")?;
            }
        }
        CommandOutput::Layout(placed) => {
            for (node, label) in placed {
                writeln!(
                    writer,
                    "{}\t{:.4}\t{:.4}\t{label}",
                    node.user, node.position.x, node.position.y
                )?;
            }
        }
    }
    Ok(())
}
