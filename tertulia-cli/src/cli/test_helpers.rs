//! Small helpers shared across CLI tests.
//!
//! Each test gets its own temporary data directory seeded with a five-user
//! network, so commands that rewrite tables never interfere.

use tempfile::TempDir;
use tertulia_core::{FriendshipRecord, User};
use tertulia_providers_parquet::ParquetTableStore;

use super::{Cli, CliError, Command, CommandOutput, render_output, run_cli};

fn user(id: &str, name: &str, post: Option<&str>) -> User {
    User::from_fields(Some(id), Some(name), post).expect("valid user row")
}

fn friendship(left: &str, right: &str) -> FriendshipRecord {
    FriendshipRecord::from_fields(Some(left), Some(right)).expect("valid friendship row")
}

/// Users a to e (Ana, Beto, Carla, Dario, Elena) with friendships a-b,
/// b-c and c-d. Elena is isolated and has a legacy post.
pub(super) fn seeded_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let mut store = ParquetTableStore::open(dir.path()).expect("open temp dir");
    store
        .write_users(&[
            user("a", "Ana", None),
            user("b", "Beto", None),
            user("c", "Carla", None),
            user("d", "Dario", None),
            user("e", "Elena", Some("hola mundo")),
        ])
        .expect("write users");
    store
        .write_friendships(&[
            friendship("a", "b"),
            friendship("b", "c"),
            friendship("c", "d"),
        ])
        .expect("write friendships");
    dir
}

pub(super) fn run(dir: &TempDir, command: Command) -> Result<CommandOutput, CliError> {
    run_cli(Cli {
        data_dir: dir.path().to_path_buf(),
        command,
    })
}

pub(super) fn run_expecting_error(dir: &TempDir, command: Command, panic_msg: &str) -> CliError {
    match run(dir, command) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

pub(super) fn rendered(output: &CommandOutput) -> String {
    let mut buffer = Vec::new();
    render_output(output, &mut buffer).expect("rendering to a vec cannot fail");
    String::from_utf8(buffer).expect("output is UTF-8")
}
