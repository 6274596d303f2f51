use tertulia_core::{FriendshipRecord, MemoryStore, User};

/// Users `a`..`e` named Ana..Elena; `e` has a legacy post.
#[must_use]
pub fn users() -> Vec<User> {
    [
        ("a", "Ana", None),
        ("b", "Beto", None),
        ("c", "Carla", None),
        ("d", "Dario", None),
        ("e", "Elena", Some("hola mundo")),
    ]
    .into_iter()
    .filter_map(|(id, name, post)| User::from_fields(Some(id), Some(name), post))
    .collect()
}

/// The path `a - b - c - d`; `e` has no friends.
#[must_use]
pub fn friendships() -> Vec<FriendshipRecord> {
    [("a", "b"), ("b", "c"), ("c", "d")]
        .into_iter()
        .filter_map(|(left, right)| FriendshipRecord::from_fields(Some(left), Some(right)))
        .collect()
}

/// Store holding only the mandatory tables.
#[must_use]
pub fn network() -> MemoryStore {
    MemoryStore::new()
        .with_users(users())
        .with_friendships(friendships())
}
