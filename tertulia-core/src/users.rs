//! Directory of users loaded from the user table.

use std::collections::HashMap;

use crate::model::{User, UserId};

/// Users in table order, indexed by identifier.
///
/// A repeated identifier keeps its first position and takes the later
/// row's name and legacy post.
///
/// # Examples
/// ```
/// use tertulia_core::{User, Users};
///
/// let users = Users::from_records(vec![
///     User::from_fields(Some("1"), Some("Ana"), None).expect("valid row"),
///     User::from_fields(Some("2"), Some("Beto"), None).expect("valid row"),
/// ]);
/// assert_eq!(users.display_name("2"), "Beto");
/// assert_eq!(users.display_name("9"), "User 9");
/// assert_eq!(users.find_by_name("Ana").map(|u| u.id.as_str()), Some("1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Users {
    index: HashMap<UserId, usize>,
    entries: Vec<User>,
}

impl Users {
    /// Builds the directory from table rows.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = User>) -> Self {
        let mut users = Self::default();
        for record in records {
            let existing = users.index.get(&record.id).copied();
            if let Some(slot) = existing {
                users.entries[slot] = record;
                continue;
            }
            users.index.insert(record.id.clone(), users.entries.len());
            users.entries.push(record);
        }
        users
    }

    /// Returns the user with identifier `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&User> {
        self.index.get(id).and_then(|&slot| self.entries.get(slot))
    }

    /// Returns whether `id` is listed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the first user, in table order, whose display name equals
    /// `name` after trimming. A blank name matches nobody.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&User> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return None;
        }
        self.entries.iter().find(|user| user.name == wanted)
    }

    /// Display name of `id`, or `User <id>` when the user is unknown or
    /// unnamed.
    #[must_use]
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|user| user.name.as_str())
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("User {id}"), ToOwned::to_owned)
    }

    /// Users in table order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &User> + '_ {
        self.entries.iter()
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
