//! Named communities and the forest derived from their listings.
//!
//! Two notions of "community" live side by side. The explicit listing maps
//! each community to its members and each user to the community that most
//! recently listed them. The forest unions every listed member with the
//! first member of the same listing, so a user who appears in two listings
//! bridges them: [`CommunityRegistry::same_component`] may report two users
//! as connected even though no single listing names both.

use std::collections::{BTreeMap, HashMap};

use tracing::{Span, debug, field, info, instrument};

use crate::{
    disjoint_set::DisjointSet,
    error::{InvalidInput, Result},
    model::{Community, CommunityId, UserId},
    store::{CommunityRecord, TableStore},
    users::Users,
};

/// A community as presented to users, with resolved member names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunitySummary {
    /// Community identifier.
    pub id: CommunityId,
    /// Display name.
    pub name: String,
    /// Member identifiers in listing order.
    pub members: Vec<UserId>,
    /// Member display names, aligned with `members`.
    pub member_names: Vec<String>,
}

/// Registry of communities backed by a disjoint-set forest.
///
/// # Examples
/// ```
/// use tertulia_core::{CommunityRegistry, MemoryStore, UserId};
///
/// let mut store = MemoryStore::new();
/// let mut registry = CommunityRegistry::default();
/// let members = [UserId::new("a"), UserId::new("b")];
/// let id = registry.create("Chess club", &members, &mut store)?;
/// assert_eq!(id.get(), 1);
/// assert_eq!(registry.community_of("b"), Some(id));
/// assert!(registry.same_component("a", "b"));
/// # Ok::<(), tertulia_core::TertuliaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommunityRegistry {
    communities: BTreeMap<CommunityId, Community>,
    membership: HashMap<UserId, CommunityId>,
    forest: DisjointSet<UserId>,
}

impl CommunityRegistry {
    /// Rebuilds the registry from stored listings.
    ///
    /// Blank names inherit the name found on another row of the same
    /// community, falling back to [`Community::fallback_name`]. A member
    /// listed twice in one community is kept once.
    ///
    /// # Errors
    /// Returns [`crate::TertuliaError::Forest`] if the forest rejects an
    /// element, which cannot happen because every member is registered
    /// before it is unioned.
    #[instrument(
        name = "community.load",
        err,
        skip(records),
        fields(rows = records.len(), communities = field::Empty),
    )]
    pub fn from_records(records: Vec<CommunityRecord>) -> Result<Self> {
        let mut names: HashMap<CommunityId, String> = HashMap::new();
        for record in &records {
            if !record.name.is_empty() {
                names.insert(record.community, record.name.clone());
            }
        }

        let mut registry = Self::default();
        for record in records {
            let community = registry
                .communities
                .entry(record.community)
                .or_insert_with(|| Community {
                    id: record.community,
                    name: names
                        .get(&record.community)
                        .cloned()
                        .unwrap_or_else(|| Community::fallback_name(record.community)),
                    members: Vec::new(),
                });
            if !community.members.contains(&record.user) {
                community.members.push(record.user.clone());
            }
            registry.membership.insert(record.user, record.community);
        }

        let listings: Vec<Vec<UserId>> = registry
            .communities
            .values()
            .map(|community| community.members.clone())
            .collect();
        for members in &listings {
            registry.merge(members)?;
        }

        Span::current().record("communities", registry.communities.len());
        debug!(sets = registry.forest.set_count(), "community forest rebuilt");
        Ok(registry)
    }

    /// Creates a community named `name` listing `members`, persists the
    /// whole registry through `store`, and only then updates memory.
    ///
    /// Repeated members are listed once, in first-occurrence order. The new
    /// identifier is one greater than the largest existing one, or `1`.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyName`] or [`InvalidInput::EmptyMembers`]
    /// for rejected requests and [`crate::TertuliaError::Storage`] when the
    /// write fails. The registry is unchanged on every error path.
    #[instrument(
        name = "community.create",
        err,
        skip(self, members, store),
        fields(members = members.len(), community = field::Empty),
    )]
    pub fn create<S: TableStore + ?Sized>(
        &mut self,
        name: &str,
        members: &[UserId],
        store: &mut S,
    ) -> Result<CommunityId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidInput::EmptyName.into());
        }
        let mut listed: Vec<UserId> = Vec::with_capacity(members.len());
        for member in members {
            if !listed.contains(member) {
                listed.push(member.clone());
            }
        }
        if listed.is_empty() {
            return Err(InvalidInput::EmptyMembers.into());
        }

        let id = CommunityId::next_after(self.communities.keys().copied());
        let community = Community {
            id,
            name: name.to_owned(),
            members: listed,
        };
        let mut rows = self.rows();
        rows.extend(listing_rows(&community));
        store.write_communities(&rows)?;

        self.merge(&community.members)?;
        for member in &community.members {
            self.membership.insert(member.clone(), id);
        }
        self.communities.insert(id, community);

        Span::current().record("community", id.get());
        info!(%id, "community created");
        Ok(id)
    }

    /// Community that most recently listed `user`.
    #[must_use]
    pub fn community_of(&self, user: &str) -> Option<CommunityId> {
        self.membership.get(user).copied()
    }

    /// Members listed under `community`; empty when it is unknown.
    #[must_use]
    pub fn members_of(&self, community: CommunityId) -> &[UserId] {
        self.communities
            .get(&community)
            .map(|listing| listing.members.as_slice())
            .unwrap_or_default()
    }

    /// Whether both users are in the forest and share a representative.
    /// Users never listed in any community yield `false`.
    pub fn same_component(&mut self, left: &str, right: &str) -> bool {
        self.forest.connected(&UserId::new(left), &UserId::new(right))
    }

    /// Communities in identifier order with resolved names.
    #[must_use]
    pub fn summaries(&self, users: &Users) -> Vec<CommunitySummary> {
        self.communities
            .values()
            .map(|community| CommunitySummary {
                id: community.id,
                name: community.name.clone(),
                members: community.members.clone(),
                member_names: community
                    .members
                    .iter()
                    .map(|member| users.display_name(member.as_str()))
                    .collect(),
            })
            .collect()
    }

    /// One storage row per listed member, in identifier then listing order.
    #[must_use]
    pub fn rows(&self) -> Vec<CommunityRecord> {
        self.communities.values().flat_map(listing_rows).collect()
    }

    /// Communities in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Community> + '_ {
        self.communities.values()
    }

    /// Number of communities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// Returns whether no community is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    fn merge(&mut self, members: &[UserId]) -> Result<()> {
        for member in members {
            self.forest.make_set(member.clone());
        }
        if let Some((first, rest)) = members.split_first() {
            for member in rest {
                self.forest.union(first, member)?;
            }
        }
        Ok(())
    }
}

fn listing_rows(community: &Community) -> impl Iterator<Item = CommunityRecord> + '_ {
    community.members.iter().map(|member| CommunityRecord {
        community: community.id,
        name: community.name.clone(),
        user: member.clone(),
    })
}
