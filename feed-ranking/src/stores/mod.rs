//! Capability traits for the external stores the ranking engine reads from.
//!
//! The engine never talks to a database directly; it is handed trait objects
//! for the content store, social graph store, and interaction log. Eligibility
//! semantics live here (`ContentQuery::matches`) so that every store
//! implementation and every test fixture agrees on which items qualify.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::RetrievalError;
use crate::models::{ContentItem, Interaction, TargetType, Visibility};

/// Source ordering requested from the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentSort {
    /// Newest first
    #[default]
    CreatedAtDesc,
    /// like_count desc, then comment_count desc, then created_at desc
    EngagementDesc,
}

/// Candidate filter handed to the content store.
///
/// The store is expected to return at most `limit` items matching
/// [`ContentQuery::matches`], ordered by `sort`, starting at `offset`.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    /// Restrict to these authors when set
    pub authors: Option<HashSet<Uuid>>,
    /// Never return items by these authors
    pub exclude_authors: HashSet<Uuid>,
    /// Never return these items
    pub exclude_ids: HashSet<Uuid>,
    /// Admitted visibility levels; `Private` never qualifies
    pub visibility: Vec<Visibility>,
    /// Required group tag for `Group`-visibility items. When unset, group
    /// items qualify regardless of their tag (the trending case).
    pub group_tag: Option<String>,
    /// Lower bound on creation time (trending window)
    pub created_after: Option<DateTime<Utc>>,
    pub sort: ContentSort,
    pub offset: usize,
    pub limit: usize,
}

impl ContentQuery {
    /// Eligibility predicate this query describes. Store implementations
    /// translate it to their own query language; in-memory fixtures apply it
    /// directly.
    pub fn matches(&self, item: &ContentItem) -> bool {
        if let Some(authors) = &self.authors {
            if !authors.contains(&item.author_id) {
                return false;
            }
        }
        if self.exclude_authors.contains(&item.author_id) {
            return false;
        }
        if self.exclude_ids.contains(&item.id) {
            return false;
        }
        if let Some(after) = self.created_after {
            if item.created_at < after {
                return false;
            }
        }
        match item.visibility {
            Visibility::Private => false,
            Visibility::Group => {
                if !self.visibility.contains(&Visibility::Group) {
                    return false;
                }
                match &self.group_tag {
                    Some(required) => item.group_tag.as_deref() == Some(required.as_str()),
                    None => true,
                }
            }
            level => self.visibility.contains(&level),
        }
    }
}

/// Read access to content items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Items matching the query predicate, in the requested source order.
    async fn find_visible(&self, query: &ContentQuery)
        -> Result<Vec<ContentItem>, RetrievalError>;

    /// Point lookups for re-hydration and preference inference. Missing ids
    /// are silently absent from the result.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>, RetrievalError>;
}

/// Read access to the social graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraphStore: Send + Sync {
    /// Accounts the user is connected to with `Accepted` status.
    async fn list_accepted_connections(
        &self,
        user_id: Uuid,
    ) -> Result<HashSet<Uuid>, RetrievalError>;
}

/// Read access to historical like/comment actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// All of the user's interactions against the given target type.
    async fn list_interactions(
        &self,
        user_id: Uuid,
        target_type: TargetType,
    ) -> Result<Vec<Interaction>, RetrievalError>;

    /// Point membership check for a single (user, target) pair.
    async fn has_interaction(
        &self,
        user_id: Uuid,
        target_id: Uuid,
        target_type: TargetType,
    ) -> Result<bool, RetrievalError>;
}
