//! Port trait for materializing nodes from the backing store.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Node, ReadingSettings};

/// Which kind of node to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Content entry; `None` matches any public type.
    Content(Option<String>),
    /// Term of a taxonomy.
    Term(String),
    /// User (author archive).
    User,
}

/// How to identify the node within its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKey {
    /// Database id.
    Id(i64),
    /// Slug (last path segment).
    Slug(String),
    /// Slash-separated slug chain, root first (`parent/child`).
    Path(String),
    /// Attachment file URL.
    SourceUrl(String),
}

/// Store collaborator for single-node lookups.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Turn a kind + key into a view node, or `None` if nothing matches.
    ///
    /// Only published entries are returned. Content nodes carry their
    /// front page / posts page flags.
    async fn materialize(&self, kind: &NodeKind, key: &NodeKey) -> StoreResult<Option<Node>>;

    /// Current front page / posts page designations.
    async fn reading_settings(&self) -> StoreResult<ReadingSettings>;
}
