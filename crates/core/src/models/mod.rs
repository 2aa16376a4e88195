//! Domain models for nodes exposed by the query layer.
//!
//! Nodes are transient view objects: stores build them fresh for each
//! request and nothing mutates them afterwards.

mod site;

pub use site::*;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Content
// =============================================================================

/// A post, page, attachment or custom type entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub database_id: i64,
    /// Registered type name (`post`, `page`, ...).
    pub post_type: String,
    /// GraphQL type name (`Post`, `Page`, `CustomType`, ...).
    pub type_name: String,
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub parent_database_id: Option<i64>,
    pub author_database_id: Option<i64>,
    /// Canonical URI relative to the host.
    pub uri: String,
    /// File URL, attachments only.
    pub source_url: Option<String>,
    pub is_front_page: bool,
    pub is_posts_page: bool,
}

// =============================================================================
// Terms
// =============================================================================

/// A taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermNode {
    pub database_id: i64,
    pub taxonomy: String,
    pub type_name: String,
    pub name: String,
    pub slug: String,
    pub parent_database_id: Option<i64>,
    pub uri: String,
}

// =============================================================================
// Content Types
// =============================================================================

/// Synthetic listing node for a content type (the posts index, archives).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeNode {
    pub name: String,
    pub label: String,
    pub graphql_single_name: String,
    pub graphql_plural_name: String,
    pub uri: String,
    pub is_front_page: bool,
    pub is_posts_page: bool,
}

impl ContentTypeNode {
    /// Build the listing node for a registered type.
    pub fn listing(
        post_type: &PostTypeObject,
        uri: String,
        is_front_page: bool,
        is_posts_page: bool,
    ) -> Self {
        Self {
            name: post_type.name.clone(),
            label: post_type.label.clone(),
            graphql_single_name: post_type.graphql_single_name.clone(),
            graphql_plural_name: post_type.graphql_plural_name.clone(),
            uri,
            is_front_page,
            is_posts_page,
        }
    }
}

// =============================================================================
// Users & Roles
// =============================================================================

/// A user, addressable through its author archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNode {
    pub database_id: i64,
    /// URL-safe nicename.
    pub slug: String,
    pub name: String,
    pub uri: String,
}

/// A user role from the in-memory role list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    /// Role key, e.g. `administrator`.
    pub name: String,
    pub display_name: String,
    pub capabilities: Vec<String>,
}

// =============================================================================
// Comments
// =============================================================================

/// A comment on a content entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub database_id: i64,
    /// Content entry the comment belongs to.
    pub content_id: i64,
    pub parent_database_id: Option<i64>,
    pub author_name: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub comment_type: String,
    pub approved: bool,
}

// =============================================================================
// Node
// =============================================================================

/// Any resource exposed by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Content(ContentNode),
    Term(TermNode),
    ContentType(ContentTypeNode),
    User(UserNode),
    UserRole(UserRole),
    Comment(Comment),
}

impl Node {
    /// Numeric identity in the backing store, when the kind has one.
    pub fn database_id(&self) -> Option<i64> {
        match self {
            Node::Content(n) => Some(n.database_id),
            Node::Term(n) => Some(n.database_id),
            Node::User(n) => Some(n.database_id),
            Node::Comment(n) => Some(n.database_id),
            Node::ContentType(_) | Node::UserRole(_) => None,
        }
    }

    /// Opaque global identity (base64 of `kind:id`).
    pub fn global_id(&self) -> String {
        match self {
            Node::Content(n) => to_global_id("post", &n.database_id.to_string()),
            Node::Term(n) => to_global_id("term", &n.database_id.to_string()),
            Node::ContentType(n) => to_global_id("post_type", &n.name),
            Node::User(n) => to_global_id("user", &n.database_id.to_string()),
            Node::UserRole(n) => to_global_id("user_role", &n.name),
            Node::Comment(n) => to_global_id("comment", &n.database_id.to_string()),
        }
    }

    /// GraphQL type name.
    pub fn type_name(&self) -> &str {
        match self {
            Node::Content(n) => &n.type_name,
            Node::Term(n) => &n.type_name,
            Node::ContentType(_) => "ContentType",
            Node::User(_) => "User",
            Node::UserRole(_) => "UserRole",
            Node::Comment(_) => "Comment",
        }
    }

    /// Canonical URI for URI-addressable kinds.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Node::Content(n) => Some(&n.uri),
            Node::Term(n) => Some(&n.uri),
            Node::ContentType(n) => Some(&n.uri),
            Node::User(n) => Some(&n.uri),
            Node::UserRole(_) | Node::Comment(_) => None,
        }
    }

    pub fn is_content_node(&self) -> bool {
        matches!(self, Node::Content(_))
    }

    pub fn is_term_node(&self) -> bool {
        matches!(self, Node::Term(_))
    }
}

/// Encode a global id.
pub fn to_global_id(kind: &str, id: &str) -> String {
    STANDARD.encode(format!("{}:{}", kind, id))
}

/// Decode a global id into `(kind, id)`.
pub fn from_global_id(global_id: &str) -> Option<(String, String)> {
    let bytes = STANDARD.decode(global_id).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (kind, id) = decoded.split_once(':')?;
    if kind.is_empty() || id.is_empty() {
        return None;
    }
    Some((kind.to_string(), id.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
