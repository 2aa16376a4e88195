//! Row-level records shared by every store, and the conversion of those
//! records into view nodes.
//!
//! Records mirror the stored tables one to one. The JSON fixture read by
//! the memory store is a [`SiteContent`]; PostgreSQL rows are mapped into
//! the same records before they become nodes, so both stores compute
//! canonical URIs and front page flags identically.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::error::{StoreError, StoreResult};
use folio_core::models::{
    Comment, ContentNode, PostPermalink, ReadingSettings, SiteConfig, TermNode, UserNode, UserRole,
    upper_first,
};

// =============================================================================
// Records
// =============================================================================

/// A content entry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub author: Option<i64>,
    /// Term ids assigned to the entry.
    #[serde(default)]
    pub terms: Vec<i64>,
    /// File URL, attachments only.
    #[serde(default)]
    pub source_url: Option<String>,
}

impl PostRecord {
    /// Published entries are visible; attachments inherit their parent's status.
    pub fn is_published(&self) -> bool {
        self.status == "publish" || (self.post_type == "attachment" && self.status == "inherit")
    }
}

/// A taxonomy term row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub id: i64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<i64>,
}

/// A user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    /// URL-safe name used in author archives.
    pub nicename: String,
    #[serde(default)]
    pub display_name: String,
}

/// A comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default = "default_comment_type")]
    pub comment_type: String,
    #[serde(default = "default_true")]
    pub approved: bool,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Comment {
            database_id: record.id,
            content_id: record.post_id,
            parent_database_id: record.parent.filter(|p| *p != 0),
            author_name: record.author_name,
            content: record.content,
            date: record.date,
            comment_type: record.comment_type,
            approved: record.approved,
        }
    }
}

/// Full content of a site, as loaded from a JSON fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteContent {
    pub reading: ReadingSettings,
    pub posts: Vec<PostRecord>,
    pub terms: Vec<TermRecord>,
    pub users: Vec<UserRecord>,
    pub comments: Vec<CommentRecord>,
    /// Roles registered on top of the stock ones.
    pub roles: Vec<UserRole>,
}

impl SiteContent {
    /// Parse a JSON fixture.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::SerializationError(format!("invalid fixture: {}", e)))
    }

    /// Read and parse a JSON fixture file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            StoreError::ConnectionError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

// =============================================================================
// Roles
// =============================================================================

/// The stock role list, in registration order.
pub fn default_roles() -> Vec<UserRole> {
    let role = |name: &str, display_name: &str, capabilities: &[&str]| UserRole {
        name: name.to_string(),
        display_name: display_name.to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
    };
    vec![
        role(
            "administrator",
            "Administrator",
            &["manage_options", "edit_others_posts", "publish_posts", "edit_posts", "read"],
        ),
        role(
            "editor",
            "Editor",
            &["edit_others_posts", "publish_posts", "edit_posts", "read"],
        ),
        role("author", "Author", &["publish_posts", "edit_posts", "read"]),
        role("contributor", "Contributor", &["edit_posts", "read"]),
        role("subscriber", "Subscriber", &["read"]),
    ]
}

/// Stock roles followed by `custom`, replacing stock entries of the same name.
pub fn merge_roles(custom: &[UserRole]) -> Vec<UserRole> {
    let mut roles = default_roles();
    for role in custom {
        match roles.iter_mut().find(|r| r.name == role.name) {
            Some(existing) => *existing = role.clone(),
            None => roles.push(role.clone()),
        }
    }
    roles
}

// =============================================================================
// Node Construction
// =============================================================================

/// Everything a content entry's canonical URI depends on besides the row.
#[derive(Debug, Clone, Default)]
pub struct ContentContext<'a> {
    /// Ancestor slugs, root first.
    pub ancestors: &'a [String],
    /// Slug of the entry's primary category.
    pub category: Option<&'a str>,
    /// Nicename of the entry's author.
    pub author: Option<&'a str>,
}

/// Turns records into nodes against one site and reading settings snapshot.
#[derive(Debug, Clone, Copy)]
pub struct NodeBuilder<'a> {
    site: &'a SiteConfig,
    reading: &'a ReadingSettings,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(site: &'a SiteConfig, reading: &'a ReadingSettings) -> Self {
        Self { site, reading }
    }

    /// Whether the entry's type is registered and public.
    pub fn is_routable(&self, post: &PostRecord) -> bool {
        self.site
            .post_type(&post.post_type)
            .is_some_and(|pt| pt.public)
    }

    pub fn content(&self, post: &PostRecord, context: &ContentContext<'_>) -> ContentNode {
        let is_front_page =
            post.post_type == "page" && self.reading.static_front_page() == Some(post.id);
        let is_posts_page =
            post.post_type == "page" && self.reading.posts_page() == Some(post.id);

        let uri = if is_front_page {
            self.site.root_uri()
        } else {
            self.site.content_uri(&PostPermalink {
                id: post.id,
                post_type: &post.post_type,
                slug: &post.slug,
                ancestors: context.ancestors,
                date: post.date,
                category: context.category,
                author: context.author,
            })
        };

        let type_name = self
            .site
            .post_type(&post.post_type)
            .map(|pt| pt.type_name())
            .unwrap_or_else(|| upper_first(&post.post_type));

        ContentNode {
            database_id: post.id,
            post_type: post.post_type.clone(),
            type_name,
            title: post.title.clone(),
            slug: post.slug.clone(),
            date: post.date,
            parent_database_id: post.parent.filter(|p| *p != 0),
            author_database_id: post.author,
            uri,
            source_url: post.source_url.clone(),
            is_front_page,
            is_posts_page,
        }
    }

    /// `path` holds ancestor slugs then the term's own slug.
    ///
    /// Returns `None` for terms of unregistered taxonomies.
    pub fn term(&self, term: &TermRecord, path: &[String]) -> Option<TermNode> {
        let taxonomy = self.site.taxonomy(&term.taxonomy)?;
        Some(TermNode {
            database_id: term.id,
            taxonomy: term.taxonomy.clone(),
            type_name: taxonomy.type_name(),
            name: term.name.clone(),
            slug: term.slug.clone(),
            parent_database_id: term.parent.filter(|p| *p != 0),
            uri: self.site.term_uri(taxonomy, term.id, path),
        })
    }

    pub fn user(&self, user: &UserRecord) -> UserNode {
        let name = if user.display_name.is_empty() {
            user.nicename.clone()
        } else {
            user.display_name.clone()
        };
        UserNode {
            database_id: user.id,
            slug: user.nicename.clone(),
            name,
            uri: self.site.author_uri(user.id, &user.nicename),
        }
    }
}

/// Split a `parent/child` path into segments, ignoring empty ones.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn default_post_type() -> String {
    "post".to_string()
}

fn default_status() -> String {
    "publish".to_string()
}

fn default_comment_type() -> String {
    "comment".to_string()
}

fn default_true() -> bool {
    true
}
