//! Port traits for data repositories.
//!
//! These traits define the collections the API layer can paginate.
//! Implementations live in the infrastructure layer (e.g., `folio-storage`).

use crate::models::{Comment, ContentNode, UserRole};

use super::collection::CollectionSource;

// =============================================================================
// Connection Tags
// =============================================================================

/// Cursor tag of the comments connection.
pub const COMMENT_CONNECTION: &str = "comment";
/// Cursor tag of content node connections.
pub const CONTENT_CONNECTION: &str = "contentnode";
/// Cursor tag of the user roles connection.
pub const USER_ROLE_CONNECTION: &str = "userrole";

// =============================================================================
// Filter Types
// =============================================================================

/// Filter options for comment collections.
///
/// Only approved comments are ever listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFilter {
    pub comment_type: Option<String>,
    pub comment_type_in: Vec<String>,
    pub comment_type_not_in: Vec<String>,
    pub content_id: Option<i64>,
    /// Parent comment id; `Some(0)` lists top-level comments, `None` all.
    pub parent: Option<i64>,
}

impl Default for CommentFilter {
    fn default() -> Self {
        Self {
            comment_type: None,
            comment_type_in: Vec::new(),
            comment_type_not_in: Vec::new(),
            content_id: None,
            parent: Some(0),
        }
    }
}

impl CommentFilter {
    /// Whether a comment passes the filter.
    pub fn matches(&self, comment: &Comment) -> bool {
        if !comment.approved {
            return false;
        }
        if let Some(comment_type) = &self.comment_type {
            if &comment.comment_type != comment_type {
                return false;
            }
        }
        if !self.comment_type_in.is_empty() && !self.comment_type_in.contains(&comment.comment_type)
        {
            return false;
        }
        if self.comment_type_not_in.contains(&comment.comment_type) {
            return false;
        }
        if let Some(content_id) = self.content_id {
            if comment.content_id != content_id {
                return false;
            }
        }
        match self.parent {
            Some(0) => comment.parent_database_id.is_none(),
            Some(parent) => comment.parent_database_id == Some(parent),
            None => true,
        }
    }
}

/// Filter options for content node collections. Published entries only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    pub post_type: String,
    pub parent: Option<i64>,
}

impl ContentFilter {
    pub fn of_type(post_type: &str) -> Self {
        Self {
            post_type: post_type.to_string(),
            parent: None,
        }
    }
}

// =============================================================================
// Collection Aliases
// =============================================================================

/// Comment collection, keyed by comment id.
pub type CommentSource<'a> = Box<dyn CollectionSource<Item = Comment, Key = i64> + 'a>;
/// Content collection, keyed by content id.
pub type ContentSource<'a> = Box<dyn CollectionSource<Item = ContentNode, Key = i64> + 'a>;
/// Role collection, keyed by role name.
pub type UserRoleSource<'a> = Box<dyn CollectionSource<Item = UserRole, Key = String> + 'a>;

// =============================================================================
// Composite Repository
// =============================================================================

/// Combined access to every paginated collection.
pub trait Repositories: Send + Sync {
    /// Approved comments matching `filter`, newest first.
    fn comments(&self, filter: CommentFilter) -> CommentSource<'_>;

    /// Published entries of one content type, newest first.
    fn content_nodes(&self, filter: ContentFilter) -> ContentSource<'_>;

    /// Registered roles in registration order.
    fn user_roles(&self) -> UserRoleSource<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(comment_type: &str, parent: Option<i64>) -> Comment {
        Comment {
            database_id: 1,
            content_id: 10,
            parent_database_id: parent,
            author_name: "admin".into(),
            content: "hi".into(),
            date: Utc::now(),
            comment_type: comment_type.into(),
            approved: true,
        }
    }

    #[test]
    fn test_default_filter_lists_top_level_only() {
        let filter = CommentFilter::default();
        assert!(filter.matches(&comment("comment", None)));
        assert!(!filter.matches(&comment("comment", Some(3))));
    }

    #[test]
    fn test_type_filters() {
        let filter = CommentFilter {
            comment_type_not_in: vec!["comment".into()],
            ..Default::default()
        };
        assert!(!filter.matches(&comment("comment", None)));
        assert!(filter.matches(&comment("custom-type-one", None)));

        let filter = CommentFilter {
            comment_type_in: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        assert!(filter.matches(&comment("b", None)));
        assert!(!filter.matches(&comment("c", None)));
    }

    #[test]
    fn test_unapproved_never_matches() {
        let mut pending = comment("comment", None);
        pending.approved = false;
        assert!(!CommentFilter::default().matches(&pending));
    }
}
