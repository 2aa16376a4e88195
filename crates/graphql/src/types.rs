//! GraphQL type definitions.

use async_graphql::{EmptyMutation, EmptySubscription, Enum, InputObject, Schema, SimpleObject, Union, ID};
use chrono::{DateTime, Utc};

use folio_core::models::{self, Node};
use folio_core::ports::{self, CommentFilter};

use crate::schema::CoreQuery;

/// The folio GraphQL schema type.
pub type FolioSchema = Schema<CoreQuery, EmptyMutation, EmptySubscription>;

// -----------------------------------------------------------------------------
// Node Types
// -----------------------------------------------------------------------------

/// A post, page, media item or custom type entry.
#[derive(SimpleObject, Clone)]
pub struct ContentNode {
    pub id: ID,
    pub database_id: i64,
    /// GraphQL single name of the entry's type (`Post`, `Page`, ...).
    pub type_name: String,
    pub content_type_name: String,
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub uri: String,
    pub parent_database_id: Option<i64>,
    pub author_database_id: Option<i64>,
    pub source_url: Option<String>,
    pub is_front_page: bool,
    pub is_posts_page: bool,
    pub is_content_node: bool,
    pub is_term_node: bool,
}

impl From<models::ContentNode> for ContentNode {
    fn from(n: models::ContentNode) -> Self {
        let id = ID(Node::Content(n.clone()).global_id());
        Self {
            id,
            database_id: n.database_id,
            type_name: n.type_name,
            content_type_name: n.post_type,
            title: n.title,
            slug: n.slug,
            date: n.date,
            uri: n.uri,
            parent_database_id: n.parent_database_id,
            author_database_id: n.author_database_id,
            source_url: n.source_url,
            is_front_page: n.is_front_page,
            is_posts_page: n.is_posts_page,
            is_content_node: true,
            is_term_node: false,
        }
    }
}

/// A taxonomy term.
#[derive(SimpleObject, Clone)]
pub struct TermNode {
    pub id: ID,
    pub database_id: i64,
    pub type_name: String,
    pub taxonomy_name: String,
    pub name: String,
    pub slug: String,
    pub parent_database_id: Option<i64>,
    pub uri: String,
    pub is_content_node: bool,
    pub is_term_node: bool,
}

impl From<models::TermNode> for TermNode {
    fn from(n: models::TermNode) -> Self {
        let id = ID(Node::Term(n.clone()).global_id());
        Self {
            id,
            database_id: n.database_id,
            type_name: n.type_name,
            taxonomy_name: n.taxonomy,
            name: n.name,
            slug: n.slug,
            parent_database_id: n.parent_database_id,
            uri: n.uri,
            is_content_node: false,
            is_term_node: true,
        }
    }
}

/// Listing of a content type: the posts index or a type archive.
#[derive(SimpleObject, Clone)]
pub struct ContentType {
    pub id: ID,
    pub name: String,
    pub label: String,
    pub graphql_single_name: String,
    pub graphql_plural_name: String,
    pub uri: String,
    pub is_front_page: bool,
    pub is_posts_page: bool,
    pub is_content_node: bool,
    pub is_term_node: bool,
}

impl From<models::ContentTypeNode> for ContentType {
    fn from(n: models::ContentTypeNode) -> Self {
        let id = ID(Node::ContentType(n.clone()).global_id());
        Self {
            id,
            name: n.name,
            label: n.label,
            graphql_single_name: n.graphql_single_name,
            graphql_plural_name: n.graphql_plural_name,
            uri: n.uri,
            is_front_page: n.is_front_page,
            is_posts_page: n.is_posts_page,
            is_content_node: false,
            is_term_node: false,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct User {
    pub id: ID,
    pub database_id: i64,
    pub name: String,
    pub slug: String,
    pub uri: String,
    pub is_content_node: bool,
    pub is_term_node: bool,
}

impl From<models::UserNode> for User {
    fn from(n: models::UserNode) -> Self {
        let id = ID(Node::User(n.clone()).global_id());
        Self {
            id,
            database_id: n.database_id,
            name: n.name,
            slug: n.slug,
            uri: n.uri,
            is_content_node: false,
            is_term_node: false,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct UserRole {
    pub id: ID,
    pub name: String,
    pub display_name: String,
    pub capabilities: Vec<String>,
}

impl From<models::UserRole> for UserRole {
    fn from(role: models::UserRole) -> Self {
        let id = ID(Node::UserRole(role.clone()).global_id());
        Self {
            id,
            name: role.name,
            display_name: role.display_name,
            capabilities: role.capabilities,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct Comment {
    pub id: ID,
    pub database_id: i64,
    /// Database id of the commented entry.
    pub content_id: i64,
    pub parent_database_id: Option<i64>,
    pub author_name: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[graphql(name = "type")]
    pub comment_type: String,
    pub approved: bool,
}

impl From<models::Comment> for Comment {
    fn from(c: models::Comment) -> Self {
        let id = ID(Node::Comment(c.clone()).global_id());
        Self {
            id,
            database_id: c.database_id,
            content_id: c.content_id,
            parent_database_id: c.parent_database_id,
            author_name: c.author_name,
            content: c.content,
            date: c.date,
            comment_type: c.comment_type,
            approved: c.approved,
        }
    }
}

/// Anything `nodeByUri` can return.
///
/// The concrete entry type (`Post`, `Page`, `CustomType`, ...) is exposed
/// through each member's `typeName` field.
#[derive(Union, Clone)]
pub enum UniformResourceIdentifiable {
    ContentNode(ContentNode),
    TermNode(TermNode),
    ContentType(ContentType),
    User(User),
}

impl UniformResourceIdentifiable {
    /// Kinds without a URI have no counterpart.
    pub fn from_node(node: Node) -> Option<Self> {
        match node {
            Node::Content(n) => Some(Self::ContentNode(n.into())),
            Node::Term(n) => Some(Self::TermNode(n.into())),
            Node::ContentType(n) => Some(Self::ContentType(n.into())),
            Node::User(n) => Some(Self::User(n.into())),
            Node::UserRole(_) | Node::Comment(_) => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Arguments
// -----------------------------------------------------------------------------

/// Filters of the comments connection.
#[derive(InputObject, Default)]
pub struct CommentWhereArgs {
    pub comment_type: Option<String>,
    pub comment_type_in: Option<Vec<String>>,
    pub comment_type_not_in: Option<Vec<String>>,
    /// Only comments on this entry.
    pub content_id: Option<i64>,
    /// Parent comment id; `0` lists top-level comments.
    pub parent: Option<i64>,
}

impl From<CommentWhereArgs> for CommentFilter {
    fn from(args: CommentWhereArgs) -> Self {
        let defaults = CommentFilter::default();
        Self {
            comment_type: args.comment_type,
            comment_type_in: args.comment_type_in.unwrap_or_default(),
            comment_type_not_in: args.comment_type_not_in.unwrap_or_default(),
            content_id: args.content_id,
            parent: args.parent.or(defaults.parent),
        }
    }
}

/// How `page(id:)` is interpreted.
#[derive(Enum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageIdType {
    /// Global id.
    #[default]
    Id,
    DatabaseId,
    Uri,
}

/// How `mediaItem(id:)` is interpreted.
#[derive(Enum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MediaItemIdType {
    /// Global id.
    #[default]
    Id,
    DatabaseId,
    Uri,
    SourceUrl,
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl From<ports::PageInfo> for PageInfo {
    fn from(info: ports::PageInfo) -> Self {
        Self {
            has_next_page: info.has_next_page,
            has_previous_page: info.has_previous_page,
            start_cursor: info.start_cursor.map(|c| c.value),
            end_cursor: info.end_cursor.map(|c| c.value),
        }
    }
}

/// Generate Relay-style connection types (Edge + Connection) with From impl.
macro_rules! define_connection {
    ($node:ty, $core_model:ty, $edge:ident, $connection:ident) => {
        #[derive(SimpleObject)]
        pub struct $edge {
            pub node: $node,
            pub cursor: String,
        }

        #[derive(SimpleObject)]
        pub struct $connection {
            pub edges: Vec<$edge>,
            /// The edge nodes, without cursors.
            pub nodes: Vec<$node>,
            pub page_info: PageInfo,
        }

        impl From<ports::Connection<$core_model>> for $connection {
            fn from(conn: ports::Connection<$core_model>) -> Self {
                let edges: Vec<$edge> = conn
                    .edges
                    .into_iter()
                    .map(|e| $edge {
                        node: <$node>::from(e.node),
                        cursor: e.cursor.value,
                    })
                    .collect();
                Self {
                    nodes: edges.iter().map(|e| e.node.clone()).collect(),
                    edges,
                    page_info: conn.page_info.into(),
                }
            }
        }
    };
}

define_connection!(Comment, models::Comment, CommentEdge, CommentConnection);
define_connection!(UserRole, models::UserRole, UserRoleEdge, UserRoleConnection);
define_connection!(ContentNode, models::ContentNode, ContentNodeEdge, ContentNodeConnection);
