//! GraphQL API for folio.
//!
//! Exposes the paginated collections and URI resolution of `folio-core`
//! over GraphQL.
//!
//! # Building a Schema
//!
//! ```ignore
//! use folio_graphql::{build_schema, serve_with_shutdown, ServerConfig};
//!
//! let schema = build_schema(repositories, resolver, ConnectionResolver::default());
//! serve_with_shutdown(schema, ServerConfig::default(), shutdown).await?;
//! ```

mod schema;
mod server;
mod types;

pub use schema::{
    build_schema, schema_builder, CoreQuery, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH,
};
pub use server::{app, serve, serve_with_shutdown, ServerConfig};
pub use types::{
    Comment, CommentConnection, CommentWhereArgs, ContentNode, ContentNodeConnection,
    ContentType, FolioSchema, MediaItemIdType, PageIdType, PageInfo, TermNode,
    UniformResourceIdentifiable, User, UserRole, UserRoleConnection,
};
