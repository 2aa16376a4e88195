//! GraphQL schema definition.
//!
//! The core query exposes the paginated collections (comments, user roles,
//! content nodes) and URI resolution (`nodeByUri`, `page`, `mediaItem`).

use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Result, Schema,
    SchemaBuilder, ID,
};

use folio_core::error::{PaginationError, ResolveError};
use folio_core::models::{Node, from_global_id};
use folio_core::ports::{ContentFilter, Pagination, Repositories};
use folio_core::services::{ConnectionResolver, NodeResolver};

use crate::types::{
    CommentConnection, CommentWhereArgs, ContentNode, ContentNodeConnection, FolioSchema,
    MediaItemIdType, PageIdType, UniformResourceIdentifiable, UserRoleConnection,
};

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Maximum length of URI and id arguments.
const MAX_ID_LENGTH: usize = 2048;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the schema with query depth and complexity limits.
pub fn build_schema(
    repositories: Arc<dyn Repositories>,
    resolver: NodeResolver,
    connections: ConnectionResolver,
) -> FolioSchema {
    schema_builder(repositories, resolver, connections)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Create a schema builder with the collaborators as data.
///
/// Remember to call `.limit_depth()` and `.limit_complexity()` before `.finish()`.
pub fn schema_builder(
    repositories: Arc<dyn Repositories>,
    resolver: NodeResolver,
    connections: ConnectionResolver,
) -> SchemaBuilder<CoreQuery, EmptyMutation, EmptySubscription> {
    Schema::build(CoreQuery, EmptyMutation, EmptySubscription)
        .data(repositories)
        .data(resolver)
        .data(connections)
}

// -----------------------------------------------------------------------------
// Core Query
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct CoreQuery;

#[Object]
impl CoreQuery {
    /// Approved comments, newest first.
    async fn comments<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        last: Option<i32>,
        after: Option<String>,
        before: Option<String>,
        #[graphql(name = "where")] filter: Option<CommentWhereArgs>,
    ) -> Result<CommentConnection> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let connections = ctx.data::<ConnectionResolver>()?;

        let source = repos.comments(filter.unwrap_or_default().into());
        let connection = connections
            .paginate(source.as_ref(), &pagination(first, last, after, before))
            .await
            .map_err(pagination_error)?;

        Ok(CommentConnection::from(connection))
    }

    /// Registered user roles.
    async fn user_roles<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        last: Option<i32>,
        after: Option<String>,
        before: Option<String>,
    ) -> Result<UserRoleConnection> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let connections = ctx.data::<ConnectionResolver>()?;

        let source = repos.user_roles();
        let connection = connections
            .paginate(source.as_ref(), &pagination(first, last, after, before))
            .await
            .map_err(pagination_error)?;

        Ok(UserRoleConnection::from(connection))
    }

    /// Published entries of one content type, newest first.
    #[allow(clippy::too_many_arguments)]
    async fn content_nodes<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        post_type: String,
        parent: Option<i64>,
        first: Option<i32>,
        last: Option<i32>,
        after: Option<String>,
        before: Option<String>,
    ) -> Result<ContentNodeConnection> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let connections = ctx.data::<ConnectionResolver>()?;
        let resolver = ctx.data::<NodeResolver>()?;

        if resolver.site().post_type(&post_type).is_none() {
            return Err(async_graphql::Error::new(format!(
                "Unknown content type '{}'",
                post_type
            ))
            .extend_with(|_, e| e.set("code", "BAD_USER_INPUT")));
        }

        let filter = ContentFilter {
            parent,
            ..ContentFilter::of_type(&post_type)
        };
        let source = repos.content_nodes(filter);
        let connection = connections
            .paginate(source.as_ref(), &pagination(first, last, after, before))
            .await
            .map_err(pagination_error)?;

        Ok(ContentNodeConnection::from(connection))
    }

    /// The node addressed by a URI, or null.
    async fn node_by_uri<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        uri: String,
    ) -> Result<Option<UniformResourceIdentifiable>> {
        validate_id_length(&uri, "uri")?;
        let resolver = ctx.data::<NodeResolver>()?;

        let node = resolver.resolve_by_uri(&uri).await.map_err(resolve_error)?;
        Ok(node.and_then(UniformResourceIdentifiable::from_node))
    }

    /// A page by global id, database id or URI.
    async fn page<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: ID,
        #[graphql(default)] id_type: PageIdType,
    ) -> Result<Option<ContentNode>> {
        validate_id_length(&id, "id")?;
        let resolver = ctx.data::<NodeResolver>()?;

        let node = match id_type {
            PageIdType::Uri => resolver.resolve_by_uri(&id).await,
            PageIdType::DatabaseId => {
                resolver
                    .resolve_content_by_id("page", parse_database_id(&id)?)
                    .await
            }
            PageIdType::Id => match global_content_id(&id) {
                Some(database_id) => resolver.resolve_content_by_id("page", database_id).await,
                None => Ok(None),
            },
        }
        .map_err(resolve_error)?;

        Ok(content_of_type(node, "page"))
    }

    /// A media item by global id, database id, URI or file URL.
    async fn media_item<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: ID,
        #[graphql(default)] id_type: MediaItemIdType,
    ) -> Result<Option<ContentNode>> {
        validate_id_length(&id, "id")?;
        let resolver = ctx.data::<NodeResolver>()?;

        let node = match id_type {
            MediaItemIdType::Uri => resolver.resolve_by_uri(&id).await,
            MediaItemIdType::SourceUrl => resolver.resolve_media_by_source_url(&id).await,
            MediaItemIdType::DatabaseId => {
                resolver
                    .resolve_content_by_id("attachment", parse_database_id(&id)?)
                    .await
            }
            MediaItemIdType::Id => match global_content_id(&id) {
                Some(database_id) => {
                    resolver
                        .resolve_content_by_id("attachment", database_id)
                        .await
                }
                None => Ok(None),
            },
        }
        .map_err(resolve_error)?;

        Ok(content_of_type(node, "attachment"))
    }
}

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

fn pagination(
    first: Option<i32>,
    last: Option<i32>,
    after: Option<String>,
    before: Option<String>,
) -> Pagination {
    Pagination::from_args(first.map(i64::from), after, last.map(i64::from), before)
}

/// Caller mistakes are flagged as bad input, store failures as internal.
fn pagination_error(err: PaginationError) -> async_graphql::Error {
    let code = match err {
        PaginationError::Argument(_) => "BAD_USER_INPUT",
        PaginationError::Store(_) => "INTERNAL_SERVER_ERROR",
    };
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

fn resolve_error(err: ResolveError) -> async_graphql::Error {
    let code = match err {
        ResolveError::Path(_) => "BAD_USER_INPUT",
        ResolveError::Store(_) => "INTERNAL_SERVER_ERROR",
    };
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

/// Keep `node` only if it is an entry of `post_type`.
fn content_of_type(node: Option<Node>, post_type: &str) -> Option<ContentNode> {
    match node {
        Some(Node::Content(content)) if content.post_type == post_type => {
            Some(ContentNode::from(content))
        }
        _ => None,
    }
}

/// Database id carried by a content global id.
fn global_content_id(id: &str) -> Option<i64> {
    let (kind, database_id) = from_global_id(id)?;
    if kind != "post" {
        return None;
    }
    database_id.parse().ok()
}

fn parse_database_id(id: &str) -> Result<i64> {
    id.trim().parse::<i64>().map_err(|_| {
        async_graphql::Error::new(format!("Invalid database id '{}'", id))
            .extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
    })
}

fn validate_id_length(value: &str, field_name: &str) -> Result<()> {
    if value.len() > MAX_ID_LENGTH {
        return Err(async_graphql::Error::new(format!(
            "{} too long: maximum {} characters allowed",
            field_name, MAX_ID_LENGTH
        )));
    }
    Ok(())
}
