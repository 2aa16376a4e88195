//! PostgreSQL storage adapter.
//!
//! This module implements the store ports defined in `folio-core` using
//! PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool, migrations and fixture import
//! - [`PgRepositories`] - Implements both `Repositories` and `NodeStore`
//! - Collections: [`PgCommentSource`], [`PgContentSource`]
//!
//! Pagination is keyset-based: bounds compare `(date, id)` against the
//! cursor row, and has-more checks are single-row `EXISTS` queries.
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_graphql(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let repositories = PgRepositories::new(Arc::new(db), site, Vec::new());
//! ```

mod comment_repo;
mod content_repo;
mod database;
mod helpers;
mod node_store;
mod options;

pub use comment_repo::PgCommentSource;
pub use content_repo::PgContentSource;
pub use database::{Database, DatabaseConfig, ImportStats};
pub use options::reading_settings_from;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use folio_core::error::StoreResult;
use folio_core::models::{Node, ReadingSettings, SiteConfig, UserRole};
use folio_core::ports::{
    CommentFilter, CommentSource, ContentFilter, ContentSource, NodeKey, NodeKind, NodeStore,
    Repositories, UserRoleSource,
};

use crate::memory::role_collection;
use crate::records::{NodeBuilder, merge_roles};

// =============================================================================
// Composite Repository
// =============================================================================

/// Aggregated PostgreSQL stores.
///
/// Roles are not stored in the database: they come from the in-memory
/// role list (stock roles plus any custom ones).
pub struct PgRepositories {
    db: Arc<Database>,
    site: Arc<SiteConfig>,
    roles: Vec<UserRole>,
}

impl PgRepositories {
    /// Create a new repository aggregate from a database connection.
    pub fn new(db: Arc<Database>, site: Arc<SiteConfig>, custom_roles: Vec<UserRole>) -> Self {
        Self {
            db,
            site,
            roles: merge_roles(&custom_roles),
        }
    }
}

impl Repositories for PgRepositories {
    fn comments(&self, filter: CommentFilter) -> CommentSource<'_> {
        Box::new(PgCommentSource::new(self.db.pool().clone(), filter))
    }

    fn content_nodes(&self, filter: ContentFilter) -> ContentSource<'_> {
        Box::new(PgContentSource::new(
            self.db.pool().clone(),
            self.site.clone(),
            filter,
        ))
    }

    fn user_roles(&self) -> UserRoleSource<'_> {
        Box::new(role_collection(&self.roles))
    }
}

#[async_trait]
impl NodeStore for PgRepositories {
    #[instrument(skip(self))]
    async fn materialize(&self, kind: &NodeKind, key: &NodeKey) -> StoreResult<Option<Node>> {
        let pool = self.db.pool();
        let reading = options::load_reading_settings(pool).await?;
        let builder = NodeBuilder::new(&self.site, &reading);

        let node = match kind {
            NodeKind::Content(post_type) => content_repo::find_post(pool, post_type.as_deref(), key)
                .await?
                .filter(|row| row.is_routable(&self.site))
                .map(|row| Node::Content(row.into_node(&self.site, &reading))),
            NodeKind::Term(taxonomy) => node_store::find_term(pool, taxonomy, key)
                .await?
                .and_then(|found| builder.term(&found.term, &found.path))
                .map(Node::Term),
            NodeKind::User => node_store::find_user(pool, key)
                .await?
                .map(|user| Node::User(builder.user(&user))),
        };
        Ok(node)
    }

    async fn reading_settings(&self) -> StoreResult<ReadingSettings> {
        options::load_reading_settings(self.db.pool()).await
    }
}
