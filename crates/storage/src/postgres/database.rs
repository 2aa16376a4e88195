//! PostgreSQL database connection and configuration.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, instrument};

use folio_core::error::{StoreError, StoreResult};
use folio_core::models::ShowOnFront;

use crate::records::SiteContent;

use super::helpers::query_error;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Connection acquisition timeout.
    pub acquire_timeout: Duration,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
    /// Maximum connection lifetime.
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/folio".to_string(),
            max_connections: 20,
            min_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DatabaseConfig {
    /// Create a configuration optimized for GraphQL queries.
    pub fn for_graphql(url: &str) -> Self {
        Self {
            url: url.to_string(),
            max_connections: 15,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(900),
        }
    }
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database with the given configuration.
    #[instrument(skip_all)]
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        debug!(
            max_conn = config.max_connections,
            min_conn = config.min_connections,
            "Creating connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        debug!("Connection pool created");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> StoreResult<()> {
        debug!("Running migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationError(e.to_string()))?;

        debug!("Migrations completed");

        Ok(())
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Load a content snapshot into the database in one transaction.
    ///
    /// Rows are upserted by id, so importing the same fixture twice is a
    /// no-op. Terms and posts are inserted parents-first.
    #[instrument(skip_all)]
    pub async fn import(&self, content: &SiteContent) -> StoreResult<ImportStats> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionError(e.to_string()))?;

        for user in &content.users {
            sqlx::query(
                r#"
                INSERT INTO users (id, nicename, display_name)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET
                    nicename = EXCLUDED.nicename,
                    display_name = EXCLUDED.display_name
                "#,
            )
            .bind(user.id)
            .bind(&user.nicename)
            .bind(&user.display_name)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        // Parents reference rows of the same table: insert without them first
        for term in &content.terms {
            sqlx::query(
                r#"
                INSERT INTO terms (id, taxonomy, name, slug)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    taxonomy = EXCLUDED.taxonomy,
                    name = EXCLUDED.name,
                    slug = EXCLUDED.slug
                "#,
            )
            .bind(term.id)
            .bind(&term.taxonomy)
            .bind(&term.name)
            .bind(&term.slug)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }
        for term in content.terms.iter().filter(|t| t.parent.is_some()) {
            sqlx::query("UPDATE terms SET parent_id = $2 WHERE id = $1")
                .bind(term.id)
                .bind(term.parent.filter(|p| *p != 0))
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }

        for post in &content.posts {
            sqlx::query(
                r#"
                INSERT INTO posts (
                    id, post_type, status, title, slug, published_at, author_id, source_url
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    post_type = EXCLUDED.post_type,
                    status = EXCLUDED.status,
                    title = EXCLUDED.title,
                    slug = EXCLUDED.slug,
                    published_at = EXCLUDED.published_at,
                    author_id = EXCLUDED.author_id,
                    source_url = EXCLUDED.source_url
                "#,
            )
            .bind(post.id)
            .bind(&post.post_type)
            .bind(&post.status)
            .bind(&post.title)
            .bind(&post.slug)
            .bind(post.date)
            .bind(post.author)
            .bind(&post.source_url)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }
        for post in &content.posts {
            sqlx::query("UPDATE posts SET parent_id = $2 WHERE id = $1")
                .bind(post.id)
                .bind(post.parent.filter(|p| *p != 0))
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;

            sqlx::query("DELETE FROM term_relationships WHERE post_id = $1")
                .bind(post.id)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            for term_id in &post.terms {
                sqlx::query(
                    "INSERT INTO term_relationships (post_id, term_id) VALUES ($1, $2) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(post.id)
                .bind(*term_id)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            }
        }

        for comment in &content.comments {
            sqlx::query(
                r#"
                INSERT INTO comments (
                    id, post_id, parent_id, author_name, content, created_at,
                    comment_type, approved
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    post_id = EXCLUDED.post_id,
                    parent_id = EXCLUDED.parent_id,
                    author_name = EXCLUDED.author_name,
                    content = EXCLUDED.content,
                    created_at = EXCLUDED.created_at,
                    comment_type = EXCLUDED.comment_type,
                    approved = EXCLUDED.approved
                "#,
            )
            .bind(comment.id)
            .bind(comment.post_id)
            .bind(comment.parent.filter(|p| *p != 0))
            .bind(&comment.author_name)
            .bind(&comment.content)
            .bind(comment.date)
            .bind(&comment.comment_type)
            .bind(comment.approved)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        let reading = &content.reading;
        let show_on_front = match reading.show_on_front {
            ShowOnFront::Posts => "posts",
            ShowOnFront::Page => "page",
        };
        let options = [
            ("show_on_front", show_on_front.to_string()),
            ("page_on_front", reading.page_on_front.unwrap_or(0).to_string()),
            ("page_for_posts", reading.page_for_posts.unwrap_or(0).to_string()),
        ];
        for (name, value) in options {
            sqlx::query(
                r#"
                INSERT INTO options (name, value) VALUES ($1, $2)
                ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value
                "#,
            )
            .bind(name)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionError(e.to_string()))?;

        let stats = ImportStats {
            posts: content.posts.len() as u64,
            terms: content.terms.len() as u64,
            users: content.users.len() as u64,
            comments: content.comments.len() as u64,
        };
        info!(
            posts = stats.posts,
            terms = stats.terms,
            users = stats.users,
            comments = stats.comments,
            "Content imported"
        );

        Ok(stats)
    }
}

/// Row counts written by [`Database::import`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub posts: u64,
    pub terms: u64,
    pub users: u64,
    pub comments: u64,
}
