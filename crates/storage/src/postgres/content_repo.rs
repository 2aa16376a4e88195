//! Content entries for PostgreSQL: the per-type collection and the single
//! entry lookups used by URI resolution.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::trace;

use folio_core::error::StoreResult;
use folio_core::models::{ContentNode, ReadingSettings, SiteConfig};
use folio_core::ports::{
    CONTENT_CONNECTION, CollectionSource, ContentFilter, FetchRequest, NodeKey, PageDirection,
};

use crate::records::{ContentContext, NodeBuilder, PostRecord, path_segments};

use super::helpers::{Conditions, SqlParam, keyset_bound, query_error, scan_order};
use super::options::load_reading_settings;

/// Entry columns plus everything its canonical URI needs.
const POST_SELECT: &str = r#"
    SELECT p.id, p.post_type, p.status, p.title, p.slug, p.published_at,
           p.parent_id, p.author_id, p.source_url,
           u.nicename AS author_nicename,
           post_ancestors(p.id) AS ancestors,
           (
               SELECT array_to_string(term_path(t.id), '/')
               FROM term_relationships tr
               JOIN terms t ON t.id = tr.term_id
               WHERE tr.post_id = p.id AND t.taxonomy = 'category'
               ORDER BY t.id
               LIMIT 1
           ) AS category_path
    FROM posts p
    LEFT JOIN users u ON u.id = p.author_id
"#;

/// Visibility rule shared by every entry query.
const PUBLISHED: &str =
    "(p.status = 'publish' OR (p.post_type = 'attachment' AND p.status = 'inherit'))";

/// Published entries of one type, newest first.
pub struct PgContentSource {
    pool: PgPool,
    site: Arc<SiteConfig>,
    filter: ContentFilter,
}

impl PgContentSource {
    pub fn new(pool: PgPool, site: Arc<SiteConfig>, filter: ContentFilter) -> Self {
        Self { pool, site, filter }
    }

    fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::default();
        conditions.raw(PUBLISHED);
        conditions.bind(
            "p.post_type = {}",
            SqlParam::Text(self.filter.post_type.clone()),
        );
        if let Some(parent) = self.filter.parent {
            conditions.bind("COALESCE(p.parent_id, 0) = {}", SqlParam::Int(parent));
        }
        conditions
    }
}

#[async_trait]
impl CollectionSource for PgContentSource {
    type Item = ContentNode;
    type Key = i64;

    fn connection_tag(&self) -> &str {
        CONTENT_CONNECTION
    }

    fn order_key(&self, item: &ContentNode) -> i64 {
        item.database_id
    }

    async fn fetch(&self, request: FetchRequest<i64>) -> StoreResult<Vec<ContentNode>> {
        let routable = self
            .site
            .post_type(&self.filter.post_type)
            .is_some_and(|pt| pt.public);
        if !routable {
            return Ok(Vec::new());
        }

        let mut conditions = self.conditions();
        if let Some(after) = request.after {
            conditions.bind(
                &keyset_bound("posts", "p", "published_at", PageDirection::Forward),
                SqlParam::Int(after),
            );
        }
        if let Some(before) = request.before {
            conditions.bind(
                &keyset_bound("posts", "p", "published_at", PageDirection::Backward),
                SqlParam::Int(before),
            );
        }

        let order = scan_order(request.direction);
        let query = format!(
            "{} {} ORDER BY p.published_at {order}, p.id {order} LIMIT {}",
            POST_SELECT,
            conditions.where_sql(),
            request.limit,
            order = order,
        );
        trace!(%query, "Fetching content nodes");

        let rows = fetch_posts(&self.pool, &query, &conditions).await?;
        let reading = load_reading_settings(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_node(&self.site, &reading))
            .collect())
    }

    async fn exists_beyond(&self, bound: &i64, direction: PageDirection) -> StoreResult<bool> {
        let mut conditions = self.conditions();
        conditions.bind(
            &keyset_bound("posts", "p", "published_at", direction),
            SqlParam::Int(*bound),
        );

        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM posts p {} LIMIT 1)",
            conditions.where_sql()
        );

        conditions
            .apply_scalar(sqlx::query_scalar::<_, bool>(&query))
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)
    }
}

/// Look up one published entry of `post_type` (any type when `None`).
pub async fn find_post(
    pool: &PgPool,
    post_type: Option<&str>,
    key: &NodeKey,
) -> StoreResult<Option<PostRow>> {
    let mut conditions = Conditions::default();
    conditions.raw(PUBLISHED);
    if let Some(post_type) = post_type {
        conditions.bind("p.post_type = {}", SqlParam::Text(post_type.to_string()));
    }

    let segments = match key {
        NodeKey::Id(id) => {
            conditions.bind("p.id = {}", SqlParam::Int(*id));
            Vec::new()
        }
        NodeKey::Slug(slug) => {
            conditions.bind("p.slug = {}", SqlParam::Text(slug.clone()));
            Vec::new()
        }
        NodeKey::SourceUrl(url) => {
            conditions.bind("p.source_url = {}", SqlParam::Text(url.clone()));
            Vec::new()
        }
        NodeKey::Path(path) => {
            let segments = path_segments(path);
            let Some(slug) = segments.last() else {
                return Ok(None);
            };
            conditions.bind("p.slug = {}", SqlParam::Text(slug.to_string()));
            segments
        }
    };

    let query = format!("{} {} ORDER BY p.id", POST_SELECT, conditions.where_sql());
    let rows = fetch_posts(pool, &query, &conditions).await?;

    // Prefer the exact chain; otherwise the slug alone decides
    let exact = rows.iter().position(|row| {
        !segments.is_empty()
            && row.ancestors.len() + 1 == segments.len()
            && row
                .ancestors
                .iter()
                .chain(std::iter::once(&row.slug))
                .zip(&segments)
                .all(|(a, b)| a.as_str() == *b)
    });
    let mut rows = rows;
    Ok(match exact {
        Some(index) => Some(rows.swap_remove(index)),
        None => rows.into_iter().next(),
    })
}

async fn fetch_posts(
    pool: &PgPool,
    query: &str,
    conditions: &Conditions,
) -> StoreResult<Vec<PostRow>> {
    conditions
        .apply(sqlx::query_as::<_, PostRow>(query))
        .fetch_all(pool)
        .await
        .map_err(query_error)
}

/// Database row representation for an entry.
#[derive(sqlx::FromRow)]
pub struct PostRow {
    id: i64,
    post_type: String,
    status: String,
    title: String,
    slug: String,
    published_at: DateTime<Utc>,
    parent_id: Option<i64>,
    author_id: Option<i64>,
    source_url: Option<String>,
    author_nicename: Option<String>,
    ancestors: Vec<String>,
    category_path: Option<String>,
}

impl PostRow {
    pub fn is_routable(&self, site: &SiteConfig) -> bool {
        site.post_type(&self.post_type).is_some_and(|pt| pt.public)
    }

    pub fn into_node(self, site: &SiteConfig, reading: &ReadingSettings) -> ContentNode {
        let record = PostRecord {
            id: self.id,
            post_type: self.post_type,
            status: self.status,
            title: self.title,
            slug: self.slug,
            date: self.published_at,
            parent: self.parent_id,
            author: self.author_id,
            terms: Vec::new(),
            source_url: self.source_url,
        };
        NodeBuilder::new(site, reading).content(
            &record,
            &ContentContext {
                ancestors: &self.ancestors,
                category: self.category_path.as_deref(),
                author: self.author_nicename.as_deref(),
            },
        )
    }
}
