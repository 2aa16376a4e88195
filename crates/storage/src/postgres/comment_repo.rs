//! Comment collection for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::trace;

use folio_core::error::StoreResult;
use folio_core::models::Comment;
use folio_core::ports::{
    COMMENT_CONNECTION, CollectionSource, CommentFilter, FetchRequest, PageDirection,
};

use super::helpers::{Conditions, SqlParam, keyset_bound, query_error, scan_order};

/// Approved comments matching a filter, newest first.
pub struct PgCommentSource {
    pool: PgPool,
    filter: CommentFilter,
}

impl PgCommentSource {
    pub fn new(pool: PgPool, filter: CommentFilter) -> Self {
        Self { pool, filter }
    }

    fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::default();
        conditions.raw("c.approved");

        if let Some(comment_type) = &self.filter.comment_type {
            conditions.bind("c.comment_type = {}", SqlParam::Text(comment_type.clone()));
        }
        if !self.filter.comment_type_in.is_empty() {
            conditions.bind(
                "c.comment_type = ANY({})",
                SqlParam::TextList(self.filter.comment_type_in.clone()),
            );
        }
        if !self.filter.comment_type_not_in.is_empty() {
            conditions.bind(
                "NOT (c.comment_type = ANY({}))",
                SqlParam::TextList(self.filter.comment_type_not_in.clone()),
            );
        }
        if let Some(content_id) = self.filter.content_id {
            conditions.bind("c.post_id = {}", SqlParam::Int(content_id));
        }
        if let Some(parent) = self.filter.parent {
            conditions.bind("COALESCE(c.parent_id, 0) = {}", SqlParam::Int(parent));
        }
        conditions
    }
}

#[async_trait]
impl CollectionSource for PgCommentSource {
    type Item = Comment;
    type Key = i64;

    fn connection_tag(&self) -> &str {
        COMMENT_CONNECTION
    }

    fn order_key(&self, item: &Comment) -> i64 {
        item.database_id
    }

    async fn fetch(&self, request: FetchRequest<i64>) -> StoreResult<Vec<Comment>> {
        let mut conditions = self.conditions();
        if let Some(after) = request.after {
            conditions.bind(
                &keyset_bound("comments", "c", "created_at", PageDirection::Forward),
                SqlParam::Int(after),
            );
        }
        if let Some(before) = request.before {
            conditions.bind(
                &keyset_bound("comments", "c", "created_at", PageDirection::Backward),
                SqlParam::Int(before),
            );
        }

        let order = scan_order(request.direction);
        let query = format!(
            r#"
            SELECT c.id, c.post_id, c.parent_id, c.author_name, c.content,
                   c.created_at, c.comment_type, c.approved
            FROM comments c
            {}
            ORDER BY c.created_at {order}, c.id {order}
            LIMIT {}
            "#,
            conditions.where_sql(),
            request.limit,
            order = order,
        );
        trace!(%query, "Fetching comments");

        let rows: Vec<CommentRow> = conditions
            .apply(sqlx::query_as::<_, CommentRow>(&query))
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn exists_beyond(&self, bound: &i64, direction: PageDirection) -> StoreResult<bool> {
        let mut conditions = self.conditions();
        conditions.bind(
            &keyset_bound("comments", "c", "created_at", direction),
            SqlParam::Int(*bound),
        );

        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM comments c {} LIMIT 1)",
            conditions.where_sql()
        );

        conditions
            .apply_scalar(sqlx::query_scalar::<_, bool>(&query))
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)
    }
}

/// Database row representation for Comment.
#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    parent_id: Option<i64>,
    author_name: String,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
    comment_type: String,
    approved: bool,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            database_id: self.id,
            content_id: self.post_id,
            parent_database_id: self.parent_id.filter(|p| *p != 0),
            author_name: self.author_name,
            content: self.content,
            date: self.created_at,
            comment_type: self.comment_type,
            approved: self.approved,
        }
    }
}
