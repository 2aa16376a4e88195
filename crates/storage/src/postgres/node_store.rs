//! Single node lookups for PostgreSQL: terms and users. Entries live in
//! `content_repo`.

use sqlx::PgPool;

use folio_core::error::StoreResult;
use folio_core::ports::NodeKey;

use crate::records::{TermRecord, UserRecord, path_segments};

use super::helpers::{Conditions, SqlParam, query_error};

/// A term with its slug path (ancestors then itself).
pub struct TermWithPath {
    pub term: TermRecord,
    pub path: Vec<String>,
}

/// Look up a term of `taxonomy`.
pub async fn find_term(
    pool: &PgPool,
    taxonomy: &str,
    key: &NodeKey,
) -> StoreResult<Option<TermWithPath>> {
    let mut conditions = Conditions::default();
    conditions.bind("t.taxonomy = {}", SqlParam::Text(taxonomy.to_string()));

    let segments = match key {
        NodeKey::Id(id) => {
            conditions.bind("t.id = {}", SqlParam::Int(*id));
            Vec::new()
        }
        NodeKey::Slug(slug) => {
            conditions.bind("t.slug = {}", SqlParam::Text(slug.clone()));
            Vec::new()
        }
        NodeKey::Path(path) => {
            let segments = path_segments(path);
            let Some(slug) = segments.last() else {
                return Ok(None);
            };
            conditions.bind("t.slug = {}", SqlParam::Text(slug.to_string()));
            segments
        }
        NodeKey::SourceUrl(_) => return Ok(None),
    };

    let query = format!(
        r#"
        SELECT t.id, t.taxonomy, t.name, t.slug, t.parent_id, term_path(t.id) AS path
        FROM terms t
        {}
        ORDER BY t.id
        "#,
        conditions.where_sql()
    );

    let rows: Vec<TermRow> = conditions
        .apply(sqlx::query_as::<_, TermRow>(&query))
        .fetch_all(pool)
        .await
        .map_err(query_error)?;

    let mut rows = rows;
    let exact = rows
        .iter()
        .position(|row| !segments.is_empty() && row.path == segments);
    let row = match exact {
        Some(index) => Some(rows.swap_remove(index)),
        None => rows.into_iter().next(),
    };
    Ok(row.map(TermRow::into_term))
}

/// Look up a user by id or nicename.
pub async fn find_user(pool: &PgPool, key: &NodeKey) -> StoreResult<Option<UserRecord>> {
    let mut conditions = Conditions::default();
    match key {
        NodeKey::Id(id) => conditions.bind("id = {}", SqlParam::Int(*id)),
        NodeKey::Slug(slug) | NodeKey::Path(slug) => {
            conditions.bind("nicename = {}", SqlParam::Text(slug.clone()))
        }
        NodeKey::SourceUrl(_) => return Ok(None),
    }

    let query = format!(
        "SELECT id, nicename, display_name FROM users {} LIMIT 1",
        conditions.where_sql()
    );

    let row: Option<(i64, String, String)> = conditions
        .apply(sqlx::query_as(&query))
        .fetch_optional(pool)
        .await
        .map_err(query_error)?;

    Ok(row.map(|(id, nicename, display_name)| UserRecord {
        id,
        nicename,
        display_name,
    }))
}

/// Database row representation for a term.
#[derive(sqlx::FromRow)]
struct TermRow {
    id: i64,
    taxonomy: String,
    name: String,
    slug: String,
    parent_id: Option<i64>,
    path: Vec<String>,
}

impl TermRow {
    fn into_term(self) -> TermWithPath {
        TermWithPath {
            term: TermRecord {
                id: self.id,
                taxonomy: self.taxonomy,
                name: self.name,
                slug: self.slug,
                parent: self.parent_id,
            },
            path: self.path,
        }
    }
}
