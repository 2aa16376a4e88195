//! Shared helpers for dynamic SQL and row conversion.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{QueryAs, QueryScalar};

use folio_core::error::StoreError;
use folio_core::ports::PageDirection;

/// A bound value of a dynamic query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    TextList(Vec<String>),
}

/// WHERE clause built from hardcoded fragments and positional parameters.
///
/// Fragments are always written in this crate; user input only ever
/// reaches the query as a bound parameter. A `{}` in a fragment marks
/// where its placeholder (`$n`) goes.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl Conditions {
    /// Add a fragment without parameters.
    pub fn raw(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    /// Add a fragment with one parameter.
    pub fn bind(&mut self, clause: &str, param: SqlParam) {
        self.params.push(param);
        let placeholder = format!("${}", self.params.len());
        self.clauses.push(clause.replace("{}", &placeholder));
    }

    /// `WHERE a AND b`, or an empty string.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn apply<'q, O>(
        &'q self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for param in &self.params {
            query = match param {
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.as_str()),
                SqlParam::TextList(v) => query.bind(v.as_slice()),
            };
        }
        query
    }

    pub fn apply_scalar<'q, O>(
        &'q self,
        mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for param in &self.params {
            query = match param {
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.as_str()),
                SqlParam::TextList(v) => query.bind(v.as_slice()),
            };
        }
        query
    }
}

/// Keyset bound against the cursor row.
///
/// Natural order is `(sort, id)` descending, so "after" in natural order
/// means strictly smaller. The cursor row is looked up by id; when it no
/// longer exists the comparison is NULL and nothing matches.
pub fn keyset_bound(table: &str, alias: &str, sort: &str, beyond: PageDirection) -> String {
    let op = match beyond {
        PageDirection::Forward => "<",
        PageDirection::Backward => ">",
    };
    format!(
        "({alias}.{sort}, {alias}.id) {op} (SELECT {sort}, id FROM {table} WHERE id = {{}})",
        alias = alias,
        sort = sort,
        op = op,
        table = table,
    )
}

/// SQL sort keyword for a scan direction over a descending natural order.
pub fn scan_order(direction: PageDirection) -> &'static str {
    match direction {
        PageDirection::Forward => "DESC",
        PageDirection::Backward => "ASC",
    }
}

pub fn query_error(e: sqlx::Error) -> StoreError {
    StoreError::QueryError(e.to_string())
}
