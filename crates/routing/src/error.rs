//! Errors raised while building the rule table.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    /// A generated pattern failed to compile.
    #[error("Invalid rewrite rule '{pattern}': {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type RoutingResult<T> = Result<T, RoutingError>;
