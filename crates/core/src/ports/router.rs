//! Port traits for the routing collaborator and request hooks.

use std::collections::BTreeMap;

/// A request path after normalization.
///
/// `path` has no leading or trailing slash and no home sub-directory.
/// With pretty routing active `query` is only kept on the root path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPath {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl NormalizedPath {
    /// Whether this addresses the site root.
    pub fn is_root(&self) -> bool {
        self.path.is_empty() && self.query.is_empty()
    }
}

/// Query variables produced by routing.
pub type QueryVars = BTreeMap<String, String>;

/// Result of matching a path against the rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    /// Pattern of the rule that matched (`None` for query-var routing).
    pub matched_rule: Option<String>,
    pub query_vars: QueryVars,
}

/// Rule-based path matcher. Owns its rule table.
pub trait Router: Send + Sync {
    /// Whether path-based (pretty) routing is active.
    fn uses_pretty_paths(&self) -> bool;

    /// Match a normalized path.
    fn match_path(&self, path: &NormalizedPath) -> Option<RouteMatch>;
}

/// Routing context exposed to hooks while a resolution is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Normalized request path.
    pub request: String,
    pub matched_rule: Option<String>,
    pub query_vars: QueryVars,
}

/// Observer notified after routing and before materialization.
///
/// Fire-and-forget: the resolver ignores whatever a hook does.
pub trait RequestHook: Send + Sync {
    fn on_parse_request(&self, context: &RequestContext);
}
