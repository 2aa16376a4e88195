//! # Folio Routing
//!
//! Routing collaborator for URI resolution.
//!
//! With pretty permalinks, a rewrite-rule table is generated from the
//! permalink structure and the registered content types and taxonomies
//! (see [`RuleTable::generate`] for the order). With plain permalinks
//! only the recognised public query variables of the request are kept.
//!
//! ```ignore
//! let router = RewriteRouter::new(&site)?;
//! let resolver = NodeResolver::new(site, store, Arc::new(router));
//! ```

pub mod error;
pub mod router;
pub mod rules;

pub use error::{RoutingError, RoutingResult};
pub use router::RewriteRouter;
pub use rules::{RewriteRule, RuleTable, VarSource};
