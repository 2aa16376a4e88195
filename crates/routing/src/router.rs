//! [`Router`] implementation backed by the generated rule table.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use folio_core::models::SiteConfig;
use folio_core::ports::{NormalizedPath, QueryVars, RouteMatch, Router};

use crate::error::RoutingResult;
use crate::rules::RuleTable;

/// Public query variables understood without rewrite rules.
const PUBLIC_QUERY_VARS: &[&str] = &[
    "p",
    "page_id",
    "attachment_id",
    "name",
    "pagename",
    "post_type",
    "cat",
    "category_name",
    "tag",
    "tag_id",
    "taxonomy",
    "term",
    "author",
    "author_name",
    "year",
    "monthnum",
    "day",
];

/// Routes paths with rewrite rules, or query strings on plain sites.
///
/// The table is a snapshot of the site configuration at construction;
/// build a new router when registrations change.
#[derive(Debug, Clone)]
pub struct RewriteRouter {
    pretty: bool,
    rules: RuleTable,
    query_vars: BTreeSet<String>,
}

impl RewriteRouter {
    pub fn new(site: &SiteConfig) -> RoutingResult<Self> {
        let pretty = site.uses_pretty_permalinks();
        let rules = if pretty {
            RuleTable::generate(site)?
        } else {
            RuleTable::default()
        };

        let query_vars = PUBLIC_QUERY_VARS
            .iter()
            .map(|v| v.to_string())
            .chain(
                site.post_types
                    .iter()
                    .filter(|p| p.public && !p.is_builtin())
                    .map(|p| p.query_var().to_string()),
            )
            .chain(
                site.taxonomies
                    .iter()
                    .filter(|t| !t.is_builtin())
                    .map(|t| t.query_var().to_string()),
            )
            .collect();

        debug!(pretty, rules = rules.len(), "Rewrite rules generated");
        Ok(Self {
            pretty,
            rules,
            query_vars,
        })
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Keep only recognised query variables.
    fn match_query(&self, query: &[(String, String)]) -> Option<RouteMatch> {
        let query_vars: QueryVars = query
            .iter()
            .filter(|(name, _)| self.query_vars.contains(name))
            .cloned()
            .collect();
        if query_vars.is_empty() {
            return None;
        }
        Some(RouteMatch {
            matched_rule: None,
            query_vars,
        })
    }
}

impl Router for RewriteRouter {
    fn uses_pretty_paths(&self) -> bool {
        self.pretty
    }

    fn match_path(&self, path: &NormalizedPath) -> Option<RouteMatch> {
        if !self.pretty || path.path.is_empty() {
            return self.match_query(&path.query);
        }
        let route = self.rules.find(&path.path);
        trace!(path = %path.path, rule = ?route.as_ref().and_then(|r| r.matched_rule.as_deref()), "Matched path");
        route
    }
}

#[cfg(test)]
mod tests {
    use folio_core::models::{PostTypeObject, TaxonomyObject};
    use url::Url;

    use super::*;

    fn site(structure: &str) -> SiteConfig {
        let mut site = SiteConfig::new(Url::parse("http://localhost").unwrap())
            .with_permalinks(structure);
        site.register_post_type(PostTypeObject::new(
            "by_uri_cpt",
            "CustomType",
            "CustomTypes",
        ));
        site.register_post_type(
            PostTypeObject::new("test_hierarchical", "testHierarchical", "testHierarchicals")
                .hierarchical()
                .with_archive(),
        );
        site.register_taxonomy(
            TaxonomyObject::new("by_uri_tax", "CustomTax", "CustomTaxes")
                .for_types(&["by_uri_cpt"]),
        );
        site
    }

    fn path(path: &str) -> NormalizedPath {
        NormalizedPath {
            path: path.to_string(),
            query: Vec::new(),
        }
    }

    fn vars(route: Option<RouteMatch>) -> Vec<(String, String)> {
        route
            .map(|r| r.query_vars.into_iter().collect())
            .unwrap_or_default()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_date_permalinks() {
        let router = RewriteRouter::new(&site("/%year%/%monthnum%/%day%/%postname%/")).unwrap();
        assert!(router.uses_pretty_paths());
        assert_eq!(
            vars(router.match_path(&path("2024/05/03/hello"))),
            vec![
                pair("day", "03"),
                pair("monthnum", "05"),
                pair("name", "hello"),
                pair("year", "2024"),
            ]
        );
    }

    #[test]
    fn test_custom_types_and_taxonomies() {
        let router = RewriteRouter::new(&site("/%year%/%monthnum%/%day%/%postname%/")).unwrap();
        assert_eq!(
            vars(router.match_path(&path("by_uri_cpt/test"))),
            vec![pair("by_uri_cpt", "test")]
        );
        assert_eq!(
            vars(router.match_path(&path("by_uri_tax/my-term"))),
            vec![pair("by_uri_tax", "my-term")]
        );
        // Test critique: le chemin hiérarchique complet est conservé
        assert_eq!(
            vars(router.match_path(&path("test_hierarchical/parent/child"))),
            vec![pair("test_hierarchical", "parent/child")]
        );
        assert_eq!(
            vars(router.match_path(&path("test_hierarchical"))),
            vec![pair("post_type", "test_hierarchical")]
        );
    }

    #[test]
    fn test_builtin_archives() {
        let router = RewriteRouter::new(&site("/%year%/%monthnum%/%day%/%postname%/")).unwrap();
        assert_eq!(
            vars(router.match_path(&path("category/news/local"))),
            vec![pair("category_name", "news/local")]
        );
        assert_eq!(
            vars(router.match_path(&path("tag/rust"))),
            vec![pair("tag", "rust")]
        );
        assert_eq!(
            vars(router.match_path(&path("author/admin"))),
            vec![pair("author_name", "admin")]
        );
    }

    #[test]
    fn test_pages_are_the_catch_all() {
        let router = RewriteRouter::new(&site("/%year%/%monthnum%/%day%/%postname%/")).unwrap();
        let route = router.match_path(&path("parent/child")).unwrap();
        assert_eq!(route.matched_rule.as_deref(), Some("^(.+?)/?$"));
        assert_eq!(
            route.query_vars.get("pagename").map(String::as_str),
            Some("parent/child")
        );
    }

    #[test]
    fn test_postname_structure_merges_page_and_post() {
        let router = RewriteRouter::new(&site("/%postname%/")).unwrap();
        assert_eq!(
            vars(router.match_path(&path("hello"))),
            vec![pair("name", "hello"), pair("pagename", "hello")]
        );
        // Un chemin imbriqué ne peut être qu'une page
        assert_eq!(
            vars(router.match_path(&path("parent/child"))),
            vec![pair("pagename", "parent/child")]
        );
        // Les règles spécifiques passent toujours avant les pages
        assert_eq!(
            vars(router.match_path(&path("category/news"))),
            vec![pair("category_name", "news")]
        );
    }

    #[test]
    fn test_rewrite_slug_is_escaped() {
        let mut site = site("/%postname%/");
        site.register_post_type(
            PostTypeObject::new("release", "Release", "Releases").with_rewrite_slug("v1.0"),
        );
        let router = RewriteRouter::new(&site).unwrap();
        assert_eq!(
            vars(router.match_path(&path("v1.0/beta"))),
            vec![pair("release", "beta")]
        );
        assert!(!vars(router.match_path(&path("v1x0/beta"))).contains(&pair("release", "beta")));
    }

    #[test]
    fn test_plain_mode_keeps_recognised_vars() {
        let router = RewriteRouter::new(&site("")).unwrap();
        assert!(!router.uses_pretty_paths());
        assert!(router.rules().is_empty());

        let request = NormalizedPath {
            path: String::new(),
            query: vec![pair("p", "5"), pair("utm_source", "mail")],
        };
        assert_eq!(vars(router.match_path(&request)), vec![pair("p", "5")]);

        let request = NormalizedPath {
            path: String::new(),
            query: vec![pair("by_uri_tax", "term")],
        };
        assert_eq!(vars(router.match_path(&request)), vec![pair("by_uri_tax", "term")]);

        let request = NormalizedPath {
            path: "about".to_string(),
            query: vec![pair("utm_source", "mail")],
        };
        assert!(router.match_path(&request).is_none());
    }

    #[test]
    fn test_pretty_root_reads_query() {
        let router = RewriteRouter::new(&site("/%postname%/")).unwrap();
        let request = NormalizedPath {
            path: String::new(),
            query: vec![pair("attachment_id", "9")],
        };
        let route = router.match_path(&request).unwrap();
        assert_eq!(route.matched_rule, None);
        assert_eq!(vars(Some(route)), vec![pair("attachment_id", "9")]);
    }
}
