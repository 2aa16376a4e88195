//! URI to node resolution.
//!
//! Given any URI string, decide whether it belongs to this site and which
//! single node it addresses. Routing is delegated to a [`Router`], lookups
//! to a [`NodeStore`]; this service owns the ordering rules between them.

use std::sync::Arc;

use tracing::{debug, instrument, trace};
use url::Url;

use crate::error::{PathError, ResolveResult};
use crate::metrics::{ResolutionTimer, record_uri_resolution};
use crate::models::{ContentTypeNode, Node, SiteConfig};
use crate::ports::{
    NodeKey, NodeKind, NodeStore, NormalizedPath, QueryVars, RequestContext, RequestHook, Router,
};

/// Outcome of one resolution, before it is flattened for callers.
enum Resolution {
    Found(Node),
    NotFound,
    Foreign,
}

/// Lookup selected from routing query variables.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Node { kind: NodeKind, key: NodeKey },
    Archive(String),
}

/// Resolves URIs into nodes.
///
/// Holds only shared read-only collaborators, so one instance serves
/// concurrent requests.
#[derive(Clone)]
pub struct NodeResolver {
    site: Arc<SiteConfig>,
    store: Arc<dyn NodeStore>,
    router: Arc<dyn Router>,
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl NodeResolver {
    pub fn new(site: Arc<SiteConfig>, store: Arc<dyn NodeStore>, router: Arc<dyn Router>) -> Self {
        Self {
            site,
            store,
            router,
            hooks: Vec::new(),
        }
    }

    /// Register an observer of the routing context.
    pub fn with_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Resolve `uri` to the node it addresses.
    ///
    /// `Ok(None)` covers foreign hosts, unknown paths and paths that only
    /// partially match a hierarchical entry.
    #[instrument(skip(self))]
    pub async fn resolve_by_uri(&self, uri: &str) -> ResolveResult<Option<Node>> {
        let _timer = ResolutionTimer::new();
        let result = self.resolve(uri).await;

        let outcome = match &result {
            Ok(Resolution::Found(_)) => "node",
            Ok(Resolution::NotFound) => "none",
            Ok(Resolution::Foreign) => "external",
            Err(_) => "error",
        };
        record_uri_resolution(outcome);
        debug!(outcome, "URI resolved");

        result.map(|resolution| match resolution {
            Resolution::Found(node) => Some(node),
            Resolution::NotFound | Resolution::Foreign => None,
        })
    }

    /// Look up an attachment by its file URL.
    #[instrument(skip(self))]
    pub async fn resolve_media_by_source_url(&self, source_url: &str) -> ResolveResult<Option<Node>> {
        let url = self.parse(source_url)?;
        if !self.owns(&url) {
            return Ok(None);
        }
        let kind = NodeKind::Content(Some("attachment".to_string()));
        let key = NodeKey::SourceUrl(source_url.trim().to_string());
        Ok(self.store.materialize(&kind, &key).await?)
    }

    /// Look up a published entry of `post_type` by database id.
    pub async fn resolve_content_by_id(
        &self,
        post_type: &str,
        id: i64,
    ) -> ResolveResult<Option<Node>> {
        let kind = NodeKind::Content(Some(post_type.to_string()));
        Ok(self.store.materialize(&kind, &NodeKey::Id(id)).await?)
    }

    /// Normalize a URI the way resolution does.
    ///
    /// Returns `Ok(None)` when the URI is not owned by this site.
    pub fn normalize(&self, uri: &str) -> Result<Option<NormalizedPath>, PathError> {
        let url = self.parse(uri)?;
        Ok(self.normalize_url(&url))
    }

    async fn resolve(&self, uri: &str) -> ResolveResult<Resolution> {
        let Some(path) = self.normalize(uri)? else {
            trace!("URI not owned by this site");
            return Ok(Resolution::Foreign);
        };

        if path.is_root() {
            return self.resolve_front_page().await;
        }

        let route = self.router.match_path(&path);
        let context = RequestContext {
            request: path.path.clone(),
            matched_rule: route.as_ref().and_then(|r| r.matched_rule.clone()),
            query_vars: route
                .as_ref()
                .map(|r| r.query_vars.clone())
                .unwrap_or_default(),
        };
        for hook in &self.hooks {
            hook.on_parse_request(&context);
        }

        let Some(route) = route else {
            // Unrecognized query strings on the root still address the home page
            if path.path.is_empty() {
                return self.resolve_front_page().await;
            }
            return Ok(Resolution::NotFound);
        };

        // A path rule only addresses nodes whose canonical URI is that path
        let exact = route.matched_rule.is_some();
        let lookups = self.lookups_for(&route.query_vars);
        for lookup in lookups {
            trace!(?lookup, "Trying lookup");
            if let Some(node) = self.materialize(lookup, &path, exact).await? {
                return Ok(Resolution::Found(node));
            }
        }
        Ok(Resolution::NotFound)
    }

    async fn materialize(
        &self,
        lookup: Lookup,
        path: &NormalizedPath,
        exact: bool,
    ) -> ResolveResult<Option<Node>> {
        match lookup {
            Lookup::Node { kind, key } => {
                let Some(node) = self.store.materialize(&kind, &key).await? else {
                    return Ok(None);
                };
                let must_match = exact || matches!(key, NodeKey::Path(_));
                if must_match && !self.is_canonical(&node, path) {
                    debug!(uri = node.uri(), "Non-canonical path rejected");
                    return Ok(None);
                }
                Ok(Some(node))
            }
            Lookup::Archive(name) => Ok(self
                .site
                .post_type(&name)
                .filter(|pt| pt.has_archive && pt.public)
                .map(|pt| {
                    Node::ContentType(ContentTypeNode::listing(
                        pt,
                        self.site.archive_uri(pt),
                        false,
                        false,
                    ))
                })),
        }
    }

    async fn resolve_front_page(&self) -> ResolveResult<Resolution> {
        let settings = self.store.reading_settings().await?;

        if let Some(page_id) = settings.static_front_page() {
            let kind = NodeKind::Content(Some("page".to_string()));
            if let Some(page) = self.store.materialize(&kind, &NodeKey::Id(page_id)).await? {
                return Ok(Resolution::Found(page));
            }
            debug!(page_id, "Front page missing, falling back to posts listing");
        }

        let Some(posts) = self.site.post_type("post") else {
            return Ok(Resolution::NotFound);
        };
        let listing = ContentTypeNode::listing(
            posts,
            self.site.root_uri(),
            true,
            settings.posts_page().is_none(),
        );
        Ok(Resolution::Found(Node::ContentType(listing)))
    }

    fn parse(&self, uri: &str) -> Result<Url, PathError> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let home = &self.site.home_url;
        let parsed = if let Some(rest) = trimmed.strip_prefix("//") {
            Url::parse(&format!("{}://{}", home.scheme(), rest))
        } else {
            match Url::parse(trimmed) {
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    if trimmed.starts_with('/') || trimmed.starts_with('?') {
                        home.join(trimmed)
                    } else {
                        home.join(&format!("/{}", trimmed))
                    }
                }
                other => other,
            }
        };

        parsed.map_err(|e| PathError::Malformed {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
    }

    fn owns(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let home = &self.site.home_url;
        let same_host = match (url.host_str(), home.host_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        same_host && url.port() == home.port()
    }

    fn normalize_url(&self, url: &Url) -> Option<NormalizedPath> {
        if !self.owns(url) {
            return None;
        }

        let home_path = self.site.home_path();
        let relative = url.path().strip_prefix(home_path)?;
        if !relative.is_empty() && !relative.starts_with('/') {
            return None;
        }

        let path = relative.trim_matches('/').to_string();
        // Pretty paths ignore the query string, except on the root
        let query = if self.router.uses_pretty_paths() && !path.is_empty() {
            Vec::new()
        } else {
            url.query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        };

        Some(NormalizedPath { path, query })
    }

    /// Whether `node`'s canonical URI addresses exactly `path`.
    fn is_canonical(&self, node: &Node, path: &NormalizedPath) -> bool {
        let Some(canonical) = node.uri().and_then(|uri| self.normalize(uri).ok().flatten()) else {
            return false;
        };
        canonical.path == path.path && canonical.query.iter().all(|pair| path.query.contains(pair))
    }

    /// Candidate lookups, most specific first.
    ///
    /// Several candidates appear when a rule yields overlapping vars, e.g.
    /// a page path that may also be a post name.
    fn lookups_for(&self, vars: &QueryVars) -> Vec<Lookup> {
        let get = |key: &str| vars.get(key).map(String::as_str).filter(|v| !v.is_empty());
        let id = |key: &str| get(key).and_then(|v| v.parse::<i64>().ok());
        let content = |post_type: &str, key: NodeKey| Lookup::Node {
            kind: NodeKind::Content(Some(post_type.to_string())),
            key,
        };
        let term = |taxonomy: &str, key: NodeKey| Lookup::Node {
            kind: NodeKind::Term(taxonomy.to_string()),
            key,
        };
        let post_type = get("post_type");
        let mut lookups = Vec::new();

        if let Some(id) = id("attachment_id") {
            lookups.push(content("attachment", NodeKey::Id(id)));
        }
        if let Some(id) = id("p") {
            lookups.push(Lookup::Node {
                kind: NodeKind::Content(post_type.map(str::to_string)),
                key: NodeKey::Id(id),
            });
        }
        if let Some(id) = id("page_id") {
            lookups.push(content("page", NodeKey::Id(id)));
        }
        if let Some(path) = get("pagename") {
            lookups.push(content("page", NodeKey::Path(path.to_string())));
        }
        for pt in self.site.post_types.iter().filter(|p| p.public && !p.is_builtin()) {
            if let Some(value) = get(pt.query_var()) {
                let key = if pt.hierarchical {
                    NodeKey::Path(value.to_string())
                } else {
                    NodeKey::Slug(value.to_string())
                };
                lookups.push(content(&pt.name, key));
            }
        }
        if let Some(slug) = get("name") {
            lookups.push(content(post_type.unwrap_or("post"), NodeKey::Slug(slug.to_string())));
        }
        if let Some(id) = id("cat") {
            lookups.push(term("category", NodeKey::Id(id)));
        }
        if let Some(path) = get("category_name") {
            lookups.push(term("category", NodeKey::Path(path.to_string())));
        }
        if let Some(slug) = get("tag") {
            lookups.push(term("post_tag", NodeKey::Slug(slug.to_string())));
        }
        if let Some(id) = id("tag_id") {
            lookups.push(term("post_tag", NodeKey::Id(id)));
        }
        for tax in self.site.taxonomies.iter().filter(|t| !t.is_builtin()) {
            if let Some(value) = get(tax.query_var()) {
                let key = if tax.hierarchical {
                    NodeKey::Path(value.to_string())
                } else {
                    NodeKey::Slug(value.to_string())
                };
                lookups.push(term(&tax.name, key));
            }
        }
        if let (Some(taxonomy), Some(slug)) = (get("taxonomy"), get("term")) {
            lookups.push(term(taxonomy, NodeKey::Slug(slug.to_string())));
        }
        if let Some(id) = id("author") {
            lookups.push(Lookup::Node {
                kind: NodeKind::User,
                key: NodeKey::Id(id),
            });
        }
        if let Some(slug) = get("author_name") {
            lookups.push(Lookup::Node {
                kind: NodeKind::User,
                key: NodeKey::Slug(slug.to_string()),
            });
        }
        if lookups.is_empty() {
            if let Some(name) = post_type {
                lookups.push(Lookup::Archive(name.to_string()));
            }
        }
        lookups
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::{ResolveError, StoreError, StoreResult};
    use crate::models::{ContentNode, PostTypeObject, ReadingSettings, ShowOnFront};
    use crate::ports::RouteMatch;

    /// Store keyed by (kind, key).
    #[derive(Default)]
    struct MockStore {
        nodes: HashMap<(String, String), Node>,
        settings: ReadingSettings,
        lookups: Mutex<Vec<(NodeKind, NodeKey)>>,
        fail: bool,
    }

    impl MockStore {
        fn insert(&mut self, kind: NodeKind, key: NodeKey, node: Node) {
            self.nodes
                .insert((format!("{:?}", kind), format!("{:?}", key)), node);
        }
    }

    #[async_trait]
    impl NodeStore for MockStore {
        async fn materialize(&self, kind: &NodeKind, key: &NodeKey) -> StoreResult<Option<Node>> {
            if self.fail {
                return Err(StoreError::ConnectionError("gone".into()));
            }
            self.lookups.lock().unwrap().push((kind.clone(), key.clone()));
            Ok(self
                .nodes
                .get(&(format!("{:?}", kind), format!("{:?}", key)))
                .cloned())
        }

        async fn reading_settings(&self) -> StoreResult<ReadingSettings> {
            Ok(self.settings)
        }
    }

    /// Router mapping exact paths to query vars.
    struct MockRouter {
        pretty: bool,
        routes: HashMap<String, Vec<(&'static str, String)>>,
    }

    impl Router for MockRouter {
        fn uses_pretty_paths(&self) -> bool {
            self.pretty
        }

        fn match_path(&self, path: &NormalizedPath) -> Option<RouteMatch> {
            if !self.pretty {
                let vars: QueryVars = path.query.iter().cloned().collect();
                return (!vars.is_empty()).then(|| RouteMatch {
                    matched_rule: None,
                    query_vars: vars,
                });
            }
            self.routes.get(&path.path).map(|vars| RouteMatch {
                matched_rule: Some(format!("^{}/?$", path.path)),
                query_vars: vars.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingHook {
        seen: Mutex<Vec<RequestContext>>,
    }

    impl RequestHook for RecordingHook {
        fn on_parse_request(&self, context: &RequestContext) {
            self.seen.lock().unwrap().push(context.clone());
        }
    }

    fn page(id: i64, slug: &str, uri: &str) -> Node {
        Node::Content(ContentNode {
            database_id: id,
            post_type: "page".into(),
            type_name: "Page".into(),
            title: slug.into(),
            slug: slug.into(),
            date: Utc::now(),
            parent_database_id: None,
            author_database_id: None,
            uri: uri.into(),
            source_url: None,
            is_front_page: false,
            is_posts_page: false,
        })
    }

    fn site() -> Arc<SiteConfig> {
        let mut site = SiteConfig::new(Url::parse("https://example.org").unwrap())
            .with_permalinks("/%postname%/");
        site.register_post_type(
            PostTypeObject::new("book", "Book", "Books").with_archive(),
        );
        Arc::new(site)
    }

    /// One query var per route: `(path, var, value)`.
    fn router(routes: &[(&str, &'static str, &str)]) -> Arc<MockRouter> {
        Arc::new(MockRouter {
            pretty: true,
            routes: routes
                .iter()
                .map(|(path, var, value)| (path.to_string(), vec![(*var, value.to_string())]))
                .collect(),
        })
    }

    fn resolver(store: MockStore, router: Arc<MockRouter>) -> NodeResolver {
        NodeResolver::new(site(), Arc::new(store), router)
    }

    #[tokio::test]
    async fn test_foreign_host_is_none() {
        let resolver = resolver(MockStore::default(), router(&[]));
        let node = resolver
            .resolve_by_uri("https://external-domain.com/about")
            .await
            .unwrap();
        assert_eq!(node, None);
        let node = resolver.resolve_by_uri("mailto:someone@example.org").await.unwrap();
        assert_eq!(node, None);
    }

    #[tokio::test]
    async fn test_empty_and_malformed_uris_error() {
        let resolver = resolver(MockStore::default(), router(&[]));
        let err = resolver.resolve_by_uri("  ").await.unwrap_err();
        assert!(matches!(err, ResolveError::Path(PathError::Empty)));
        let err = resolver.resolve_by_uri("https://[broken").await.unwrap_err();
        assert!(matches!(err, ResolveError::Path(PathError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_root_without_static_front_page_is_posts_listing() {
        let resolver = resolver(MockStore::default(), router(&[]));
        for uri in ["/", "https://example.org", "https://example.org/"] {
            let node = resolver.resolve_by_uri(uri).await.unwrap();
            let Some(Node::ContentType(listing)) = node else {
                panic!("expected listing for {uri}");
            };
            assert_eq!(listing.name, "post");
            assert_eq!(listing.uri, "/");
            assert!(listing.is_front_page);
            assert!(listing.is_posts_page);
        }
    }

    #[tokio::test]
    async fn test_root_with_static_front_page() {
        let mut store = MockStore {
            settings: ReadingSettings {
                show_on_front: ShowOnFront::Page,
                page_on_front: Some(5),
                page_for_posts: None,
            },
            ..Default::default()
        };
        store.insert(
            NodeKind::Content(Some("page".into())),
            NodeKey::Id(5),
            page(5, "home", "/"),
        );
        let node = resolver(store, router(&[])).resolve_by_uri("/").await.unwrap();
        assert_eq!(node.and_then(|n| n.database_id()), Some(5));
    }

    #[tokio::test]
    async fn test_missing_front_page_falls_back_to_listing() {
        let store = MockStore {
            settings: ReadingSettings {
                show_on_front: ShowOnFront::Page,
                page_on_front: Some(99),
                page_for_posts: Some(12),
            },
            ..Default::default()
        };
        let node = resolver(store, router(&[])).resolve_by_uri("/").await.unwrap();
        let Some(Node::ContentType(listing)) = node else {
            panic!("expected listing");
        };
        assert!(listing.is_front_page);
        // Une page des articles existe: la racine n'est pas cette page
        assert!(!listing.is_posts_page);
    }

    #[tokio::test]
    async fn test_hierarchical_path_must_match_exactly() {
        let mut store = MockStore::default();
        store.insert(
            NodeKind::Content(Some("page".into())),
            NodeKey::Path("parent/child".into()),
            page(3, "child", "/parent/child/"),
        );
        // Test critique: une correspondance partielle ne doit rien renvoyer
        store.insert(
            NodeKind::Content(Some("page".into())),
            NodeKey::Path("child".into()),
            page(3, "child", "/parent/child/"),
        );
        let router = router(&[
            ("parent/child", "pagename", "parent/child"),
            ("child", "pagename", "child"),
        ]);
        let resolver = resolver(store, router);

        let node = resolver.resolve_by_uri("/parent/child/").await.unwrap();
        assert_eq!(node.and_then(|n| n.database_id()), Some(3));

        let node = resolver.resolve_by_uri("/child/").await.unwrap();
        assert_eq!(node, None);
    }

    #[tokio::test]
    async fn test_hooks_fire_even_without_match() {
        let hook = Arc::new(RecordingHook::default());
        let resolver = resolver(
            MockStore::default(),
            router(&[("about", "pagename", "about")]),
        )
        .with_hook(hook.clone());

        assert_eq!(resolver.resolve_by_uri("/about/").await.unwrap(), None);
        assert_eq!(resolver.resolve_by_uri("/nowhere/").await.unwrap(), None);

        let seen = hook.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].request, "about");
        assert_eq!(seen[0].query_vars.get("pagename").map(String::as_str), Some("about"));
        assert_eq!(seen[1].matched_rule, None);
    }

    #[tokio::test]
    async fn test_lookup_precedence() {
        let resolver = resolver(MockStore::default(), router(&[]));
        let vars = |pairs: &[(&str, &str)]| -> QueryVars {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };

        let lookups = resolver.lookups_for(&vars(&[("name", "hello"), ("category_name", "news")]));
        assert_eq!(
            lookups.first(),
            Some(&Lookup::Node {
                kind: NodeKind::Content(Some("post".into())),
                key: NodeKey::Slug("hello".into()),
            })
        );
        assert_eq!(lookups.len(), 2);

        let lookups = resolver.lookups_for(&vars(&[("book", "dune")]));
        assert_eq!(
            lookups,
            vec![Lookup::Node {
                kind: NodeKind::Content(Some("book".into())),
                key: NodeKey::Slug("dune".into()),
            }]
        );

        let lookups = resolver.lookups_for(&vars(&[("post_type", "book")]));
        assert_eq!(lookups, vec![Lookup::Archive("book".into())]);

        let lookups = resolver.lookups_for(&vars(&[("p", "not-a-number")]));
        assert!(lookups.is_empty());
    }

    #[tokio::test]
    async fn test_page_path_falls_back_to_post_name() {
        let mut store = MockStore::default();
        let mut post = page(11, "hello", "/hello/");
        if let Node::Content(content) = &mut post {
            content.post_type = "post".into();
            content.type_name = "Post".into();
        }
        store.insert(
            NodeKind::Content(Some("post".into())),
            NodeKey::Slug("hello".into()),
            post,
        );
        let router = Arc::new(MockRouter {
            pretty: true,
            routes: HashMap::from([(
                "hello".to_string(),
                vec![("pagename", "hello".to_string()), ("name", "hello".to_string())],
            )]),
        });
        let node = resolver(store, router).resolve_by_uri("/hello/").await.unwrap();
        assert_eq!(node.and_then(|n| n.database_id()), Some(11));
    }

    #[tokio::test]
    async fn test_slug_match_must_own_the_path() {
        let mut store = MockStore::default();
        let mut post = page(11, "hello", "/hello/");
        if let Node::Content(content) = &mut post {
            content.post_type = "post".into();
        }
        store.insert(
            NodeKind::Content(Some("post".into())),
            NodeKey::Slug("hello".into()),
            post,
        );
        let router = router(&[("hello", "name", "hello"), ("1999/hello", "name", "hello")]);
        let resolver = resolver(store, router);

        let node = resolver.resolve_by_uri("/hello/").await.unwrap();
        assert_eq!(node.and_then(|n| n.database_id()), Some(11));

        // Test critique: le slug existe mais l'URI canonique est ailleurs
        let node = resolver.resolve_by_uri("/1999/hello/").await.unwrap();
        assert_eq!(node, None);
    }

    #[tokio::test]
    async fn test_pretty_root_keeps_query() {
        let resolver = resolver(MockStore::default(), router(&[]));
        let path = resolver.normalize("/?attachment_id=4").unwrap().unwrap();
        assert_eq!(path.query, vec![("attachment_id".to_string(), "4".to_string())]);
        let path = resolver.normalize("/about/?page_id=4").unwrap().unwrap();
        assert!(path.query.is_empty());
    }

    #[tokio::test]
    async fn test_archive_resolves_to_content_type() {
        let resolver = resolver(
            MockStore::default(),
            router(&[("book", "post_type", "book")]),
        );
        let node = resolver.resolve_by_uri("/book/").await.unwrap();
        let Some(Node::ContentType(listing)) = node else {
            panic!("expected archive");
        };
        assert_eq!(listing.name, "book");
        assert_eq!(listing.uri, "/book/");
        assert!(!listing.is_front_page);
    }

    #[tokio::test]
    async fn test_store_failure_is_error() {
        let store = MockStore {
            fail: true,
            ..Default::default()
        };
        let resolver = resolver(store, router(&[("about", "pagename", "about")]));
        let err = resolver.resolve_by_uri("/about/").await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }

    #[tokio::test]
    async fn test_plain_mode_reads_query() {
        let mut store = MockStore::default();
        store.insert(
            NodeKind::Content(Some("page".into())),
            NodeKey::Id(8),
            page(8, "about", "/?page_id=8"),
        );
        let router = Arc::new(MockRouter {
            pretty: false,
            routes: HashMap::new(),
        });
        let resolver = resolver(store, router);

        let node = resolver.resolve_by_uri("/?page_id=8").await.unwrap();
        assert_eq!(node.and_then(|n| n.database_id()), Some(8));

        let path = resolver.normalize("https://example.org/?page_id=8").unwrap().unwrap();
        assert_eq!(path.query, vec![("page_id".to_string(), "8".to_string())]);
    }

    #[tokio::test]
    async fn test_media_by_source_url_checks_host() {
        let resolver = resolver(MockStore::default(), router(&[]));
        let node = resolver
            .resolve_media_by_source_url("https://cdn.other.net/uploads/a.png")
            .await
            .unwrap();
        assert_eq!(node, None);
    }

    #[test]
    fn test_home_subdirectory_is_stripped() {
        let site = Arc::new(SiteConfig::new(Url::parse("https://example.org/blog/").unwrap()));
        let resolver = NodeResolver::new(site, Arc::new(MockStore::default()), router(&[]));

        let path = resolver
            .normalize("https://example.org/blog/about/")
            .unwrap()
            .unwrap();
        assert_eq!(path.path, "about");
        assert_eq!(resolver.normalize("https://example.org/other/").unwrap(), None);
        assert_eq!(resolver.normalize("https://example.org/blogroll/").unwrap(), None);
    }
}
