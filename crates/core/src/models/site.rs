//! Site configuration: registered content types, taxonomies, reading
//! settings and permalink structure.
//!
//! Stores use this to compute canonical URIs when they materialize nodes,
//! and the routing collaborator uses it to build its rule table. Both
//! treat it as a read-only snapshot.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

// =============================================================================
// Registrations
// =============================================================================

/// A registered content type (post, page, attachment or custom).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeObject {
    /// Internal name, e.g. `post` or `by_uri_cpt`.
    pub name: String,
    /// Human readable label.
    #[serde(default)]
    pub label: String,
    /// GraphQL singular name, e.g. `Post` or `customType`.
    pub graphql_single_name: String,
    /// GraphQL plural name.
    pub graphql_plural_name: String,
    /// Whether entries can have parents (page-like paths).
    #[serde(default)]
    pub hierarchical: bool,
    /// Whether entries are publicly routable.
    #[serde(default = "default_true")]
    pub public: bool,
    /// Whether the type has an archive at its rewrite base.
    #[serde(default)]
    pub has_archive: bool,
    /// Path segment used for pretty permalinks (defaults to `name`).
    #[serde(default)]
    pub rewrite_slug: Option<String>,
    /// Query variable used for plain permalinks (defaults to `name`).
    #[serde(default)]
    pub query_var: Option<String>,
}

impl PostTypeObject {
    /// Register a new, public, non-hierarchical type.
    pub fn new(name: &str, single: &str, plural: &str) -> Self {
        Self {
            name: name.to_string(),
            label: plural.to_string(),
            graphql_single_name: single.to_string(),
            graphql_plural_name: plural.to_string(),
            hierarchical: false,
            public: true,
            has_archive: false,
            rewrite_slug: None,
            query_var: None,
        }
    }

    /// Mark the type as hierarchical.
    pub fn hierarchical(mut self) -> Self {
        self.hierarchical = true;
        self
    }

    /// Give the type an archive listing.
    pub fn with_archive(mut self) -> Self {
        self.has_archive = true;
        self
    }

    /// Override the pretty permalink base.
    pub fn with_rewrite_slug(mut self, slug: &str) -> Self {
        self.rewrite_slug = Some(slug.to_string());
        self
    }

    /// Path segment used for pretty permalinks.
    pub fn rewrite_base(&self) -> &str {
        self.rewrite_slug.as_deref().unwrap_or(&self.name)
    }

    /// Query variable naming an entry of this type.
    pub fn query_var(&self) -> &str {
        self.query_var.as_deref().unwrap_or(&self.name)
    }

    /// Whether this is one of the stock types.
    pub fn is_builtin(&self) -> bool {
        matches!(self.name.as_str(), "post" | "page" | "attachment")
    }

    /// GraphQL type name (`customType` -> `CustomType`).
    pub fn type_name(&self) -> String {
        upper_first(&self.graphql_single_name)
    }
}

/// A registered taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyObject {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub graphql_single_name: String,
    pub graphql_plural_name: String,
    #[serde(default)]
    pub hierarchical: bool,
    #[serde(default)]
    pub rewrite_slug: Option<String>,
    #[serde(default)]
    pub query_var: Option<String>,
    /// Content types the taxonomy is attached to.
    #[serde(default)]
    pub object_types: Vec<String>,
}

impl TaxonomyObject {
    pub fn new(name: &str, single: &str, plural: &str) -> Self {
        Self {
            name: name.to_string(),
            label: plural.to_string(),
            graphql_single_name: single.to_string(),
            graphql_plural_name: plural.to_string(),
            hierarchical: false,
            rewrite_slug: None,
            query_var: None,
            object_types: Vec::new(),
        }
    }

    pub fn hierarchical(mut self) -> Self {
        self.hierarchical = true;
        self
    }

    pub fn for_types(mut self, types: &[&str]) -> Self {
        self.object_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn rewrite_base(&self) -> &str {
        self.rewrite_slug.as_deref().unwrap_or(&self.name)
    }

    pub fn query_var(&self) -> &str {
        self.query_var.as_deref().unwrap_or(&self.name)
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.name.as_str(), "category" | "post_tag")
    }

    pub fn type_name(&self) -> String {
        upper_first(&self.graphql_single_name)
    }
}

// =============================================================================
// Reading Settings
// =============================================================================

/// What the root path shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowOnFront {
    /// The post listing.
    #[default]
    Posts,
    /// A static page (`page_on_front`).
    Page,
}

/// Front page / posts page designations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingSettings {
    #[serde(default)]
    pub show_on_front: ShowOnFront,
    /// Page shown at `/` when `show_on_front` is `page`.
    #[serde(default)]
    pub page_on_front: Option<i64>,
    /// Page designated as the posts index.
    #[serde(default)]
    pub page_for_posts: Option<i64>,
}

impl ReadingSettings {
    /// The configured static front page, if one is in effect.
    pub fn static_front_page(&self) -> Option<i64> {
        match self.show_on_front {
            ShowOnFront::Page => self.page_on_front.filter(|id| *id > 0),
            ShowOnFront::Posts => None,
        }
    }

    /// The configured posts page, if any.
    pub fn posts_page(&self) -> Option<i64> {
        self.page_for_posts.filter(|id| *id > 0)
    }
}

// =============================================================================
// Permalinks
// =============================================================================

/// Permalink tags: (tag, capture pattern, query variable).
pub const PERMALINK_TAGS: &[(&str, &str, &str)] = &[
    ("%year%", "([0-9]{4})", "year"),
    ("%monthnum%", "([0-9]{1,2})", "monthnum"),
    ("%day%", "([0-9]{1,2})", "day"),
    ("%hour%", "([0-9]{1,2})", "hour"),
    ("%minute%", "([0-9]{1,2})", "minute"),
    ("%second%", "([0-9]{1,2})", "second"),
    ("%postname%", "([^/]+)", "name"),
    ("%post_id%", "([0-9]+)", "p"),
    ("%category%", "(.+?)", "category_name"),
    ("%author%", "([^/]+)", "author_name"),
];

/// Tag template for post permalinks. Empty means plain permalinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermalinkStructure(String);

impl PermalinkStructure {
    pub fn new(structure: &str) -> Self {
        Self(structure.trim().to_string())
    }

    pub fn plain() -> Self {
        Self(String::new())
    }

    pub fn is_plain(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Data needed to build a content permalink.
#[derive(Debug, Clone)]
pub struct PostPermalink<'a> {
    pub id: i64,
    pub post_type: &'a str,
    pub slug: &'a str,
    /// Ancestor slugs, root first.
    pub ancestors: &'a [String],
    pub date: DateTime<Utc>,
    pub category: Option<&'a str>,
    pub author: Option<&'a str>,
}

// =============================================================================
// Site Configuration
// =============================================================================

/// Read-only site snapshot shared by stores, router and resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public home URL; its host decides which URIs are owned.
    pub home_url: Url,
    pub permalink_structure: PermalinkStructure,
    pub category_base: String,
    pub tag_base: String,
    pub author_base: String,
    pub post_types: Vec<PostTypeObject>,
    pub taxonomies: Vec<TaxonomyObject>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let home_url = Url::parse("http://localhost").unwrap_or_else(|_| unreachable!());
        Self::new(home_url)
    }
}

impl SiteConfig {
    /// Create a configuration with the stock registrations.
    pub fn new(home_url: Url) -> Self {
        Self {
            home_url,
            permalink_structure: PermalinkStructure::plain(),
            category_base: "category".to_string(),
            tag_base: "tag".to_string(),
            author_base: "author".to_string(),
            post_types: builtin_post_types(),
            taxonomies: builtin_taxonomies(),
        }
    }

    /// Use the given permalink structure.
    pub fn with_permalinks(mut self, structure: &str) -> Self {
        self.permalink_structure = PermalinkStructure::new(structure);
        self
    }

    /// Add or replace a content type registration.
    pub fn register_post_type(&mut self, post_type: PostTypeObject) {
        self.post_types.retain(|p| p.name != post_type.name);
        self.post_types.push(post_type);
    }

    /// Add or replace a taxonomy registration.
    pub fn register_taxonomy(&mut self, taxonomy: TaxonomyObject) {
        self.taxonomies.retain(|t| t.name != taxonomy.name);
        self.taxonomies.push(taxonomy);
    }

    /// Re-add any stock registration missing after deserialization.
    pub fn ensure_builtins(mut self) -> Self {
        for builtin in builtin_post_types() {
            if self.post_type(&builtin.name).is_none() {
                self.post_types.insert(0, builtin);
            }
        }
        for builtin in builtin_taxonomies() {
            if self.taxonomy(&builtin.name).is_none() {
                self.taxonomies.insert(0, builtin);
            }
        }
        self
    }

    pub fn post_type(&self, name: &str) -> Option<&PostTypeObject> {
        self.post_types.iter().find(|p| p.name == name)
    }

    pub fn taxonomy(&self, name: &str) -> Option<&TaxonomyObject> {
        self.taxonomies.iter().find(|t| t.name == name)
    }

    /// Whether pretty (path-based) permalinks are active.
    pub fn uses_pretty_permalinks(&self) -> bool {
        !self.permalink_structure.is_plain()
    }

    /// Sub-directory of the home URL without trailing slash (`""` at root).
    pub fn home_path(&self) -> &str {
        self.home_url.path().trim_end_matches('/')
    }

    /// Canonical URI of the root path.
    pub fn root_uri(&self) -> String {
        format!("{}/", self.home_path())
    }

    /// Canonical URI of a content entry.
    pub fn content_uri(&self, link: &PostPermalink<'_>) -> String {
        let path = if self.permalink_structure.is_plain() {
            self.plain_content_path(link)
        } else {
            match link.post_type {
                "post" => self.expand_structure(link),
                "attachment" => format!("/?attachment_id={}", link.id),
                "page" => format!("/{}/", join_path(link.ancestors, link.slug)),
                other => {
                    let base = self
                        .post_type(other)
                        .map(|p| p.rewrite_base().to_string())
                        .unwrap_or_else(|| other.to_string());
                    format!("/{}/{}/", base, join_path(link.ancestors, link.slug))
                }
            }
        };
        format!("{}{}", self.home_path(), path)
    }

    /// Canonical URI of a term. `path` holds ancestor slugs then the term slug.
    pub fn term_uri(&self, taxonomy: &TaxonomyObject, id: i64, path: &[String]) -> String {
        let slug = path.last().map(String::as_str).unwrap_or_default();
        let uri = if self.permalink_structure.is_plain() {
            match taxonomy.name.as_str() {
                "category" => format!("/?cat={}", id),
                "post_tag" => format!("/?tag={}", slug),
                _ => format!("/?{}={}", taxonomy.query_var(), slug),
            }
        } else {
            let base = match taxonomy.name.as_str() {
                "category" => self.category_base.as_str(),
                "post_tag" => self.tag_base.as_str(),
                _ => taxonomy.rewrite_base(),
            };
            let segments = if taxonomy.hierarchical {
                path.join("/")
            } else {
                slug.to_string()
            };
            format!("/{}/{}/", base, segments)
        };
        format!("{}{}", self.home_path(), uri)
    }

    /// Canonical URI of an author archive.
    pub fn author_uri(&self, id: i64, nicename: &str) -> String {
        let uri = if self.permalink_structure.is_plain() {
            format!("/?author={}", id)
        } else {
            format!("/{}/{}/", self.author_base, nicename)
        };
        format!("{}{}", self.home_path(), uri)
    }

    /// Canonical URI of a content type archive.
    pub fn archive_uri(&self, post_type: &PostTypeObject) -> String {
        let uri = if post_type.name == "post" {
            "/".to_string()
        } else if self.permalink_structure.is_plain() {
            format!("/?post_type={}", post_type.name)
        } else {
            format!("/{}/", post_type.rewrite_base())
        };
        format!("{}{}", self.home_path(), uri)
    }

    fn plain_content_path(&self, link: &PostPermalink<'_>) -> String {
        match link.post_type {
            "post" => format!("/?p={}", link.id),
            "page" => format!("/?page_id={}", link.id),
            "attachment" => format!("/?attachment_id={}", link.id),
            other => {
                let query_var = self
                    .post_type(other)
                    .map(|p| p.query_var().to_string())
                    .unwrap_or_else(|| other.to_string());
                format!("/?{}={}", query_var, join_path(link.ancestors, link.slug))
            }
        }
    }

    fn expand_structure(&self, link: &PostPermalink<'_>) -> String {
        let date = link.date;
        let mut path = self.permalink_structure.as_str().to_string();
        let replacements = [
            ("%year%", format!("{:04}", date.year())),
            ("%monthnum%", format!("{:02}", date.month())),
            ("%day%", format!("{:02}", date.day())),
            ("%hour%", format!("{:02}", date.hour())),
            ("%minute%", format!("{:02}", date.minute())),
            ("%second%", format!("{:02}", date.second())),
            ("%postname%", link.slug.to_string()),
            ("%post_id%", link.id.to_string()),
            ("%category%", link.category.unwrap_or("uncategorized").to_string()),
            ("%author%", link.author.unwrap_or_default().to_string()),
        ];
        for (tag, value) in replacements {
            path = path.replace(tag, &value);
        }
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        path
    }
}

/// Stock content types.
pub fn builtin_post_types() -> Vec<PostTypeObject> {
    vec![
        PostTypeObject::new("post", "Post", "Posts"),
        PostTypeObject::new("page", "Page", "Pages").hierarchical(),
        PostTypeObject::new("attachment", "MediaItem", "MediaItems"),
    ]
}

/// Stock taxonomies.
pub fn builtin_taxonomies() -> Vec<TaxonomyObject> {
    let mut category = TaxonomyObject::new("category", "Category", "Categories")
        .hierarchical()
        .for_types(&["post"]);
    category.query_var = Some("category_name".to_string());
    let mut tag = TaxonomyObject::new("post_tag", "Tag", "Tags").for_types(&["post"]);
    tag.query_var = Some("tag".to_string());
    vec![category, tag]
}

/// `customType` -> `CustomType`.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_path(ancestors: &[String], slug: &str) -> String {
    ancestors
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(slug))
        .collect::<Vec<_>>()
        .join("/")
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn site(structure: &str) -> SiteConfig {
        let mut site = SiteConfig::new(Url::parse("https://example.org").unwrap())
            .with_permalinks(structure);
        site.register_post_type(
            PostTypeObject::new("by_uri_cpt", "customType", "customTypes")
                .with_rewrite_slug("custom"),
        );
        site
    }

    fn post_link<'a>(post_type: &'a str, ancestors: &'a [String]) -> PostPermalink<'a> {
        PostPermalink {
            id: 7,
            post_type,
            slug: "hello",
            ancestors,
            date: Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap(),
            category: None,
            author: None,
        }
    }

    #[test]
    fn test_pretty_post_uri_expands_date_tags() {
        let site = site("/%year%/%monthnum%/%day%/%postname%/");
        assert_eq!(site.content_uri(&post_link("post", &[])), "/2024/05/03/hello/");
    }

    #[test]
    fn test_plain_uris_use_query_vars() {
        let site = site("");
        assert_eq!(site.content_uri(&post_link("post", &[])), "/?p=7");
        assert_eq!(site.content_uri(&post_link("page", &[])), "/?page_id=7");
        assert_eq!(site.content_uri(&post_link("by_uri_cpt", &[])), "/?by_uri_cpt=hello");
    }

    #[test]
    fn test_hierarchical_page_uri_includes_ancestors() {
        let site = site("/%postname%/");
        let ancestors = vec!["parent".to_string()];
        assert_eq!(site.content_uri(&post_link("page", &ancestors)), "/parent/hello/");
        assert_eq!(
            site.content_uri(&post_link("by_uri_cpt", &ancestors)),
            "/custom/parent/hello/"
        );
    }

    #[test]
    fn test_home_sub_directory_prefixes_uris() {
        let site = SiteConfig::new(Url::parse("https://example.org/blog/").unwrap())
            .with_permalinks("/%postname%/");
        assert_eq!(site.home_path(), "/blog");
        assert_eq!(site.root_uri(), "/blog/");
        assert_eq!(site.content_uri(&post_link("post", &[])), "/blog/hello/");
    }

    #[test]
    fn test_static_front_page_requires_page_mode() {
        let mut settings = ReadingSettings {
            show_on_front: ShowOnFront::Posts,
            page_on_front: Some(4),
            page_for_posts: None,
        };
        assert_eq!(settings.static_front_page(), None);
        settings.show_on_front = ShowOnFront::Page;
        assert_eq!(settings.static_front_page(), Some(4));
        settings.page_on_front = Some(0);
        assert_eq!(settings.static_front_page(), None);
    }

    #[test]
    fn test_ensure_builtins_restores_missing_types() {
        let mut site = SiteConfig::default();
        site.post_types.clear();
        let site = site.ensure_builtins();
        assert!(site.post_type("post").is_some());
        assert!(site.post_type("page").unwrap().hierarchical);
    }

    #[test]
    fn test_site_config_from_json() {
        let json = r#"{
            "home_url": "https://example.org/",
            "permalink_structure": "/%postname%/",
            "post_types": [
                {"name": "by_uri_cpt", "graphql_single_name": "customType", "graphql_plural_name": "customTypes"}
            ]
        }"#;
        let site: SiteConfig = serde_json::from_str(json).unwrap();
        let site = site.ensure_builtins();

        // Les champs absents prennent les valeurs par défaut
        assert_eq!(site.category_base, "category");
        assert!(site.post_type("by_uri_cpt").unwrap().public);
        assert!(site.post_type("attachment").is_some());
        assert!(site.taxonomy("category").is_some());
        assert!(site.uses_pretty_permalinks());
    }
}
