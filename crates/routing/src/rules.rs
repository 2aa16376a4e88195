//! Rewrite rules generated from the site configuration.
//!
//! Each rule is an anchored regex over the normalized path (no leading or
//! trailing slash) and a list of query variables filled from its captures.
//! Rules are checked in table order; the first match wins.

use folio_core::models::{PERMALINK_TAGS, SiteConfig};
use folio_core::ports::{QueryVars, RouteMatch};
use regex::Regex;

use crate::error::{RoutingError, RoutingResult};

/// Where a query variable takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarSource {
    /// Capture group (1-based).
    Capture(usize),
    Literal(String),
}

/// One compiled rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: String,
    regex: Regex,
    vars: Vec<(String, VarSource)>,
    /// Keep scanning after a match and merge the next matching rule's vars.
    merge_next: bool,
}

impl RewriteRule {
    pub fn new(pattern: &str, vars: Vec<(String, VarSource)>) -> RoutingResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| RoutingError::InvalidRule {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            vars,
            merge_next: false,
        })
    }

    /// Single-variable rule filled from the first capture.
    fn capture(pattern: &str, var: &str) -> RoutingResult<Self> {
        Self::new(pattern, vec![(var.to_string(), VarSource::Capture(1))])
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Query vars for `path`, or `None` when the rule does not match.
    pub fn apply(&self, path: &str) -> Option<QueryVars> {
        let captures = self.regex.captures(path)?;
        let vars = self
            .vars
            .iter()
            .filter_map(|(name, source)| {
                let value = match source {
                    VarSource::Capture(index) => captures.get(*index)?.as_str().to_string(),
                    VarSource::Literal(value) => value.clone(),
                };
                Some((name.clone(), value))
            })
            .collect();
        Some(vars)
    }
}

/// Ordered rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<RewriteRule>,
}

impl RuleTable {
    /// Build the table for a site with pretty permalinks.
    ///
    /// Order: custom content types, categories, tags, custom taxonomies,
    /// authors, the post structure and finally the page catch-all. When
    /// the post structure starts with a free-text tag the page rule moves
    /// in front of it and merges the post vars, so `/slug/` can name
    /// either a page or a post.
    pub fn generate(site: &SiteConfig) -> RoutingResult<Self> {
        let mut rules = Vec::new();

        for post_type in site.post_types.iter().filter(|p| p.public && !p.is_builtin()) {
            let base = regex::escape(post_type.rewrite_base());
            if post_type.has_archive {
                rules.push(RewriteRule::new(
                    &format!("^{}/?$", base),
                    vec![(
                        "post_type".to_string(),
                        VarSource::Literal(post_type.name.clone()),
                    )],
                )?);
            }
            rules.push(RewriteRule::capture(
                &format!("^{}/{}/?$", base, segment_capture(post_type.hierarchical)),
                post_type.query_var(),
            )?);
        }

        rules.push(RewriteRule::capture(
            &format!("^{}/(.+?)/?$", regex::escape(&site.category_base)),
            "category_name",
        )?);
        rules.push(RewriteRule::capture(
            &format!("^{}/([^/]+)/?$", regex::escape(&site.tag_base)),
            "tag",
        )?);
        for taxonomy in site.taxonomies.iter().filter(|t| !t.is_builtin()) {
            rules.push(RewriteRule::capture(
                &format!(
                    "^{}/{}/?$",
                    regex::escape(taxonomy.rewrite_base()),
                    segment_capture(taxonomy.hierarchical)
                ),
                taxonomy.query_var(),
            )?);
        }
        rules.push(RewriteRule::capture(
            &format!("^{}/([^/]+)/?$", regex::escape(&site.author_base)),
            "author_name",
        )?);

        let structure = site.permalink_structure.as_str();
        let post_rule = structure_rule(structure)?;
        let page_rule = RewriteRule::capture("^(.+?)/?$", "pagename")?;

        if starts_with_free_text(structure) {
            rules.push(RewriteRule {
                merge_next: true,
                ..page_rule
            });
            rules.extend(post_rule);
        } else {
            rules.extend(post_rule);
            rules.push(page_rule);
        }

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(RewriteRule::pattern)
    }

    /// First matching rule, merged with the next one when it asks for it.
    pub fn find(&self, path: &str) -> Option<RouteMatch> {
        let mut rules = self.rules.iter();
        let (rule, mut query_vars) = rules
            .by_ref()
            .find_map(|rule| rule.apply(path).map(|vars| (rule, vars)))?;

        if rule.merge_next {
            if let Some(extra) = rules.find_map(|next| next.apply(path)) {
                for (name, value) in extra {
                    query_vars.entry(name).or_insert(value);
                }
            }
        }

        Some(RouteMatch {
            matched_rule: Some(rule.pattern.clone()),
            query_vars,
        })
    }
}

fn segment_capture(hierarchical: bool) -> &'static str {
    if hierarchical {
        "(.+?)"
    } else {
        "([^/]+)"
    }
}

/// Compile the post permalink structure, e.g. `/%year%/%postname%/`.
///
/// Returns `None` when the structure has no tags at all.
fn structure_rule(structure: &str) -> RoutingResult<Option<RewriteRule>> {
    let trimmed = structure.trim_matches('/');
    let mut pattern = String::from("^");
    let mut vars = Vec::new();
    let mut rest = trimmed;

    while !rest.is_empty() {
        let next_tag = PERMALINK_TAGS
            .iter()
            .filter_map(|tag| rest.find(tag.0).map(|at| (at, tag)))
            .min_by_key(|(at, _)| *at);
        match next_tag {
            Some((at, (tag, capture, var))) => {
                pattern.push_str(&regex::escape(&rest[..at]));
                pattern.push_str(capture);
                vars.push((var.to_string(), VarSource::Capture(vars.len() + 1)));
                rest = &rest[at + tag.len()..];
            }
            None => {
                pattern.push_str(&regex::escape(rest));
                rest = "";
            }
        }
    }

    if vars.is_empty() {
        return Ok(None);
    }
    pattern.push_str("/?$");
    RewriteRule::new(&pattern, vars).map(Some)
}

/// Whether the structure's first segment can match any slug.
fn starts_with_free_text(structure: &str) -> bool {
    let trimmed = structure.trim_start_matches('/');
    ["%postname%", "%category%", "%author%"]
        .iter()
        .any(|tag| trimmed.starts_with(tag))
}
