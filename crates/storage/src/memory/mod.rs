//! In-memory store.
//!
//! Serves a whole site from a [`SiteContent`] snapshot: fixtures, demos and
//! tests. Every lookup works on the snapshot taken at construction, so the
//! store is freely shareable across concurrent requests.

mod collection;

pub use collection::RankedCollection;

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use folio_core::error::StoreResult;
use folio_core::models::{Comment, ContentNode, Node, ReadingSettings, SiteConfig, UserRole};
use folio_core::ports::{
    COMMENT_CONNECTION, CONTENT_CONNECTION, CommentFilter, CommentSource, ContentFilter,
    ContentSource, NodeKey, NodeKind, NodeStore, Repositories, USER_ROLE_CONNECTION,
    UserRoleSource,
};

use crate::records::{
    ContentContext, NodeBuilder, PostRecord, SiteContent, TermRecord, merge_roles, path_segments,
};

/// Guard against parent cycles in hand-written fixtures.
const MAX_DEPTH: usize = 32;

/// Natural order of dated collections: newest first, ties by id descending.
type DateRank = (Reverse<DateTime<Utc>>, Reverse<i64>);

/// Store backed by an in-memory [`SiteContent`].
pub struct MemoryStore {
    site: Arc<SiteConfig>,
    content: SiteContent,
    roles: Vec<UserRole>,
}

impl MemoryStore {
    pub fn new(site: Arc<SiteConfig>, content: SiteContent) -> Self {
        let roles = merge_roles(&content.roles);
        debug!(
            posts = content.posts.len(),
            terms = content.terms.len(),
            comments = content.comments.len(),
            roles = roles.len(),
            "Memory store loaded"
        );
        Self {
            site,
            content,
            roles,
        }
    }

    /// Parse a JSON fixture.
    pub fn from_json(site: Arc<SiteConfig>, json: &str) -> StoreResult<Self> {
        Ok(Self::new(site, SiteContent::from_json(json)?))
    }

    /// Read and parse a JSON fixture file.
    #[instrument(skip(site))]
    pub fn from_fixture_file(site: Arc<SiteConfig>, path: &Path) -> StoreResult<Self> {
        Ok(Self::new(site, SiteContent::from_file(path)?))
    }

    pub fn site(&self) -> &Arc<SiteConfig> {
        &self.site
    }

    pub fn content(&self) -> &SiteContent {
        &self.content
    }

    fn builder(&self) -> NodeBuilder<'_> {
        NodeBuilder::new(&self.site, &self.content.reading)
    }

    fn post(&self, id: i64) -> Option<&PostRecord> {
        self.content.posts.iter().find(|p| p.id == id)
    }

    fn term(&self, id: i64) -> Option<&TermRecord> {
        self.content.terms.iter().find(|t| t.id == id)
    }

    /// Ancestor slugs of an entry, root first.
    fn post_ancestors(&self, post: &PostRecord) -> Vec<String> {
        let mut slugs = Vec::new();
        let mut parent = post.parent.filter(|p| *p != 0);
        while let Some(id) = parent {
            if slugs.len() >= MAX_DEPTH {
                break;
            }
            let Some(ancestor) = self.post(id) else {
                break;
            };
            slugs.push(ancestor.slug.clone());
            parent = ancestor.parent.filter(|p| *p != 0);
        }
        slugs.reverse();
        slugs
    }

    /// Ancestor slugs then the term's own slug.
    fn term_path(&self, term: &TermRecord) -> Vec<String> {
        let mut slugs = vec![term.slug.clone()];
        let mut parent = term.parent.filter(|p| *p != 0);
        while let Some(id) = parent {
            if slugs.len() > MAX_DEPTH {
                break;
            }
            let Some(ancestor) = self.term(id) else {
                break;
            };
            slugs.push(ancestor.slug.clone());
            parent = ancestor.parent.filter(|p| *p != 0);
        }
        slugs.reverse();
        slugs
    }

    fn content_node(&self, post: &PostRecord) -> ContentNode {
        let ancestors = self.post_ancestors(post);
        let category = post
            .terms
            .iter()
            .filter_map(|id| self.term(*id))
            .filter(|t| t.taxonomy == "category")
            .min_by_key(|t| t.id)
            .map(|t| self.term_path(t).join("/"));
        let author = post
            .author
            .and_then(|id| self.content.users.iter().find(|u| u.id == id))
            .map(|u| u.nicename.as_str());

        self.builder().content(
            post,
            &ContentContext {
                ancestors: &ancestors,
                category: category.as_deref(),
                author,
            },
        )
    }

    fn visible_posts<'a>(
        &'a self,
        post_type: Option<&'a str>,
    ) -> impl Iterator<Item = &'a PostRecord> {
        let builder = self.builder();
        self.content.posts.iter().filter(move |p| {
            p.is_published()
                && builder.is_routable(p)
                && post_type.map_or(true, |t| t == p.post_type)
        })
    }

    fn find_content<'a>(
        &'a self,
        post_type: Option<&'a str>,
        key: &NodeKey,
    ) -> Option<&'a PostRecord> {
        let mut candidates = self.visible_posts(post_type);
        match key {
            NodeKey::Id(id) => candidates.find(|p| p.id == *id),
            NodeKey::Slug(slug) => candidates.find(|p| &p.slug == slug),
            NodeKey::SourceUrl(url) => candidates.find(|p| p.source_url.as_deref() == Some(url.as_str())),
            NodeKey::Path(path) => {
                let segments = path_segments(path);
                let slug = *segments.last()?;
                let matches: Vec<&PostRecord> = candidates.filter(|p| p.slug == slug).collect();
                // Prefer the exact chain; otherwise the slug alone decides
                matches
                    .iter()
                    .find(|p| {
                        let mut chain = self.post_ancestors(p);
                        chain.push(p.slug.clone());
                        chain == segments
                    })
                    .or_else(|| matches.first())
                    .copied()
            }
        }
    }

    fn find_term(&self, taxonomy: &str, key: &NodeKey) -> Option<&TermRecord> {
        let mut candidates = self.content.terms.iter().filter(|t| t.taxonomy == taxonomy);
        match key {
            NodeKey::Id(id) => candidates.find(|t| t.id == *id),
            NodeKey::Slug(slug) => candidates.find(|t| &t.slug == slug),
            NodeKey::SourceUrl(_) => None,
            NodeKey::Path(path) => {
                let segments = path_segments(path);
                let slug = *segments.last()?;
                let matches: Vec<&TermRecord> = candidates.filter(|t| t.slug == slug).collect();
                matches
                    .iter()
                    .find(|t| self.term_path(t) == segments)
                    .or_else(|| matches.first())
                    .copied()
            }
        }
    }

    fn comment_rank(comment: &Comment) -> DateRank {
        (Reverse(comment.date), Reverse(comment.database_id))
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    #[instrument(skip(self))]
    async fn materialize(&self, kind: &NodeKind, key: &NodeKey) -> StoreResult<Option<Node>> {
        let node = match kind {
            NodeKind::Content(post_type) => self
                .find_content(post_type.as_deref(), key)
                .map(|post| Node::Content(self.content_node(post))),
            NodeKind::Term(taxonomy) => self.find_term(taxonomy, key).and_then(|term| {
                self.builder()
                    .term(term, &self.term_path(term))
                    .map(Node::Term)
            }),
            NodeKind::User => {
                let user = self.content.users.iter().find(|u| match key {
                    NodeKey::Id(id) => u.id == *id,
                    NodeKey::Slug(slug) | NodeKey::Path(slug) => &u.nicename == slug,
                    NodeKey::SourceUrl(_) => false,
                });
                user.map(|u| Node::User(self.builder().user(u)))
            }
        };
        Ok(node)
    }

    async fn reading_settings(&self) -> StoreResult<ReadingSettings> {
        Ok(self.content.reading)
    }
}

impl Repositories for MemoryStore {
    fn comments(&self, filter: CommentFilter) -> CommentSource<'_> {
        let all: Vec<Comment> = self.content.comments.iter().cloned().map(Comment::from).collect();
        let ranks: HashMap<i64, DateRank> = all
            .iter()
            .map(|c| (c.database_id, Self::comment_rank(c)))
            .collect();
        let items = all
            .into_iter()
            .filter(|c| filter.matches(c))
            .map(|c| (Self::comment_rank(&c), c))
            .collect();
        Box::new(RankedCollection::new(
            COMMENT_CONNECTION,
            items,
            ranks,
            |c: &Comment| c.database_id,
        ))
    }

    fn content_nodes(&self, filter: ContentFilter) -> ContentSource<'_> {
        let rank = |p: &PostRecord| (Reverse(p.date), Reverse(p.id));
        let ranks: HashMap<i64, DateRank> =
            self.content.posts.iter().map(|p| (p.id, rank(p))).collect();
        let items = self
            .visible_posts(Some(&filter.post_type))
            .filter(|p| filter.parent.map_or(true, |parent| p.parent.unwrap_or(0) == parent))
            .map(|p| (rank(p), self.content_node(p)))
            .collect();
        Box::new(RankedCollection::new(
            CONTENT_CONNECTION,
            items,
            ranks,
            |n: &ContentNode| n.database_id,
        ))
    }

    fn user_roles(&self) -> UserRoleSource<'_> {
        Box::new(role_collection(&self.roles))
    }
}

/// Roles in registration order, keyed by role name.
pub fn role_collection(roles: &[UserRole]) -> RankedCollection<UserRole, String, usize> {
    let ranks = roles
        .iter()
        .enumerate()
        .map(|(i, r)| (r.name.clone(), i))
        .collect();
    let items = roles.iter().cloned().enumerate().collect();
    RankedCollection::new(USER_ROLE_CONNECTION, items, ranks, |r: &UserRole| {
        r.name.clone()
    })
}
