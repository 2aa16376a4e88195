//! Connection engine: turns a collection plus pagination arguments into
//! a page of edges with stable cursors.
//!
//! # Flow
//!
//! 1. Validate arguments (`first`/`last` exclusivity, non-negative counts)
//! 2. Decode `after`/`before` against the collection's connection tag
//! 3. Fetch `count + 1` items in the scan direction
//! 4. Run the bounded existence check on the opposite side of the cursor
//! 5. Restore natural order and attach cursors

use tracing::{debug, instrument, trace};

use crate::error::{ArgumentError, CursorError, PaginationResult};
use crate::metrics::{record_argument_error, record_connection_query};
use crate::ports::{
    Base64CursorCodec, CollectionSource, Connection, Cursor, CursorCodec, CursorKey,
    CursorPosition, Edge, FetchRequest, PageDirection, PageInfo, Pagination,
};

// =============================================================================
// Configuration
// =============================================================================

/// Default page size when neither `first` nor `last` is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Maximum page size; larger counts are clamped.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size settings for the connection engine.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

// =============================================================================
// ConnectionResolver
// =============================================================================

/// Validated request for one page.
#[derive(Debug)]
struct PagePlan<K> {
    direction: PageDirection,
    count: usize,
    after: Option<K>,
    before: Option<K>,
}

/// Paginates any [`CollectionSource`].
///
/// Stateless across calls; concurrent calls share nothing but the codec.
#[derive(Debug, Clone, Default)]
pub struct ConnectionResolver<C = Base64CursorCodec> {
    config: ConnectionConfig,
    codec: C,
}

impl ConnectionResolver<Base64CursorCodec> {
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_codec(config, Base64CursorCodec)
    }
}

impl<C: CursorCodec> ConnectionResolver<C> {
    pub fn with_codec(config: ConnectionConfig, codec: C) -> Self {
        Self { config, codec }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Check the pagination arguments without touching any store.
    pub fn validate(args: &Pagination) -> Result<(), ArgumentError> {
        if args.first.is_some() && args.last.is_some() {
            return Err(ArgumentError::FirstAndLast);
        }
        if let Some(first) = args.first.filter(|n| *n < 0) {
            return Err(ArgumentError::NegativeCount {
                argument: "first",
                value: first,
            });
        }
        if let Some(last) = args.last.filter(|n| *n < 0) {
            return Err(ArgumentError::NegativeCount {
                argument: "last",
                value: last,
            });
        }
        Ok(())
    }

    /// Fetch one page of `source`.
    ///
    /// Edges are always in the collection's natural order, whichever
    /// direction was requested.
    #[instrument(skip_all, fields(connection = source.connection_tag()))]
    pub async fn paginate<S>(
        &self,
        source: &S,
        args: &Pagination,
    ) -> PaginationResult<Connection<S::Item>>
    where
        S: CollectionSource + ?Sized,
    {
        let tag = source.connection_tag().to_string();

        let plan = match self.plan::<S::Key>(&tag, args) {
            Ok(plan) => plan,
            Err(e) => {
                record_argument_error(&tag);
                debug!(error = %e, "Rejected pagination arguments");
                return Err(e.into());
            }
        };
        record_connection_query(&tag, plan.direction.as_str());
        trace!(direction = plan.direction.as_str(), count = plan.count, "Fetching page");

        let request = FetchRequest {
            direction: plan.direction,
            limit: plan.count + 1,
            after: plan.after.clone(),
            before: plan.before.clone(),
        };
        let mut items = source.fetch(request).await?;

        let has_more = items.len() > plan.count;
        items.truncate(plan.count);

        let (has_next_page, has_previous_page) = match plan.direction {
            PageDirection::Forward => {
                let has_previous = match &plan.after {
                    Some(after) => source.exists_beyond(after, PageDirection::Backward).await?,
                    None => false,
                };
                (has_more, has_previous)
            }
            PageDirection::Backward => {
                let has_next = match &plan.before {
                    Some(before) => source.exists_beyond(before, PageDirection::Forward).await?,
                    None => false,
                };
                items.reverse();
                (has_next, has_more)
            }
        };

        let edges: Vec<Edge<S::Item>> = items
            .into_iter()
            .map(|node| {
                let key = source.order_key(&node).to_cursor_key();
                let cursor = self.codec.encode(&CursorPosition::new(tag.as_str(), key));
                Edge { node, cursor }
            })
            .collect();

        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };

        debug!(
            edges = edges.len(),
            has_next_page, has_previous_page, "Page assembled"
        );

        Ok(Connection { edges, page_info })
    }

    fn plan<K: CursorKey>(&self, tag: &str, args: &Pagination) -> Result<PagePlan<K>, ArgumentError> {
        Self::validate(args)?;

        let direction = args.direction();
        let requested = match direction {
            PageDirection::Forward => args.first,
            PageDirection::Backward => args.last,
        };
        let count = requested
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);

        Ok(PagePlan {
            direction,
            count,
            after: self.decode_key(args.after.as_ref(), "after", tag)?,
            before: self.decode_key(args.before.as_ref(), "before", tag)?,
        })
    }

    fn decode_key<K: CursorKey>(
        &self,
        cursor: Option<&Cursor>,
        argument: &'static str,
        tag: &str,
    ) -> Result<Option<K>, ArgumentError> {
        let Some(cursor) = cursor.filter(|c| !c.value.is_empty()) else {
            return Ok(None);
        };

        let position = self
            .codec
            .decode_for(cursor, tag)
            .map_err(|source| ArgumentError::InvalidCursor { argument, source })?;

        K::from_cursor_key(&position.key)
            .map(Some)
            .ok_or_else(|| ArgumentError::InvalidCursor {
                argument,
                source: CursorError::Malformed(format!("invalid order key '{}'", position.key)),
            })
    }
}
