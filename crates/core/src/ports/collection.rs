//! Port trait for ordered collections that can be paginated.
//!
//! A [`CollectionSource`] is the collection descriptor handed to the
//! connection engine: it already carries its filters and natural order,
//! so the engine only speaks in positions and limits.

use async_trait::async_trait;

use crate::error::StoreResult;

use super::cursor::CursorKey;
use super::pagination::PageDirection;

/// One bounded fetch against a collection.
///
/// Bounds are exclusive. With [`PageDirection::Forward`] items come in
/// natural order starting after `after` and stopping before `before`;
/// with [`PageDirection::Backward`] they come in reverse natural order
/// starting before `before` and stopping after `after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest<K> {
    pub direction: PageDirection,
    pub limit: usize,
    pub after: Option<K>,
    pub before: Option<K>,
}

/// An ordered collection (database rows, in-memory lists).
///
/// Implementations must be deterministic for identical requests against
/// unchanged data.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Item type produced by the collection.
    type Item: Send;
    /// Order key written into cursors.
    type Key: CursorKey + Clone + std::fmt::Debug;

    /// Connection tag carried by this collection's cursors.
    fn connection_tag(&self) -> &str;

    /// Order key of an item.
    fn order_key(&self, item: &Self::Item) -> Self::Key;

    /// Fetch up to `request.limit` items.
    async fn fetch(&self, request: FetchRequest<Self::Key>) -> StoreResult<Vec<Self::Item>>;

    /// Whether at least one item lies strictly beyond `bound` in
    /// `direction`. Must not read more than one row.
    async fn exists_beyond(&self, bound: &Self::Key, direction: PageDirection)
        -> StoreResult<bool>;
}
