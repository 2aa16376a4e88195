//! Ordered in-memory collection.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;

use folio_core::error::StoreResult;
use folio_core::ports::{CollectionSource, CursorKey, FetchRequest, PageDirection};

/// A filtered snapshot sorted by rank; natural order is ascending rank.
///
/// `ranks` covers every row of the underlying table, including rows the
/// filter dropped, so a cursor pointing at a filtered-out row still has a
/// position. A cursor whose row no longer exists matches nothing.
pub struct RankedCollection<T, K, R> {
    tag: &'static str,
    items: Vec<(R, T)>,
    ranks: HashMap<K, R>,
    key_of: fn(&T) -> K,
}

impl<T, K, R> RankedCollection<T, K, R>
where
    K: Hash + Eq,
    R: Ord,
{
    pub fn new(
        tag: &'static str,
        mut items: Vec<(R, T)>,
        ranks: HashMap<K, R>,
        key_of: fn(&T) -> K,
    ) -> Self {
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            tag,
            items,
            ranks,
            key_of,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rank of an optional bound; `Err(())` when the bound row is gone.
    fn bound_rank(&self, key: Option<&K>) -> Result<Option<&R>, ()> {
        match key {
            None => Ok(None),
            Some(key) => self.ranks.get(key).map(Some).ok_or(()),
        }
    }
}

#[async_trait]
impl<T, K, R> CollectionSource for RankedCollection<T, K, R>
where
    T: Clone + Send + Sync,
    K: CursorKey + Clone + Debug + Hash + Eq + Send + Sync,
    R: Ord + Send + Sync,
{
    type Item = T;
    type Key = K;

    fn connection_tag(&self) -> &str {
        self.tag
    }

    fn order_key(&self, item: &T) -> K {
        (self.key_of)(item)
    }

    async fn fetch(&self, request: FetchRequest<K>) -> StoreResult<Vec<T>> {
        let (Ok(lower), Ok(upper)) = (
            self.bound_rank(request.after.as_ref()),
            self.bound_rank(request.before.as_ref()),
        ) else {
            return Ok(Vec::new());
        };

        let window = self.items.iter().filter(|(rank, _)| {
            lower.map_or(true, |l| rank > l) && upper.map_or(true, |u| rank < u)
        });

        let items = match request.direction {
            PageDirection::Forward => window
                .take(request.limit)
                .map(|(_, item)| item.clone())
                .collect(),
            PageDirection::Backward => window
                .rev()
                .take(request.limit)
                .map(|(_, item)| item.clone())
                .collect(),
        };
        Ok(items)
    }

    async fn exists_beyond(&self, bound: &K, direction: PageDirection) -> StoreResult<bool> {
        let Some(rank) = self.ranks.get(bound) else {
            return Ok(false);
        };
        Ok(match direction {
            PageDirection::Forward => self.items.iter().any(|(r, _)| r > rank),
            PageDirection::Backward => self.items.iter().any(|(r, _)| r < rank),
        })
    }
}
