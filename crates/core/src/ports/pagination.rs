//! Pagination types for connection queries.
//!
//! These types implement Relay-style cursor pagination, commonly used
//! with GraphQL but also applicable to other APIs.

/// Opaque cursor for pagination.
///
/// The cursor value is produced by a [`super::CursorCodec`] and should be
/// treated as an opaque token by clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub value: String,
}

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Pagination arguments for connection queries.
///
/// Supports forward pagination (`first`/`after`) and backward
/// pagination (`last`/`before`). Counts are signed so that negative
/// input can be reported instead of wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of items to fetch (forward pagination).
    pub first: Option<i64>,
    /// Cursor to start after.
    pub after: Option<Cursor>,
    /// Number of items to fetch (backward pagination).
    pub last: Option<i64>,
    /// Cursor to end before.
    pub before: Option<Cursor>,
}

impl Pagination {
    /// Build from raw transport values. Empty cursor strings count as absent.
    pub fn from_args(
        first: Option<i64>,
        after: Option<String>,
        last: Option<i64>,
        before: Option<String>,
    ) -> Self {
        Self {
            first,
            after: non_empty_cursor(after),
            last,
            before: non_empty_cursor(before),
        }
    }

    pub fn forward(first: i64) -> Self {
        Self {
            first: Some(first),
            ..Default::default()
        }
    }

    pub fn backward(last: i64) -> Self {
        Self {
            last: Some(last),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.after = Some(cursor);
        self
    }

    pub fn before(mut self, cursor: Cursor) -> Self {
        self.before = Some(cursor);
        self
    }

    /// Direction implied by the arguments.
    pub fn direction(&self) -> PageDirection {
        if self.last.is_some() && self.first.is_none() {
            PageDirection::Backward
        } else {
            PageDirection::Forward
        }
    }
}

fn non_empty_cursor(value: Option<String>) -> Option<Cursor> {
    value.filter(|v| !v.is_empty()).map(Cursor::new)
}

/// Paginated result set with edges and page info.
///
/// Edges are always in the collection's natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs).
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// The nodes of the page, in edge order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }

    /// Convert every node, keeping cursors and page info.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    node: f(e.node),
                    cursor: e.cursor,
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

/// A single item in a paginated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (used for pagination).
    pub cursor: Cursor,
}

/// Information about the current page in a paginated result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor of the first item in this page.
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last item in this page.
    pub end_cursor: Option<Cursor>,
}

/// Direction of a scan relative to a collection's natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    /// Natural order.
    Forward,
    /// Reverse of natural order.
    Backward,
}

impl PageDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PageDirection::Forward => "forward",
            PageDirection::Backward => "backward",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor_strings_are_absent() {
        let args = Pagination::from_args(Some(2), Some(String::new()), None, Some(String::new()));
        assert_eq!(args.after, None);
        assert_eq!(args.before, None);
        assert_eq!(args.first, Some(2));
    }

    #[test]
    fn test_direction_selection() {
        assert_eq!(Pagination::default().direction(), PageDirection::Forward);
        assert_eq!(Pagination::backward(3).direction(), PageDirection::Backward);
        // first l'emporte: la validation rejette le mélange plus tard
        let both = Pagination {
            first: Some(1),
            last: Some(1),
            ..Default::default()
        };
        assert_eq!(both.direction(), PageDirection::Forward);
    }
}
