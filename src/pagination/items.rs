//! Pull-based iteration over every item of a query.

use std::collections::VecDeque;

use futures_util::stream::{self, Stream};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::pagination::query::{PageParams, Query};

enum Position {
    Start,
    Cursor(String),
    Done,
}

/// Lazy, finite, non-restartable item sequence.
///
/// Pages are fetched one at a time, only when the buffered items run out.
/// Dropping the iterator stops all further requests. After an error or the
/// last page, [`Items::next`] returns `Ok(None)`.
pub struct Items<T> {
    query: Query<T>,
    page_size: Option<u32>,
    buffer: VecDeque<T>,
    position: Position,
}

impl<T: DeserializeOwned> Items<T> {
    pub(crate) fn new(query: Query<T>) -> Self {
        Self {
            query,
            page_size: None,
            buffer: VecDeque::new(),
            position: Position::Start,
        }
    }

    /// Page size requested for the first page; later pages follow the cursor.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Next item, fetching another page if needed.
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let params = match std::mem::replace(&mut self.position, Position::Done) {
                Position::Done => return Ok(None),
                Position::Start => PageParams {
                    size: self.page_size,
                    cursor: None,
                },
                Position::Cursor(cursor) => PageParams::default().cursor(cursor),
            };

            let page = self.query.page(params).await?;
            self.position = match (page.last_page, page.cursor) {
                (true, _) => Position::Done,
                (false, Some(cursor)) => Position::Cursor(cursor),
                (false, None) => {
                    tracing::warn!(
                        path = %self.query.path(),
                        "Page is not last but has no cursor; stopping iteration"
                    );
                    Position::Done
                }
            };
            self.buffer.extend(page.items);
        }
    }

    /// Adapt into a `Stream` of items.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        stream::try_unfold(self, |mut items| async move {
            let next = items.next().await?;
            Ok::<_, Error>(next.map(|item| (item, items)))
        })
    }
}
