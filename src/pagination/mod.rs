//! Cursor pagination.
//!
//! # Data Flow
//! ```text
//! Query (collection, operation, params)
//!     → page(PageParams)        one request: params + pageSize, or cursor only
//!     → Page { items, cursor, last_page }
//!         → next_page()         new Page from the cursor, never mutates
//!
//! Query::all()
//!     → Items::next()           buffered pull; fetches the next page lazily
//!     → Items::into_stream()    same sequence as a futures Stream
//! ```
//!
//! # Design Decisions
//! - Pages are fetched strictly in sequence; one request in flight per scan
//! - A cursor request never repeats the original filter
//! - Empty non-final pages are legal (sum queries) and skipped transparently

pub mod items;
pub mod page;
pub mod query;

pub use items::Items;
pub use page::Page;
pub use query::{PageParams, Query};
