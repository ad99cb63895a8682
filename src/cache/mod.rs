//! Whole-page response cache for the index feed.
//!
//! Rendered pages are kept for a fixed TTL, so a post published in the
//! meantime only appears once the entry expires or the cache is cleared.

mod middleware;
mod store;

pub use middleware::cache_page;
pub use store::{CachedResponse, ResponseCache};
