//! Feed source layer — fetches a remote listing as structured items.

pub mod reddit;

pub use reddit::RedditFeed;

use async_trait::async_trait;

use crate::error::FeedError;

/// One entry from the watched feed.
///
/// Populated once at the adapter boundary; fields the source omits are
/// empty strings. Only `id` outlives the dispatch pass (in the ledger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stable identifier derived from the entry link (fallback: the raw link).
    pub id: String,
    /// Author handle, normalized to a bare lowercase name.
    pub author: String,
    pub title: String,
    /// Raw HTML body of the entry, used for preview-image extraction.
    pub summary_html: String,
    pub link: String,
}

/// Remote feed adapter.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current feed snapshot, ordered as the source orders it.
    ///
    /// An unreachable feed is an error the caller logs and treats as an
    /// empty snapshot; it must never abort the dispatch loop.
    async fn fetch(&self, url: &str) -> Result<Vec<Item>, FeedError>;
}
