use crate::types::{FetchError, RawEntry};
use async_trait::async_trait;

/// Trait for pulling one full snapshot of raw entries from a feed endpoint
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Endpoint this source reads from
    fn source_uri(&self) -> &str;

    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Fetch and parse the whole feed, preserving source order.
    /// Duplicate entries are passed through untouched.
    async fn pull(&self) -> Result<Vec<RawEntry>, FetchError>;
}
