pub mod client;
pub mod normalize;

use crate::error::StorefrontError;
use crate::model::SearchPage;
use async_trait::async_trait;

/// Suggestions shown for one query, at most.
pub const MAX_SUGGESTIONS: usize = 8;

/// The two remote operations the search session and suggestion feed depend on.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch_page(
        &self,
        query: &str,
        min_rating: u32,
        page: u32,
        limit: u32,
    ) -> Result<SearchPage, StorefrontError>;

    /// Never fails; an unreachable service yields no suggestions.
    async fn fetch_suggestions(&self, query: &str) -> Vec<String>;
}
