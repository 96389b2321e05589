//! Forum search port.

use async_trait::async_trait;

use crate::error::Result;
use crate::search::{SearchQuery, Topic};

/// Service that executes a search against a forum backend.
#[async_trait]
pub trait ForumSearch: Send + Sync {
    /// Executes one search request.
    ///
    /// # Arguments
    /// * `query` - The query built from a captured failure
    ///
    /// # Returns
    /// Topics in the order the backend returned them, deduplicated by id.
    /// An empty vector when nothing matched.
    ///
    /// # Errors
    /// `SearchError::Network` on transport failure or timeout,
    /// `SearchError::ResponseFormat` when the payload cannot be parsed.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Topic>>;
}
