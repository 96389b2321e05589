//! Forum search for captured failures.
//!
//! This module turns a captured failure into a search request and the
//! backend's answer into a ranked topic list:
//! - [`QueryBuilder`] builds the [`SearchQuery`]
//! - [`ForumSearch`] is implemented by backend clients
//! - [`ResultRanker`] orders, deduplicates and truncates the topics

pub mod model;
pub mod options;
pub mod query_builder;
pub mod ranker;
pub mod service;

pub use model::{ResultList, SearchQuery, Topic};
pub use options::{Criteria, SearchConfig, SearchOptions, SortBy, TopicStatus, DEFAULT_TOP, MAX_TOP};
pub use query_builder::QueryBuilder;
pub use ranker::ResultRanker;
pub use service::ForumSearch;
