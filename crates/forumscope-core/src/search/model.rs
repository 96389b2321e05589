//! Search domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::options::{Criteria, SortBy, TopicStatus};

/// A search request derived from a captured failure and a [`SearchConfig`](super::SearchConfig).
///
/// Built fresh for every captured failure and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search phrase extracted from the failure (quoted for narrow criteria)
    pub phrase: String,

    /// Criteria that shaped the phrase
    pub criteria: Criteria,

    /// Server-side ordering token (`order:<sort>`), absent for relevance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Status filter token (`status:<status>`), absent for `any`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    pub sortby: SortBy,
    pub status_filter: TopicStatus,
}

impl SearchQuery {
    /// The value sent as the `q` request parameter.
    pub fn q(&self) -> String {
        let mut parts = vec![self.phrase.as_str()];
        if let Some(order) = &self.order {
            parts.push(order);
        }
        if let Some(status) = &self.status {
            parts.push(status);
        }
        parts.join(" ")
    }
}

/// One forum topic returned by a search.
///
/// Two topics with the same `id` are the same topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    pub title: String,
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub like_count: u64,

    #[serde(default)]
    pub posts_count: u64,

    /// Last post or bump time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,

    /// Relevance score as returned by the API; only meaningful within one response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,

    #[serde(default)]
    pub has_accepted_answer: bool,
}

impl Topic {
    pub fn new(id: u64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            slug: None,
            views: 0,
            like_count: 0,
            posts_count: 0,
            last_activity: None,
            relevance: None,
            has_accepted_answer: false,
        }
    }
}

/// Ordered, deduplicated and bounded list of topics handed to a renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultList {
    topics: Vec<Topic>,

    /// Why the search could not be completed, when it degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    unavailable: Option<String>,
}

impl ResultList {
    /// Wraps topics that were already ranked.
    pub(crate) fn from_ranked(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            unavailable: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// An empty list marking the search as unavailable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            topics: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable.is_some()
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }
}

impl<'a> IntoIterator for &'a ResultList {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.topics.iter()
    }
}
