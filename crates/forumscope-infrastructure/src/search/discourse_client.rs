//! Discourse search client.
//!
//! Sends one `GET /search.json` request per search and converts the `topics`
//! array of the response into [`Topic`] values. Entries that lack an id or a
//! title are skipped so a partially usable response still yields results.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;

use forumscope_core::error::{Result, SearchError};
use forumscope_core::search::{ForumSearch, SearchQuery, Topic};

use crate::settings::ClientSettings;

const SEARCH_PATH: &str = "search.json";
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// [`ForumSearch`] implementation backed by a Discourse instance.
#[derive(Clone)]
pub struct DiscourseSearchClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DiscourseSearchClient {
    /// Creates a client from the given settings.
    ///
    /// The timeout bounds the whole request, including reading the body.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| SearchError::network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self) -> String {
        format!("{}/{}", self.base_url, SEARCH_PATH)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::network(format!(
                "Forum search timed out after {:?}: {err}",
                self.timeout
            ))
        } else {
            SearchError::network(format!("Forum search request failed: {err}"))
        }
    }
}

#[async_trait]
impl ForumSearch for DiscourseSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Topic>> {
        let q = query.q();
        tracing::debug!(url = %self.search_url(), q = %q, "Sending forum search request");

        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", q.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.trim().chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
            return Err(SearchError::http_status(
                status.as_u16(),
                format!("Forum search returned HTTP {status}: {preview}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let topics = parse_search_response(&body, &self.base_url)?;
        tracing::debug!(count = topics.len(), "Parsed forum search response");
        Ok(topics)
    }
}

/// Parses a Discourse search response body.
///
/// A response without a `topics` key means nothing matched. Topic URLs are
/// taken from the entry when present, otherwise derived from `base_url`.
pub fn parse_search_response(body: &str, base_url: &str) -> Result<Vec<Topic>> {
    let payload: Value = serde_json::from_str(body)?;

    let Some(root) = payload.as_object() else {
        return Err(SearchError::response_format(
            "expected a JSON object at the top level",
        ));
    };

    let entries = match root.get("topics") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(SearchError::response_format(
                "'topics' is present but is not an array",
            ));
        }
    };

    let base_url = base_url.trim_end_matches('/');
    let mut seen = HashSet::new();
    let mut topics = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Some(topic) = parse_topic(entry, base_url) else {
            tracing::debug!(index, "Skipping search entry without id or title");
            continue;
        };

        if !seen.insert(topic.id) {
            continue;
        }

        topics.push(topic);
    }

    Ok(topics)
}

fn parse_topic(entry: &Value, base_url: &str) -> Option<Topic> {
    let id = entry.get("id").and_then(Value::as_u64)?;
    let title = entry
        .get("title")
        .or_else(|| entry.get("fancy_title"))
        .and_then(Value::as_str)?
        .to_string();

    let slug = entry
        .get("slug")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let url = entry
        .get("url")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| match &slug {
            Some(slug) => format!("{base_url}/t/{slug}/{id}"),
            None => format!("{base_url}/t/{id}"),
        });

    let last_activity = entry
        .get("last_posted_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .or_else(|| {
            entry
                .get("bumped_at")
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
        });

    let relevance = entry
        .get("relevance")
        .or_else(|| entry.get("score"))
        .and_then(Value::as_f64);

    Some(Topic {
        id,
        title,
        url,
        slug,
        views: count(entry, "views"),
        like_count: count(entry, "like_count"),
        posts_count: count(entry, "posts_count"),
        last_activity,
        relevance,
        has_accepted_answer: entry
            .get("has_accepted_answer")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn count(entry: &Value, key: &str) -> u64 {
    entry.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
