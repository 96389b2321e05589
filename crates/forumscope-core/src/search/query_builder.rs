//! Translation of a captured failure into a forum search query.

use super::model::SearchQuery;
use super::options::{Criteria, SearchConfig, SortBy, TopicStatus};
use crate::exception::ExceptionInfo;

/// Maximum length of the search phrase, in characters.
pub const MAX_PHRASE_CHARS: usize = 200;

const FALLBACK_TYPE_NAME: &str = "Error";

/// Builds [`SearchQuery`] values. Stateless and deterministic.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Builds the query for `exception` under `config`.
    ///
    /// The phrase is `"<Type>: <message>"`, or the type alone when the message
    /// is blank. Only the first line of the message is kept, double quotes are
    /// removed and whitespace is collapsed so the phrase stays well-formed.
    pub fn build(exception: &ExceptionInfo, config: &SearchConfig) -> SearchQuery {
        let phrase = Self::phrase(exception);
        let phrase = match config.criteria() {
            Criteria::Narrow => format!("\"{}\"", phrase),
            Criteria::Broad => phrase,
        };

        SearchQuery {
            phrase,
            criteria: config.criteria(),
            order: Self::order_token(config.sortby()),
            status: Self::status_token(config.status()),
            sortby: config.sortby(),
            status_filter: config.status(),
        }
    }

    fn phrase(exception: &ExceptionInfo) -> String {
        let type_name = sanitize(exception.type_name());
        let type_name = if type_name.is_empty() {
            FALLBACK_TYPE_NAME.to_string()
        } else {
            type_name
        };

        let first_line = exception.message().lines().next().unwrap_or("");
        let message = sanitize(first_line);

        let phrase = if message.is_empty() {
            type_name
        } else {
            format!("{}: {}", type_name, message)
        };

        truncate_chars(&phrase, MAX_PHRASE_CHARS)
    }

    /// Maps the sort order to the Discourse `order:` token.
    ///
    /// Relevance is the server default and needs no token.
    fn order_token(sortby: SortBy) -> Option<String> {
        match sortby {
            SortBy::Relevance => None,
            other => Some(format!("order:{}", other)),
        }
    }

    fn status_token(status: TopicStatus) -> Option<String> {
        match status {
            TopicStatus::Any => None,
            other => Some(format!("status:{}", other)),
        }
    }
}

fn sanitize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
