//! Client-side ordering and truncation of search results.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::model::{ResultList, Topic};
use super::options::{SearchConfig, SortBy};

/// Orders, deduplicates and truncates topics. Never fails.
pub struct ResultRanker;

impl ResultRanker {
    /// Ranks `topics` according to `config`.
    ///
    /// All orderings are descending and stable, so ties keep response order.
    /// Topics without a relevance score or timestamp sort after those with one.
    pub fn rank(mut topics: Vec<Topic>, config: &SearchConfig) -> ResultList {
        match config.sortby() {
            SortBy::Relevance => {
                topics.sort_by(|a, b| desc_option(a.relevance, b.relevance, f64::total_cmp))
            }
            SortBy::Views => topics.sort_by(|a, b| b.views.cmp(&a.views)),
            SortBy::Likes => topics.sort_by(|a, b| b.like_count.cmp(&a.like_count)),
            SortBy::LatestTopic => {
                topics.sort_by(|a, b| desc_option(a.last_activity, b.last_activity, Ord::cmp))
            }
        }

        let mut seen = HashSet::new();
        let ranked = topics
            .into_iter()
            .filter(|topic| seen.insert(topic.id))
            .take(config.top())
            .collect();

        ResultList::from_ranked(ranked)
    }
}

/// Descending by `cmp`, with `None` last. `cmp` must be a total order.
fn desc_option<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&b, &a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
