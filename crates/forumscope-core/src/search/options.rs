//! Search options as supplied by the user and their validated form.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::ConfigError;

/// Default number of topics returned.
pub const DEFAULT_TOP: usize = 5;

/// Upper bound for `top`; one Discourse search page holds 50 topics.
pub const MAX_TOP: usize = 50;

/// Breadth of term matching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Criteria {
    /// Terms are sent unquoted
    #[default]
    Broad,
    /// The phrase is sent as an exact (quoted) match
    Narrow,
}

/// Result ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Views,
    Likes,
    LatestTopic,
}

/// Forum topic state filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TopicStatus {
    #[default]
    Any,
    Open,
    Closed,
    Public,
    Archived,
    #[serde(rename = "noreplies")]
    #[strum(serialize = "noreplies")]
    NoReplies,
    SingleUser,
    Solved,
    Unsolved,
}

/// Raw, unvalidated search options.
///
/// This is what a caller or the settings file provides. Call
/// [`SearchOptions::validate`] to obtain a [`SearchConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub top: i64,
    pub criteria: String,
    pub sortby: String,
    pub status: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP as i64,
            criteria: Criteria::default().to_string(),
            sortby: SortBy::default().to_string(),
            status: TopicStatus::default().to_string(),
        }
    }
}

impl SearchOptions {
    pub fn top(mut self, top: i64) -> Self {
        self.top = top;
        self
    }

    pub fn criteria(mut self, criteria: impl Into<String>) -> Self {
        self.criteria = criteria.into();
        self
    }

    pub fn sortby(mut self, sortby: impl Into<String>) -> Self {
        self.sortby = sortby.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Validates every option and returns the immutable configuration.
    ///
    /// Values are matched case-sensitively after trimming. `top` above
    /// [`MAX_TOP`] is clamped; zero or negative is rejected.
    pub fn validate(&self) -> Result<SearchConfig, ConfigError> {
        if self.top < 1 {
            return Err(ConfigError::InvalidTop(self.top));
        }
        let criteria = self
            .criteria
            .trim()
            .parse::<Criteria>()
            .map_err(|_| ConfigError::UnknownCriteria(self.criteria.clone()))?;
        let sortby = self
            .sortby
            .trim()
            .parse::<SortBy>()
            .map_err(|_| ConfigError::UnknownSortBy(self.sortby.clone()))?;
        let status = self
            .status
            .trim()
            .parse::<TopicStatus>()
            .map_err(|_| ConfigError::UnknownStatus(self.status.clone()))?;

        let top = usize::try_from(self.top).unwrap_or(MAX_TOP).min(MAX_TOP);

        Ok(SearchConfig {
            top,
            criteria,
            sortby,
            status,
        })
    }
}

/// Validated, immutable search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    top: usize,
    criteria: Criteria,
    sortby: SortBy,
    status: TopicStatus,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP,
            criteria: Criteria::default(),
            sortby: SortBy::default(),
            status: TopicStatus::default(),
        }
    }
}

impl SearchConfig {
    /// Builds a configuration from typed values.
    ///
    /// Only `top` can be invalid here; it follows the same rules as
    /// [`SearchOptions::validate`].
    pub fn new(
        top: usize,
        criteria: Criteria,
        sortby: SortBy,
        status: TopicStatus,
    ) -> Result<Self, ConfigError> {
        if top == 0 {
            return Err(ConfigError::InvalidTop(0));
        }
        Ok(Self {
            top: top.min(MAX_TOP),
            criteria,
            sortby,
            status,
        })
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn criteria(&self) -> Criteria {
        self.criteria
    }

    pub fn sortby(&self) -> SortBy {
        self.sortby
    }

    pub fn status(&self) -> TopicStatus {
        self.status
    }
}
