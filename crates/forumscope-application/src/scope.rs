//! Scoped execution that searches the forum when the scoped block fails.
//!
//! A scope awaits its block. When the block succeeds, the value is returned
//! untouched and nothing else happens. When the block fails, the failure is
//! captured, the search pipeline runs (query, search, rank), the topics are
//! handed to the renderer, and the original failure is returned (or the
//! original panic resumed).
//!
//! Failures of the search pipeline itself are secondary: they are logged and
//! rendered as an unavailable result list, and never replace the block's own
//! failure.

use std::future::Future;
use std::panic::{AssertUnwindSafe, Location};
use std::sync::Arc;

use futures::FutureExt;

use forumscope_core::error::ConfigError;
use forumscope_core::search::{
    ForumSearch, QueryBuilder, ResultList, ResultRanker, SearchConfig, SearchOptions,
};
use forumscope_core::{CaptureError, ExceptionInfo};
use forumscope_infrastructure::{DiscourseSearchClient, Settings};

use crate::render::TopicRenderer;

/// Lifecycle of one scope invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// The block is executing
    Running,
    /// The block finished without failing; no search was performed
    Completed,
    /// The block failed and the search pipeline ran
    Captured,
}

/// Runs blocks and reports related forum topics when they fail.
#[derive(Clone)]
pub struct ExceptionScope {
    config: SearchConfig,
    search: Arc<dyn ForumSearch>,
    renderer: Arc<dyn TopicRenderer>,
}

impl ExceptionScope {
    /// Creates a scope, validating `options` immediately.
    ///
    /// An invalid option is returned as [`ConfigError`] here, before any block
    /// runs and before any request can be sent.
    pub fn new(
        options: SearchOptions,
        search: Arc<dyn ForumSearch>,
        renderer: Arc<dyn TopicRenderer>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::with_config(options.validate()?, search, renderer))
    }

    pub fn with_config(
        config: SearchConfig,
        search: Arc<dyn ForumSearch>,
        renderer: Arc<dyn TopicRenderer>,
    ) -> Self {
        Self {
            config,
            search,
            renderer,
        }
    }

    /// Creates a scope searching the Discourse instance named in `settings`.
    pub fn from_settings(
        settings: &Settings,
        renderer: Arc<dyn TopicRenderer>,
    ) -> forumscope_core::Result<Self> {
        let config = settings.search_config()?;
        let client = DiscourseSearchClient::new(&settings.client)?;
        Ok(Self::with_config(config, Arc::new(client), renderer))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Marks the start of a scoped block.
    pub fn enter(&self) -> ScopeGuard<'_> {
        ScopeGuard {
            scope: self,
            state: ScopeState::Running,
        }
    }

    /// Awaits `block`; on `Err`, reports related topics and returns the error unchanged.
    ///
    /// `E` may be any concrete error type, `Box<dyn Error>` (optionally
    /// `Send + Sync`) or `anyhow::Error`; see [`CaptureError`].
    #[track_caller]
    pub fn run<F, T, E, M>(&self, block: F) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: CaptureError<M>,
    {
        let location = Location::caller();
        async move {
            let guard = self.enter();
            match block.await {
                Ok(value) => {
                    guard.complete();
                    Ok(value)
                }
                Err(err) => {
                    let info = err.capture().with_location(location);
                    guard.capture(info).await;
                    Err(err)
                }
            }
        }
    }

    /// Like [`run`](Self::run), and additionally reports a panic in `block`
    /// before resuming it with the original payload.
    #[track_caller]
    pub fn run_catching_panics<F, T, E, M>(&self, block: F) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: CaptureError<M>,
    {
        let location = Location::caller();
        async move {
            let guard = self.enter();
            match AssertUnwindSafe(block).catch_unwind().await {
                Ok(Ok(value)) => {
                    guard.complete();
                    Ok(value)
                }
                Ok(Err(err)) => {
                    let info = err.capture().with_location(location);
                    guard.capture(info).await;
                    Err(err)
                }
                Err(payload) => {
                    let info = ExceptionInfo::from_panic(payload.as_ref()).with_location(location);
                    guard.capture(info).await;
                    std::panic::resume_unwind(payload)
                }
            }
        }
    }

    /// Runs the search pipeline for `exception` and renders the result.
    ///
    /// Never fails. The renderer is called exactly once.
    pub async fn report(&self, exception: &ExceptionInfo) -> ResultList {
        tracing::info!(
            exception_type = exception.type_name(),
            message = exception.message(),
            "Captured failure, searching forum for related topics"
        );

        let results = match AssertUnwindSafe(self.search_topics(exception))
            .catch_unwind()
            .await
        {
            Ok(Ok(results)) => results,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Forum search unavailable");
                ResultList::unavailable(err.to_string())
            }
            Err(payload) => {
                let reason = ExceptionInfo::from_panic(payload.as_ref());
                tracing::warn!(panic = reason.message(), "Forum search pipeline panicked");
                ResultList::unavailable(format!("search pipeline panicked: {}", reason.message()))
            }
        };

        self.renderer.render(exception, &results);
        results
    }

    async fn search_topics(&self, exception: &ExceptionInfo) -> forumscope_core::Result<ResultList> {
        let query = QueryBuilder::build(exception, &self.config);
        let topics = self.search.search(&query).await?;
        Ok(ResultRanker::rank(topics, &self.config))
    }
}

/// Tracks one scoped block from [`ExceptionScope::enter`] to its outcome.
pub struct ScopeGuard<'a> {
    scope: &'a ExceptionScope,
    state: ScopeState,
}

impl ScopeGuard<'_> {
    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// The block finished without failing. No search is performed.
    pub fn complete(mut self) -> ScopeState {
        self.state = ScopeState::Completed;
        self.state
    }

    /// The block failed: runs the search pipeline and returns the rendered list.
    pub async fn capture(mut self, exception: ExceptionInfo) -> ResultList {
        self.state = ScopeState::Captured;
        self.scope.report(&exception).await
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        // The async pipeline cannot run from here.
        if self.state == ScopeState::Running && std::thread::panicking() {
            tracing::warn!("Scope unwound by a panic without reporting; use run_catching_panics");
        }
    }
}
