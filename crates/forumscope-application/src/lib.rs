//! Application layer for forumscope.
//!
//! Wraps a block in an [`ExceptionScope`]; when the block fails, related
//! forum topics are searched, ranked and handed to a [`TopicRenderer`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use forumscope_application::{ExceptionScope, MarkdownRenderer};
//! use forumscope_infrastructure::SettingsFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsFile::new()?.load()?.with_env_overrides()?;
//! let scope = ExceptionScope::from_settings(&settings, Arc::new(MarkdownRenderer::stderr()))?;
//!
//! let parsed = scope.run(async { "12x".parse::<u32>() }).await;
//! assert!(parsed.is_err());
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod render;
pub mod scope;

pub use render::{format_report, MarkdownRenderer, TopicRenderer, TracingRenderer};
pub use scope::{ExceptionScope, ScopeGuard, ScopeState};
