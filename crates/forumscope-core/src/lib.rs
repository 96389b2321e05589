pub mod error;
pub mod exception;
pub mod search;

// Re-export common types
pub use error::{ConfigError, Result, SearchError};
pub use exception::{CaptureError, ExceptionInfo};
