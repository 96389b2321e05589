//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Set to `1` to emit JSON log lines.
pub const LOG_JSON_ENV: &str = "FORUMSCOPE_LOG_JSON";

/// Installs a global fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);

    let installed = if std::env::var(LOG_JSON_ENV).ok().as_deref() == Some("1") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        init_tracing();
        assert!(!init_tracing());
    }
}
