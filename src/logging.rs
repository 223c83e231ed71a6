//! Logging initialization and configuration.
//!
//! Log lines go to stderr so captured command output on stdout stays clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a level is given.
pub const DEFAULT_FILTER: &str = "shellkit=info";

fn build_filter(level: Option<&str>) -> EnvFilter {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(env.as_deref(), level)
}

/// `env` holds the `RUST_LOG` value, which wins when it parses.
fn resolve_filter(env: Option<&str>, level: Option<&str>) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| match level {
            Some(level) if !level.contains('=') => EnvFilter::new(format!("shellkit={}", level)),
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::new(DEFAULT_FILTER),
        })
}

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// falls back to `level` (a bare level such as `debug` is scoped to this
/// crate) and then to `shellkit=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init(level: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init(level: Option<&str>) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_idempotent() {
        let _ = try_init(None);
        // Second call errors once a subscriber is set; it must not panic.
        let _ = try_init(Some("debug"));
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init(Some("trace"));

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        tracing::warn!("test warn message");
    }

    #[test]
    fn test_filter_accepts_directives() {
        let filter = resolve_filter(None, Some("shellkit=debug,tar=warn")).to_string();
        assert!(filter.contains("shellkit=debug"));
        assert!(filter.contains("tar=warn"));
    }

    #[test]
    fn test_bare_level_scoped_to_crate() {
        let filter = resolve_filter(None, Some("debug")).to_string();
        assert!(filter.contains("shellkit=debug"));
        assert!(resolve_filter(None, None).to_string().contains("shellkit=info"));
    }

    #[test]
    fn test_rust_log_wins() {
        let filter = resolve_filter(Some("tar=trace"), Some("debug")).to_string();
        assert!(filter.contains("tar=trace"));
        assert!(!filter.contains("shellkit=debug"));
    }
}
