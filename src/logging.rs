//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a configured level is present.
pub const DEFAULT_FILTER: &str = "repl_playground=info,tower_http=info";

fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        // A bare level applies to this crate; anything else is a full directive.
        Some(level) if is_bare_level(level) => {
            EnvFilter::new(format!("repl_playground={level},tower_http={level}"))
        }
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

fn is_bare_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "error" | "warn" | "info" | "debug" | "trace" | "off"
    )
}

/// Initialize the logging system.
///
/// With no level, uses the `RUST_LOG` environment variable and falls back
/// to [`DEFAULT_FILTER`].
///
/// # Panics
///
/// Panics if another tracing subscriber has already been set.
pub fn init(level: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Err` if logging has already been initialized.
pub fn try_init(level: Option<&str>) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}
