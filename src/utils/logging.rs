//! Logging setup shared by the demo binary and tests.
//!
//! `RUST_LOG` wins when set; otherwise everything is filtered at the
//! configured level. Worker threads are named after their subscriber, so
//! thread names are included in every line.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber. Later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(default_level).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}

/// Maps a configured level name to a filter, falling back to `INFO`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "warn" | "warning" => LevelFilter::WARN,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    }
}
