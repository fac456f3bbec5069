//! Logging setup for the binaries

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Log level from `LOG_LEVEL` (trace, debug, info, warn, error), default info
pub fn level_from_env() -> Level {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| Level::from_str(value.trim()).ok())
        .unwrap_or(Level::INFO)
}

/// Install the global fmt subscriber; a second call is a no-op
pub fn init() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_from_env())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
