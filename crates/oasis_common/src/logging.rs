//! Logging utilities for the Oasis scheduling service.
//!
//! Provides a standardized approach to initializing the tracing subscriber
//! across all crates in the workspace.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default log level (INFO).
///
/// Call once at application start.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still wins where set; the directive only raises the floor for
/// the workspace's own crates.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("oasis={}", level).parse().expect("valid directive"));

    // Use try_init to handle the case where a global default subscriber has
    // already been set (tests initialize repeatedly).
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
