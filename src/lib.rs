pub mod citation;
pub mod cli;
pub mod config;
pub mod promotion;
pub mod records;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Only binaries call this; the library never does.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_target(false)
        .init();
}
