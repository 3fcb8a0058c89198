//! Tracing subscriber setup for the vPTZ binaries.
//!
//! Log output goes to stderr so crop records written to stdout stay clean.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Only the first call
/// installs a subscriber; later calls keep it.
pub fn init_logging(config: &LoggingConfig) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(level_filter(&config.level))
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Filter from `RUST_LOG`, else the configured level. An unparseable level
/// falls back to `info`.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
