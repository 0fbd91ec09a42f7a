//! Logging setup for the terminal front-end
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `request_matrix=info`).
//! When `REQUEST_MATRIX_LOG_DIR` is set they are also written to a daily
//! rolling file in that directory.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "request_matrix=info";

/// Environment variable naming the log file directory
pub const LOG_DIR_ENV_VAR: &str = "REQUEST_MATRIX_LOG_DIR";

/// File name prefix of the rolling log files
pub const LOG_FILE_PREFIX: &str = "request-matrix.log";

/// Install the global tracing subscriber
pub fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = match std::env::var(LOG_DIR_ENV_VAR) {
        Ok(dir) if !dir.trim().is_empty() => {
            let dir = dir.trim();
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            Some(fmt::layer().json().with_writer(appender))
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
