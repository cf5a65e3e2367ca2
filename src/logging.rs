//! File-only tracing setup. The terminal belongs to the UI, so nothing is
//! written to stdout or stderr once the session starts.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_PREFIX: &str = "pokecards.log";

/// Installs a daily rolling file subscriber filtered by `RUST_LOG` (default `info`).
///
/// Keep the returned guard alive for the whole session; dropping it flushes
/// and stops the background writer.
pub fn init(log_dir: &Path) -> WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log directory {}: {err}", log_dir.display());
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter);

    if let Err(err) = tracing_subscriber::registry().with(file_layer).try_init() {
        eprintln!("Failed to install log subscriber: {err}");
    }

    tracing::info!(dir = %log_dir.display(), "logging initialized");
    guard
}
