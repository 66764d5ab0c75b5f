use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_DIR: &str = ".sigscope/logs";

/// `$HOME/.sigscope/logs`, or `./.sigscope/logs` without a home directory.
pub fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(DEFAULT_LOG_DIR)
}

/// Installs the global subscriber: a daily rolling file plus, optionally,
/// coloured output on stderr. Level comes from `RUST_LOG` (default `info`).
///
/// Keep the returned guard alive; buffered lines are flushed when it drops.
/// Calling this again keeps the first subscriber.
pub fn init_logging(component: &str, log_dir: Option<&Path>, to_stderr: bool) -> WorkerGuard {
    let log_dir = log_dir.map(Path::to_path_buf).unwrap_or_else(default_log_dir);
    let _ = std::fs::create_dir_all(&log_dir);

    // Files are named after the component, e.g. matcher.2026-10-17
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let installed = if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).try_init()
    } else {
        registry.try_init()
    };

    if installed.is_err() {
        tracing::debug!("a global subscriber is already installed");
    }

    guard
}
