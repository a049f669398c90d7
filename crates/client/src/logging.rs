//! Tracing setup for the binary.
use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log to stderr and to `client.log` under the platform cache directory.
///
/// `RUST_LOG` refines the filter; the default level is `info`.
pub fn setup_logging() -> Result<PathBuf> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "client.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    // Keep the file writer alive for the whole process.
    std::mem::forget(guard);

    tracing::debug!("Log file: {}/client.log", log_dir.display());
    Ok(log_dir)
}

/// Platform log directory, e.g. `~/.cache/roster/logs` on Linux.
fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "roster")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("/tmp/roster/logs"))
}
