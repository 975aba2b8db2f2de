//! Tracing setup: console layer on stderr plus an optional JSON-lines file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Install the global subscriber.
///
/// The console filter comes from `--log-level` unless `RUST_LOG` is set. The
/// file sink (if configured) always logs JSON lines at `[logging] level`; the
/// returned guard flushes it on drop, so hold it until the command finishes.
pub fn init(
    level: &str,
    json: bool,
    cfg: &irmap_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| eyre::eyre!("invalid log level '{level}': {e}"))?;
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let console = if json {
        console.json().boxed()
    } else {
        console.boxed()
    };

    let mut guard = None;
    let file_layer = match cfg.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file {path:?} has no file name"))?;
            let appender = match cfg.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);
            let file_level = cfg.level.as_deref().unwrap_or("info");
            let file_filter = EnvFilter::try_new(file_level)
                .map_err(|e| eyre::eyre!("invalid logging.level '{file_level}': {e}"))?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))?;
    Ok(guard)
}
