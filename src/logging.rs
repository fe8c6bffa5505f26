use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{
    filter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::Config;
use crate::error::{Error, Result};

/// Keeps the non-blocking writer threads alive for the process lifetime.
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Three daily-rolling file sinks, selected by event target: HTTP access
/// events (tower_http), storage events (sqlx), everything else to the
/// quiz log. Debug mode additionally mirrors to stdout.
pub fn init(config: &Config) -> Result<LogGuards> {
    let (http_writer, http_guard) = file_writer(&config.log.http_log_path)?;
    let (db_writer, db_guard) = file_writer(&config.log.db_log_path)?;
    let (quiz_writer, quiz_guard) = file_writer(&config.log.quiz_log_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if config.debug { "debug" } else { "info" }));

    let http_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(http_writer)
        .with_filter(filter::filter_fn(|meta| {
            meta.target().starts_with("tower_http")
        }));

    let db_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(db_writer)
        .with_filter(filter::filter_fn(|meta| meta.target().starts_with("sqlx")));

    let quiz_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(quiz_writer)
        .with_filter(filter::filter_fn(|meta| {
            !meta.target().starts_with("tower_http") && !meta.target().starts_with("sqlx")
        }));

    let stdout_layer = config.debug.then(|| fmt::layer());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(http_layer)
        .with(db_layer)
        .with(quiz_layer)
        .with(stdout_layer)
        .init();

    Ok(LogGuards {
        _guards: vec![http_guard, db_guard, quiz_guard],
    })
}

fn file_writer(path: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let path = Path::new(path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("invalid log path: {}", path.display())))?;

    std::fs::create_dir_all(dir)?;

    let appender = rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Deletes rotated log files older than the retention window. The daily
/// appender names rotations `<file>.<YYYY-MM-DD>`, so anything matching
/// the prefix with an age past the cutoff is fair game.
pub fn prune_rotated_logs(config: &Config, retention: Duration) -> std::io::Result<usize> {
    let mut removed = 0;

    for path in [
        &config.log.http_log_path,
        &config.log.db_log_path,
        &config.log.quiz_log_path,
    ] {
        let path = Path::new(path);
        let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
            continue;
        };
        let prefix = format!("{}.", file_name.to_string_lossy());

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(&prefix) {
                continue;
            }
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            let age = SystemTime::now()
                .duration_since(modified)
                .unwrap_or_default();
            if age > retention && std::fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
    }

    Ok(removed)
}
