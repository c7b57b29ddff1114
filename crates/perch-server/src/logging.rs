//! `tracing` setup for the `perch` binary.
//!
//! Events always go to stdout. With a log file configured they are also
//! appended there through a non-blocking writer; keep the returned
//! [`WorkerGuard`] alive until shutdown so buffered lines are flushed.

use std::path::Path;

use anyhow::Context as _;
use tracing::level_filters::LevelFilter;
use tracing_appender::{
  non_blocking::{NonBlocking, WorkerGuard},
  rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// A non-blocking writer appending to `path`. Parent directories are created.
pub fn file_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
  let file_name = path
    .file_name()
    .with_context(|| format!("log path {path:?} has no file name"))?;
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  std::fs::create_dir_all(dir)
    .with_context(|| format!("failed to create log directory {dir:?}"))?;

  let appender = RollingFileAppender::builder()
    .rotation(Rotation::NEVER)
    .filename_prefix(file_name.to_string_lossy())
    .build(dir)
    .with_context(|| format!("failed to open log file {path:?}"))?;
  Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. `RUST_LOG` overrides the `INFO` default.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
  let (file_layer, guard) = match log_file {
    Some(path) => {
      let (writer, guard) = file_writer(path)?;
      (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with(fmt::layer())
    .with(file_layer)
    .try_init()
    .context("tracing setup failed")?;

  Ok(guard)
}
