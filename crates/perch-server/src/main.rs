//! perch server binary.
//!
//! Reads the five required secrets from the environment, layers
//! `perch.toml` (or the path given with `--config`) under `PERCH_*`
//! variables, opens the SQLite store and serves the app over HTTP.
//!
//! ```text
//! API_KEY=… API_SECRET=… ACCESS_TOKEN=… ACCESS_SECRET=… SECRET_KEY=… \
//!   cargo run -p perch-server --bin perch -- --reset-db
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use perch_core::store::TimelineStore as _;
use perch_server::{AppState, Secrets, ServerConfig};
use perch_store_sqlite::SqliteStore;
use perch_twitter::TwitterClient;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about = "Twitter timeline ingestion and query server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "perch.toml")]
  config: PathBuf,

  /// Drop and recreate every table before serving. All data is lost.
  #[arg(long)]
  reset_db: bool,

  /// Also append log output to this file.
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let _log_guard = perch_server::logging::init(cli.log_file.as_deref())?;

  tracing::info!(version = env!("CARGO_PKG_VERSION"), "perch starting");

  // Secrets first: nothing else starts without them.
  let secrets = Secrets::from_env().context("failed to load credentials")?;

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to read configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.reset_db {
    store.reset().await.context("failed to reset store")?;
  }
  let purged = store
    .purge_expired_sessions()
    .await
    .context("failed to purge expired sessions")?;
  tracing::info!(purged, "expired sessions removed");

  let provider = TwitterClient::build_authenticated(&secrets.twitter, &server_cfg.client_settings())
    .context("failed to build twitter client")?;

  let state = AppState {
    store:       Arc::new(store),
    provider:    Arc::new(provider),
    session_key: Arc::new(secrets.session_key),
    config:      Arc::new(server_cfg.clone()),
  };

  let app = perch_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
