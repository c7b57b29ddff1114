//! Runtime configuration and startup secrets.
//!
//! Non-secret settings come from an optional TOML file layered under
//! `PERCH_`-prefixed environment variables. The five secrets are read from
//! plain, unprefixed environment variables and are all mandatory.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use perch_twitter::{ClientSettings, RateLimitPolicy, TwitterCredentials, config::DEFAULT_API_URL};
use serde::Deserialize;
use thiserror::Error;

use crate::session::SessionKey;

// ─── Server configuration ────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `perch.toml` and the
/// environment.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Where the provider sends the browser after authorization. `oob` is
  /// used when unset.
  pub callback_url:       Option<String>,
  pub api_url:            String,
  pub session_ttl_hours:  i64,
  /// Add `Secure` to the session cookie. Enable when served over HTTPS.
  pub secure_cookie:      bool,
  pub wait_on_rate_limit: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "0.0.0.0".to_string(),
      port:               4455,
      store_path:         PathBuf::from("perch.sqlite"),
      callback_url:       None,
      api_url:            DEFAULT_API_URL.to_string(),
      session_ttl_hours:  168,
      secure_cookie:      false,
      wait_on_rate_limit: true,
    }
  }
}

impl ServerConfig {
  /// Layer the (optional) file at `path` and `PERCH_*` variables over the
  /// defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PERCH"))
      .build()?
      .try_deserialize()
  }

  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(self.session_ttl_hours)
  }

  pub fn client_settings(&self) -> ClientSettings {
    ClientSettings {
      api_url: self.api_url.clone(),
      callback_url: self.callback_url.clone(),
      rate_limit: RateLimitPolicy {
        wait: self.wait_on_rate_limit,
        ..RateLimitPolicy::default()
      },
      ..ClientSettings::default()
    }
  }

  /// `Max-Age` for the session cookie, in seconds.
  pub fn cookie_max_age(&self) -> u64 {
    self.session_ttl_hours.max(0) as u64 * 3600
  }
}

// ─── Secrets ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SecretsError {
  #[error("required environment variable {0} is missing or empty")]
  Missing(&'static str),

  #[error("invalid session signing key")]
  InvalidSessionKey,

  #[error(transparent)]
  Config(#[from] config::ConfigError),
}

/// The OAuth credentials and session-signing key, loaded once at startup.
pub struct Secrets {
  pub twitter:     TwitterCredentials,
  pub session_key: SessionKey,
}

impl fmt::Debug for Secrets {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Secrets")
      .field("twitter", &self.twitter)
      .field("session_key", &"<redacted>")
      .finish()
  }
}

impl Secrets {
  /// Read `API_KEY`, `API_SECRET`, `ACCESS_TOKEN`, `ACCESS_SECRET` and
  /// `SECRET_KEY` from the process environment.
  pub fn from_env() -> Result<Self, SecretsError> {
    let source = config::Config::builder()
      .add_source(config::Environment::default())
      .build()?;
    Self::from_config(&source)
  }

  /// The first missing variable, in the order listed above, is reported.
  pub fn from_config(source: &config::Config) -> Result<Self, SecretsError> {
    let twitter = TwitterCredentials {
      consumer_key:    required(source, "API_KEY")?,
      consumer_secret: required(source, "API_SECRET")?,
      access_token:    required(source, "ACCESS_TOKEN")?,
      access_secret:   required(source, "ACCESS_SECRET")?,
    };
    let session_key = SessionKey::new(required(source, "SECRET_KEY")?.as_bytes())
      .map_err(|_| SecretsError::InvalidSessionKey)?;
    Ok(Self { twitter, session_key })
  }
}

fn required(source: &config::Config, var: &'static str) -> Result<String, SecretsError> {
  match source.get_string(&var.to_ascii_lowercase()) {
    Ok(value) if !value.trim().is_empty() => Ok(value),
    Ok(_) | Err(config::ConfigError::NotFound(_)) => Err(SecretsError::Missing(var)),
    Err(e) => Err(e.into()),
  }
}
