//! Clubhouse HTTP server: configuration and application assembly.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store
//! and serves [`app`].

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use clubhouse_core::store::ClubStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Settings read from `config.toml` and `CLUBHOUSE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub const DEFAULT_HOST: &'static str = "127.0.0.1";
  pub const DEFAULT_PORT: u16 = 8000;
  pub const DEFAULT_STORE_PATH: &'static str = "clubhouse.db";

  /// Layer `file` (optional) and the environment over the defaults.
  pub fn load(file: Option<PathBuf>) -> Result<Self, config::ConfigError> {
    let mut builder = config::Config::builder()
      .set_default("host", Self::DEFAULT_HOST)?
      .set_default("port", i64::from(Self::DEFAULT_PORT))?
      .set_default("store_path", Self::DEFAULT_STORE_PATH)?;
    if let Some(file) = file {
      builder = builder.add_source(config::File::from(file).required(false));
    }
    builder
      .add_source(config::Environment::with_prefix("CLUBHOUSE"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The complete application: the JSON API under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: ClubStore + 'static,
{
  Router::new()
    .nest("/api", clubhouse_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use clubhouse_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(None).unwrap();
    assert_eq!(cfg.port, ServerConfig::DEFAULT_PORT);
    assert_eq!(cfg.store_path, PathBuf::from(ServerConfig::DEFAULT_STORE_PATH));
    assert_eq!(cfg.address(), format!("{}:{}", cfg.host, cfg.port));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Some(PathBuf::from("/nonexistent/clubhouse.toml")));
    assert!(cfg.is_ok());
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = app(Arc::new(store));

    let req = Request::builder().uri("/api/users").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let req = Request::builder().uri("/users").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }
}
