//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// Invalid input, or a request the target's current state forbids.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// A storage constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error. Used as `.map_err(ApiError::store)`.
  pub fn store<E: Into<clubhouse_core::Error>>(e: E) -> Self {
    Self::from(e.into())
  }
}

impl From<clubhouse_core::Error> for ApiError {
  fn from(e: clubhouse_core::Error) -> Self {
    use clubhouse_core::Error as E;
    match e {
      E::NotFound { .. } => Self::NotFound(e.to_string()),
      E::Conflict(m) => Self::BadRequest(m),
      E::Validation(_) => Self::BadRequest(e.to_string()),
      E::Integrity(_) => Self::Conflict(e.to_string()),
      E::Credential(_) | E::Storage(_) => Self::Internal(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
