//! Error type for `clubhouse-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] clubhouse_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn is_constraint(e: &rusqlite::Error) -> bool {
  e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

/// Constraint violations become [`clubhouse_core::Error::Integrity`]; every
/// other backend failure is opaque storage trouble.
impl From<Error> for clubhouse_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::Sqlite(e) if is_constraint(&e) => Self::Integrity(e.to_string()),
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) if is_constraint(&e) => {
        Self::Integrity(e.to_string())
      }
      other => Self::Storage(Box::new(other)),
    }
  }
}
