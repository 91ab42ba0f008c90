//! Error types for `clubhouse-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },

  /// The aggregate is in the wrong state for the requested operation.
  /// Nothing has been written when this is returned.
  #[error("{0}")]
  Conflict(String),

  #[error("invalid input: {0}")]
  Validation(String),

  /// A uniqueness or foreign-key constraint rejected the write.
  #[error("integrity violation: {0}")]
  Integrity(String),

  #[error("credential error: {0}")]
  Credential(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: &'static str, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
