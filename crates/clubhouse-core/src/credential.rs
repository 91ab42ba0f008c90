//! Password credentials stored on a [`Person`](crate::person::Person).
//!
//! Hashes are argon2 PHC strings. People registered together with a role get
//! the hash of a random UUID nobody ever sees, so they cannot sign in until a
//! password is set explicitly.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use uuid::Uuid;

use crate::{Error, Result};

pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Credential(e.to_string()))
}

/// A valid hash of a secret that is immediately thrown away.
pub fn unusable_password() -> Result<String> {
  hash_password(&Uuid::new_v4().to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_verifies_only_its_own_password() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("battery staple", &hash));
  }

  #[test]
  fn unusable_password_rejects_empty_input() {
    let hash = unusable_password().unwrap();
    assert!(!verify_password("", &hash));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }
}
