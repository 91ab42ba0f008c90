//! Business operations, written once against [`Repository`].
//!
//! Each public function here is one unit of work. It reads, checks its
//! preconditions, and writes through the repository it is handed; it never
//! commits. A precondition failure returns before anything is written.
//!
//! [`Repository`]: crate::repo::Repository

pub mod applications;
pub mod groups;
pub mod persons;
pub mod roles;

use uuid::Uuid;

use crate::{Error, Result};

fn require<T>(found: Option<T>, entity: &'static str, id: Uuid) -> Result<T> {
  found.ok_or_else(|| Error::not_found(entity, id))
}
