//! Role lifecycle: appointing and cancelling time-bounded roles.
//!
//! The invariant maintained here is "at most one active role of a kind per
//! person". [`appoint`] checks it before inserting; the storage layer backs
//! the check with a unique index so a concurrent writer surfaces as
//! [`Error::Integrity`] rather than a second active row.

use tracing::info;
use uuid::Uuid;

use super::{persons, require};
use crate::{
  Error, Result,
  clock::Clock,
  person::NewPerson,
  repo::Repository,
  role::{Assignment, Role, RoleKind},
};

/// Give `person_id` a new active role of kind `R`, starting today.
///
/// Fails with [`Error::NotFound`] if the person does not exist and with
/// [`Error::Conflict`] if they already hold an active role of this kind.
pub fn appoint<R: Role>(
  repo: &mut impl Repository,
  clock: &dyn Clock,
  person_id: Uuid,
  details: R::Details,
) -> Result<R> {
  repo.require_person(person_id)?;
  R::validate_details(&details)?;

  if let Some(existing) = repo.active::<R>(person_id)? {
    return Err(Error::Conflict(format!(
      "person {person_id} already has an active {} role ({})",
      R::KIND,
      existing.id()
    )));
  }

  let role = R::appointed(Uuid::new_v4(), person_id, clock.today(), details);
  repo.insert_role(&role.clone().into_any())?;
  info!(
    kind = %R::KIND,
    role_id = %role.id(),
    %person_id,
    "appointed role"
  );
  Ok(role)
}

/// End the role `id` of kind `R` on today's date.
///
/// A coach cannot be cancelled while any of their groups is still future or
/// active.
pub fn cancel<R: Role>(
  repo: &mut impl Repository,
  clock: &dyn Clock,
  id: Uuid,
) -> Result<R> {
  let mut role = require(repo.find::<R>(id)?, R::KIND.into(), id)?;

  if R::KIND == RoleKind::Coach && role.is_active() {
    let open = repo.open_groups_of(id)?;
    if !open.is_empty() {
      return Err(Error::Conflict(format!(
        "coach {id} still leads {} open group(s)",
        open.len()
      )));
    }
  }

  role.cancel(clock.today())?;
  repo.save_tenure(R::KIND, id, role.tenure())?;
  info!(kind = %R::KIND, role_id = %id, "cancelled role");
  Ok(role)
}

/// Register a person with an unusable credential and appoint them as `R`.
/// Either both rows are written or neither is.
pub fn create_person_with_role<R: Role>(
  repo: &mut impl Repository,
  clock: &dyn Clock,
  mut person: NewPerson,
  details: R::Details,
) -> Result<Assignment<R>> {
  R::validate_details(&details)?;
  person.password = None;
  let person = persons::create_person(repo, clock, person)?;
  let role = appoint::<R>(repo, clock, person.id, details)?;
  Ok(Assignment { role, person })
}

/// Pair a role with the person holding it.
pub fn with_person<R: Role>(
  repo: &impl Repository,
  role: R,
) -> Result<Assignment<R>> {
  let person = repo.require_person(role.person_id())?;
  Ok(Assignment { role, person })
}
