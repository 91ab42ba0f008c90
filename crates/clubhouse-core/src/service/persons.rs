//! Person registration and maintenance.

use tracing::info;
use uuid::Uuid;

use super::require;
use crate::{
  Error, Result,
  clock::Clock,
  credential::{hash_password, unusable_password},
  person::{NewPerson, Person, PersonPatch},
  repo::Repository,
};

/// Register a person. A supplied password is hashed; without one the person
/// gets an unusable credential.
pub fn create_person(
  repo: &mut impl Repository,
  clock: &dyn Clock,
  mut input: NewPerson,
) -> Result<Person> {
  let password_hash = match input.password.take() {
    Some(password) => hash_password(&password)?,
    None => unusable_password()?,
  };
  let person = input.into_person(Uuid::new_v4(), clock.now(), password_hash)?;
  ensure_email_free(repo, &person.email, person.id)?;

  repo.insert_person(&person)?;
  info!(person_id = %person.id, "registered person");
  Ok(person)
}

pub fn update_person(
  repo: &mut impl Repository,
  id: Uuid,
  patch: PersonPatch,
) -> Result<Person> {
  let mut person = require(repo.person(id)?, "person", id)?;
  patch.apply(&mut person)?;
  ensure_email_free(repo, &person.email, person.id)?;
  if let Some(password) = &patch.password {
    person.password_hash = hash_password(password)?;
  }

  repo.update_person(&person)?;
  Ok(person)
}

pub fn delete_person(repo: &mut impl Repository, id: Uuid) -> Result<()> {
  if !repo.delete_person(id)? {
    return Err(Error::not_found("person", id));
  }
  info!(person_id = %id, "deleted person");
  Ok(())
}

fn ensure_email_free(
  repo: &impl Repository,
  email: &str,
  owner: Uuid,
) -> Result<()> {
  match repo.person_by_email(email)? {
    Some(other) if other.id != owner => Err(Error::Conflict(format!(
      "email {email} is already registered"
    ))),
    _ => Ok(()),
  }
}
