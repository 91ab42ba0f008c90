//! The group-application workflow.
//!
//! Approval is the only operation in the system that touches three
//! aggregates at once: the application, the applicant's athlete role, and
//! the athlete's group memberships. It runs in a single unit of work, so a
//! failure at any step leaves all three as they were.

use tracing::{debug, info};
use uuid::Uuid;

use super::{require, roles};
use crate::{
  Error, Result,
  application::{ApplicationPatch, GroupApplication, NewApplication},
  clock::Clock,
  repo::Repository,
  role::Athlete,
};

pub fn submit_application(
  repo: &mut impl Repository,
  clock: &dyn Clock,
  input: NewApplication,
) -> Result<GroupApplication> {
  repo.require_person(input.person_id)?;
  require(repo.group(input.group_id)?, "group", input.group_id)?;

  let application = input.into_application(Uuid::new_v4(), clock.now())?;
  repo.insert_application(&application)?;
  info!(
    application_id = %application.id,
    person_id = %application.person_id,
    group_id = %application.group_id,
    "submitted group application"
  );
  Ok(application)
}

/// Approve a `New` application.
///
/// The applicant's active athlete role is reused as is, including its
/// playing level; an athlete is appointed at the requested level only when
/// none is active. Membership in the group is then added if missing.
pub fn approve_application(
  repo: &mut impl Repository,
  clock: &dyn Clock,
  id: Uuid,
) -> Result<GroupApplication> {
  let mut application = load(repo, id)?;
  application.approve()?;

  let athlete = match repo.active::<Athlete>(application.person_id)? {
    Some(athlete) => {
      if athlete.playing_level != application.playing_level {
        debug!(
          athlete_id = %athlete.id,
          current = ?athlete.playing_level,
          requested = ?application.playing_level,
          "keeping existing athlete playing level"
        );
      }
      athlete
    }
    None => roles::appoint::<Athlete>(
      repo,
      clock,
      application.person_id,
      application.playing_level,
    )?,
  };

  if !repo.add_athlete_group(athlete.id, application.group_id)? {
    debug!(
      athlete_id = %athlete.id,
      group_id = %application.group_id,
      "athlete already in group"
    );
  }

  repo.update_application(&application)?;
  info!(
    application_id = %id,
    athlete_id = %athlete.id,
    group_id = %application.group_id,
    "approved group application"
  );
  Ok(application)
}

/// Reject a `New` application, recording `reason`.
pub fn reject_application(
  repo: &mut impl Repository,
  id: Uuid,
  reason: String,
) -> Result<GroupApplication> {
  let mut application = load(repo, id)?;
  application.reject(reason)?;

  repo.update_application(&application)?;
  info!(application_id = %id, "rejected group application");
  Ok(application)
}

pub fn update_application(
  repo: &mut impl Repository,
  id: Uuid,
  patch: ApplicationPatch,
) -> Result<GroupApplication> {
  let mut application = load(repo, id)?;
  patch.apply(&mut application)?;
  repo.update_application(&application)?;
  Ok(application)
}

pub fn delete_application(repo: &mut impl Repository, id: Uuid) -> Result<()> {
  load(repo, id)?.ensure_new("deleted")?;
  if !repo.delete_application(id)? {
    return Err(Error::not_found("group application", id));
  }
  info!(application_id = %id, "deleted group application");
  Ok(())
}

fn load(repo: &impl Repository, id: Uuid) -> Result<GroupApplication> {
  require(repo.application(id)?, "group application", id)
}
