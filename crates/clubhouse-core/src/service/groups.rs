//! Training group maintenance.

use tracing::info;
use uuid::Uuid;

use super::require;
use crate::{
  Error, Result,
  group::{Group, GroupPatch, NewGroup},
  repo::Repository,
  role::{Coach, Role},
};

pub fn create_group(repo: &mut impl Repository, input: NewGroup) -> Result<Group> {
  let group = input.into_group(Uuid::new_v4())?;
  ensure_active_coach(repo, group.coach_id)?;

  repo.insert_group(&group)?;
  info!(group_id = %group.id, coach_id = %group.coach_id, "created group");
  Ok(group)
}

pub fn update_group(
  repo: &mut impl Repository,
  id: Uuid,
  patch: GroupPatch,
) -> Result<Group> {
  let mut group = require(repo.group(id)?, "group", id)?;
  let previous_coach = group.coach_id;
  patch.apply(&mut group)?;
  if group.coach_id != previous_coach {
    ensure_active_coach(repo, group.coach_id)?;
    info!(group_id = %id, coach_id = %group.coach_id, "reassigned group");
  }

  repo.update_group(&group)?;
  Ok(group)
}

fn ensure_active_coach(repo: &impl Repository, coach_id: Uuid) -> Result<()> {
  let coach = require(repo.find::<Coach>(coach_id)?, "coach", coach_id)?;
  if !coach.is_active() {
    return Err(Error::Conflict(format!("coach {coach_id} is no longer active")));
  }
  Ok(())
}
