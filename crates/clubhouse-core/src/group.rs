//! Training groups.
//!
//! A group always has exactly one coach. Athlete membership is held on the
//! athlete side ([`crate::role::Athlete::groups`]); the group itself owns no
//! athletes.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  role::PlayingLevel,
  validate::{non_blank, optional, required},
};

/// Hard upper bound on `max_participants`.
pub const MAX_PARTICIPANTS: u8 = 12;
pub const DEFAULT_MIN_PARTICIPANTS: u8 = 6;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Weekday {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
  Sunday,
}

/// Descriptive lifecycle of a group.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupStatus {
  #[default]
  Future,
  Active,
  Finished,
}

impl GroupStatus {
  /// Future and active groups still need their coach.
  pub fn is_open(self) -> bool { !matches!(self, Self::Finished) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:               Uuid,
  pub name:             String,
  pub description:      Option<String>,
  pub coach_id:         Uuid,
  pub min_participants: u8,
  pub max_participants: u8,
  pub playing_level:    PlayingLevel,
  pub training_days:    BTreeSet<Weekday>,
  /// Free-form label such as "18:00–19:30".
  pub training_time:    String,
  pub status:           GroupStatus,
  pub training_start:   Option<NaiveDate>,
}

impl Group {
  pub fn validate(&self) -> Result<()> {
    required("name", &self.name, 300)?;
    optional("description", self.description.as_deref(), 3000)?;
    required("training_time", &self.training_time, 50)?;

    if self.max_participants > MAX_PARTICIPANTS {
      return Err(Error::Validation(format!(
        "max_participants must be at most {MAX_PARTICIPANTS}"
      )));
    }
    if self.min_participants > self.max_participants {
      return Err(Error::Validation(
        "min_participants must not exceed max_participants".into(),
      ));
    }
    if self.training_days.is_empty() {
      return Err(Error::Validation(
        "at least one training day is required".into(),
      ));
    }
    Ok(())
  }
}

// ─── Input types ─────────────────────────────────────────────────────────────

fn default_min() -> u8 { DEFAULT_MIN_PARTICIPANTS }

fn default_max() -> u8 { MAX_PARTICIPANTS }

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
  pub name:             String,
  #[serde(default)]
  pub description:      Option<String>,
  pub coach_id:         Uuid,
  #[serde(default = "default_min")]
  pub min_participants: u8,
  #[serde(default = "default_max")]
  pub max_participants: u8,
  pub playing_level:    PlayingLevel,
  pub training_days:    BTreeSet<Weekday>,
  pub training_time:    String,
  #[serde(default)]
  pub status:           GroupStatus,
  #[serde(default)]
  pub training_start:   Option<NaiveDate>,
}

impl NewGroup {
  pub fn into_group(self, id: Uuid) -> Result<Group> {
    let group = Group {
      id,
      name: self.name.trim().to_owned(),
      description: non_blank(self.description),
      coach_id: self.coach_id,
      min_participants: self.min_participants,
      max_participants: self.max_participants,
      playing_level: self.playing_level,
      training_days: self.training_days,
      training_time: self.training_time.trim().to_owned(),
      status: self.status,
      training_start: self.training_start,
    };
    group.validate()?;
    Ok(group)
  }
}

/// Partial update of a group. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPatch {
  pub name:             Option<String>,
  pub description:      Option<String>,
  pub coach_id:         Option<Uuid>,
  pub min_participants: Option<u8>,
  pub max_participants: Option<u8>,
  pub playing_level:    Option<PlayingLevel>,
  pub training_days:    Option<BTreeSet<Weekday>>,
  pub training_time:    Option<String>,
  pub status:           Option<GroupStatus>,
  /// `null` clears the start date; an absent field leaves it unchanged.
  #[serde(default, deserialize_with = "present")]
  pub training_start:   Option<Option<NaiveDate>>,
}

/// Wrap any value that is present, `null` included, in `Some`.
fn present<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(de).map(Some)
}

impl GroupPatch {
  pub fn apply(&self, group: &mut Group) -> Result<()> {
    if let Some(v) = &self.name {
      group.name = v.trim().to_owned();
    }
    if let Some(v) = &self.description {
      group.description = non_blank(Some(v.clone()));
    }
    if let Some(v) = self.coach_id {
      group.coach_id = v;
    }
    if let Some(v) = self.min_participants {
      group.min_participants = v;
    }
    if let Some(v) = self.max_participants {
      group.max_participants = v;
    }
    if let Some(v) = self.playing_level {
      group.playing_level = v;
    }
    if let Some(v) = &self.training_days {
      group.training_days = v.clone();
    }
    if let Some(v) = &self.training_time {
      group.training_time = v.trim().to_owned();
    }
    if let Some(v) = self.status {
      group.status = v;
    }
    if let Some(v) = self.training_start {
      group.training_start = v;
    }
    group.validate()
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupQuery {
  pub coach_id:      Option<Uuid>,
  pub status:        Option<GroupStatus>,
  pub playing_level: Option<PlayingLevel>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_group() -> NewGroup {
    NewGroup {
      name:             "Evening beginners".into(),
      description:      None,
      coach_id:         Uuid::new_v4(),
      min_participants: DEFAULT_MIN_PARTICIPANTS,
      max_participants: MAX_PARTICIPANTS,
      playing_level:    PlayingLevel::Beginner,
      training_days:    [Weekday::Tuesday, Weekday::Thursday].into(),
      training_time:    "19:00-20:30".into(),
      status:           GroupStatus::Future,
      training_start:   None,
    }
  }

  #[test]
  fn defaults_are_valid() {
    let group = new_group().into_group(Uuid::new_v4()).unwrap();
    assert_eq!(group.max_participants, 12);
    assert_eq!(group.status, GroupStatus::Future);
  }

  #[test]
  fn capacity_above_twelve_is_rejected() {
    let mut input = new_group();
    input.max_participants = 13;
    let err = input.into_group(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn min_above_max_is_rejected() {
    let mut input = new_group();
    input.min_participants = 10;
    input.max_participants = 8;
    assert!(input.into_group(Uuid::new_v4()).is_err());
  }

  #[test]
  fn patch_revalidates() {
    let mut group = new_group().into_group(Uuid::new_v4()).unwrap();
    let patch = GroupPatch {
      training_days: Some(BTreeSet::new()),
      ..Default::default()
    };
    assert!(matches!(patch.apply(&mut group), Err(Error::Validation(_))));
  }

  #[test]
  fn patch_sets_and_clears_training_start() {
    let mut group = new_group().into_group(Uuid::new_v4()).unwrap();

    let patch: GroupPatch =
      serde_json::from_str(r#"{"training_start":"2024-10-01"}"#).unwrap();
    patch.apply(&mut group).unwrap();
    assert_eq!(group.training_start, NaiveDate::from_ymd_opt(2024, 10, 1));

    let patch: GroupPatch = serde_json::from_str(r#"{"name":"Renamed"}"#).unwrap();
    patch.apply(&mut group).unwrap();
    assert_eq!(group.training_start, NaiveDate::from_ymd_opt(2024, 10, 1));

    let patch: GroupPatch =
      serde_json::from_str(r#"{"training_start":null}"#).unwrap();
    patch.apply(&mut group).unwrap();
    assert_eq!(group.training_start, None);
  }

  #[test]
  fn training_days_deserialize_from_lowercase_names() {
    let days: BTreeSet<Weekday> =
      serde_json::from_str(r#"["friday","monday","friday"]"#).unwrap();
    assert_eq!(days, [Weekday::Monday, Weekday::Friday].into());
  }

  #[test]
  fn finished_groups_are_closed() {
    assert!(GroupStatus::Future.is_open());
    assert!(GroupStatus::Active.is_open());
    assert!(!GroupStatus::Finished.is_open());
  }
}
