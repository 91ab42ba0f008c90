//! Role attachments: time-bounded links between a person and a role kind.
//!
//! Every kind shares the same [`Tenure`]: a role is active from `date_from`
//! while `date_to` is `None`. Ending a tenure is the only mutation it
//! supports, and an ended row is never reactivated; appointing the same
//! person again creates a new row.
//!
//! At most one active row may exist per person and kind. The check lives in
//! [`crate::service::roles`]; storage backends back it with a unique index.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::Person,
  validate::optional,
};

// ─── Kinds and shared shape ──────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoleKind {
  Administrator,
  Coach,
  Athlete,
}

/// The period during which a role is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
  pub date_from: NaiveDate,
  /// `None` while the role is active.
  pub date_to:   Option<NaiveDate>,
}

impl Tenure {
  pub fn starting(date_from: NaiveDate) -> Self {
    Self { date_from, date_to: None }
  }

  pub fn is_active(&self) -> bool { self.date_to.is_none() }
}

/// Shared capabilities of the three role kinds.
pub trait Role: Clone + Send + Sync + Sized + 'static {
  const KIND: RoleKind;

  /// Kind-specific fields supplied on appointment.
  type Details: Send + 'static;

  /// Build a freshly appointed, active role.
  fn appointed(
    id: Uuid,
    person_id: Uuid,
    date_from: NaiveDate,
    details: Self::Details,
  ) -> Self;

  fn id(&self) -> Uuid;
  fn person_id(&self) -> Uuid;
  fn tenure(&self) -> &Tenure;
  fn tenure_mut(&mut self) -> &mut Tenure;

  fn into_any(self) -> AnyRole;
  fn from_any(role: AnyRole) -> Option<Self>;

  fn validate_details(_details: &Self::Details) -> Result<()> { Ok(()) }

  fn is_active(&self) -> bool { self.tenure().is_active() }

  /// End the tenure on `today`. Fails if it has already ended, leaving
  /// `date_to` untouched.
  fn cancel(&mut self, today: NaiveDate) -> Result<()> {
    if !self.is_active() {
      return Err(Error::Conflict(format!(
        "{} role {} is already inactive",
        Self::KIND,
        self.id()
      )));
    }
    self.tenure_mut().date_to = Some(today);
    Ok(())
  }
}

// ─── Administrator ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
  pub id:        Uuid,
  pub person_id: Uuid,
  #[serde(flatten)]
  pub tenure:    Tenure,
}

impl Role for Administrator {
  const KIND: RoleKind = RoleKind::Administrator;
  type Details = ();

  fn appointed(id: Uuid, person_id: Uuid, date_from: NaiveDate, _: ()) -> Self {
    Self { id, person_id, tenure: Tenure::starting(date_from) }
  }

  fn id(&self) -> Uuid { self.id }
  fn person_id(&self) -> Uuid { self.person_id }
  fn tenure(&self) -> &Tenure { &self.tenure }
  fn tenure_mut(&mut self) -> &mut Tenure { &mut self.tenure }

  fn into_any(self) -> AnyRole { AnyRole::Administrator(self) }

  fn from_any(role: AnyRole) -> Option<Self> {
    match role {
      AnyRole::Administrator(r) => Some(r),
      _ => None,
    }
  }
}

// ─── Coach ───────────────────────────────────────────────────────────────────

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
pub enum CoachPosition {
  #[default]
  Instructor,
  Senior,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JudgeCategory {
  Third,
  Second,
  First,
  Highest,
}

/// Coach-specific fields. Every field has a default so an empty appointment
/// request yields an instructor with no prior experience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachProfile {
  pub position:         CoachPosition,
  /// Full years of coaching experience at the moment of hiring.
  pub coach_experience: u8,
  pub judge_category:   Option<JudgeCategory>,
  pub education:        Option<String>,
  pub additional_info:  Option<String>,
  pub achievements:     Option<String>,
}

pub const MAX_COACH_EXPERIENCE: u8 = 99;

impl CoachProfile {
  pub fn validate(&self) -> Result<()> {
    if self.coach_experience > MAX_COACH_EXPERIENCE {
      return Err(Error::Validation(format!(
        "coach_experience must be at most {MAX_COACH_EXPERIENCE}"
      )));
    }
    optional("education", self.education.as_deref(), 300)?;
    optional("additional_info", self.additional_info.as_deref(), 5000)?;
    optional("achievements", self.achievements.as_deref(), 5000)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
  pub id:        Uuid,
  pub person_id: Uuid,
  #[serde(flatten)]
  pub tenure:    Tenure,
  #[serde(flatten)]
  pub profile:   CoachProfile,
}

impl Coach {
  /// Experience at hire plus full years served since `date_from`.
  pub fn current_experience(&self, today: NaiveDate) -> u32 {
    today.years_since(self.tenure.date_from).unwrap_or(0)
      + u32::from(self.profile.coach_experience)
  }
}

impl Role for Coach {
  const KIND: RoleKind = RoleKind::Coach;
  type Details = CoachProfile;

  fn appointed(
    id: Uuid,
    person_id: Uuid,
    date_from: NaiveDate,
    profile: CoachProfile,
  ) -> Self {
    Self { id, person_id, tenure: Tenure::starting(date_from), profile }
  }

  fn id(&self) -> Uuid { self.id }
  fn person_id(&self) -> Uuid { self.person_id }
  fn tenure(&self) -> &Tenure { &self.tenure }
  fn tenure_mut(&mut self) -> &mut Tenure { &mut self.tenure }

  fn into_any(self) -> AnyRole { AnyRole::Coach(self) }

  fn from_any(role: AnyRole) -> Option<Self> {
    match role {
      AnyRole::Coach(r) => Some(r),
      _ => None,
    }
  }

  fn validate_details(profile: &CoachProfile) -> Result<()> {
    profile.validate()
  }
}

// ─── Athlete ─────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayingLevel {
  Beginner,
  Player,
  Pro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
  pub id:            Uuid,
  pub person_id:     Uuid,
  #[serde(flatten)]
  pub tenure:        Tenure,
  pub playing_level: PlayingLevel,
  /// Training groups the athlete currently belongs to.
  #[serde(default)]
  pub groups:        BTreeSet<Uuid>,
}

impl Role for Athlete {
  const KIND: RoleKind = RoleKind::Athlete;
  type Details = PlayingLevel;

  fn appointed(
    id: Uuid,
    person_id: Uuid,
    date_from: NaiveDate,
    playing_level: PlayingLevel,
  ) -> Self {
    Self {
      id,
      person_id,
      tenure: Tenure::starting(date_from),
      playing_level,
      groups: BTreeSet::new(),
    }
  }

  fn id(&self) -> Uuid { self.id }
  fn person_id(&self) -> Uuid { self.person_id }
  fn tenure(&self) -> &Tenure { &self.tenure }
  fn tenure_mut(&mut self) -> &mut Tenure { &mut self.tenure }

  fn into_any(self) -> AnyRole { AnyRole::Athlete(self) }

  fn from_any(role: AnyRole) -> Option<Self> {
    match role {
      AnyRole::Athlete(r) => Some(r),
      _ => None,
    }
  }
}

// ─── Tagged variant ──────────────────────────────────────────────────────────

/// Any role attachment. This is what crosses the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum AnyRole {
  Administrator(Administrator),
  Coach(Coach),
  Athlete(Athlete),
}

impl AnyRole {
  pub fn kind(&self) -> RoleKind {
    match self {
      Self::Administrator(_) => RoleKind::Administrator,
      Self::Coach(_) => RoleKind::Coach,
      Self::Athlete(_) => RoleKind::Athlete,
    }
  }

  pub fn id(&self) -> Uuid {
    match self {
      Self::Administrator(r) => r.id,
      Self::Coach(r) => r.id,
      Self::Athlete(r) => r.id,
    }
  }

  pub fn person_id(&self) -> Uuid {
    match self {
      Self::Administrator(r) => r.person_id,
      Self::Coach(r) => r.person_id,
      Self::Athlete(r) => r.person_id,
    }
  }

  pub fn tenure(&self) -> &Tenure {
    match self {
      Self::Administrator(r) => &r.tenure,
      Self::Coach(r) => &r.tenure,
      Self::Athlete(r) => &r.tenure,
    }
  }
}

/// A role together with the person holding it, as the API returns it.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment<R> {
  #[serde(flatten)]
  pub role:   R,
  pub person: Person,
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters for listing roles of one kind. Results are newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleQuery {
  pub person_id: Option<Uuid>,
  /// `true` for active tenures only, `false` for ended ones only.
  pub active:    Option<bool>,
  /// Athletes only: membership in this group.
  pub group_id:  Option<Uuid>,
  /// Substring match over the holder's full name.
  pub text:      Option<String>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn cancel_ends_tenure_once() {
    let mut admin =
      Administrator::appointed(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 10), ());
    assert!(admin.is_active());

    admin.cancel(date(2024, 3, 1)).unwrap();
    assert_eq!(admin.tenure.date_to, Some(date(2024, 3, 1)));

    let err = admin.cancel(date(2024, 4, 1)).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(admin.tenure.date_to, Some(date(2024, 3, 1)));
  }

  #[test]
  fn coach_defaults_to_instructor() {
    let coach = Coach::appointed(
      Uuid::new_v4(),
      Uuid::new_v4(),
      date(2020, 9, 1),
      CoachProfile::default(),
    );
    assert_eq!(coach.profile.position, CoachPosition::Instructor);
    assert_eq!(coach.profile.coach_experience, 0);
    assert!(coach.profile.judge_category.is_none());
  }

  #[test]
  fn coach_experience_counts_full_years_served() {
    let profile = CoachProfile { coach_experience: 3, ..Default::default() };
    let coach =
      Coach::appointed(Uuid::new_v4(), Uuid::new_v4(), date(2020, 9, 1), profile);

    assert_eq!(coach.current_experience(date(2020, 9, 1)), 3);
    assert_eq!(coach.current_experience(date(2023, 8, 31)), 5);
    assert_eq!(coach.current_experience(date(2023, 9, 1)), 6);
  }

  #[test]
  fn coach_profile_limits_experience() {
    let profile = CoachProfile { coach_experience: 100, ..Default::default() };
    assert!(matches!(profile.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn any_role_round_trips_through_from_any() {
    let athlete = Athlete::appointed(
      Uuid::new_v4(),
      Uuid::new_v4(),
      date(2024, 1, 1),
      PlayingLevel::Player,
    );
    let any = athlete.clone().into_any();
    assert_eq!(any.kind(), RoleKind::Athlete);
    assert_eq!(Coach::from_any(any.clone()), None);
    assert_eq!(Athlete::from_any(any), Some(athlete));
  }

  #[test]
  fn role_kind_renders_snake_case() {
    assert_eq!(RoleKind::Administrator.to_string(), "administrator");
    assert_eq!("coach".parse::<RoleKind>().unwrap(), RoleKind::Coach);
  }
}
