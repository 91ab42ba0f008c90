//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar dates are `YYYY-MM-DD`, UUIDs
//! are hyphenated lowercase strings. Enum columns hold the lowercase names
//! the domain types derive through `strum`; training days are a JSON array.

use std::{collections::BTreeSet, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use clubhouse_core::{
  application::GroupApplication,
  group::{Group, Weekday},
  person::Person,
  role::{
    Administrator, AnyRole, Athlete, Coach, CoachProfile, RoleKind, Tenure,
  },
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Column text of a `strum`-derived enum.
pub fn encode_enum<E: Into<&'static str>>(value: E) -> &'static str {
  value.into()
}

pub fn decode_enum<E: FromStr>(column: &'static str, s: &str) -> Result<E> {
  s.parse()
    .map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

pub fn encode_days(days: &BTreeSet<Weekday>) -> Result<String> {
  Ok(serde_json::to_string(days)?)
}

pub fn decode_days(s: &str) -> Result<BTreeSet<Weekday>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Persons ─────────────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str = "person_id, last_name, first_name, \
  patronymic, date_of_birth, gender, email, phone, created_at, is_active, \
  password_hash";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:     String,
  pub last_name:     String,
  pub first_name:    String,
  pub patronymic:    Option<String>,
  pub date_of_birth: String,
  pub gender:        String,
  pub email:         String,
  pub phone:         String,
  pub created_at:    String,
  pub is_active:     bool,
  pub password_hash: String,
}

impl RawPerson {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:     row.get(0)?,
      last_name:     row.get(1)?,
      first_name:    row.get(2)?,
      patronymic:    row.get(3)?,
      date_of_birth: row.get(4)?,
      gender:        row.get(5)?,
      email:         row.get(6)?,
      phone:         row.get(7)?,
      created_at:    row.get(8)?,
      is_active:     row.get(9)?,
      password_hash: row.get(10)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:            decode_uuid(&self.person_id)?,
      last_name:     self.last_name,
      first_name:    self.first_name,
      patronymic:    self.patronymic,
      date_of_birth: decode_date(&self.date_of_birth)?,
      gender:        decode_enum("gender", &self.gender)?,
      email:         self.email,
      phone:         self.phone,
      created_at:    decode_dt(&self.created_at)?,
      is_active:     self.is_active,
      password_hash: self.password_hash,
    })
  }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

pub fn role_table(kind: RoleKind) -> &'static str {
  match kind {
    RoleKind::Administrator => "administrators",
    RoleKind::Coach => "coaches",
    RoleKind::Athlete => "athletes",
  }
}

/// Column list for `kind`, in the order [`RawRole::from_row`] reads it.
pub fn role_columns(kind: RoleKind) -> &'static str {
  match kind {
    RoleKind::Administrator => "role_id, person_id, date_from, date_to",
    RoleKind::Coach => {
      "role_id, person_id, date_from, date_to, position, coach_experience, \
       judge_category, education, additional_info, achievements"
    }
    RoleKind::Athlete => {
      "role_id, person_id, date_from, date_to, playing_level"
    }
  }
}

pub struct RawTenure {
  pub role_id:   String,
  pub person_id: String,
  pub date_from: String,
  pub date_to:   Option<String>,
}

impl RawTenure {
  fn decode(&self) -> Result<(Uuid, Uuid, Tenure)> {
    Ok((
      decode_uuid(&self.role_id)?,
      decode_uuid(&self.person_id)?,
      Tenure {
        date_from: decode_date(&self.date_from)?,
        date_to:   self.date_to.as_deref().map(decode_date).transpose()?,
      },
    ))
  }
}

pub struct RawCoachProfile {
  pub position:         String,
  pub coach_experience: u8,
  pub judge_category:   Option<String>,
  pub education:        Option<String>,
  pub additional_info:  Option<String>,
  pub achievements:     Option<String>,
}

/// Raw values read from one of the role tables.
pub enum RawRole {
  Administrator(RawTenure),
  Coach(RawTenure, RawCoachProfile),
  Athlete(RawTenure, String),
}

impl RawRole {
  pub fn from_row(kind: RoleKind, row: &Row<'_>) -> rusqlite::Result<Self> {
    let tenure = RawTenure {
      role_id:   row.get(0)?,
      person_id: row.get(1)?,
      date_from: row.get(2)?,
      date_to:   row.get(3)?,
    };
    Ok(match kind {
      RoleKind::Administrator => Self::Administrator(tenure),
      RoleKind::Coach => Self::Coach(tenure, RawCoachProfile {
        position:         row.get(4)?,
        coach_experience: row.get(5)?,
        judge_category:   row.get(6)?,
        education:        row.get(7)?,
        additional_info:  row.get(8)?,
        achievements:     row.get(9)?,
      }),
      RoleKind::Athlete => Self::Athlete(tenure, row.get(4)?),
    })
  }

  /// Athletes come back without memberships; the caller loads those from
  /// `athlete_groups`.
  pub fn into_role(self) -> Result<AnyRole> {
    Ok(match self {
      Self::Administrator(raw) => {
        let (id, person_id, tenure) = raw.decode()?;
        AnyRole::Administrator(Administrator { id, person_id, tenure })
      }
      Self::Coach(raw, p) => {
        let (id, person_id, tenure) = raw.decode()?;
        AnyRole::Coach(Coach {
          id,
          person_id,
          tenure,
          profile: CoachProfile {
            position:         decode_enum("position", &p.position)?,
            coach_experience: p.coach_experience,
            judge_category:   p
              .judge_category
              .as_deref()
              .map(|s| decode_enum("judge_category", s))
              .transpose()?,
            education:        p.education,
            additional_info:  p.additional_info,
            achievements:     p.achievements,
          },
        })
      }
      Self::Athlete(raw, level) => {
        let (id, person_id, tenure) = raw.decode()?;
        AnyRole::Athlete(Athlete {
          id,
          person_id,
          tenure,
          playing_level: decode_enum("playing_level", &level)?,
          groups: BTreeSet::new(),
        })
      }
    })
  }
}

// ─── Groups ──────────────────────────────────────────────────────────────────

pub const GROUP_COLUMNS: &str = "group_id, name, description, coach_id, \
  min_participants, max_participants, playing_level, training_days, \
  training_time, status, training_start";

pub struct RawGroup {
  pub group_id:         String,
  pub name:             String,
  pub description:      Option<String>,
  pub coach_id:         String,
  pub min_participants: u8,
  pub max_participants: u8,
  pub playing_level:    String,
  pub training_days:    String,
  pub training_time:    String,
  pub status:           String,
  pub training_start:   Option<String>,
}

impl RawGroup {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      group_id:         row.get(0)?,
      name:             row.get(1)?,
      description:      row.get(2)?,
      coach_id:         row.get(3)?,
      min_participants: row.get(4)?,
      max_participants: row.get(5)?,
      playing_level:    row.get(6)?,
      training_days:    row.get(7)?,
      training_time:    row.get(8)?,
      status:           row.get(9)?,
      training_start:   row.get(10)?,
    })
  }

  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      id:               decode_uuid(&self.group_id)?,
      name:             self.name,
      description:      self.description,
      coach_id:         decode_uuid(&self.coach_id)?,
      min_participants: self.min_participants,
      max_participants: self.max_participants,
      playing_level:    decode_enum("playing_level", &self.playing_level)?,
      training_days:    decode_days(&self.training_days)?,
      training_time:    self.training_time,
      status:           decode_enum("status", &self.status)?,
      training_start:   self
        .training_start
        .as_deref()
        .map(decode_date)
        .transpose()?,
    })
  }
}

// ─── Applications ────────────────────────────────────────────────────────────

pub const APPLICATION_COLUMNS: &str = "application_id, person_id, group_id, \
  created_at, status, playing_level, comment, reject_reason";

pub struct RawApplication {
  pub application_id: String,
  pub person_id:      String,
  pub group_id:       String,
  pub created_at:     String,
  pub status:         String,
  pub playing_level:  String,
  pub comment:        Option<String>,
  pub reject_reason:  Option<String>,
}

impl RawApplication {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      application_id: row.get(0)?,
      person_id:      row.get(1)?,
      group_id:       row.get(2)?,
      created_at:     row.get(3)?,
      status:         row.get(4)?,
      playing_level:  row.get(5)?,
      comment:        row.get(6)?,
      reject_reason:  row.get(7)?,
    })
  }

  pub fn into_application(self) -> Result<GroupApplication> {
    Ok(GroupApplication {
      id:            decode_uuid(&self.application_id)?,
      person_id:     decode_uuid(&self.person_id)?,
      group_id:      decode_uuid(&self.group_id)?,
      created_at:    decode_dt(&self.created_at)?,
      status:        decode_enum("status", &self.status)?,
      playing_level: decode_enum("playing_level", &self.playing_level)?,
      comment:       self.comment,
      reject_reason: self.reject_reason,
    })
  }
}

#[cfg(test)]
mod tests {
  use clubhouse_core::{group::GroupStatus, role::PlayingLevel};

  use super::*;

  #[test]
  fn enums_use_lowercase_column_text() {
    assert_eq!(encode_enum(PlayingLevel::Pro), "pro");
    assert_eq!(encode_enum(GroupStatus::Finished), "finished");
    let level: PlayingLevel = decode_enum("playing_level", "beginner").unwrap();
    assert_eq!(level, PlayingLevel::Beginner);
  }

  #[test]
  fn unknown_enum_text_names_the_column() {
    let err = decode_enum::<PlayingLevel>("playing_level", "legend").unwrap_err();
    assert!(err.to_string().contains("playing_level"), "{err}");
  }

  #[test]
  fn dates_are_iso() {
    let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(encode_date(d), "2024-02-29");
    assert_eq!(decode_date("2024-02-29").unwrap(), d);
    assert!(decode_date("29.02.2024").is_err());
  }
}
