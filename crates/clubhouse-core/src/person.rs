//! Person, the canonical identity record.
//!
//! A person carries no role information. Administrator, coach and athlete
//! tenures reference a person from their own tables (see [`crate::role`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  validate::{max_chars, non_blank, required},
};

const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 32;

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
pub enum Gender {
  #[default]
  Male,
  Female,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub id:            Uuid,
  pub last_name:     String,
  pub first_name:    String,
  pub patronymic:    Option<String>,
  pub date_of_birth: NaiveDate,
  pub gender:        Gender,
  /// Unique across all people; stored normalized.
  pub email:         String,
  pub phone:         String,
  pub created_at:    DateTime<Utc>,
  pub is_active:     bool,
  /// argon2 PHC string. Never serialised.
  #[serde(skip)]
  pub password_hash: String,
}

impl Person {
  /// "Last First Patronymic", without trailing whitespace when the
  /// patronymic is absent.
  pub fn full_name(&self) -> String {
    format!(
      "{} {} {}",
      self.last_name,
      self.first_name,
      self.patronymic.as_deref().unwrap_or_default()
    )
    .trim()
    .to_owned()
  }
}

/// Trim the address and lower-case its domain part.
///
/// Fails unless there is exactly one `@` with something on both sides and no
/// whitespace anywhere.
pub fn normalize_email(raw: &str) -> Result<String> {
  let email = raw.trim();
  let invalid = || Error::Validation(format!("invalid email address: {raw:?}"));

  let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
  if local.is_empty()
    || domain.is_empty()
    || domain.contains('@')
    || email.chars().any(char::is_whitespace)
  {
    return Err(invalid());
  }
  max_chars("email", email, EMAIL_MAX)?;

  Ok(format!("{local}@{}", domain.to_lowercase()))
}

// ─── Input types ─────────────────────────────────────────────────────────────

/// Input for registering a person.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
  pub last_name:     String,
  pub first_name:    String,
  #[serde(default)]
  pub patronymic:    Option<String>,
  pub date_of_birth: NaiveDate,
  #[serde(default)]
  pub gender:        Gender,
  pub email:         String,
  pub phone:         String,
  /// Plain-text password. When absent the person gets an unusable
  /// credential.
  #[serde(default)]
  pub password:      Option<String>,
}

impl NewPerson {
  /// Validate every field and build the record. The email is normalized.
  pub fn into_person(
    self,
    id: Uuid,
    created_at: DateTime<Utc>,
    password_hash: String,
  ) -> Result<Person> {
    let person = Person {
      id,
      last_name: self.last_name.trim().to_owned(),
      first_name: self.first_name.trim().to_owned(),
      patronymic: non_blank(self.patronymic).map(|p| p.trim().to_owned()),
      date_of_birth: self.date_of_birth,
      gender: self.gender,
      email: normalize_email(&self.email)?,
      phone: self.phone.trim().to_owned(),
      created_at,
      is_active: true,
      password_hash,
    };
    check(&person)?;
    Ok(person)
  }
}

/// Partial update of a person. Absent fields are left unchanged; an empty
/// `patronymic` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPatch {
  pub last_name:     Option<String>,
  pub first_name:    Option<String>,
  pub patronymic:    Option<String>,
  pub date_of_birth: Option<NaiveDate>,
  pub gender:        Option<Gender>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub is_active:     Option<bool>,
  /// Handled by the service, which owns hashing.
  pub password:      Option<String>,
}

impl PersonPatch {
  /// Apply every field except `password` and re-validate the result.
  pub fn apply(&self, person: &mut Person) -> Result<()> {
    if let Some(v) = &self.last_name {
      person.last_name = v.trim().to_owned();
    }
    if let Some(v) = &self.first_name {
      person.first_name = v.trim().to_owned();
    }
    if let Some(v) = &self.patronymic {
      person.patronymic = non_blank(Some(v.trim().to_owned()));
    }
    if let Some(v) = self.date_of_birth {
      person.date_of_birth = v;
    }
    if let Some(v) = self.gender {
      person.gender = v;
    }
    if let Some(v) = &self.email {
      person.email = normalize_email(v)?;
    }
    if let Some(v) = &self.phone {
      person.phone = v.trim().to_owned();
    }
    if let Some(v) = self.is_active {
      person.is_active = v;
    }
    check(person)
  }
}

fn check(person: &Person) -> Result<()> {
  required("last_name", &person.last_name, NAME_MAX)?;
  required("first_name", &person.first_name, NAME_MAX)?;
  if let Some(p) = &person.patronymic {
    max_chars("patronymic", p, NAME_MAX)?;
  }
  required("phone", &person.phone, PHONE_MAX)
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters for listing people. Results are newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonQuery {
  /// Substring match over the full name and the email address.
  pub text:      Option<String>,
  pub is_active: Option<bool>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_person() -> NewPerson {
    NewPerson {
      last_name:     "Ivanova".into(),
      first_name:    "Anna".into(),
      patronymic:    None,
      date_of_birth: NaiveDate::from_ymd_opt(1995, 4, 12).unwrap(),
      gender:        Gender::Female,
      email:         "  Anna.Ivanova@Example.COM ".into(),
      phone:         "+7 900 000-00-00".into(),
      password:      None,
    }
  }

  #[test]
  fn full_name_skips_missing_patronymic() {
    let mut person = new_person()
      .into_person(Uuid::new_v4(), Utc::now(), String::new())
      .unwrap();
    assert_eq!(person.full_name(), "Ivanova Anna");

    person.patronymic = Some("Sergeevna".into());
    assert_eq!(person.full_name(), "Ivanova Anna Sergeevna");
  }

  #[test]
  fn email_domain_is_lowercased_and_trimmed() {
    let person = new_person()
      .into_person(Uuid::new_v4(), Utc::now(), String::new())
      .unwrap();
    assert_eq!(person.email, "Anna.Ivanova@example.com");
  }

  #[test]
  fn malformed_emails_are_rejected() {
    for raw in ["", "no-at-sign", "@example.com", "a@", "a@b@c", "a b@c.d"] {
      assert!(
        matches!(normalize_email(raw), Err(Error::Validation(_))),
        "accepted {raw:?}"
      );
    }
  }

  #[test]
  fn blank_names_are_rejected() {
    let mut input = new_person();
    input.first_name = "   ".into();
    let err = input
      .into_person(Uuid::new_v4(), Utc::now(), String::new())
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn patch_clears_patronymic_with_empty_string() {
    let mut input = new_person();
    input.patronymic = Some("Sergeevna".into());
    let mut person = input
      .into_person(Uuid::new_v4(), Utc::now(), String::new())
      .unwrap();

    let patch = PersonPatch { patronymic: Some(String::new()), ..Default::default() };
    patch.apply(&mut person).unwrap();
    assert_eq!(person.patronymic, None);
  }

  #[test]
  fn password_hash_is_not_serialised() {
    let person = new_person()
      .into_person(Uuid::new_v4(), Utc::now(), "$argon2id$secret".into())
      .unwrap();
    let json = serde_json::to_string(&person).unwrap();
    assert!(!json.contains("argon2"), "{json}");
    assert!(json.contains("\"gender\":\"female\""), "{json}");
  }
}
