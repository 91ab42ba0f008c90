//! Group applications: a person's request to join a training group.
//!
//! ```text
//!         approve()                reject(reason)
//!   New ───────────► Approved   New ───────────► Rejected
//!    │ (edit/delete allowed only here)
//! ```
//!
//! Approved and Rejected are terminal. The transition methods on
//! [`GroupApplication`] refuse anything that does not start from `New`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  role::PlayingLevel,
  validate::{max_chars, non_blank, optional},
};

pub const MAX_COMMENT: usize = 1500;
pub const MAX_REJECT_REASON: usize = 500;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  New,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupApplication {
  pub id:            Uuid,
  pub person_id:     Uuid,
  pub group_id:      Uuid,
  pub created_at:    DateTime<Utc>,
  pub status:        ApplicationStatus,
  /// Level the applicant asks to train at.
  pub playing_level: PlayingLevel,
  pub comment:       Option<String>,
  /// Set only when the application is rejected.
  pub reject_reason: Option<String>,
}

impl GroupApplication {
  /// Fail with [`Error::Conflict`] unless the application is still `New`.
  /// `action` completes the sentence "only new applications can be …".
  pub fn ensure_new(&self, action: &str) -> Result<()> {
    if self.status != ApplicationStatus::New {
      return Err(Error::Conflict(format!(
        "only new applications can be {action}; application {} is {}",
        self.id, self.status
      )));
    }
    Ok(())
  }

  pub fn approve(&mut self) -> Result<()> {
    self.ensure_new("approved")?;
    self.status = ApplicationStatus::Approved;
    Ok(())
  }

  /// Move to `Rejected` and record why, both or neither.
  pub fn reject(&mut self, reason: String) -> Result<()> {
    self.ensure_new("rejected")?;
    max_chars("reject_reason", &reason, MAX_REJECT_REASON)?;
    self.status = ApplicationStatus::Rejected;
    self.reject_reason = Some(reason);
    Ok(())
  }
}

// ─── Input types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
  pub person_id:     Uuid,
  pub group_id:      Uuid,
  pub playing_level: PlayingLevel,
  #[serde(default)]
  pub comment:       Option<String>,
}

impl NewApplication {
  pub fn into_application(
    self,
    id: Uuid,
    created_at: DateTime<Utc>,
  ) -> Result<GroupApplication> {
    let comment = non_blank(self.comment);
    optional("comment", comment.as_deref(), MAX_COMMENT)?;
    Ok(GroupApplication {
      id,
      person_id: self.person_id,
      group_id: self.group_id,
      created_at,
      status: ApplicationStatus::New,
      playing_level: self.playing_level,
      comment,
      reject_reason: None,
    })
  }
}

/// Fields an applicant may still change while the application is `New`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationPatch {
  pub playing_level: Option<PlayingLevel>,
  /// An empty string clears the comment.
  pub comment:       Option<String>,
}

impl ApplicationPatch {
  pub fn apply(&self, application: &mut GroupApplication) -> Result<()> {
    application.ensure_new("edited")?;
    if let Some(v) = &self.comment {
      let comment = non_blank(Some(v.clone()));
      optional("comment", comment.as_deref(), MAX_COMMENT)?;
      application.comment = comment;
    }
    if let Some(v) = self.playing_level {
      application.playing_level = v;
    }
    Ok(())
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters for listing applications. Results are newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationQuery {
  pub person_id: Option<Uuid>,
  pub group_id:  Option<Uuid>,
  pub status:    Option<ApplicationStatus>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}
