//! [`SqliteRepo`]: the [`Repository`] implementation over one open
//! transaction.

use std::collections::BTreeSet;

use clubhouse_core::{
  application::{ApplicationQuery, GroupApplication},
  group::{Group, GroupQuery},
  person::{Person, PersonQuery},
  repo::Repository,
  role::{AnyRole, RoleKind, RoleQuery, Tenure},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    APPLICATION_COLUMNS, GROUP_COLUMNS, PERSON_COLUMNS, RawApplication,
    RawGroup, RawPerson, RawRole, decode_uuid, encode_date, encode_days,
    encode_dt, encode_enum, encode_uuid, role_columns, role_table,
  },
};

const DEFAULT_LIMIT: usize = 100;

/// Repository view of a connection, normally a `rusqlite::Transaction`
/// borrowed through `Deref`.
pub struct SqliteRepo<'c> {
  conn: &'c Connection,
}

impl<'c> SqliteRepo<'c> {
  pub fn new(conn: &'c Connection) -> Self { Self { conn } }

  fn memberships(&self, athlete_id: &str) -> Result<BTreeSet<Uuid>> {
    let mut stmt = self
      .conn
      .prepare("SELECT group_id FROM athlete_groups WHERE athlete_id = ?1")?;
    let ids = stmt
      .query_map(params![athlete_id], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  /// Decode a role row, attaching memberships to athletes.
  fn finish_role(&self, raw: RawRole) -> Result<AnyRole> {
    let mut role = raw.into_role()?;
    if let AnyRole::Athlete(athlete) = &mut role {
      athlete.groups = self.memberships(&encode_uuid(athlete.id))?;
    }
    Ok(role)
  }

  fn role_where(
    &self,
    kind: RoleKind,
    clause: &str,
    id: Uuid,
  ) -> Result<Option<AnyRole>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE {clause}",
      role_columns(kind),
      role_table(kind)
    );
    let raw = self
      .conn
      .query_row(&sql, params![encode_uuid(id)], |row| {
        RawRole::from_row(kind, row)
      })
      .optional()?;
    raw.map(|raw| self.finish_role(raw)).transpose()
  }
}

fn paging(limit: Option<usize>, offset: Option<usize>) -> (i64, i64) {
  let clamp = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
  (clamp(limit.unwrap_or(DEFAULT_LIMIT)), clamp(offset.unwrap_or(0)))
}

/// Substring pattern for `LIKE ... ESCAPE '\'` matching `text` literally.
fn like_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

fn where_clause(conds: &[&str]) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  }
}

/// Map backend errors into the core error at the trait boundary.
fn lift<T>(op: impl FnOnce() -> Result<T>) -> clubhouse_core::Result<T> {
  op().map_err(Into::into)
}

impl Repository for SqliteRepo<'_> {
  // ── Persons ───────────────────────────────────────────────────────────────

  fn person(&self, id: Uuid) -> clubhouse_core::Result<Option<Person>> {
    lift(|| {
      let raw = self
        .conn
        .query_row(
          &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
          params![encode_uuid(id)],
          RawPerson::from_row,
        )
        .optional()?;
      raw.map(RawPerson::into_person).transpose()
    })
  }

  fn person_by_email(
    &self,
    email: &str,
  ) -> clubhouse_core::Result<Option<Person>> {
    lift(|| {
      let raw = self
        .conn
        .query_row(
          &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE email = ?1"),
          params![email],
          RawPerson::from_row,
        )
        .optional()?;
      raw.map(RawPerson::into_person).transpose()
    })
  }

  fn persons(
    &self,
    query: &PersonQuery,
  ) -> clubhouse_core::Result<Vec<Person>> {
    lift(|| {
      let text_pattern = query.text.as_deref().map(like_pattern);
      let (limit, offset) = paging(query.limit, query.offset);

      let mut conds: Vec<&'static str> = vec![];
      if text_pattern.is_some() {
        conds.push(
          "(last_name || ' ' || first_name || ' ' || COALESCE(patronymic, '') \
           LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\')",
        );
      }
      if query.is_active.is_some() {
        conds.push("is_active = ?2");
      }

      let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM persons {}
         ORDER BY rowid DESC LIMIT ?3 OFFSET ?4",
        where_clause(&conds)
      );
      let mut stmt = self.conn.prepare(&sql)?;
      let raws = stmt
        .query_map(
          params![text_pattern, query.is_active, limit, offset],
          RawPerson::from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(RawPerson::into_person).collect()
    })
  }

  fn insert_person(&mut self, person: &Person) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        &format!(
          "INSERT INTO persons ({PERSON_COLUMNS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
          encode_uuid(person.id),
          person.last_name,
          person.first_name,
          person.patronymic,
          encode_date(person.date_of_birth),
          encode_enum(person.gender),
          person.email,
          person.phone,
          encode_dt(person.created_at),
          person.is_active,
          person.password_hash,
        ],
      )?;
      Ok(())
    })
  }

  fn update_person(&mut self, person: &Person) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        "UPDATE persons SET
           last_name = ?2, first_name = ?3, patronymic = ?4,
           date_of_birth = ?5, gender = ?6, email = ?7, phone = ?8,
           is_active = ?9, password_hash = ?10
         WHERE person_id = ?1",
        params![
          encode_uuid(person.id),
          person.last_name,
          person.first_name,
          person.patronymic,
          encode_date(person.date_of_birth),
          encode_enum(person.gender),
          person.email,
          person.phone,
          person.is_active,
          person.password_hash,
        ],
      )?;
      Ok(())
    })
  }

  fn delete_person(&mut self, id: Uuid) -> clubhouse_core::Result<bool> {
    lift(|| {
      let n = self.conn.execute(
        "DELETE FROM persons WHERE person_id = ?1",
        params![encode_uuid(id)],
      )?;
      Ok(n > 0)
    })
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  fn role(
    &self,
    kind: RoleKind,
    id: Uuid,
  ) -> clubhouse_core::Result<Option<AnyRole>> {
    lift(|| self.role_where(kind, "role_id = ?1", id))
  }

  fn active_role(
    &self,
    kind: RoleKind,
    person_id: Uuid,
  ) -> clubhouse_core::Result<Option<AnyRole>> {
    lift(|| self.role_where(kind, "person_id = ?1 AND date_to IS NULL", person_id))
  }

  fn roles(
    &self,
    kind: RoleKind,
    query: &RoleQuery,
  ) -> clubhouse_core::Result<Vec<AnyRole>> {
    lift(|| {
      let person_str   = query.person_id.map(encode_uuid);
      let text_pattern = query.text.as_deref().map(like_pattern);
      let group_str    = query.group_id.map(encode_uuid);
      let (limit, offset) = paging(query.limit, query.offset);

      let mut conds: Vec<&'static str> = vec![];
      if person_str.is_some() {
        conds.push("person_id = ?1");
      }
      match query.active {
        Some(true) => conds.push("date_to IS NULL"),
        Some(false) => conds.push("date_to IS NOT NULL"),
        None => {}
      }
      if text_pattern.is_some() {
        conds.push(
          "person_id IN (SELECT person_id FROM persons WHERE \
           last_name || ' ' || first_name || ' ' || COALESCE(patronymic, '') \
           LIKE ?2 ESCAPE '\\')",
        );
      }
      // Memberships exist for athletes only; other kinds ignore the filter.
      if group_str.is_some() && kind == RoleKind::Athlete {
        conds.push(
          "role_id IN (SELECT athlete_id FROM athlete_groups WHERE group_id = ?3)",
        );
      }

      let sql = format!(
        "SELECT {} FROM {} {}
         ORDER BY rowid DESC LIMIT ?4 OFFSET ?5",
        role_columns(kind),
        role_table(kind),
        where_clause(&conds)
      );
      let mut stmt = self.conn.prepare(&sql)?;
      let raws = stmt
        .query_map(
          params![person_str, text_pattern, group_str, limit, offset],
          |row| RawRole::from_row(kind, row),
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(|raw| self.finish_role(raw)).collect()
    })
  }

  fn insert_role(&mut self, role: &AnyRole) -> clubhouse_core::Result<()> {
    lift(|| {
      let id        = encode_uuid(role.id());
      let person_id = encode_uuid(role.person_id());
      let date_from = encode_date(role.tenure().date_from);
      let date_to   = role.tenure().date_to.map(encode_date);

      match role {
        AnyRole::Administrator(_) => {
          self.conn.execute(
            "INSERT INTO administrators (role_id, person_id, date_from, date_to)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, person_id, date_from, date_to],
          )?;
        }
        AnyRole::Coach(coach) => {
          let p = &coach.profile;
          self.conn.execute(
            "INSERT INTO coaches (
               role_id, person_id, date_from, date_to, position,
               coach_experience, judge_category, education,
               additional_info, achievements
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
              id,
              person_id,
              date_from,
              date_to,
              encode_enum(p.position),
              p.coach_experience,
              p.judge_category.map(encode_enum),
              p.education,
              p.additional_info,
              p.achievements,
            ],
          )?;
        }
        AnyRole::Athlete(athlete) => {
          self.conn.execute(
            "INSERT INTO athletes (role_id, person_id, date_from, date_to, playing_level)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
              id,
              person_id,
              date_from,
              date_to,
              encode_enum(athlete.playing_level),
            ],
          )?;
          for group_id in &athlete.groups {
            self.conn.execute(
              "INSERT OR IGNORE INTO athlete_groups (athlete_id, group_id)
               VALUES (?1, ?2)",
              params![id, encode_uuid(*group_id)],
            )?;
          }
        }
      }
      Ok(())
    })
  }

  fn save_tenure(
    &mut self,
    kind: RoleKind,
    id: Uuid,
    tenure: &Tenure,
  ) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        &format!(
          "UPDATE {} SET date_from = ?2, date_to = ?3 WHERE role_id = ?1",
          role_table(kind)
        ),
        params![
          encode_uuid(id),
          encode_date(tenure.date_from),
          tenure.date_to.map(encode_date),
        ],
      )?;
      Ok(())
    })
  }

  fn add_athlete_group(
    &mut self,
    athlete_id: Uuid,
    group_id: Uuid,
  ) -> clubhouse_core::Result<bool> {
    lift(|| {
      let n = self.conn.execute(
        "INSERT OR IGNORE INTO athlete_groups (athlete_id, group_id)
         VALUES (?1, ?2)",
        params![encode_uuid(athlete_id), encode_uuid(group_id)],
      )?;
      Ok(n > 0)
    })
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  fn group(&self, id: Uuid) -> clubhouse_core::Result<Option<Group>> {
    lift(|| {
      let raw = self
        .conn
        .query_row(
          &format!(
            "SELECT {GROUP_COLUMNS} FROM training_groups WHERE group_id = ?1"
          ),
          params![encode_uuid(id)],
          RawGroup::from_row,
        )
        .optional()?;
      raw.map(RawGroup::into_group).transpose()
    })
  }

  fn groups(&self, query: &GroupQuery) -> clubhouse_core::Result<Vec<Group>> {
    lift(|| {
      let coach_str  = query.coach_id.map(encode_uuid);
      let status_str = query.status.map(encode_enum);
      let level_str  = query.playing_level.map(encode_enum);
      let (limit, offset) = paging(query.limit, query.offset);

      let mut conds: Vec<&'static str> = vec![];
      if coach_str.is_some() {
        conds.push("coach_id = ?1");
      }
      if status_str.is_some() {
        conds.push("status = ?2");
      }
      if level_str.is_some() {
        conds.push("playing_level = ?3");
      }

      let sql = format!(
        "SELECT {GROUP_COLUMNS} FROM training_groups {}
         ORDER BY rowid DESC LIMIT ?4 OFFSET ?5",
        where_clause(&conds)
      );
      let mut stmt = self.conn.prepare(&sql)?;
      let raws = stmt
        .query_map(
          params![coach_str, status_str, level_str, limit, offset],
          RawGroup::from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(RawGroup::into_group).collect()
    })
  }

  fn open_groups_of(&self, coach_id: Uuid) -> clubhouse_core::Result<Vec<Uuid>> {
    lift(|| {
      let mut stmt = self.conn.prepare(
        "SELECT group_id FROM training_groups
         WHERE coach_id = ?1 AND status != 'finished'",
      )?;
      let ids = stmt
        .query_map(params![encode_uuid(coach_id)], |row| {
          row.get::<_, String>(0)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      ids.iter().map(|s| decode_uuid(s)).collect()
    })
  }

  fn insert_group(&mut self, group: &Group) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        &format!(
          "INSERT INTO training_groups ({GROUP_COLUMNS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
          encode_uuid(group.id),
          group.name,
          group.description,
          encode_uuid(group.coach_id),
          group.min_participants,
          group.max_participants,
          encode_enum(group.playing_level),
          encode_days(&group.training_days)?,
          group.training_time,
          encode_enum(group.status),
          group.training_start.map(encode_date),
        ],
      )?;
      Ok(())
    })
  }

  fn update_group(&mut self, group: &Group) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        "UPDATE training_groups SET
           name = ?2, description = ?3, coach_id = ?4,
           min_participants = ?5, max_participants = ?6, playing_level = ?7,
           training_days = ?8, training_time = ?9, status = ?10,
           training_start = ?11
         WHERE group_id = ?1",
        params![
          encode_uuid(group.id),
          group.name,
          group.description,
          encode_uuid(group.coach_id),
          group.min_participants,
          group.max_participants,
          encode_enum(group.playing_level),
          encode_days(&group.training_days)?,
          group.training_time,
          encode_enum(group.status),
          group.training_start.map(encode_date),
        ],
      )?;
      Ok(())
    })
  }

  // ── Applications ──────────────────────────────────────────────────────────

  fn application(
    &self,
    id: Uuid,
  ) -> clubhouse_core::Result<Option<GroupApplication>> {
    lift(|| {
      let raw = self
        .conn
        .query_row(
          &format!(
            "SELECT {APPLICATION_COLUMNS} FROM group_applications
             WHERE application_id = ?1"
          ),
          params![encode_uuid(id)],
          RawApplication::from_row,
        )
        .optional()?;
      raw.map(RawApplication::into_application).transpose()
    })
  }

  fn applications(
    &self,
    query: &ApplicationQuery,
  ) -> clubhouse_core::Result<Vec<GroupApplication>> {
    lift(|| {
      let person_str = query.person_id.map(encode_uuid);
      let group_str  = query.group_id.map(encode_uuid);
      let status_str = query.status.map(encode_enum);
      let (limit, offset) = paging(query.limit, query.offset);

      let mut conds: Vec<&'static str> = vec![];
      if person_str.is_some() {
        conds.push("person_id = ?1");
      }
      if group_str.is_some() {
        conds.push("group_id = ?2");
      }
      if status_str.is_some() {
        conds.push("status = ?3");
      }

      let sql = format!(
        "SELECT {APPLICATION_COLUMNS} FROM group_applications {}
         ORDER BY rowid DESC LIMIT ?4 OFFSET ?5",
        where_clause(&conds)
      );
      let mut stmt = self.conn.prepare(&sql)?;
      let raws = stmt
        .query_map(
          params![person_str, group_str, status_str, limit, offset],
          RawApplication::from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws
        .into_iter()
        .map(RawApplication::into_application)
        .collect()
    })
  }

  fn insert_application(
    &mut self,
    application: &GroupApplication,
  ) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        &format!(
          "INSERT INTO group_applications ({APPLICATION_COLUMNS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
          encode_uuid(application.id),
          encode_uuid(application.person_id),
          encode_uuid(application.group_id),
          encode_dt(application.created_at),
          encode_enum(application.status),
          encode_enum(application.playing_level),
          application.comment,
          application.reject_reason,
        ],
      )?;
      Ok(())
    })
  }

  /// Status and reject reason are written by the same statement.
  fn update_application(
    &mut self,
    application: &GroupApplication,
  ) -> clubhouse_core::Result<()> {
    lift(|| {
      self.conn.execute(
        "UPDATE group_applications SET
           status = ?2, playing_level = ?3, comment = ?4, reject_reason = ?5
         WHERE application_id = ?1",
        params![
          encode_uuid(application.id),
          encode_enum(application.status),
          encode_enum(application.playing_level),
          application.comment,
          application.reject_reason,
        ],
      )?;
      Ok(())
    })
  }

  fn delete_application(&mut self, id: Uuid) -> clubhouse_core::Result<bool> {
    lift(|| {
      let n = self.conn.execute(
        "DELETE FROM group_applications WHERE application_id = ?1",
        params![encode_uuid(id)],
      )?;
      Ok(n > 0)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn paging_clamps_instead_of_wrapping() {
    assert_eq!(paging(None, None), (DEFAULT_LIMIT as i64, 0));
    assert_eq!(paging(Some(usize::MAX), Some(usize::MAX)), (i64::MAX, i64::MAX));
  }

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("Sidor"), "%Sidor%");
    assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
    assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
  }
}
