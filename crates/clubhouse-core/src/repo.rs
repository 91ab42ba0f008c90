//! The [`Repository`] trait: one unit of work against a storage backend.
//!
//! A repository lives for exactly one transaction. Services take
//! `&mut impl Repository` and never see commits or rollbacks; the backend
//! commits when the service returns `Ok` and rolls back otherwise.
//!
//! Methods are synchronous. Async backends run the whole service call on
//! their connection thread (see `clubhouse-store-sqlite`).

use uuid::Uuid;

use crate::{
  Error, Result,
  application::{ApplicationQuery, GroupApplication},
  group::{Group, GroupQuery},
  person::{Person, PersonQuery},
  role::{AnyRole, Role, RoleKind, RoleQuery, Tenure},
};

pub trait Repository {
  // ── Persons ───────────────────────────────────────────────────────────

  fn person(&self, id: Uuid) -> Result<Option<Person>>;

  /// Look up by normalized email.
  fn person_by_email(&self, email: &str) -> Result<Option<Person>>;

  fn persons(&self, query: &PersonQuery) -> Result<Vec<Person>>;

  fn insert_person(&mut self, person: &Person) -> Result<()>;

  fn update_person(&mut self, person: &Person) -> Result<()>;

  /// Returns `false` if no such person existed. Their applications go with
  /// them; fails with [`Error::Integrity`] while any role row references them.
  fn delete_person(&mut self, id: Uuid) -> Result<bool>;

  // ── Roles ─────────────────────────────────────────────────────────────

  fn role(&self, kind: RoleKind, id: Uuid) -> Result<Option<AnyRole>>;

  /// The row of `kind` with `date_to = NULL` for this person, if any.
  fn active_role(
    &self,
    kind: RoleKind,
    person_id: Uuid,
  ) -> Result<Option<AnyRole>>;

  fn roles(&self, kind: RoleKind, query: &RoleQuery) -> Result<Vec<AnyRole>>;

  fn insert_role(&mut self, role: &AnyRole) -> Result<()>;

  /// Persist the tenure of an existing row. Nothing else about a role ever
  /// changes after appointment.
  fn save_tenure(
    &mut self,
    kind: RoleKind,
    id: Uuid,
    tenure: &Tenure,
  ) -> Result<()>;

  /// Add a group membership. Returns `false` when it already existed.
  fn add_athlete_group(&mut self, athlete_id: Uuid, group_id: Uuid)
  -> Result<bool>;

  // ── Groups ────────────────────────────────────────────────────────────

  fn group(&self, id: Uuid) -> Result<Option<Group>>;

  fn groups(&self, query: &GroupQuery) -> Result<Vec<Group>>;

  /// Ids of the coach's groups whose status is not `finished`.
  fn open_groups_of(&self, coach_id: Uuid) -> Result<Vec<Uuid>>;

  fn insert_group(&mut self, group: &Group) -> Result<()>;

  fn update_group(&mut self, group: &Group) -> Result<()>;

  // ── Applications ──────────────────────────────────────────────────────

  fn application(&self, id: Uuid) -> Result<Option<GroupApplication>>;

  fn applications(
    &self,
    query: &ApplicationQuery,
  ) -> Result<Vec<GroupApplication>>;

  fn insert_application(&mut self, application: &GroupApplication)
  -> Result<()>;

  fn update_application(&mut self, application: &GroupApplication)
  -> Result<()>;

  fn delete_application(&mut self, id: Uuid) -> Result<bool>;

  // ── Typed helpers ─────────────────────────────────────────────────────

  fn find<R: Role>(&self, id: Uuid) -> Result<Option<R>>
  where
    Self: Sized,
  {
    Ok(self.role(R::KIND, id)?.and_then(R::from_any))
  }

  fn active<R: Role>(&self, person_id: Uuid) -> Result<Option<R>>
  where
    Self: Sized,
  {
    Ok(self.active_role(R::KIND, person_id)?.and_then(R::from_any))
  }

  fn list<R: Role>(&self, query: &RoleQuery) -> Result<Vec<R>>
  where
    Self: Sized,
  {
    Ok(
      self
        .roles(R::KIND, query)?
        .into_iter()
        .filter_map(R::from_any)
        .collect(),
    )
  }

  fn require_person(&self, id: Uuid) -> Result<Person>
  where
    Self: Sized,
  {
    self.person(id)?.ok_or_else(|| Error::not_found("person", id))
  }
}
