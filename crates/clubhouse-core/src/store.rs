//! The `ClubStore` trait, the async surface the API layer consumes.
//!
//! Every write method is one atomic unit of work: the backend opens a
//! transaction, runs the matching function from [`crate::service`] against a
//! [`crate::repo::Repository`], and commits only if it succeeded.

use std::future::Future;

use uuid::Uuid;

use crate::{
  application::{
    ApplicationPatch, ApplicationQuery, GroupApplication, NewApplication,
  },
  group::{Group, GroupPatch, GroupQuery, NewGroup},
  person::{NewPerson, Person, PersonPatch, PersonQuery},
  role::{Assignment, Role, RoleQuery},
};

/// Abstraction over a Clubhouse storage backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait ClubStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn list_persons(
    &self,
    query: PersonQuery,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn update_person(
    &self,
    id: Uuid,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Role lifecycle ────────────────────────────────────────────────────

  /// Give an existing person a new active role of kind `R`.
  fn appoint<R: Role>(
    &self,
    person_id: Uuid,
    details: R::Details,
  ) -> impl Future<Output = Result<Assignment<R>, Self::Error>> + Send + '_;

  /// End an active role on today's date.
  fn cancel<R: Role>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Assignment<R>, Self::Error>> + Send + '_;

  /// Register a person and appoint them in one transaction.
  fn create_with_person<R: Role>(
    &self,
    person: NewPerson,
    details: R::Details,
  ) -> impl Future<Output = Result<Assignment<R>, Self::Error>> + Send + '_;

  fn get_role<R: Role>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assignment<R>>, Self::Error>> + Send + '_;

  fn list_roles<R: Role>(
    &self,
    query: RoleQuery,
  ) -> impl Future<Output = Result<Vec<Assignment<R>>, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  fn create_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  fn list_groups(
    &self,
    query: GroupQuery,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  fn update_group(
    &self,
    id: Uuid,
    patch: GroupPatch,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn submit_application(
    &self,
    input: NewApplication,
  ) -> impl Future<Output = Result<GroupApplication, Self::Error>> + Send + '_;

  fn get_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<GroupApplication>, Self::Error>>
  + Send
  + '_;

  fn list_applications(
    &self,
    query: ApplicationQuery,
  ) -> impl Future<Output = Result<Vec<GroupApplication>, Self::Error>>
  + Send
  + '_;

  /// Only while the application is `New`.
  fn update_application(
    &self,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> impl Future<Output = Result<GroupApplication, Self::Error>> + Send + '_;

  /// Only while the application is `New`.
  fn delete_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Approve, provisioning an athlete role and group membership as needed.
  fn approve_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<GroupApplication, Self::Error>> + Send + '_;

  fn reject_application(
    &self,
    id: Uuid,
    reason: String,
  ) -> impl Future<Output = Result<GroupApplication, Self::Error>> + Send + '_;
}
