//! [`SqliteStore`]: the SQLite implementation of [`ClubStore`].

use std::{path::Path, sync::Arc, time::Duration};

use clubhouse_core::{
  application::{
    ApplicationPatch, ApplicationQuery, GroupApplication, NewApplication,
  },
  clock::{Clock, SystemClock},
  group::{Group, GroupPatch, GroupQuery, NewGroup},
  person::{NewPerson, Person, PersonPatch, PersonQuery},
  repo::Repository,
  role::{Assignment, Role, RoleQuery},
  service::{applications, groups, persons, roles},
  store::ClubStore,
};
use rusqlite::TransactionBehavior;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result, repo::SqliteRepo, schema::SCHEMA};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Clubhouse store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and clock are reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  clock:           Arc<dyn Clock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_clock(path, Arc::new(SystemClock)).await
  }

  pub async fn open_with_clock(
    path: impl AsRef<Path>,
    clock: Arc<dyn Clock>,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, clock };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with_clock(Arc::new(SystemClock)).await
  }

  pub async fn open_in_memory_with_clock(clock: Arc<dyn Clock>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, clock };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` inside a `BEGIN IMMEDIATE` transaction, committing only when
  /// it returns `Ok`.
  async fn write<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteRepo<'_>, &dyn Clock) -> clubhouse_core::Result<T>
      + Send
      + 'static,
  {
    self.transaction(TransactionBehavior::Immediate, op).await
  }

  async fn read<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteRepo<'_>, &dyn Clock) -> clubhouse_core::Result<T>
      + Send
      + 'static,
  {
    self.transaction(TransactionBehavior::Deferred, op).await
  }

  async fn transaction<T, F>(
    &self,
    behavior: TransactionBehavior,
    op: F,
  ) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteRepo<'_>, &dyn Clock) -> clubhouse_core::Result<T>
      + Send
      + 'static,
  {
    let clock = Arc::clone(&self.clock);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(behavior)?;
        let outcome = op(&mut SqliteRepo::new(&tx), clock.as_ref());
        match outcome {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          // Dropping the transaction rolls it back.
          Err(e) => Ok(Err(e)),
        }
      })
      .await?;
    if let Err(e) = &outcome {
      debug!(error = %e, "transaction rolled back");
    }
    Ok(outcome?)
  }
}

// ─── ClubStore impl ──────────────────────────────────────────────────────────

impl ClubStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    self
      .write(move |repo, clock| persons::create_person(repo, clock, input))
      .await
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self.read(move |repo, _| repo.person(id)).await
  }

  async fn list_persons(&self, query: PersonQuery) -> Result<Vec<Person>> {
    self.read(move |repo, _| repo.persons(&query)).await
  }

  async fn update_person(&self, id: Uuid, patch: PersonPatch) -> Result<Person> {
    self
      .write(move |repo, _| persons::update_person(repo, id, patch))
      .await
  }

  async fn delete_person(&self, id: Uuid) -> Result<()> {
    self
      .write(move |repo, _| persons::delete_person(repo, id))
      .await
  }

  // ── Role lifecycle ────────────────────────────────────────────────────────

  async fn appoint<R: Role>(
    &self,
    person_id: Uuid,
    details: R::Details,
  ) -> Result<Assignment<R>> {
    self
      .write(move |repo, clock| {
        let role = roles::appoint::<R>(repo, clock, person_id, details)?;
        roles::with_person(repo, role)
      })
      .await
  }

  async fn cancel<R: Role>(&self, id: Uuid) -> Result<Assignment<R>> {
    self
      .write(move |repo, clock| {
        let role = roles::cancel::<R>(repo, clock, id)?;
        roles::with_person(repo, role)
      })
      .await
  }

  async fn create_with_person<R: Role>(
    &self,
    person: NewPerson,
    details: R::Details,
  ) -> Result<Assignment<R>> {
    self
      .write(move |repo, clock| {
        roles::create_person_with_role::<R>(repo, clock, person, details)
      })
      .await
  }

  async fn get_role<R: Role>(&self, id: Uuid) -> Result<Option<Assignment<R>>> {
    self
      .read(move |repo, _| {
        let repo = &*repo;
        repo
          .find::<R>(id)?
          .map(|role| roles::with_person(repo, role))
          .transpose()
      })
      .await
  }

  async fn list_roles<R: Role>(
    &self,
    query: RoleQuery,
  ) -> Result<Vec<Assignment<R>>> {
    self
      .read(move |repo, _| {
        let repo = &*repo;
        repo
          .list::<R>(&query)?
          .into_iter()
          .map(|role| roles::with_person(repo, role))
          .collect()
      })
      .await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn create_group(&self, input: NewGroup) -> Result<Group> {
    self
      .write(move |repo, _| groups::create_group(repo, input))
      .await
  }

  async fn get_group(&self, id: Uuid) -> Result<Option<Group>> {
    self.read(move |repo, _| repo.group(id)).await
  }

  async fn list_groups(&self, query: GroupQuery) -> Result<Vec<Group>> {
    self.read(move |repo, _| repo.groups(&query)).await
  }

  async fn update_group(&self, id: Uuid, patch: GroupPatch) -> Result<Group> {
    self
      .write(move |repo, _| groups::update_group(repo, id, patch))
      .await
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn submit_application(
    &self,
    input: NewApplication,
  ) -> Result<GroupApplication> {
    self
      .write(move |repo, clock| {
        applications::submit_application(repo, clock, input)
      })
      .await
  }

  async fn get_application(
    &self,
    id: Uuid,
  ) -> Result<Option<GroupApplication>> {
    self.read(move |repo, _| repo.application(id)).await
  }

  async fn list_applications(
    &self,
    query: ApplicationQuery,
  ) -> Result<Vec<GroupApplication>> {
    self.read(move |repo, _| repo.applications(&query)).await
  }

  async fn update_application(
    &self,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> Result<GroupApplication> {
    self
      .write(move |repo, _| applications::update_application(repo, id, patch))
      .await
  }

  async fn delete_application(&self, id: Uuid) -> Result<()> {
    self
      .write(move |repo, _| applications::delete_application(repo, id))
      .await
  }

  async fn approve_application(&self, id: Uuid) -> Result<GroupApplication> {
    self
      .write(move |repo, clock| {
        applications::approve_application(repo, clock, id)
      })
      .await
  }

  async fn reject_application(
    &self,
    id: Uuid,
    reason: String,
  ) -> Result<GroupApplication> {
    self
      .write(move |repo, _| applications::reject_application(repo, id, reason))
      .await
  }
}
