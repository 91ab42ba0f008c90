//! Handlers shared by `/administrators`, `/coaches` and `/athletes`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/{kind}s` | `?person_id=&active=&text=&limit=&offset=`; athletes also `group_id` |
//! | `POST` | `/{kind}s` | Creates the person from `user_data` and appoints them |
//! | `GET`  | `/{kind}s/{id}` | 404 if not found |
//! | `POST` | `/{kind}s/{id}/cancel-{kind}` | 400 if already inactive |
//!
//! Every response carries the holder under `person`.

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use clubhouse_core::{
  person::NewPerson,
  role::{
    Administrator, Assignment, Athlete, Coach, CoachProfile, PlayingLevel,
    Role, RoleQuery,
  },
  store::ClubStore,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

/// How a role kind is created over HTTP.
pub trait RoleRoute: Role + Serialize {
  type Body: DeserializeOwned + Send + 'static;

  fn split(body: Self::Body) -> (NewPerson, Self::Details);
}

#[derive(Debug, Deserialize)]
pub struct AdministratorBody {
  pub user_data: NewPerson,
}

impl RoleRoute for Administrator {
  type Body = AdministratorBody;

  fn split(body: AdministratorBody) -> (NewPerson, ()) { (body.user_data, ()) }
}

#[derive(Debug, Deserialize)]
pub struct CoachBody {
  pub user_data: NewPerson,
  #[serde(flatten)]
  pub profile:   CoachProfile,
}

impl RoleRoute for Coach {
  type Body = CoachBody;

  fn split(body: CoachBody) -> (NewPerson, CoachProfile) {
    (body.user_data, body.profile)
  }
}

#[derive(Debug, Deserialize)]
pub struct AthleteBody {
  pub user_data:     NewPerson,
  pub playing_level: PlayingLevel,
}

impl RoleRoute for Athlete {
  type Body = AthleteBody;

  fn split(body: AthleteBody) -> (NewPerson, PlayingLevel) {
    (body.user_data, body.playing_level)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

pub async fn list<S: ClubStore, R: RoleRoute>(
  State(store): State<Arc<S>>,
  Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<Assignment<R>>>, ApiError> {
  let roles = store.list_roles::<R>(query).await.map_err(ApiError::store)?;
  Ok(Json(roles))
}

pub async fn create<S: ClubStore, R: RoleRoute>(
  State(store): State<Arc<S>>,
  Json(body): Json<R::Body>,
) -> Result<impl IntoResponse, ApiError> {
  let (person, details) = R::split(body);
  let role = store
    .create_with_person::<R>(person, details)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(role)))
}

pub async fn get_one<S: ClubStore, R: RoleRoute>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assignment<R>>, ApiError> {
  let role = store
    .get_role::<R>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", R::KIND)))?;
  Ok(Json(role))
}

pub async fn cancel<S: ClubStore, R: RoleRoute>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assignment<R>>, ApiError> {
  let role = store.cancel::<R>(id).await.map_err(ApiError::store)?;
  Ok(Json(role))
}
