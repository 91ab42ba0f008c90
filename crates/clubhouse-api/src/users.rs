//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | `?text=&is_active=&limit=&offset=` |
//! | `POST`   | `/users` | Body: [`NewPerson`] |
//! | `GET`    | `/users/{id}` | 404 if not found |
//! | `PATCH`  | `/users/{id}` | Body: [`PersonPatch`] |
//! | `DELETE` | `/users/{id}` | 409 while roles or applications reference the person |
//! | `POST`   | `/users/{id}/appoint-administrator` | No body |
//! | `POST`   | `/users/{id}/appoint-coach` | Optional [`CoachProfile`] body |
//! | `POST`   | `/users/{id}/appoint-athlete` | Body: `{"playing_level":"beginner"}` |

use std::sync::Arc;

use axum::{
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use clubhouse_core::{
  person::{NewPerson, Person, PersonPatch, PersonQuery},
  role::{
    Administrator, Assignment, Athlete, Coach, CoachProfile, PlayingLevel,
  },
  store::ClubStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── CRUD ────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S: ClubStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<PersonQuery>,
) -> Result<Json<Vec<Person>>, ApiError> {
  let persons = store.list_persons(query).await.map_err(ApiError::store)?;
  Ok(Json(persons))
}

/// `POST /users`
pub async fn create<S: ClubStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  let person = store.create_person(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /users/{id}`
pub async fn get_one<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

/// `PATCH /users/{id}`
pub async fn update<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<PersonPatch>,
) -> Result<Json<Person>, ApiError> {
  let person = store.update_person(id, patch).await.map_err(ApiError::store)?;
  Ok(Json(person))
}

/// `DELETE /users/{id}`
pub async fn delete<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_person(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Appointments ────────────────────────────────────────────────────────────

/// `POST /users/{id}/appoint-administrator`
pub async fn appoint_administrator<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assignment<Administrator>>, ApiError> {
  let admin = store
    .appoint::<Administrator>(id, ())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(admin))
}

/// `POST /users/{id}/appoint-coach`
///
/// The body may be empty, in which case the coach is appointed as an
/// instructor with no prior experience.
pub async fn appoint_coach<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  body: Bytes,
) -> Result<Json<Assignment<Coach>>, ApiError> {
  let profile = if body.iter().all(u8::is_ascii_whitespace) {
    CoachProfile::default()
  } else {
    serde_json::from_slice(&body)
      .map_err(|e| ApiError::BadRequest(format!("invalid coach profile: {e}")))?
  };
  let coach = store
    .appoint::<Coach>(id, profile)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(coach))
}

#[derive(Debug, Deserialize)]
pub struct AppointAthleteBody {
  pub playing_level: PlayingLevel,
}

/// `POST /users/{id}/appoint-athlete`
pub async fn appoint_athlete<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AppointAthleteBody>,
) -> Result<Json<Assignment<Athlete>>, ApiError> {
  let athlete = store
    .appoint::<Athlete>(id, body.playing_level)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(athlete))
}
