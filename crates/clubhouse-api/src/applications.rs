//! Handlers for `/group-applications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/group-applications` | `?person_id=&group_id=&status=&limit=&offset=` |
//! | `POST`   | `/group-applications` | Body: [`NewApplication`] |
//! | `GET`    | `/group-applications/{id}` | 404 if not found |
//! | `PATCH`  | `/group-applications/{id}` | Only while `new` |
//! | `DELETE` | `/group-applications/{id}` | Only while `new` |
//! | `POST`   | `/group-applications/{id}/approve` | No body |
//! | `POST`   | `/group-applications/{id}/reject` | Body: `{"reject_reason":"..."}` |

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use clubhouse_core::{
  application::{
    ApplicationPatch, ApplicationQuery, GroupApplication, NewApplication,
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

/// `GET /group-applications`
pub async fn list<S: ClubStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<ApplicationQuery>,
) -> Result<Json<Vec<GroupApplication>>, ApiError> {
  let applications = store
    .list_applications(query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(applications))
}

/// `POST /group-applications`
pub async fn create<S: ClubStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewApplication>,
) -> Result<impl IntoResponse, ApiError> {
  let application = store
    .submit_application(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(application)))
}

/// `GET /group-applications/{id}`
pub async fn get_one<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GroupApplication>, ApiError> {
  let application = store
    .get_application(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("group application {id} not found"))
    })?;
  Ok(Json(application))
}

/// `PATCH /group-applications/{id}`
pub async fn update<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ApplicationPatch>,
) -> Result<Json<GroupApplication>, ApiError> {
  let application = store
    .update_application(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(application))
}

/// `DELETE /group-applications/{id}`
pub async fn delete<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_application(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Workflow ────────────────────────────────────────────────────────────────

/// `POST /group-applications/{id}/approve`
pub async fn approve<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GroupApplication>, ApiError> {
  let application = store
    .approve_application(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(application))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub reject_reason: String,
}

/// `POST /group-applications/{id}/reject`
pub async fn reject<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<GroupApplication>, ApiError> {
  let application = store
    .reject_application(id, body.reject_reason)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(application))
}
