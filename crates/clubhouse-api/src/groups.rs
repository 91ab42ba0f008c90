//! Handlers for `/groups` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/groups` | `?coach_id=&status=&playing_level=&limit=&offset=` |
//! | `POST`  | `/groups` | Body: [`NewGroup`]; the coach must be active |
//! | `GET`   | `/groups/{id}` | 404 if not found |
//! | `PATCH` | `/groups/{id}` | Body: [`GroupPatch`] |

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use clubhouse_core::{
  group::{Group, GroupPatch, GroupQuery, NewGroup},
  store::ClubStore,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

/// `GET /groups`
pub async fn list<S: ClubStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<GroupQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
  let groups = store.list_groups(query).await.map_err(ApiError::store)?;
  Ok(Json(groups))
}

/// `POST /groups`
pub async fn create<S: ClubStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewGroup>,
) -> Result<impl IntoResponse, ApiError> {
  let group = store.create_group(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/{id}`
pub async fn get_one<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
  let group = store
    .get_group(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("group {id} not found")))?;
  Ok(Json(group))
}

/// `PATCH /groups/{id}`
pub async fn update<S: ClubStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, ApiError> {
  let group = store.update_group(id, patch).await.map_err(ApiError::store)?;
  Ok(Json(group))
}
