//! JSON REST API for Clubhouse.
//!
//! Exposes an axum [`Router`] backed by any [`clubhouse_core::store::ClubStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", clubhouse_api::api_router(store.clone()))
//! ```

pub mod applications;
pub mod error;
pub mod extract;
pub mod groups;
pub mod roles;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use clubhouse_core::{
  role::{Administrator, Athlete, Coach},
  store::ClubStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ClubStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .patch(users::update::<S>)
        .delete(users::delete::<S>),
    )
    .route(
      "/users/{id}/appoint-administrator",
      post(users::appoint_administrator::<S>),
    )
    .route("/users/{id}/appoint-coach", post(users::appoint_coach::<S>))
    .route("/users/{id}/appoint-athlete", post(users::appoint_athlete::<S>))
    // Roles
    .route(
      "/administrators",
      get(roles::list::<S, Administrator>).post(roles::create::<S, Administrator>),
    )
    .route("/administrators/{id}", get(roles::get_one::<S, Administrator>))
    .route(
      "/administrators/{id}/cancel-administrator",
      post(roles::cancel::<S, Administrator>),
    )
    .route(
      "/coaches",
      get(roles::list::<S, Coach>).post(roles::create::<S, Coach>),
    )
    .route("/coaches/{id}", get(roles::get_one::<S, Coach>))
    .route("/coaches/{id}/cancel-coach", post(roles::cancel::<S, Coach>))
    .route(
      "/athletes",
      get(roles::list::<S, Athlete>).post(roles::create::<S, Athlete>),
    )
    .route("/athletes/{id}", get(roles::get_one::<S, Athlete>))
    .route("/athletes/{id}/cancel-athlete", post(roles::cancel::<S, Athlete>))
    // Groups
    .route("/groups", get(groups::list::<S>).post(groups::create::<S>))
    .route(
      "/groups/{id}",
      get(groups::get_one::<S>).patch(groups::update::<S>),
    )
    // Applications
    .route(
      "/group-applications",
      get(applications::list::<S>).post(applications::create::<S>),
    )
    .route(
      "/group-applications/{id}",
      get(applications::get_one::<S>)
        .patch(applications::update::<S>)
        .delete(applications::delete::<S>),
    )
    .route(
      "/group-applications/{id}/approve",
      post(applications::approve::<S>),
    )
    .route(
      "/group-applications/{id}/reject",
      post(applications::reject::<S>),
    )
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::NaiveDate;
  use clubhouse_core::clock::FixedClock;
  use clubhouse_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let today = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
    let store = SqliteStore::open_in_memory_with_clock(Arc::new(FixedClock::on(today)))
      .await
      .unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let res = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  fn user(email: &str) -> Value {
    json!({
      "last_name": "Smirnova",
      "first_name": "Olga",
      "date_of_birth": "1998-03-21",
      "gender": "female",
      "email": email,
      "phone": "+7 900 555-00-11",
    })
  }

  async fn create_user(app: &Router, email: &str) -> String {
    let (status, body) = send(app, "POST", "/users", Some(user(email))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_user_is_404_with_envelope() {
    let app = app().await;
    let (status, body) =
      send(&app, "GET", "/users/6f1c1a52-3d1f-4bb5-a0c5-6c33b0d1f0aa", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
  }

  #[tokio::test]
  async fn user_response_hides_password_hash() {
    let app = app().await;
    let mut input = user("hidden@club.test");
    input["password"] = json!("s3cret");
    let (status, body) = send(&app, "POST", "/users", Some(input)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
  }

  #[tokio::test]
  async fn invalid_user_is_400() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/users", Some(user("not-an-email"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));
  }

  #[tokio::test]
  async fn unknown_enum_in_body_is_400_with_envelope() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/athletes",
      Some(json!({ "user_data": user("legend@club.test"), "playing_level": "legend" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("legend"));

    let (_, persons) = send(&app, "GET", "/users", None).await;
    assert!(persons.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn out_of_range_number_is_400_with_envelope() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/groups",
      Some(json!({
        "name": "Huge",
        "coach_id": "6f1c1a52-3d1f-4bb5-a0c5-6c33b0d1f0aa",
        "playing_level": "pro",
        "training_days": ["monday"],
        "training_time": "07:00",
        "max_participants": 300,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn malformed_query_and_path_are_400_with_envelope() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/groups?status=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/users/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn deleting_a_role_holder_is_409() {
    let app = app().await;
    let id = create_user(&app, "held@club.test").await;
    let uri = format!("/users/{id}/appoint-administrator");
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  // ── Roles ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn appoint_coach_twice_is_400() {
    let app = app().await;
    let id = create_user(&app, "coach@club.test").await;
    let uri = format!("/users/{id}/appoint-coach");

    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["position"], "instructor");
    assert_eq!(body["date_from"], "2024-09-02");
    assert_eq!(body["date_to"], Value::Null);
    assert_eq!(body["person"]["id"], id.as_str());

    let (status, body) =
      send(&app, "POST", &uri, Some(json!({ "position": "senior" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("active coach"));

    let (_, list) =
      send(&app, "GET", &format!("/coaches?person_id={id}"), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn cancel_administrator_then_reappoint() {
    let app = app().await;
    let (status, admin) = send(
      &app,
      "POST",
      "/administrators",
      Some(json!({ "user_data": user("adm@club.test") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{admin}");
    let role_id = admin["id"].as_str().unwrap();
    let person_id = admin["person"]["id"].as_str().unwrap();

    let uri = format!("/administrators/{role_id}/cancel-administrator");
    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date_to"], "2024-09-02");

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/users/{person_id}/appoint-administrator");
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/administrators?person_id={person_id}");
    let (_, list) = send(&app, "GET", &uri, None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
  }

  // ── Workflow ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn application_approval_flow() {
    let app = app().await;

    let (status, coach) = send(
      &app,
      "POST",
      "/coaches",
      Some(json!({
        "user_data": user("trainer@club.test"),
        "position": "senior",
        "coach_experience": 4,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{coach}");
    assert_eq!(coach["position"], "senior");

    let (status, group) = send(
      &app,
      "POST",
      "/groups",
      Some(json!({
        "name": "Weekend juniors",
        "coach_id": coach["id"],
        "playing_level": "beginner",
        "training_days": ["saturday", "sunday"],
        "training_time": "10:00-11:30",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{group}");
    assert_eq!(group["max_participants"], 12);
    assert_eq!(group["min_participants"], 6);
    assert_eq!(group["status"], "future");

    let person_id = create_user(&app, "kid@club.test").await;
    let (status, application) = send(
      &app,
      "POST",
      "/group-applications",
      Some(json!({
        "person_id": person_id,
        "group_id": group["id"],
        "playing_level": "beginner",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{application}");
    assert_eq!(application["status"], "new");
    let app_id = application["id"].as_str().unwrap();

    let uri = format!("/group-applications/{app_id}/approve");
    let (status, approved) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{approved}");
    assert_eq!(approved["status"], "approved");

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let group_id = group["id"].as_str().unwrap();
    let (_, members) =
      send(&app, "GET", &format!("/athletes?group_id={group_id}"), None).await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["person"]["id"], person_id.as_str());
    assert_eq!(members[0]["playing_level"], "beginner");

    let uri = format!("/coaches/{}/cancel-coach", coach["id"].as_str().unwrap());
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn rejected_application_is_frozen() {
    let app = app().await;
    let (_, coach) = send(
      &app,
      "POST",
      "/coaches",
      Some(json!({ "user_data": user("c@club.test") })),
    )
    .await;
    let (_, group) = send(
      &app,
      "POST",
      "/groups",
      Some(json!({
        "name": "Morning",
        "coach_id": coach["id"],
        "playing_level": "pro",
        "training_days": ["monday"],
        "training_time": "07:00",
      })),
    )
    .await;
    let person_id = create_user(&app, "applicant@club.test").await;
    let (_, application) = send(
      &app,
      "POST",
      "/group-applications",
      Some(json!({
        "person_id": person_id,
        "group_id": group["id"],
        "playing_level": "pro",
        "comment": "five years of club play",
      })),
    )
    .await;
    let app_id = application["id"].as_str().unwrap();

    let (status, rejected) = send(
      &app,
      "POST",
      &format!("/group-applications/{app_id}/reject"),
      Some(json!({ "reject_reason": "insufficient level" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["reject_reason"], "insufficient level");

    let (status, _) = send(
      &app,
      "POST",
      &format!("/group-applications/{app_id}/approve"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
      &app,
      "PATCH",
      &format!("/group-applications/{app_id}"),
      Some(json!({ "comment": "please reconsider" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
      send(&app, "DELETE", &format!("/group-applications/{app_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) =
      send(&app, "GET", &format!("/group-applications/{app_id}"), None).await;
    assert_eq!(stored["status"], "rejected");
    assert_eq!(stored["reject_reason"], "insufficient level");
  }
}
