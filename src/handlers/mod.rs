//! HTTP handlers module
//!
//! JSON endpoints over the event lifecycle service:
//! - Event catalog and registration routes under `/events`
//! - Resident registrations under `/registrations`
//! - Check-in and attendance listings under `/attendance`

pub mod attendance;
pub mod error;
pub mod events;
pub mod registrations;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::config::PaginationConfig;
use crate::middleware::trace_layer;
use crate::models::{PageParams, PageRequest};
use crate::services::ServiceFactory;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(services: ServiceFactory, pagination: PaginationConfig) -> Self {
        Self {
            services,
            pagination,
        }
    }

    pub fn page_request(&self, params: PageParams) -> PageRequest {
        PageRequest::resolve(params, self.pagination.page_size, self.pagination.max_page_size)
    }
}

/// Create the Axum router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/register", post(events::register))
        .route("/events/:id/unregister", post(events::unregister))
        .route("/events/:id/registrants", get(events::registrants))
        .route("/events/:id/attendance", get(events::event_attendance))
        .route("/registrations/mine", get(registrations::my_registrations))
        .route(
            "/attendance",
            get(attendance::all_attendance).post(attendance::mark_attendance),
        )
        .layer(cors)
        .layer(trace_layer())
        .with_state(state)
}

/// Health check endpoint; 503 when the store does not answer
async fn health_check(State(state): State<AppState>) -> Response {
    match state.services.health_check().await {
        Ok(()) => Json(json!({ "status": "ok", "version": crate::VERSION })).into_response(),
        Err(err) => {
            error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::database::MemoryStore;
    use crate::models::{Resident, Role, User};
    use crate::services::JwtIdentityProvider;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        tokens: JwtIdentityProvider,
        store: Arc<MemoryStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let mut settings = Settings::default();
            settings.auth.jwt_secret = "router-test-secret-that-is-long-enough".to_string();

            let store = Arc::new(MemoryStore::new());
            let services = ServiceFactory::new(store.clone(), &settings);
            let state = AppState::new(services, settings.pagination.clone());

            Self {
                router: create_router(state),
                tokens: JwtIdentityProvider::new(&settings.auth),
                store,
            }
        }

        fn token(&self, user: &User) -> String {
            self.tokens.issue_token(user).unwrap()
        }

        async fn send(&self, method: Method, uri: &str, user: Option<&User>, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(user) = user {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }

    fn admin() -> User {
        User::new(1, "kapitan", Role::Admin)
    }

    fn resident(id: i64) -> User {
        User::new(id, format!("resident{}", id), Role::Resident)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let app = TestApp::new();

        let (status, body) = app.send(Method::GET, "/events", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "unauthorized");

        let request = Request::builder()
            .uri("/events")
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_mismatch_is_forbidden() {
        let app = TestApp::new();
        let body = json!({
            "title": "Assembly",
            "event_type": "assembly",
            "date": Utc::now() + Duration::days(1),
        });

        let (status, body) = app.send(Method::POST, "/events", Some(&resident(2)), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["kind"], "forbidden");

        let (status, _) = app.send(Method::GET, "/registrations/mine", Some(&admin()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let app = TestApp::new();
        let now = Utc::now();
        let body = json!({
            "title": "Clinic",
            "event_type": "Medical",
            "date": now - Duration::days(1),
            "capacity": -1,
        });

        let (status, body) = app.send(Method::POST, "/events", Some(&admin()), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["field"].as_str())
            .collect();
        assert!(fields.contains(&"date"));
        assert!(fields.contains(&"capacity"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = TestApp::new();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/attendance")
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token(&admin())))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_path_and_query_use_error_body() {
        let app = TestApp::new();

        let (status, body) = app.send(Method::GET, "/events/abc", Some(&admin()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");
        assert!(body["error"].as_str().is_some_and(|e| e.contains("abc")));

        let (status, body) = app.send(Method::GET, "/attendance?page=x", Some(&admin()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");

        let (status, body) = app
            .send(Method::GET, "/events/1/attendance?page_size=-1", Some(&admin()), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");

        // authentication still runs before parameter parsing
        let (status, _) = app.send(Method::GET, "/events/abc", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_event_crud_and_missing_event() {
        let app = TestApp::new();
        let body = json!({
            "title": "Relief Goods",
            "event_type": "relief",
            "date": Utc::now() + Duration::days(3),
            "venue": "Gym",
        });

        let (status, created) = app.send(Method::POST, "/events", Some(&admin()), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "upcoming");
        let id = created["id"].as_i64().unwrap();

        let (status, listed) = app.send(Method::GET, "/events?q=gym&ordering=title", Some(&resident(2)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, updated) = app
            .send(Method::PUT, &format!("/events/{}", id), Some(&admin()), Some(json!({ "status": "ongoing" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "ongoing");
        assert_eq!(updated["venue"], "Gym");

        let (status, _) = app.send(Method::DELETE, &format!("/events/{}", id), Some(&admin()), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.send(Method::GET, &format!("/events/{}", id), Some(&resident(2)), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, _) = app.send(Method::DELETE, &format!("/events/{}", id), Some(&admin()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(Method::GET, &format!("/events/{}/registrants", id), Some(&admin()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_registration_and_check_in_lifecycle() {
        let app = TestApp::new();
        let now = Utc::now();
        let a = resident(2);
        let b = resident(3);
        let c = resident(4);
        app.store.add_resident(Resident { id: 2, username: a.username.clone(), profile_id: Uuid::new_v4() });

        let body = json!({
            "title": "Vaccination Drive",
            "event_type": "vaccination",
            "date": now + Duration::hours(48),
            "registration_open": now + Duration::hours(24),
            "registration_close": now + Duration::hours(48),
            "capacity": 2,
        });
        let (status, event) = app.send(Method::POST, "/events", Some(&admin()), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = event["id"].as_i64().unwrap();
        let register_uri = format!("/events/{}/register", id);

        let (status, body) = app.send(Method::POST, &register_uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Registration not yet open.");

        let patch = json!({ "registration_open": now - Duration::minutes(1) });
        let (status, _) = app.send(Method::PUT, &format!("/events/{}", id), Some(&admin()), Some(patch)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, registration) = app.send(Method::POST, &register_uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, again) = app.send(Method::POST, &register_uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["registration"]["id"], registration["id"]);

        let (status, _) = app.send(Method::POST, &register_uri, Some(&b), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app.send(Method::POST, &register_uri, Some(&c), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let mark = json!({ "username": a.username, "event_id": id });
        let (status, attendance) = app.send(Method::POST, "/attendance", Some(&admin()), Some(mark.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(attendance["verified_by"], 1);
        let (status, body) = app.send(Method::POST, "/attendance", Some(&admin()), Some(mark)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Resident already checked in.");

        let (status, body) = app
            .send(Method::POST, &format!("/events/{}/unregister", id), Some(&a), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Already checked in; cannot unregister.");

        let (status, mine) = app.send(Method::GET, "/registrations/mine", Some(&a), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mine[0]["attendance_confirmed"], true);

        let (status, page) = app
            .send(Method::GET, &format!("/events/{}/attendance?page_size=5", id), Some(&admin()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["count"], 1);
        assert_eq!(page["page_size"], 5);
        assert_eq!(page["results"][0]["resident_username"], "resident2");

        let (status, all) = app.send(Method::GET, "/attendance", Some(&admin()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["count"], 1);
    }

    #[tokio::test]
    async fn test_check_in_without_selector() {
        let app = TestApp::new();
        let (status, body) = app
            .send(Method::POST, "/attendance", Some(&admin()), Some(json!({ "username": "nobody" })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");

        let (status, _) = app
            .send(Method::POST, "/attendance", Some(&admin()), Some(json!({ "registration_id": 77 })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unregister_when_not_registered() {
        let app = TestApp::new();
        let body = json!({
            "title": "Clean-up Drive",
            "event_type": "community",
            "date": Utc::now() + Duration::days(1),
        });
        let (_, event) = app.send(Method::POST, "/events", Some(&admin()), Some(body)).await;

        let (status, body) = app
            .send(Method::POST, &format!("/events/{}/unregister", event["id"]), Some(&resident(2)), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "You are not registered for this event.");
    }
}
