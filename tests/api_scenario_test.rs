//! End-to-end scenario over HTTP
//!
//! Drives the router through the full event lifecycle: window gating,
//! capacity, check-in and the unregistration lock. Runs against the
//! in-memory store and, when reachable, Postgres.

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use serial_test::serial;
use tower::util::ServiceExt;

use egate::config::Settings;
use egate::database::{EventStore, MemoryStore, ResidentDirectory};
use egate::models::User;
use egate::services::JwtIdentityProvider;
use egate::{create_router, AppState, ServiceFactory};
use helpers::*;

struct Client {
    router: Router,
    tokens: JwtIdentityProvider,
}

impl Client {
    fn new<S>(store: Arc<S>) -> Self
    where
        S: EventStore + ResidentDirectory + 'static,
    {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "scenario-test-secret-with-enough-length".to_string();
        settings.auth.issuer = Some("egate-tests".to_string());

        let services = ServiceFactory::new(store, &settings);
        Self {
            router: create_router(AppState::new(services, settings.pagination.clone())),
            tokens: JwtIdentityProvider::new(&settings.auth),
        }
    }

    async fn call(&self, method: Method, uri: &str, user: &User, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.tokens.issue_token(user).expect("Failed to issue token");
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json");
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("Failed to build request"))
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

async fn run_scenario(client: Client) {
    let now = Utc::now();
    let admin = admin();
    let a = resident(2);
    let b = resident(3);

    let (status, event) = client
        .call(
            Method::POST,
            "/events",
            &admin,
            Some(json!({
                "title": "Barangay Assembly",
                "event_type": "assembly",
                "date": now + Duration::hours(48),
                "venue": "Barangay Hall",
                "registration_open": now + Duration::hours(24),
                "registration_close": now + Duration::hours(48),
                "capacity": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = event["id"].as_i64().expect("event id");

    let register = format!("/events/{}/register", id);
    let (status, _) = client.call(Method::POST, &register, &a, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "registration is not open yet");

    let (status, _) = client
        .call(
            Method::PUT,
            &format!("/events/{}", id),
            &admin,
            Some(json!({ "registration_open": now - Duration::minutes(1) })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, registration) = client.call(Method::POST, &register, &a, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = client.call(Method::POST, &register, &b, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "capacity is one");
    assert_eq!(body["kind"], "forbidden");

    let (status, _) = client
        .call(
            Method::POST,
            "/attendance",
            &admin,
            Some(json!({ "registration_id": registration["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = client
        .call(Method::POST, &format!("/events/{}/unregister", id), &a, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Already checked in; cannot unregister.");

    let (status, registrants) = client
        .call(Method::GET, &format!("/events/{}/registrants", id), &admin, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registrants.as_array().map(Vec::len), Some(1));
    assert_eq!(registrants[0]["attendance_confirmed"], true);
}

#[tokio::test]
async fn test_scenario_in_memory() {
    run_scenario(Client::new(Arc::new(MemoryStore::new()))).await;
}

#[tokio::test]
#[serial]
async fn test_scenario_on_postgres() {
    let Some(db) = TestDatabase::try_new().await else {
        return;
    };
    run_scenario(Client::new(db.store.clone())).await;
}
