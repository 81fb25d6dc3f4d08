//! Event endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::error::{json_body, path_param, query_params};
use super::AppState;
use crate::middleware::CurrentUser;
use crate::models::{
    AttendanceView, CreateEventRequest, Event, EventQuery, Page, PageParams, RegistrationOutcome, RegistrationView,
    UnregisterOutcome, UpdateEventRequest,
};
use crate::utils::errors::Result;

/// `GET /events` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct EventListParams {
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub ordering: Option<String>,
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: std::result::Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>)> {
    let request = json_body(payload)?;
    let event = state.services.lifecycle.create_event(&user, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    params: std::result::Result<Query<EventListParams>, QueryRejection>,
) -> Result<Json<Vec<Event>>> {
    let params = query_params(params)?;
    let query = EventQuery::new(params.q.as_deref(), params.ordering.as_deref());
    let events = state.services.lifecycle.list_events(&query).await?;
    Ok(Json(events))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Event>> {
    let id = path_param(id)?;
    Ok(Json(state.services.lifecycle.get_event(id).await?))
}

/// PUT /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<Event>> {
    let id = path_param(id)?;
    let patch = json_body(payload)?;
    let event = state.services.lifecycle.update_event(&user, id, patch).await?;
    Ok(Json(event))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>> {
    let id = path_param(id)?;
    state.services.lifecycle.delete_event(&user, id).await?;
    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

/// POST /events/:id/register
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let id = path_param(id)?;
    let response = match state.services.lifecycle.register(&user, id).await? {
        RegistrationOutcome::Created(registration) => {
            (StatusCode::CREATED, Json(registration)).into_response()
        }
        RegistrationOutcome::AlreadyRegistered(registration) => (
            StatusCode::OK,
            Json(json!({
                "message": "You are already registered for this event.",
                "registration": registration,
            })),
        )
            .into_response(),
    };
    Ok(response)
}

/// POST /events/:id/unregister
pub async fn unregister(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>> {
    let id = path_param(id)?;
    let message = match state.services.lifecycle.unregister(&user, id).await? {
        UnregisterOutcome::Removed => "Unregistered from event.",
        UnregisterOutcome::NotRegistered => "You are not registered for this event.",
    };
    Ok(Json(json!({ "message": message })))
}

/// GET /events/:id/registrants
pub async fn registrants(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<RegistrationView>>> {
    let id = path_param(id)?;
    Ok(Json(state.services.lifecycle.registrants(&user, id).await?))
}

/// GET /events/:id/attendance
pub async fn event_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: std::result::Result<Path<i64>, PathRejection>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<AttendanceView>>> {
    let id = path_param(id)?;
    let params = query_params(params)?;
    let page = state.page_request(params);
    let attendance = state
        .services
        .lifecycle
        .event_attendance(&user, id, page)
        .await?;
    Ok(Json(attendance))
}
