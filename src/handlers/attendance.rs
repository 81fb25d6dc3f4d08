//! Attendance endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::error::{json_body, query_params};
use super::AppState;
use crate::middleware::CurrentUser;
use crate::models::{AttendanceView, CheckInOutcome, MarkAttendanceRequest, Page, PageParams};
use crate::utils::errors::Result;

/// POST /attendance
pub async fn mark_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: std::result::Result<Json<MarkAttendanceRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;

    let response = match state.services.lifecycle.mark_attendance(&user, &request).await? {
        CheckInOutcome::CheckedIn(attendance) => {
            (StatusCode::CREATED, Json(attendance)).into_response()
        }
        CheckInOutcome::AlreadyCheckedIn(attendance) => (
            StatusCode::OK,
            Json(json!({
                "message": "Resident already checked in.",
                "attendance": attendance,
            })),
        )
            .into_response(),
    };
    Ok(response)
}

/// GET /attendance
pub async fn all_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<AttendanceView>>> {
    let params = query_params(params)?;
    let page = state.page_request(params);
    Ok(Json(state.services.lifecycle.all_attendance(&user, page).await?))
}
