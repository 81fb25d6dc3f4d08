//! Error responses
//!
//! Every failure is rendered as `{kind, error, details?}` with the status
//! matching its kind.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::utils::errors::{EgateError, ErrorKind, FieldError};
use crate::utils::logging::log_request_error;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EgateError {
    fn into_response(self) -> Response {
        log_request_error(&self);

        let kind = self.kind();
        let error = match (&self, kind) {
            (_, ErrorKind::Internal) => "Internal server error.".to_string(),
            (EgateError::Validation(_), _) => "Validation failed.".to_string(),
            (EgateError::EventNotFound { .. }, _) => "Event not found.".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            kind,
            error,
            details: self.details(),
        };
        (kind.status(), Json(body)).into_response()
    }
}

/// Unwrap a JSON body, reporting malformed payloads as bad requests
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, EgateError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| EgateError::BadRequest(rejection.body_text()))
}

/// Unwrap path parameters; an unparsable id is a bad request, not a plain-text 400
pub fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, EgateError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| EgateError::BadRequest(rejection.body_text()))
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, EgateError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| EgateError::BadRequest(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::ValidationErrors;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("capacity", "Capacity must be >= 0.");
        let response = EgateError::from(errors).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["details"][0]["field"], "capacity");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        assert_eq!(EgateError::CapacityExceeded { capacity: 1 }.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(EgateError::EventNotFound { event_id: 1 }.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(EgateError::Authentication("x".into()).into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(EgateError::BadRequest("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let response = EgateError::Config("secret path /etc/egate".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["kind"], "internal");
        assert_eq!(body["error"], "Internal server error.");
        assert!(body.get("details").is_none());
    }
}
