use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dashboard_app::{ApiError, AppError, SyncError};
use serde::Serialize;

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ApiError,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>, code: Option<String>) -> Self {
        let body = ApiError {
            status: status.as_u16(),
            message: message.into(),
            code,
        };
        Self { status, body }
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not found",
            Some("not_found".to_string()),
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            Some("unauthorized".to_string()),
        )
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let api_error = ApiError::from(err);
        let status =
            StatusCode::from_u16(api_error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: api_error,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `{"error": ...}` body used by the sync and session endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "statusText", skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug)]
pub struct PlainError {
    status: StatusCode,
    body: ErrorBody,
}

impl PlainError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                status_text: None,
                detail: None,
            },
        }
    }
}

impl From<SyncError> for PlainError {
    fn from(err: SyncError) -> Self {
        // Upstream statuses outside the valid range fall back to a gateway error.
        let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_GATEWAY);
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                status_text: err.status_text().map(str::to_string),
                detail: err.detail().map(str::to_string),
            },
        }
    }
}

impl From<AppError> for PlainError {
    fn from(err: AppError) -> Self {
        let api_error = ApiError::from(err);
        let status =
            StatusCode::from_u16(api_error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, api_error.message)
    }
}

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
