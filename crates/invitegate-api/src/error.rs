//! Maps domain `AppError` to HTTP responses in the uniform envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use invitegate_core::error::{AppError, ErrorKind};

use crate::dto::response::ApiEnvelope;

/// Wrapper that carries an [`AppError`] across the handler boundary.
///
/// Handlers return `Result<_, ApiError>` so `?` on any `AppResult`
/// converts automatically.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error kind.
///
/// Business-rule rejections and infrastructure faults never share a
/// status class: a client seeing 4xx/409/410/423 can fix or retry its
/// request, while 5xx means the service itself is degraded.
fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidFormat | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Expired => StatusCode::GONE,
        ErrorKind::MaxUsesReached | ErrorKind::IdentityAlreadyRedeemed | ErrorKind::Conflict => {
            StatusCode::CONFLICT
        }
        ErrorKind::Contended => StatusCode::LOCKED,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Database | ErrorKind::Cache | ErrorKind::ServiceUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::CodeSpaceExhausted
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind);

        if status.is_server_error() {
            tracing::error!(kind = %self.0.kind, error = %self.0.message, "request failed");
        }

        let body = ApiEnvelope::<()>::error(status.as_u16(), self.0.message);
        (status, Json(body)).into_response()
    }
}
