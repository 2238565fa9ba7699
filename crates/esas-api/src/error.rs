use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use esas_core::error::CoreError;
use esas_export::error::ExportError;
use esas_linker::LinkError;
use esas_recommendations::RecommendationError;
use esas_scoring::ValidationError;
use esas_storage::error::StorageError;
use serde::Serialize;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Client input was rejected. `field` names the offending input.
    BadRequest {
        message: String,
        field: Option<String>,
    },
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    /// A concurrent request changed the record; the caller may retry once.
    Conflict(String),
    RateLimited { retry_after: u64 },
    /// Storage failed or timed out. Detail is logged, never returned.
    Unavailable,
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            field: None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, message, field) = match self {
            ApiError::BadRequest { message, field } => (StatusCode::BAD_REQUEST, message, field),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::RateLimited { retry_after: secs } => {
                retry_after = Some(secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "too many requests".to_string(),
                    None,
                )
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service temporarily unavailable, please try again".to_string(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: message,
                field,
            }),
        )
            .into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            e if e.is_unavailable() => {
                tracing::warn!(error = %e, "storage unavailable");
                ApiError::Unavailable
            }
            StorageError::NotFound { key } => ApiError::NotFound(format!("not found: {key}")),
            StorageError::PreconditionFailed { key } => {
                ApiError::Conflict(format!("{key} was modified concurrently"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest {
            field: Some(e.field()),
            message: e.to_string(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match &e {
            CoreError::MissingField(field) | CoreError::InvalidField { field, .. } => {
                ApiError::BadRequest {
                    field: Some(field.clone()),
                    message: e.to_string(),
                }
            }
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<LinkError> for ApiError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::GuestIdentifierNotFound => {
                ApiError::NotFound("nothing to link".to_string())
            }
            LinkError::ConcurrentLinkConflict { .. } => ApiError::Conflict(e.to_string()),
            LinkError::InvalidAccount => ApiError::bad_request(e.to_string()),
            LinkError::StorageUnavailable(inner) => {
                tracing::warn!(error = %inner, "storage unavailable while linking");
                ApiError::Unavailable
            }
        }
    }
}

impl From<RecommendationError> for ApiError {
    fn from(e: RecommendationError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
