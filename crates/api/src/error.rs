use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use hubs_domain::ports::cms::CmsError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("upstream service unavailable")]
    Upstream,
    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound => "not_found",
            ApiError::Upstream => "upstream_unavailable",
            ApiError::Internal => "internal_error",
        }
    }
}

impl From<CmsError> for ApiError {
    fn from(err: CmsError) -> Self {
        match err {
            CmsError::BadRequest(message) => ApiError::Validation(message),
            CmsError::NotFound(_) => ApiError::NotFound,
            CmsError::Forbidden(_) => ApiError::Forbidden,
            // Admin credential failures must not surface as a caller 401.
            CmsError::Unauthorized(message) | CmsError::Configuration(message) => {
                tracing::error!(error = %message, "cms admin access failed");
                ApiError::Internal
            }
            CmsError::Upstream(message)
            | CmsError::Transport(message)
            | CmsError::InvalidResponse(message) => {
                tracing::warn!(error = %message, "cms request failed");
                ApiError::Upstream
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = self.to_string();
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.error_code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cms_not_found_maps_to_404() {
        let err: ApiError = CmsError::NotFound("no such event".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn cms_admin_rejection_maps_to_internal() {
        let err: ApiError = CmsError::Unauthorized("bad credentials".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "internal_error");
    }

    #[test]
    fn cms_transport_failure_maps_to_bad_gateway() {
        let err: ApiError = CmsError::Transport("connection refused".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
