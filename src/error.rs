use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::common::ErrorResponse;
use crate::models::lifecycle::TransitionError;
use crate::services::fee_calculator::FeeError;

const INTERNAL_ERROR: &str = "Internal server error";

/// Handler error, rendered as `{ "error": "..." }` with a matching status
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FeeError> for ApiError {
    fn from(e: FeeError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::UnknownStatus { .. } => ApiError::Validation(e.to_string()),
            TransitionError::IllegalTransition { .. } => ApiError::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs
        let message = match &self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                INTERNAL_ERROR.to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                INTERNAL_ERROR.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_errors_are_bad_requests() {
        let err: ApiError = FeeError::InvalidTier.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid consolidation type");
    }

    #[test]
    fn test_transition_errors_map_by_kind() {
        let unknown: ApiError = TransitionError::UnknownStatus {
            entity: "order",
            value: "lost".to_string(),
        }
        .into();
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);

        let illegal: ApiError = TransitionError::IllegalTransition {
            entity: "order",
            from: "delivered".to_string(),
            to: "pending".to_string(),
        }
        .into();
        assert_eq!(illegal.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_database_error_is_generic() {
        let err = ApiError::Database(DbErr::Custom("connection refused".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
