use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::engine::EngineError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Engine(err) => match err {
                EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                EngineError::Conflict { .. }
                | EngineError::Capacity { .. }
                | EngineError::InsufficientInventory { .. }
                | EngineError::DuplicateRegistration
                | EngineError::AlreadySubmitted
                | EngineError::Integrity(_) => StatusCode::CONFLICT,
                EngineError::NotEligible => StatusCode::FORBIDDEN,
                EngineError::NotRegistered | EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Engine(err) => match err {
                EngineError::Validation(_) => "VALIDATION_ERROR",
                EngineError::Conflict { .. } => "CONFLICT",
                EngineError::Capacity { .. } => "CAPACITY_EXCEEDED",
                EngineError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
                EngineError::DuplicateRegistration => "DUPLICATE_REGISTRATION",
                EngineError::AlreadySubmitted => "ALREADY_SUBMITTED",
                EngineError::NotEligible => "NOT_ELIGIBLE",
                EngineError::NotRegistered => "NOT_REGISTERED",
                EngineError::NotFound(_) => "NOT_FOUND",
                EngineError::Integrity(_) => "INTEGRITY_ERROR",
                EngineError::Database(_) => "DATABASE_ERROR",
            },
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::Engine(EngineError::Database(err)) | AppError::Database(err) => {
                error!(error = ?err, "Database error");
            }
            AppError::Engine(err) => {
                warn!(error = %err, code = self.code(), "Operation rejected");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Internal database details stay out of the API response.
        let public_message = match &self {
            AppError::Engine(EngineError::Database(_)) | AppError::Database(_) => {
                "A database error occurred".to_string()
            }
            AppError::Engine(err) => err.to_string(),
        };

        error_response(code, public_message, status)
    }
}
