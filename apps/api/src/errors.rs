use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::application::envelope::Envelope;
use crate::application::messages;
use crate::application::store::StoreError;
use crate::application::validation::FieldError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(errors) => {
                tracing::debug!("Submission rejected: {self}");
                Envelope::invalid(errors)
            }
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                Envelope::failure(messages::SERVER_ERROR)
            }
            AppError::MethodNotAllowed => Envelope::failure(messages::METHOD_NOT_ALLOWED),
        };

        (status, Json(body)).into_response()
    }
}
