//! Application error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::todos::queries::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("anti-forgery validation failed: {0}")]
    Forgery(&'static str),

    #[error("todo {0} was modified by another request")]
    Conflict(i32),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Marks a response whose body should be replaced by the error page.
#[derive(Debug, Clone, Copy)]
pub struct Fatal;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => {
                return (StatusCode::NOT_FOUND, "Not Found").into_response();
            }
            AppError::Forgery(reason) => {
                tracing::warn!(reason, "rejected form submission");
                return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Render(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        tracing::error!(error = %self, "request failed");

        let mut response = (status, "An error occurred while processing your request.").into_response();
        response.extensions_mut().insert(Fatal);
        response
    }
}
