use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum AppError {
    /// The request never produced a response (connection refused, DNS, broken body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The marketplace API answered but rejected the request.
    #[error("API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
        errors: Vec<String>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build an API rejection from the pieces of a response envelope.
    pub fn api(status: Option<u16>, message: Option<String>, errors: Option<Vec<String>>) -> Self {
        AppError::Api {
            status,
            message: message.unwrap_or_default(),
            errors: errors.unwrap_or_default(),
        }
    }

    /// Text shown to the admin for this error.
    ///
    /// For API rejections the envelope `message` wins, then the first field
    /// error, then a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api {
                message, errors, ..
            } => {
                if !message.trim().is_empty() {
                    message.clone()
                } else if let Some(first) = errors.first() {
                    first.clone()
                } else {
                    GENERIC_ERROR_MESSAGE.to_string()
                }
            }
            AppError::Transport(msg)
            | AppError::Unauthorized(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Transport(_) | AppError::Api { .. } => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, errors) = match self {
            AppError::Transport(ref msg) => {
                tracing::error!("Transport error: {}", msg);
                (msg.clone(), None)
            }
            AppError::Api {
                status: upstream,
                ref message,
                ref errors,
            } => {
                tracing::warn!("Upstream rejected request ({:?}): {}", upstream, message);
                (
                    self.user_message(),
                    Some(errors.clone()).filter(|e| !e.is_empty()),
                )
            }
            AppError::Validation(ref msg) => (msg.clone(), Some(vec![msg.clone()])),
            AppError::Unauthorized(ref msg)
            | AppError::BadRequest(ref msg)
            | AppError::Conflict(ref msg) => (msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
