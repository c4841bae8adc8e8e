use aq_db::validation::FieldError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors a handler may answer with. Core and provider errors never reach
/// this type; only authentication, validation and profile storage do.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No token, authorization denied")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(&'static str),
    /// Profile store failure. `message` is shown to the client, `detail` is only logged.
    #[error("{message}: {detail}")]
    Store { message: &'static str, detail: String },
}

impl ApiError {
    pub fn store(message: &'static str, error: anyhow::Error) -> Self {
        ApiError::Store {
            message,
            detail: format!("{:#}", error),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => {
                json!({ "message": self.to_string(), "errors": errors })
            }
            ApiError::Store { message, .. } => {
                log::error!("{}", self);
                json!({ "message": message })
            }
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
