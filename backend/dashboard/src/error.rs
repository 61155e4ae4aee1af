use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use records::error::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Unknown query: {0}")]
    UnknownQuery(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::PageNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UnknownQuery { .. } => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}
