use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::preview::PreviewError;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    Config(#[from] serde_json::Error),

    #[error("{0}")]
    MiniJinja(#[from] minijinja::Error),

    #[error("{0}")]
    Preview(#[from] PreviewError),

    #[error("{0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for HubError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HubError::InvalidInput(e) => (StatusCode::UNPROCESSABLE_ENTITY, e).into_response(),
            HubError::NotFound(e) => (StatusCode::NOT_FOUND, e).into_response(),
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}
