use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Submission task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Template(_) | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            Json(serde_json::json!({
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}
