use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowboardError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Project not found: {0}")]
    ProjectNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Board version conflict: batch built against version {submitted}, storage is at {current}")]
    ReorderConflict { submitted: i64, current: i64 },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl FlowboardError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            FlowboardError::TaskNotFound(_) => "TASK_NOT_FOUND",
            FlowboardError::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            FlowboardError::DatabaseError(_) => "DATABASE_ERROR",
            FlowboardError::InvalidInput(_) => "INVALID_INPUT",
            FlowboardError::ReorderConflict { .. } => "REORDER_CONFLICT",
            FlowboardError::IoError(_) | FlowboardError::JsonError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowboardError>;
