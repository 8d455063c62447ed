use crate::db::models::{ReorderEntry, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// API error response
#[derive(Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Create project request
#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Create task request. Omitted status/priority fall back to the store
/// defaults (`todo`, `medium`); omitted assignees default to the current
/// user.
#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignees: Option<Vec<i64>>,
}

/// Update task request; every field optional, omitted fields unchanged.
#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignees: Option<Vec<i64>>,
}

/// Status-only transition request
#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: TaskStatus,
}

/// Bulk reorder request: the whole board's arrangement plus the version it
/// was fetched at.
#[derive(Deserialize, Serialize)]
pub struct ReorderRequest {
    pub project_id: i64,
    pub version: i64,
    pub tasks: Vec<ReorderEntry>,
}

/// Reorder response body
#[derive(Serialize)]
pub struct ReorderResult {
    pub updated: u64,
    pub version: i64,
}

/// Query parameters for the assigned-tasks listing
#[derive(Deserialize)]
pub struct AssignedQuery {
    /// Defaults to the server's current user when omitted
    pub user: Option<i64>,
}
