use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use super::models::*;
use super::server::AppState;
use crate::error::FlowboardError;
use crate::projects::ProjectStore;
use crate::tasks::TaskStore;

fn error_reply(err: &FlowboardError) -> Response {
    let status = match err {
        FlowboardError::TaskNotFound(_) | FlowboardError::ProjectNotFound(_) => {
            StatusCode::NOT_FOUND
        },
        FlowboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        FlowboardError::ReorderConflict { .. } => StatusCode::CONFLICT,
        FlowboardError::DatabaseError(_)
        | FlowboardError::IoError(_)
        | FlowboardError::JsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    }

    (
        status,
        Json(ApiError {
            code: err.to_error_code().to_string(),
            message: err.to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// List all projects
pub async fn list_projects(State(state): State<AppState>) -> Response {
    let store = ProjectStore::new(&state.pool);
    match store.list_projects().await {
        Ok(projects) => (StatusCode::OK, Json(ApiResponse { data: projects })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Create a new project
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Response {
    let store = ProjectStore::new(&state.pool);
    match store.create_project(&req.name, req.description.as_deref()).await {
        Ok(project) => (StatusCode::CREATED, Json(ApiResponse { data: project })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Get a single project by ID
pub async fn get_project(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let store = ProjectStore::new(&state.pool);
    match store.get_project(id).await {
        Ok(project) => (StatusCode::OK, Json(ApiResponse { data: project })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Create a new task. Assignees default to the server's current user.
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    let store = TaskStore::new(&state.pool);
    let assignees = req.assignees.unwrap_or_else(|| vec![state.current_user_id]);

    match store
        .create_task(
            req.project_id,
            &req.title,
            req.description.as_deref(),
            req.status,
            req.priority,
            req.due_date,
            &assignees,
        )
        .await
    {
        Ok(task) => (StatusCode::CREATED, Json(ApiResponse { data: task })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Get a single task by ID
pub async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let store = TaskStore::new(&state.pool);
    match store.get_task(id).await {
        Ok(task) => (StatusCode::OK, Json(ApiResponse { data: task })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Update task fields
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Response {
    let store = TaskStore::new(&state.pool);
    match store
        .update_task(
            id,
            req.title.as_deref(),
            req.description.as_deref(),
            req.status,
            req.priority,
            req.due_date,
            req.assignees.as_deref(),
        )
        .await
    {
        Ok(task) => (StatusCode::OK, Json(ApiResponse { data: task })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Status-only transition (the Start/Complete buttons): one record, one
/// field, no renumbering.
pub async fn set_task_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> Response {
    let store = TaskStore::new(&state.pool);
    match store
        .update_task(id, None, None, Some(req.status), None, None, None)
        .await
    {
        Ok(task) => (StatusCode::OK, Json(ApiResponse { data: task })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Delete a task
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let store = TaskStore::new(&state.pool);
    match store.delete_task(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: serde_json::json!({ "deleted": id }),
            }),
        )
            .into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Fetch a project's board: all its tasks plus the current board version
pub async fn get_board(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Response {
    let store = TaskStore::new(&state.pool);
    match store.fetch_board(project_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(ApiResponse { data: snapshot })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Tasks assigned to a user across projects, soonest due first
pub async fn assigned_tasks(
    State(state): State<AppState>,
    Query(query): Query<AssignedQuery>,
) -> Response {
    let store = TaskStore::new(&state.pool);
    let user_id = query.user.unwrap_or(state.current_user_id);
    match store.list_assigned_tasks(user_id).await {
        Ok(tasks) => (StatusCode::OK, Json(ApiResponse { data: tasks })).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Apply a Reorder Batch. A payload that doesn't match the expected shape
/// is rejected wholesale by extraction before this handler runs; entries
/// with a negative order are rejected here, and a stale version yields 409.
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Response {
    if req.tasks.iter().any(|e| e.position < 0) {
        return error_reply(&FlowboardError::InvalidInput(
            "order values must be non-negative".to_string(),
        ));
    }

    let store = TaskStore::new(&state.pool);
    match store
        .reorder_tasks(req.project_id, req.version, &req.tasks)
        .await
    {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: ReorderResult {
                    updated,
                    version: req.version + 1,
                },
            }),
        )
            .into_response(),
        Err(e) => error_reply(&e),
    }
}
