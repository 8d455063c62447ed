use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;
use super::server::AppState;

/// Create API router with all endpoints
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Project routes
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route("/projects/:id", get(handlers::get_project))
        // Task routes; statics registered alongside the :id capture
        .route("/tasks", post(handlers::create_task))
        .route("/tasks/reorder", put(handlers::reorder_tasks))
        .route("/tasks/assigned", get(handlers::assigned_tasks))
        .route("/tasks/project/:project_id", get(handlers::get_board))
        .route(
            "/tasks/:id",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/:id/status", post(handlers::set_task_status))
}
