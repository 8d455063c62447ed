use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::{create_pool, run_migrations};
use crate::projects::ProjectStore;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// Stable current-user id, used for default task assignment. This is
    /// the whole authentication surface of the service.
    pub current_user_id: i64,
    pub db_path: PathBuf,
    pub port: u16,
}

/// API server instance
pub struct BoardServer {
    port: u16,
    db_path: PathBuf,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Service info response
#[derive(Serialize)]
struct ServiceInfo {
    database: String,
    current_user_id: i64,
    port: u16,
}

impl BoardServer {
    pub fn new(port: u16, db_path: PathBuf) -> Self {
        Self { port, db_path }
    }

    /// Run the API server: open the database, migrate, resolve the current
    /// user, and serve until shutdown.
    pub async fn run(self) -> Result<()> {
        let pool = create_pool(&self.db_path)
            .await
            .context("Failed to open database")?;
        run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;

        let current_user = ProjectStore::new(&pool)
            .ensure_default_user()
            .await
            .context("Failed to resolve current user")?;

        let state = AppState {
            pool,
            current_user_id: current_user.id,
            db_path: self.db_path.clone(),
            port: self.port,
        };

        let app = create_router(state);

        let addr = format!("127.0.0.1:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Flowboard server listening on {}", addr);
        tracing::info!("Database: {}", self.db_path.display());
        tracing::info!("Current user: {} ({})", current_user.name, current_user.id);

        axum::serve(listener, app).await.context("Server error")?;

        Ok(())
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    use super::routes;

    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .merge(routes::api_routes());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            service: "flowboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

async fn info_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ServiceInfo {
            database: state.db_path.display().to_string(),
            current_user_id: state.current_user_id,
            port: state.port,
        }),
    )
}
