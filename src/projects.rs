use crate::db::models::{Project, User};
use crate::error::{FlowboardError, Result};
use sqlx::SqlitePool;

/// Minimal project/user substrate. Projects exist so tasks have an owner
/// partition and a board version; users exist so the board has a stable
/// "current user" id for default assignment. Full account management lives
/// outside this service.
pub struct ProjectStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProjectStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(FlowboardError::InvalidInput(
                "project name must not be empty".to_string(),
            ));
        }

        let result = sqlx::query("INSERT INTO projects (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        tracing::info!(project_id = id, name, "Project created");
        self.get_project(id).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, description, board_version, created_at FROM projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(FlowboardError::ProjectNotFound(id))
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, board_version, created_at FROM projects ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(projects)
    }

    /// Resolve the current user, creating it on first use. The name comes
    /// from `FLOWBOARD_USER` when set; the id stays stable afterwards.
    pub async fn ensure_default_user(&self) -> Result<User> {
        let name = std::env::var("FLOWBOARD_USER").unwrap_or_else(|_| "local".to_string());
        let email = format!("{}@flowboard.local", name);

        if let Some(user) = sqlx::query_as::<_, User>(
            "SELECT id, name, email FROM users WHERE email = ?",
        )
        .bind(&email)
        .fetch_optional(self.pool)
        .await?
        {
            return Ok(user);
        }

        let result = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(&name)
            .bind(&email)
            .execute(self.pool)
            .await?;

        tracing::info!(user_id = result.last_insert_rowid(), name, "Default user created");
        Ok(User {
            id: result.last_insert_rowid(),
            name,
            email,
        })
    }
}
