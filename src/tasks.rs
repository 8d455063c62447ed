use crate::db::models::{
    BoardSnapshot, ReorderEntry, Task, TaskPriority, TaskStatus,
};
use crate::error::{FlowboardError, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const TASK_COLUMNS: &str =
    "id, project_id, title, description, status, priority, position, due_date, created_at";

/// Store for task records: single-record CRUD, board fetches, and the
/// transactional bulk reorder.
pub struct TaskStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a task. It always starts inside a project and a known lane
    /// (`todo` unless specified), at the end of that lane.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_task(
        &self,
        project_id: i64,
        title: &str,
        description: Option<&str>,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
        due_date: Option<DateTime<Utc>>,
        assignees: &[i64],
    ) -> Result<Task> {
        if title.trim().is_empty() {
            return Err(FlowboardError::InvalidInput(
                "task title must not be empty".to_string(),
            ));
        }
        self.check_project_exists(project_id).await?;

        let status = status.unwrap_or(TaskStatus::Todo);
        let priority = priority.unwrap_or(TaskPriority::Medium);
        let now = Utc::now();

        // New tasks land at the end of their destination lane.
        let lane_len: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ? AND status = ?",
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (project_id, title, description, status, priority, position, due_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(lane_len)
        .bind(due_date)
        .bind(now)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.set_assignees(id, assignees).await?;

        tracing::info!(task_id = id, project_id, status = %status, "Task created");
        self.get_task(id).await
    }

    /// Get a task by ID, assignees included.
    pub async fn get_task(&self, id: i64) -> Result<Task> {
        let mut task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(FlowboardError::TaskNotFound(id))?;

        task.assignees = self.get_assignees(id).await?;
        Ok(task)
    }

    /// Fetch everything a client needs to build a Board State: the
    /// project's tasks (deterministically ordered, ascending position with
    /// creation order breaking ties) and its current board version.
    pub async fn fetch_board(&self, project_id: i64) -> Result<BoardSnapshot> {
        let version = self.board_version(project_id).await?;

        let mut tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY position ASC, id ASC"
        ))
        .bind(project_id)
        .fetch_all(self.pool)
        .await?;

        for task in &mut tasks {
            task.assignees = self.get_assignees(task.id).await?;
        }

        Ok(BoardSnapshot {
            project_id,
            version,
            tasks,
        })
    }

    /// Tasks assigned to a user across all projects, soonest due first.
    pub async fn list_assigned_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        let mut tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE id IN (SELECT task_id FROM task_assignees WHERE user_id = ?)
            ORDER BY due_date ASC NULLS LAST, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        for task in &mut tasks {
            task.assignees = self.get_assignees(task.id).await?;
        }

        Ok(tasks)
    }

    /// Partial field update. Omitted fields keep their stored value; the
    /// task's position is never touched here, so a status-only transition
    /// (the Start/Complete buttons) changes exactly one row and leaves every
    /// other task's status and order alone.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_task(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
        due_date: Option<DateTime<Utc>>,
        assignees: Option<&[i64]>,
    ) -> Result<Task> {
        let current = self.get_task(id).await?;

        if let Some(t) = title {
            if t.trim().is_empty() {
                return Err(FlowboardError::InvalidInput(
                    "task title must not be empty".to_string(),
                ));
            }
        }

        sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, status = ?, priority = ?, due_date = ?
            WHERE id = ?
            "#,
        )
        .bind(title.unwrap_or(&current.title))
        .bind(description.or(current.description.as_deref()))
        .bind(status.unwrap_or(current.status))
        .bind(priority.unwrap_or(current.priority))
        .bind(due_date.or(current.due_date))
        .bind(id)
        .execute(self.pool)
        .await?;

        if let Some(assignees) = assignees {
            self.set_assignees(id, assignees).await?;
        }

        if let Some(status) = status {
            if status != current.status {
                tracing::info!(task_id = id, from = %current.status, to = %status, "Task status changed");
            }
        }

        self.get_task(id).await
    }

    /// Hard delete, irreversible. Assignee rows go with it.
    pub async fn delete_task(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FlowboardError::TaskNotFound(id));
        }

        tracing::info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Apply a Reorder Batch: every `(id, status, order)` triple lands in
    /// one transaction, or none of them do.
    ///
    /// The batch must carry the board version it was built against; a stale
    /// version means another session reordered in between, and the whole
    /// batch is rejected with a conflict instead of silently overwriting.
    /// Entries naming ids that no longer exist are skipped, and entries
    /// that change nothing are harmless no-ops. Returns the number of rows
    /// written.
    pub async fn reorder_tasks(
        &self,
        project_id: i64,
        submitted_version: i64,
        entries: &[ReorderEntry],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let current: i64 = sqlx::query_scalar("SELECT board_version FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(FlowboardError::ProjectNotFound(project_id))?;

        if current != submitted_version {
            return Err(FlowboardError::ReorderConflict {
                submitted: submitted_version,
                current,
            });
        }

        let mut updated = 0u64;
        for entry in entries {
            let result = sqlx::query(
                "UPDATE tasks SET status = ?, position = ? WHERE id = ? AND project_id = ?",
            )
            .bind(entry.status)
            .bind(entry.position)
            .bind(entry.id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
            // Vanished ids fall through here with zero rows; the rest of
            // the batch still applies.
            updated += result.rows_affected();
        }

        sqlx::query("UPDATE projects SET board_version = board_version + 1 WHERE id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            project_id,
            entries = entries.len(),
            updated,
            version = submitted_version + 1,
            "Board reordered"
        );
        Ok(updated)
    }

    async fn check_project_exists(&self, project_id: i64) -> Result<()> {
        self.board_version(project_id).await.map(|_| ())
    }

    async fn board_version(&self, project_id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT board_version FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(FlowboardError::ProjectNotFound(project_id))
    }

    async fn get_assignees(&self, task_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT user_id FROM task_assignees WHERE task_id = ? ORDER BY user_id")
                .bind(task_id)
                .fetch_all(self.pool)
                .await?;
        Ok(ids)
    }

    async fn set_assignees(&self, task_id: i64, assignees: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM task_assignees WHERE task_id = ?")
            .bind(task_id)
            .execute(self.pool)
            .await?;

        for user_id in assignees {
            sqlx::query("INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?, ?)")
                .bind(task_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;
        }

        Ok(())
    }
}
