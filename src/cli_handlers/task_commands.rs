use crate::board::{BoardState, DropTarget};
use crate::cli::TaskCommands;
use crate::db::models::{Task, TaskStatus};
use crate::error::{FlowboardError, Result};
use crate::projects::ProjectStore;
use crate::tasks::TaskStore;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn handle_task_command(pool: &SqlitePool, cmd: TaskCommands) -> Result<()> {
    let store = TaskStore::new(pool);

    match cmd {
        TaskCommands::Add {
            project,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let due_date = due.map(|s| parse_due_date(&s)).transpose()?;
            let current_user = ProjectStore::new(pool).ensure_default_user().await?;

            let task = store
                .create_task(
                    project,
                    &title,
                    description.as_deref(),
                    status,
                    priority,
                    due_date,
                    &[current_user.id],
                )
                .await?;

            println!(
                "Created task [{}] {} ({}, {} #{})",
                task.id, task.title, task.priority, task.status, task.position
            );
        },

        TaskCommands::List { project } => {
            let snapshot = store.fetch_board(project).await?;
            let board = BoardState::from_snapshot(&snapshot);
            print_board(&board);
        },

        TaskCommands::Show { id } => {
            let task = store.get_task(id).await?;
            print_task(&task);
        },

        TaskCommands::Start { id } => {
            // Degenerate protocol: one record, status only, no renumbering
            let task = store
                .update_task(id, None, None, Some(TaskStatus::InProgress), None, None, None)
                .await?;
            println!("Started [{}] {}", task.id, task.title);
        },

        TaskCommands::Complete { id } => {
            let task = store
                .update_task(id, None, None, Some(TaskStatus::Done), None, None, None)
                .await?;
            println!("Completed [{}] {}", task.id, task.title);
        },

        TaskCommands::Move { id, before, lane } => {
            let target = match (before, lane) {
                (Some(task_id), None) => DropTarget::Task(task_id),
                (None, Some(status)) => DropTarget::Lane(status),
                _ => {
                    return Err(FlowboardError::InvalidInput(
                        "specify exactly one of --before or --lane".to_string(),
                    ))
                },
            };
            handle_move(&store, id, target).await?;
        },

        TaskCommands::Delete { id } => {
            store.delete_task(id).await?;
            println!("Deleted task {}", id);
        },
    }

    Ok(())
}

/// Full board cycle for one gesture: bootstrap the board from the store,
/// run the gesture, apply the arrangement locally, submit the batch.
///
/// On a rejected or failed submission the local arrangement is discarded
/// and the board re-fetched, so what gets shown never silently diverges
/// from storage.
async fn handle_move(store: &TaskStore<'_>, id: i64, target: DropTarget) -> Result<()> {
    let task = store.get_task(id).await?;
    let snapshot = store.fetch_board(task.project_id).await?;
    let board = BoardState::from_snapshot(&snapshot);

    let session = board
        .begin_gesture(id)
        .ok_or(FlowboardError::TaskNotFound(id))?;

    let Some((mut next, batch)) = session.finish(&board, Some(target)) else {
        // Target vanished between fetch and drop; nothing to do
        println!("Move target no longer exists; board unchanged");
        return Ok(());
    };

    match store
        .reorder_tasks(batch.project_id, batch.version, &batch.entries)
        .await
    {
        Ok(_) => {
            next.confirm_commit();
            print_board(&next);
            Ok(())
        },
        Err(e) => {
            tracing::error!(error = %e, project_id = batch.project_id, "Failed to persist reorder");
            let fresh = store.fetch_board(task.project_id).await?;
            print_board(&BoardState::from_snapshot(&fresh));
            Err(e)
        },
    }
}

fn parse_due_date(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FlowboardError::InvalidInput(format!("invalid due date '{}': {}", s, e)))
}

fn print_board(board: &BoardState) {
    for status in TaskStatus::ALL {
        let lane = board.lane(status);
        println!("{} ({})", status, lane.len());
        for task in lane {
            println!("  {:>2}. [{}] {}", task.position, task.id, task.title);
        }
    }
}

fn print_task(task: &Task) {
    println!("[{}] {}", task.id, task.title);
    println!("  project:  {}", task.project_id);
    println!("  status:   {}", task.status);
    println!("  priority: {}", task.priority);
    println!("  order:    {}", task.position);
    if let Some(desc) = &task.description {
        println!("  notes:    {}", desc);
    }
    if let Some(due) = task.due_date {
        println!("  due:      {}", due.to_rfc3339());
    }
    if !task.assignees.is_empty() {
        let ids: Vec<String> = task.assignees.iter().map(|id| id.to_string()).collect();
        println!("  assignees: {}", ids.join(", "));
    }
}
