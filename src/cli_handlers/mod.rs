pub mod task_commands;

pub use task_commands::handle_task_command;

use crate::cli::ProjectCommands;
use crate::db::{create_pool, run_migrations};
use crate::error::Result;
use crate::projects::ProjectStore;
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Resolve the database path: `--db` flag, then `FLOWBOARD_DB`, then
/// `./flowboard.db`.
pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("FLOWBOARD_DB").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("flowboard.db"))
}

/// Resolve the server port: `--port` flag, then `FLOWBOARD_PORT`, then 4000.
pub fn resolve_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| {
        std::env::var("FLOWBOARD_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
    })
    .unwrap_or(4000)
}

/// Open (and migrate) the database at the given path.
pub async fn open_database(db_path: &PathBuf) -> Result<SqlitePool> {
    let pool = create_pool(db_path).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn handle_init_command(db_path: &PathBuf) -> Result<()> {
    let pool = open_database(db_path).await?;
    let user = ProjectStore::new(&pool).ensure_default_user().await?;

    println!("Initialized database at {}", db_path.display());
    println!("Current user: {} (id {})", user.name, user.id);
    Ok(())
}

pub async fn handle_project_command(pool: &SqlitePool, cmd: ProjectCommands) -> Result<()> {
    let store = ProjectStore::new(pool);

    match cmd {
        ProjectCommands::Add { name, description } => {
            let project = store.create_project(&name, description.as_deref()).await?;
            println!("Created project [{}] {}", project.id, project.name);
        },
        ProjectCommands::List => {
            let projects = store.list_projects().await?;
            if projects.is_empty() {
                println!("No projects. Create one with: fb project add --name \"...\"");
                return Ok(());
            }
            for project in projects {
                match &project.description {
                    Some(desc) => println!("[{}] {} - {}", project.id, project.name, desc),
                    None => println!("[{}] {}", project.id, project.name),
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_prefers_flag() {
        let path = resolve_db_path(Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_resolve_port_prefers_flag() {
        assert_eq!(resolve_port(Some(8123)), 8123);
    }
}
