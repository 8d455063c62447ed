use crate::db::models::{TaskPriority, TaskStatus};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Flowboard - project task boards with ordered lanes

Tasks live on a per-project board in four lanes (todo, in_progress,
review, done), ordered within each lane. Moves between and within lanes
are persisted as one atomic bulk reorder, stamped with a board version so
concurrent reorders are detected instead of overwritten.

Typical session:
  fb init                         ← create the database
  fb project add --name "Site"    ← create a project
  fb task add --project 1 --title "Draft requirements"
  fb task list --project 1        ← show the board
  fb task move 3 --before 1       ← reorder within a lane
  fb task move 3 --lane review    ← move to the end of another lane
  fb serve                        ← run the HTTP API
"#;

#[derive(Parser, Clone)]
#[command(name = "flowboard")]
#[command(about = "Project task boards with ordered lanes and conflict-checked bulk reorder")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    /// Database path (falls back to FLOWBOARD_DB, then ./flowboard.db)
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Create the database and seed the current user
    Init,

    /// Run the HTTP API server
    Serve {
        /// Port to listen on (falls back to FLOWBOARD_PORT, then 4000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage tasks and the board
    #[command(subcommand)]
    Task(TaskCommands),
}

#[derive(Subcommand, Clone)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List projects
    List,
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// Create a task (lands at the end of its lane, assigned to you)
    Add {
        /// Owning project id
        #[arg(long)]
        project: i64,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Lane to start in (default: todo)
        #[arg(long)]
        status: Option<TaskStatus>,

        /// low, medium, high or urgent (default: medium)
        #[arg(long)]
        priority: Option<TaskPriority>,

        /// Due date, RFC 3339 (e.g. 2026-09-15T17:00:00Z)
        #[arg(long)]
        due: Option<String>,
    },

    /// Show a project's board, lane by lane
    List {
        #[arg(long)]
        project: i64,
    },

    /// Show one task
    Show { id: i64 },

    /// Move a task to the in_progress lane (status only, no reordering)
    Start { id: i64 },

    /// Move a task to the done lane (status only, no reordering)
    Complete { id: i64 },

    /// Move a task on the board and persist the new arrangement
    ///
    /// Exactly one target: --before places the task immediately before
    /// another task (adopting its lane), --lane moves it into a lane.
    Move {
        id: i64,

        /// Target task id to insert before
        #[arg(long, conflicts_with = "lane")]
        before: Option<i64>,

        /// Target lane to move into
        #[arg(long)]
        lane: Option<TaskStatus>,
    },

    /// Delete a task (irreversible)
    Delete { id: i64 },
}
