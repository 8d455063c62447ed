use clap::Parser;
use flowboard::cli::{Cli, Commands};
use flowboard::cli_handlers::{
    handle_init_command, handle_project_command, handle_task_command, open_database,
    resolve_db_path, resolve_port,
};
use flowboard::error::Result;
use flowboard::logging::LoggingConfig;
use flowboard::server::BoardServer;
use std::io::IsTerminal;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut log_config = LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json);

    // Server mode with stdout redirected logs to a file instead.
    // FLOWBOARD_SERVER_LOG_FILE forces this on for testing.
    if matches!(cli.command, Commands::Serve { .. }) {
        let force_file_log = std::env::var("FLOWBOARD_SERVER_LOG_FILE").is_ok();

        if force_file_log || !std::io::stdout().is_terminal() {
            use flowboard::logging::{log_file_path, ApplicationMode};
            log_config = LoggingConfig::for_mode(ApplicationMode::Server);
            log_config.file_output = Some(log_file_path(ApplicationMode::Server));
        }
    }

    if let Err(e) = flowboard::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        let error_response = e.to_error_response();
        eprintln!("{}", serde_json::to_string_pretty(&error_response).unwrap());
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let db_path = resolve_db_path(cli.db.clone());

    match cli.command.clone() {
        Commands::Init => handle_init_command(&db_path).await?,

        Commands::Serve { port } => {
            let port = resolve_port(port);
            BoardServer::new(port, db_path)
                .run()
                .await
                .map_err(|e| flowboard::error::FlowboardError::IoError(std::io::Error::other(e)))?;
        },

        Commands::Project(project_cmd) => {
            let pool = open_database(&db_path).await?;
            handle_project_command(&pool, project_cmd).await?;
        },

        Commands::Task(task_cmd) => {
            let pool = open_database(&db_path).await?;
            handle_task_command(&pool, task_cmd).await?;
        },
    }

    Ok(())
}
