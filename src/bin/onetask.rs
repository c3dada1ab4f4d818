//! Operator command line for a `PostgreSQL`-backed task list.
//!
//! Usage:
//!
//! ```text
//! onetask --owner <owner-id> <command> [args]
//! ```
//!
//! Every command acts on the tasks of a single owner and prints JSON.
//! Configuration is read as described in [`onetask::config`]; `RUST_LOG`
//! controls log verbosity (default `info`, logs go to stderr).

use clap::{Parser, Subcommand};
use diesel::connection::SimpleConnection;
use mockable::DefaultClock;
use onetask::{
    config::OnetaskConfig,
    task::{
        adapters::postgres::{PostgresTaskRepository, TaskPgPool, build_pool},
        domain::{OwnerId, TaskId},
        services::TaskListService,
    },
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_tasks/up.sql");

#[derive(Parser)]
#[command(name = "onetask")]
#[command(about = "One task at a time: manage a task list from the command line", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Account whose tasks are managed
    #[arg(long, env = "ONETASK_OWNER", global = true, default_value = "")]
    owner: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the tasks table in the configured database
    Migrate,
    /// Append a task to the end of the list
    Add {
        /// Task text
        text: Vec<String>,
    },
    /// Show pending tasks, current task first
    List,
    /// Show the current task with pending and completed-today counts
    Current,
    /// Mark a task as done (the current task when no id is given)
    Done {
        /// Task id
        id: Option<Uuid>,
    },
    /// Move the current task to the end of the list
    Skip,
    /// Put pending tasks in the given order
    Reorder {
        /// Task ids, first to last
        ids: Vec<Uuid>,
    },
    /// Show completed tasks that are not in the bin
    Completed {
        /// Only tasks completed today (UTC)
        #[arg(long)]
        today: bool,
    },
    /// Move all completed tasks into the bin
    Archive,
    /// Show tasks in the bin
    Bin,
    /// Take a task out of the bin and put it back on the list
    Restore {
        /// Task id
        id: Uuid,
    },
    /// Permanently delete a task from the bin
    Delete {
        /// Task id
        id: Uuid,
    },
    /// Permanently delete everything in the bin
    EmptyBin,
}

#[derive(Serialize)]
struct Count {
    count: u64,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = OnetaskConfig::load()?;
    let pool = build_pool(&config.database.url, config.database.max_connections)?;

    if matches!(cli.command, Command::Migrate) {
        migrate(pool).await?;
        tracing::info!("tasks schema created");
        return Ok(());
    }

    let owner = OwnerId::new(cli.owner)?;
    let service = TaskListService::new(
        Arc::new(PostgresTaskRepository::new(pool)),
        Arc::new(DefaultClock),
    )
    .with_max_text_chars(config.tasks.max_text_chars);

    match cli.command {
        Command::Migrate => Ok(()),
        Command::Add { text } => print_json(&service.create(&owner, &text.join(" ")).await?),
        Command::List => print_json(&service.list_pending(&owner).await?),
        Command::Current => print_json(&service.overview(&owner).await?),
        Command::Done { id: Some(id) } => {
            print_json(&service.complete(&owner, TaskId::from_uuid(id)).await?)
        }
        Command::Done { id: None } => print_json(&service.complete_current(&owner).await?),
        Command::Skip => print_json(&service.skip(&owner).await?),
        Command::Reorder { ids } => {
            service
                .reorder(&owner, ids.into_iter().map(TaskId::from_uuid).collect())
                .await?;
            print_json(&service.list_pending(&owner).await?)
        }
        Command::Completed { today: true } => print_json(&service.completed_today(&owner).await?),
        Command::Completed { today: false } => print_json(&service.list_completed(&owner).await?),
        Command::Archive => print_json(&Count {
            count: service.archive_completed(&owner).await?,
        }),
        Command::Bin => print_json(&service.list_archived(&owner).await?),
        Command::Restore { id } => {
            print_json(&service.restore(&owner, TaskId::from_uuid(id)).await?)
        }
        Command::Delete { id } => {
            service
                .permanent_delete(&owner, TaskId::from_uuid(id))
                .await?;
            print_json(&Count { count: 1 })
        }
        Command::EmptyBin => print_json(&Count {
            count: service.empty_bin(&owner).await?,
        }),
    }
}

async fn migrate(pool: TaskPgPool) -> Result<(), BoxError> {
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let mut connection = pool.get()?;
        connection.batch_execute(CREATE_TASKS_SQL)?;
        Ok(())
    })
    .await?
}

fn print_json(value: &impl Serialize) -> Result<(), BoxError> {
    let rendered = serde_json::to_string_pretty(value)?;
    writeln!(std::io::stdout().lock(), "{rendered}")?;
    Ok(())
}
