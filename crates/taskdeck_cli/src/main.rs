//! Command-line front end for the Taskdeck store.
//!
//! # Responsibility
//! - Map subcommands onto `TaskStore` operations against a SQLite file.
//! - Print the resulting tasks and the active notifications.

mod render;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use taskdeck_core::db::{open_db, DbError};
use taskdeck_core::{
    default_log_level, init_logging, CodecError, Notifier, Priority, SqliteSlotStorage,
    StoreConfig, StoreError, SystemClock, TaskDraft, TaskId, TaskPatch, TaskStore,
};

const DEFAULT_DB_FILE_NAME: &str = "taskdeck.sqlite3";

#[derive(Debug, Parser)]
#[command(version, about = "Manage a local task list")]
struct Cli {
    /// SQLite database file holding the task slot.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tasks.
    List {
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },
    /// Show one task.
    Show { id: u64 },
    /// Add a task.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// Change fields of a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip the completion state of a task.
    Toggle { id: u64 },
    /// Delete a task.
    Delete { id: u64 },
    /// Restore the example task set.
    Reset,
    /// Print completion statistics.
    Stats,
    /// Write the task list as JSON to a file or stdout.
    Export {
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Replace the task list with a JSON document.
    Import { file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Filter {
    All,
    Completed,
    Pending,
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Db(DbError),
    Io(PathBuf, std::io::Error),
    Codec(CodecError),
    Store(StoreError),
    TaskNotFound(u64),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(path, err) => write!(f, "{}: {err}", path.display()),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(_, err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Logging(_) | Self::TaskNotFound(_) => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<CodecError> for CliError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(CliError::Logging)?;
    }

    let conn = open_db(&cli.db)?;
    let config = StoreConfig::default();
    let notifier = Notifier::with_ttl(Box::new(SystemClock), config.notification_ttl);
    let mut store = TaskStore::open(SqliteSlotStorage::new(&conn), notifier, config);
    info!(
        "event=cli_command module=cli status=start db={}",
        cli.db.display()
    );

    let outcome = execute(&mut store, cli.command);
    render::print_notifications(&store.notifier().active());
    store.shutdown();
    outcome
}

fn execute(
    store: &mut TaskStore<SqliteSlotStorage<'_>>,
    command: Command,
) -> Result<(), CliError> {
    match command {
        Command::List { filter } => {
            let tasks = match filter {
                Filter::All => store.list().to_vec(),
                Filter::Completed => store.completed_tasks(),
                Filter::Pending => store.pending_tasks(),
            };
            render::print_tasks(&tasks);
        }
        Command::Show { id } => {
            let task = store.get(TaskId(id)).ok_or(CliError::TaskNotFound(id))?;
            render::print_task_detail(task);
        }
        Command::Add {
            title,
            description,
            priority,
        } => {
            let draft = TaskDraft::new(title)
                .with_description(description)
                .with_priority(priority);
            let task = store.add(draft)?;
            render::print_tasks(std::slice::from_ref(&task));
        }
        Command::Update {
            id,
            title,
            description,
            priority,
            completed,
        } => {
            let patch = TaskPatch {
                title,
                description,
                completed,
                priority,
            };
            let task = store
                .update(TaskId(id), patch)?
                .ok_or(CliError::TaskNotFound(id))?;
            render::print_tasks(std::slice::from_ref(&task));
        }
        Command::Toggle { id } => {
            let task = store
                .toggle_completion(TaskId(id))
                .ok_or(CliError::TaskNotFound(id))?;
            render::print_tasks(std::slice::from_ref(&task));
        }
        Command::Delete { id } => {
            store
                .delete(TaskId(id))
                .ok_or(CliError::TaskNotFound(id))?;
        }
        Command::Reset => {
            store.reset();
            render::print_tasks(store.list());
        }
        Command::Stats => render::print_stats(&store.stats()),
        Command::Export { out } => {
            let document = store.export_json()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, document).map_err(|err| CliError::Io(path, err))?
                }
                None => println!("{document}"),
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file).map_err(|err| CliError::Io(file, err))?;
            store.import_json(&text)?;
            render::print_tasks(store.list());
        }
    }
    Ok(())
}
