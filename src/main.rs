use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use git_checkpoint::commands::{auto, config, create, delete, list, load, schedule, uninstall};
use git_checkpoint::completions::{generate_completions, Shell};
use git_checkpoint::error::CheckpointError;
use std::io;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `GIT_CHECKPOINT_LOG=debug`.
const LOG_ENV: &str = "GIT_CHECKPOINT_LOG";

#[derive(Parser)]
#[command(name = "git-checkpoint")]
#[command(about = "Named, non-destructive snapshots of uncommitted git work", long_about = None)]
#[command(version)]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot staged, unstaged and untracked changes
    Create {
        /// Checkpoint name (defaults to auto_<timestamp>)
        name: Option<String>,
    },

    /// List checkpoints, newest first
    #[command(visible_alias = "ls")]
    List {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a checkpoint, or every checkpoint with `*`
    #[command(visible_alias = "rm")]
    Delete {
        /// Checkpoint name, or `*` for all
        name: String,
    },

    /// Apply a checkpoint's changes to the working tree
    #[command(visible_alias = "apply")]
    Load {
        /// Checkpoint name
        name: String,
    },

    /// Create an automatic checkpoint if anything changed since the last one
    Auto,

    /// Stop scheduled automatic checkpoints for this repository
    Pause,

    /// (Re)register scheduled automatic checkpoints for this repository
    Resume,

    /// Show the schedule state for this repository
    Status,

    /// Read or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Remove this repository's schedule entry and settings
    LocalUninstall,

    /// Remove schedule entries for every repository and the global settings
    Uninstall,

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print one setting, or all of them
    Get {
        /// interval, notify, max_auto or auto_age_days
        key: Option<String>,
    },

    /// Change a setting
    Set {
        /// interval, notify, max_auto or auto_age_days
        key: String,
        /// New value (interval: minutes, or e.g. 30s / 10m)
        value: String,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let yes = cli.yes;

    match cli.command {
        Commands::Create { name } => create::execute(name, yes),
        Commands::List { json } => list::execute(json),
        Commands::Delete { name } => delete::execute(name, yes),
        Commands::Load { name } => load::execute(name, yes),
        Commands::Auto => auto::execute(),
        Commands::Pause => schedule::pause(),
        Commands::Resume => schedule::resume(),
        Commands::Status => schedule::status(),
        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => config::get(key),
            ConfigCommands::Set { key, value } => config::set(key, value),
        },
        Commands::LocalUninstall => uninstall::local(),
        Commands::Uninstall => uninstall::global(yes),
        Commands::Completions { shell } => {
            let shell = Shell::from_str(&shell)?;
            let mut cmd = Cli::command();
            generate_completions(&mut cmd, shell, &mut io::stdout());
            Ok(())
        }
        Commands::Version => {
            println!("git-checkpoint {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let declined = e
                .downcast_ref::<CheckpointError>()
                .is_some_and(CheckpointError::is_declined);
            if declined {
                eprintln!("Aborted.");
            } else {
                eprintln!("{} {e:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}
