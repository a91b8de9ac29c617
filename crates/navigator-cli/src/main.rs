//! note-navigator: run note navigation and cleanup commands on a vault directory.
//!
//! Each invocation scans the vault, treats the given note as the active file,
//! runs one command and writes the updated statistics back to the settings file.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use navigator_cli::{statistics_report, Config, Input, NativeVault, TerminalWorkspace};
use navigator_core::plugin::{Command, NoteNavigator};
use navigator_core::Vault;

#[derive(Parser, Debug)]
#[command(name = "note-navigator")]
#[command(about = "Navigate, move and safely delete notes in an Obsidian vault")]
#[command(version)]
struct Args {
    /// Path to the vault directory
    #[arg(short, long, env = "NOTE_NAVIGATOR_VAULT")]
    vault: String,

    /// Settings file (defaults to .note-navigator.json inside the vault)
    #[arg(long, env = "NOTE_NAVIGATOR_SETTINGS")]
    settings: Option<String>,

    /// File explorer sort order: alphabetical, alphabeticalReverse, byCreatedTime,
    /// byCreatedTimeReverse, byModifiedTime or byModifiedTimeReverse
    #[arg(long)]
    sort_order: Option<String>,

    /// What deletion does with files: local (.trash folder), system or none
    #[arg(long, default_value = "local")]
    trash: String,

    /// Answer yes to confirmation prompts
    #[arg(short, long)]
    yes: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Open the note after FILE
    Next { file: String },
    /// Open the note before FILE
    Prev { file: String },
    /// Delete FILE with its orphaned attachments and emptied folders
    Delete { file: String },
    /// Move FILE to another folder and open the note after it
    Move { file: String },
    /// Rename the folder containing FILE
    RenameFolder { file: String },
    /// Print the sort order, trash mode and sorted contents of FILE's folder
    Debug { file: String },
    /// Print usage statistics
    Stats {
        /// Reset all counters to zero
        #[arg(long)]
        reset: bool,
    },
}

impl Cmd {
    fn active_file(&self) -> Option<&str> {
        match self {
            Cmd::Next { file }
            | Cmd::Prev { file }
            | Cmd::Delete { file }
            | Cmd::Move { file }
            | Cmd::RenameFolder { file }
            | Cmd::Debug { file } => Some(file),
            Cmd::Stats { .. } => None,
        }
    }

    fn command(&self) -> Option<Command> {
        match self {
            Cmd::Next { .. } => Some(Command::NavigateNext),
            Cmd::Prev { .. } => Some(Command::NavigatePrevious),
            Cmd::Delete { .. } => Some(Command::DeleteAndNavigate),
            Cmd::Move { .. } => Some(Command::MoveAndNavigate),
            Cmd::RenameFolder { .. } => Some(Command::RenameParentFolder),
            Cmd::Debug { .. } => Some(Command::DebugSorting),
            Cmd::Stats { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Respects RUST_LOG, defaults to info (or debug with --verbose)
    let default_filter = if args.verbose {
        "debug,navigator_core=debug,navigator_cli=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::new(
        &args.vault,
        args.settings.as_deref(),
        args.sort_order.clone(),
        &args.trash,
    )?;
    info!("Vault path: {}", config.vault_path.display());

    let settings = config.load_settings().await?;
    let vault = NativeVault::open(config.vault_path.clone(), config.trash_option)
        .await
        .with_context(|| format!("Failed to scan vault at {}", config.vault_path.display()))?;
    let workspace = TerminalWorkspace::new(config.settings_path.clone(), config.sort_order.clone(), Input::Stdin)
        .assume_yes(args.yes);

    if let Some(path) = args.command.active_file() {
        let file = vault
            .file(path.trim_start_matches("./"))
            .with_context(|| format!("{} is not a file in the vault", path))?;
        workspace.set_active(Some(file));
    }

    let mut navigator = NoteNavigator::new(Arc::new(vault), Arc::new(workspace), settings);

    match (&args.command, args.command.command()) {
        (Cmd::Stats { reset }, _) => {
            for line in statistics_report(navigator.view_settings().await) {
                println!("{}", line);
            }
            if *reset {
                navigator.reset_statistics().await;
                println!("Statistics reset.");
            }
        }
        (_, Some(Command::DebugSorting)) => {
            if let Some(report) = navigator.debug_report() {
                for line in report.lines() {
                    println!("{}", line);
                }
            }
        }
        (_, Some(command)) => {
            if !navigator.can_run(command) {
                bail!("{} is not available for this file", command.name());
            }
            navigator.run(command).await;
        }
        (_, None) => {}
    }

    Ok(())
}
