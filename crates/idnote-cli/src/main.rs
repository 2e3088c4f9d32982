//! idnote CLI - look up and edit notes keyed by numeric identifier

mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::Parser;
use idnote_core::{MemoryNoteStore, NoteStore, Session};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, NoteCommands};
use crate::commands::common::{resolve_backend, Backend};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::set::run_set;
use crate::commands::shell::run_shell;
use crate::commands::show::run_show;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "idnote=info,idnote_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Some(Commands::Config { command }) => return run_config(command, cli.profile.as_deref()),
        Some(Commands::Completions { shell, output }) => {
            return run_completions(shell, output.as_deref());
        }
        Some(Commands::Note(command)) => command,
        None => NoteCommands::Shell,
    };

    match resolve_backend(cli.ephemeral, cli.profile.as_deref())? {
        Backend::Remote {
            store,
            cache_policy,
        } => run_note_command(&Session::with_cache_policy(store, cache_policy), command).await,
        Backend::Ephemeral => run_note_command(&Session::new(MemoryNoteStore::new()), command).await,
    }
}

async fn run_note_command<S: NoteStore>(
    session: &Session<S>,
    command: NoteCommands,
) -> Result<(), CliError> {
    match command {
        NoteCommands::Show { id, json } => run_show(session, &id, json).await,
        NoteCommands::Set { id, content } => run_set(session, &id, &content).await,
        NoteCommands::Edit { id } => run_edit(session, &id).await,
        NoteCommands::List { json } => run_list(session, json).await,
        NoteCommands::Shell => run_shell(session).await,
    }
}
