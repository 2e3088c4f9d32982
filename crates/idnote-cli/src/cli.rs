use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "idnote")]
#[command(about = "Look up and edit short notes keyed by a numeric identifier")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for store connection settings
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Use an in-process store that is discarded on exit
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Note(NoteCommands),
    /// Configure CLI connection profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Commands that run against the note store
#[derive(Subcommand)]
pub enum NoteCommands {
    /// Show the note for an identifier
    #[command(alias = "get")]
    Show {
        /// Digit-only identifier
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the note for an identifier (reads stdin when no content is given)
    Set {
        /// Digit-only identifier
        id: String,
        /// Note content
        content: Vec<String>,
    },
    /// Edit the note for an identifier in $VISUAL / $EDITOR
    Edit {
        /// Digit-only identifier
        id: String,
    },
    /// List all notes with previews
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open the interactive shell (default)
    Shell,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Table holding the notes
        #[arg(long, value_name = "NAME")]
        table: Option<String>,
        /// Always read notes from the store instead of the session cache
        #[arg(long)]
        no_cache: bool,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the resolved profile (anon key redacted)
    Show,
}
