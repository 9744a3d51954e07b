use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "starnote")]
#[command(about = "Stargazing diary: notes, tags, constellations, and sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding local data (overrides config and STARNOTE_DATA_DIR)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.json
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quick capture: starnote "saw Jupiter's moons"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(long)]
        name: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Observation time (RFC 3339, YYYY-MM-DD, or Unix ms)
        #[arg(long, value_name = "WHEN")]
        at: Option<String>,
        /// Note body
        body: Vec<String>,
    },
    /// List notes
    List {
        /// Only notes with this tag
        #[arg(long)]
        tag: Option<String>,
        /// Range start, inclusive
        #[arg(long, value_name = "WHEN")]
        from: Option<String>,
        /// Range end, exclusive
        #[arg(long, value_name = "WHEN")]
        to: Option<String>,
        /// Include deleted notes
        #[arg(long, conflicts_with_all = ["tag", "from", "to"])]
        all: bool,
        /// Number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing note (opens $EDITOR when no field flags are given)
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// Replace the tag list (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Move the note to another time
        #[arg(long, value_name = "WHEN")]
        at: Option<String>,
    },
    /// Delete a note (kept until purge)
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Erase deleted notes for good
    Purge,
    /// Search note names and bodies
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Manage tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Local user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Sync server account
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Sync notes with the server
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
    },
    /// Constellation checklist
    Sky {
        #[command(subcommand)]
        command: SkyCommands,
    },
    /// Export notes
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show or write the config file
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

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for starnote_core::export::ExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Known tags with note counts
    List {
        #[arg(long)]
        json: bool,
    },
    /// Register a tag without attaching it
    Add { tag: String },
    /// Rename a tag on every note
    Rename { from: String, to: String },
    /// Remove a tag from every note
    Delete { tag: String },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a local account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign in to a local account
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the current local account
    Whoami,
    /// Change the current account's password
    Passwd {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
    /// Remove a local account
    Delete { username: String },
    List,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create an account on the sync server
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign in to the sync server
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Status,
    /// Change username or email on the server
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Upload a single note
    Push {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Delete a note on the server only
    Remove {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Show the last successful sync
    Status,
}

#[derive(Subcommand)]
pub enum SkyCommands {
    /// All constellations with their observed flag
    List {
        /// Only observed ones
        #[arg(long, conflicts_with = "remaining")]
        observed: bool,
        /// Only ones not yet observed
        #[arg(long)]
        remaining: bool,
        #[arg(long)]
        json: bool,
    },
    /// Mark a constellation as observed, e.g. `sky mark ursa major`
    Mark {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Clear the observed flag
    Unmark {
        #[arg(required = true)]
        name: Vec<String>,
    },
    Progress,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write config.json
    Init {
        /// Sync server base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Local data directory
        #[arg(long = "set-data-dir", value_name = "PATH")]
        data_dir: Option<PathBuf>,
    },
}
