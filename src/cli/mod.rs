//! Command-line interface definitions.
//!
//! Argument structs live here; behavior lives in [`commands`].

pub mod commands;

use crate::config::CliOverrides;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dropdesk",
    version,
    about = "Track wallets, airdrop projects, tasks and notes locally"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (overrides metadata.json)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colors
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags that feed the config layers.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db: self.db.clone(),
            json: self.json.then_some(true),
            no_color: self.no_color.then_some(true),
            balance_cache_ttl: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .dropdesk data directory here
    Init(InitArgs),

    /// Manage tracked wallets
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },

    /// Manage airdrop projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage project tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Manage checklist steps under a task
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },

    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Chain reference data
    Chain {
        #[command(subcommand)]
        command: ChainCommands,
    },

    /// Daily routine completion per wallet
    Daily {
        #[command(subcommand)]
        command: DailyCommands,
    },

    /// Write a JSON backup of all records
    Export(ExportArgs),

    /// Replace all records with a JSON backup
    Import(ImportArgs),

    /// Merge a dump from the older localStorage format
    ImportLegacy(ImportArgs),

    /// Print JSON Schemas for the record types
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Reinitialize an existing data directory (keeps the database)
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum WalletCommands {
    /// Track a new wallet
    Add(WalletAddArgs),
    /// List wallets
    List(WalletListArgs),
    /// Show one wallet
    Show(AddressArg),
    /// Change wallet details
    Edit(WalletEditArgs),
    /// Stop tracking a wallet
    Rm(AddressArg),
    /// Show or change the wallet-type list
    Types(WalletTypesArgs),
    /// Show or record the balance of one wallet
    Balance(WalletBalanceArgs),
    /// Cached balances of all wallets
    Balances,
}

#[derive(Args, Debug)]
pub struct AddressArg {
    pub address: String,
}

#[derive(Args, Debug)]
pub struct WalletAddArgs {
    pub address: String,

    #[arg(short = 't', long = "type", default_value = "EVM")]
    pub wallet_type: String,

    #[arg(long)]
    pub alias: Option<String>,

    #[arg(long)]
    pub twitter: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct WalletListArgs {
    /// Only wallets of this type
    #[arg(short = 't', long = "type")]
    pub wallet_type: Option<String>,

    /// Print full addresses
    #[arg(long)]
    pub full: bool,
}

#[derive(Args, Debug)]
pub struct WalletEditArgs {
    pub address: String,

    #[arg(short = 't', long = "type")]
    pub wallet_type: Option<String>,

    /// New alias (empty string clears it)
    #[arg(long)]
    pub alias: Option<String>,

    #[arg(long)]
    pub twitter: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct WalletTypesArgs {
    /// Add a type
    #[arg(long)]
    pub add: Vec<String>,

    /// Remove a type
    #[arg(long)]
    pub remove: Vec<String>,

    /// Go back to the default list
    #[arg(long, conflicts_with_all = ["add", "remove"])]
    pub reset: bool,
}

#[derive(Args, Debug)]
pub struct WalletBalanceArgs {
    pub address: String,

    /// Record a balance in USD
    #[arg(long, conflicts_with = "forget")]
    pub set: Option<f64>,

    /// Drop the cached balance
    #[arg(long)]
    pub forget: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Add(ProjectAddArgs),
    /// List projects
    List(ProjectListArgs),
    /// Show one project
    Show(IdArg),
    /// Change project details
    Edit(ProjectEditArgs),
    /// Delete a project (soft)
    Rm(IdArg),
    /// Bring back a deleted project
    Restore(IdArg),
}

#[derive(Args, Debug)]
pub struct IdArg {
    pub id: String,
}

#[derive(Args, Debug, Default)]
pub struct ProjectFields {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub discord: Option<String>,

    #[arg(long)]
    pub telegram: Option<String>,

    #[arg(long)]
    pub twitter: Option<String>,

    #[arg(long)]
    pub stage: Option<String>,

    #[arg(long)]
    pub airdrop_stage: Option<String>,

    #[arg(long)]
    pub estimated_price: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    /// Tag (repeatable; replaces the list when given)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Related wallet address (repeatable; replaces the list when given)
    #[arg(long = "wallet")]
    pub wallets: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ProjectAddArgs {
    pub name: String,

    /// Mark the project as mandatory
    #[arg(long)]
    pub mandatory: bool,

    #[command(flatten)]
    pub fields: ProjectFields,
}

#[derive(Args, Debug, Default)]
pub struct ProjectListArgs {
    /// Only projects carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Only mandatory projects
    #[arg(long)]
    pub mandatory: bool,

    /// Include deleted projects
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ProjectEditArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub mandatory: Option<bool>,

    #[command(flatten)]
    pub fields: ProjectFields,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task under a project
    Add(TaskAddArgs),
    /// List tasks
    List(TaskListArgs),
    /// Show a task with its steps
    Show(IdArg),
    /// Change task details
    Edit(TaskEditArgs),
    /// Delete a task (soft)
    Rm(IdArg),
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub guide_link: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority_note: Option<String>,
}

#[derive(Args, Debug)]
pub struct TaskAddArgs {
    pub name: String,

    #[arg(short, long)]
    pub project: String,

    /// 1 (most urgent) to 5
    #[arg(long, default_value_t = crate::model::DEFAULT_TASK_PRIORITY)]
    pub priority: u8,

    /// Repeats every day
    #[arg(long)]
    pub daily: bool,

    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(Args, Debug, Default)]
pub struct TaskListArgs {
    /// Only tasks of this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only daily tasks
    #[arg(long)]
    pub daily: bool,

    /// Include deleted tasks
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct TaskEditArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub project: Option<String>,

    #[arg(long)]
    pub priority: Option<u8>,

    #[arg(long)]
    pub daily: Option<bool>,

    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Add steps to a task
    Add(SubtaskAddArgs),
    /// List the steps of a task
    List(TaskIdArg),
    /// Remove one step
    Rm(IdArg),
    /// Remove every step of a task
    Clear(TaskIdArg),
}

#[derive(Args, Debug)]
pub struct TaskIdArg {
    pub task_id: String,
}

#[derive(Args, Debug)]
pub struct SubtaskAddArgs {
    pub task_id: String,

    /// Step name (repeatable)
    #[arg(required = true)]
    pub names: Vec<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub guide_link: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Write a note
    Add(NoteAddArgs),
    /// List notes
    List(NoteListArgs),
    /// Show one note
    Show(IdArg),
    /// Change a note
    Edit(NoteEditArgs),
    /// Delete a note (soft)
    Rm(IdArg),
}

#[derive(Args, Debug)]
pub struct NoteAddArgs {
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub content: String,

    /// 1 (most important) to 5
    #[arg(long, default_value_t = crate::model::DEFAULT_NOTE_PRIORITY)]
    pub priority: u8,

    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct NoteListArgs {
    #[arg(long)]
    pub tag: Option<String>,

    /// Include deleted notes
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct NoteEditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub content: Option<String>,

    #[arg(long)]
    pub priority: Option<u8>,

    /// Replaces the tag list when given
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Create a tag
    Add(TagAddArgs),
    /// List tags
    List,
    /// Delete a tag
    Rm(IdArg),
}

#[derive(Args, Debug)]
pub struct TagAddArgs {
    pub name: String,

    /// Display color (derived from the name when omitted)
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ChainCommands {
    /// List known chains
    List,
    /// Insert or refresh chains from a JSON array file
    Upsert(ChainUpsertArgs),
}

#[derive(Args, Debug)]
pub struct ChainUpsertArgs {
    /// JSON file holding an array of chains
    pub file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum DailyCommands {
    /// Flip completion for a wallet
    Toggle(DailyToggleArgs),
    /// Completion marks for a day
    Show(DailyShowArgs),
}

#[derive(Args, Debug)]
pub struct DailyToggleArgs {
    /// Project name
    pub project: String,

    pub wallet: String,

    /// Day as YYYY-MM-DD (today when omitted)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct DailyShowArgs {
    /// Day as YYYY-MM-DD (today when omitted)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Target file or directory (default: export-dir config, then CWD)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the document to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaTarget::All)]
    pub target: SchemaTarget,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaTarget {
    #[default]
    All,
    Wallet,
    Project,
    Task,
    Subtask,
    Note,
    Tag,
    Chain,
    Snapshot,
    Error,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
