//! CLI argument parsing for the `reckon` binary.
//!
//! The CLI only gathers signals and paths; every decision is made by the
//! engine so the same logic can be embedded elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reckon",
    version,
    about = "Infer a project version from the state of its git history",
    after_help = "Commands:\n  version    Reckon the version for the current commit\n  inventory  Show the repository facts the version is computed from\n  init       Write a .reckon.json config stub\n\nExamples:\n  reckon version\n  reckon version --scope minor --stage rc\n  RECKON_SNAPSHOT=false reckon version --repo ../service\n  reckon inventory --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log progress at info level (RECKON_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Version(VersionArgs),
    Inventory(InventoryArgs),
    Init(InitArgs),
}

/// Repository and config location shared by the reading commands.
#[derive(clap::Args, Debug, Clone)]
pub struct RepoArgs {
    /// Directory inside the git work tree
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Config file (defaults: RECKON_CONFIG, .reckon.json, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Reckon the version for the current commit")]
pub struct VersionArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Normal component to escalate: major, minor, patch or none
    #[arg(long, value_name = "SCOPE", env = "RECKON_SCOPE")]
    pub scope: Option<String>,

    /// Pre-release stage from the configured allow-list
    #[arg(long, value_name = "STAGE", env = "RECKON_STAGE")]
    pub stage: Option<String>,

    /// Append the snapshot marker ("true" enables, anything else disables)
    #[arg(long, value_name = "BOOL", env = "RECKON_SNAPSHOT")]
    pub snapshot: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Show the repository facts a version is reckoned from")]
pub struct InventoryArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(
    about = "Write a .reckon.json config stub at the work tree root",
    after_help = "The stub holds the built-in defaults: snapshot pre-releases, strict ordering,\nand default_scope \"minor\" (an absent --scope bumps the minor version).\nRemove default_scope to leave the normal version unchanged when no scope is given."
)]
pub struct InitArgs {
    /// Directory inside the git work tree
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Overwrite an existing .reckon.json
    #[arg(long)]
    pub force: bool,
}
