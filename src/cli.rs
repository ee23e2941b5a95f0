use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::{editor::Selection, picker::Precedence, thing::ThingKind};

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
}

#[derive(Parser)]
#[command(name = "atp")]
#[command(
    about = "Derive project root, seed query and preselect keys from editor cursor state"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved project root for a file
    Root(RootArgs),

    /// Build the search request and picker invocation for a backend
    Request(RequestArgs),

    /// Pick the preselected candidate from lines on stdin
    Pick(PickArgs),

    /// Print the nearest symbol-index entry at or before the cursor
    Nearest(NearestArgs),

    /// Initialize an atpoint.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Cursor placement: --offset, or --line with an optional --column
#[derive(Debug, Clone, Args)]
pub struct CursorArgs {
    /// Cursor byte offset from the start of the file
    #[arg(long, conflicts_with = "line")]
    pub offset: Option<usize>,

    /// Cursor line (1-based)
    #[arg(long)]
    pub line: Option<usize>,

    /// Cursor byte column within --line (0-based, default 0)
    #[arg(long)]
    pub column: Option<usize>,
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// File whose project root to resolve (defaults to the working directory)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct RequestArgs {
    /// Backend: rg, ag, git-grep, grep, file-jump, find-file, fzf, imenu
    pub backend: String,

    /// File backing the buffer; omit for a scratch buffer read from stdin
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub cursor: CursorArgs,

    /// Active selection as START..END byte offsets
    #[arg(long, value_parser = parse_selection)]
    pub selection: Option<Selection>,

    /// Symbol index (JSON lines) for the imenu backend
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Override the configured thing-at-point extractor
    #[arg(long, value_enum)]
    pub thing: Option<ThingKind>,

    /// Override the configured option precedence
    #[arg(long, value_enum)]
    pub precedence: Option<Precedence>,

    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Debug, Parser)]
pub struct PickArgs {
    /// Preselect key candidates must start with
    #[arg(long)]
    pub key: String,

    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Debug, Parser)]
pub struct NearestArgs {
    /// Symbol index (JSON lines)
    #[arg(long)]
    pub index: PathBuf,

    /// File the index describes
    #[arg(long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub cursor: CursorArgs,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,

    /// Write `atp.<ext>` into this directory instead of stdout
    #[arg(long, conflicts_with = "stdout")]
    pub out_dir: Option<PathBuf>,

    /// Print the script to stdout (the default without --out-dir)
    #[arg(long)]
    pub stdout: bool,
}

/// Parse `START..END` (either order) into a selection
pub fn parse_selection(s: &str) -> Result<Selection, String> {
    let (a, b) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got `{s}`"))?;
    let a: usize = a.trim().parse().map_err(|_| format!("invalid start offset `{a}`"))?;
    let b: usize = b.trim().parse().map_err(|_| format!("invalid end offset `{b}`"))?;
    Ok(Selection::between(a, b))
}
