use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::{DEFAULT_FILE_PATTERN, DEFAULT_START_DATE};
use crate::error::Error;

#[derive(Parser)]
#[command(name = "klinemerge")]
#[command(about = "Incremental kline CSV consolidation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge new fragments into one artifact per symbol
    Merge(MergeArgs),
    /// Show artifacts and resume dates per symbol
    Status(StatusArgs),
    /// Extract downloaded ZIP archives in place
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Fragment directory (default: $KLINEMERGE_INPUT_DIR or downloaded_klines)
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Artifact directory (default: $KLINEMERGE_OUTPUT_DIR or merged_klines)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// First day to consolidate (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START_DATE)]
    pub start_date: String,

    /// Last day to consolidate (YYYY-MM-DD, default: today UTC)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Comma-separated symbols (default: all)
    #[arg(short, long)]
    pub symbols: Option<String>,

    /// Input layout: symbol-dirs or vision
    #[arg(long, default_value = "symbol-dirs")]
    pub layout: String,

    /// Kline interval directory to read (vision layout only, e.g. 1m)
    #[arg(long)]
    pub interval: Option<String>,

    /// Search symbol directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// File name glob for fragments
    #[arg(long, default_value = DEFAULT_FILE_PATTERN)]
    pub file_pattern: String,

    /// Header policy: recency or kline
    #[arg(long, default_value = "recency")]
    pub schema: String,

    /// Symbols processed in parallel (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Hold a per-symbol lock file while merging
    #[arg(long)]
    pub lock: bool,

    /// Extract ZIP archives in the input tree before merging
    #[arg(long)]
    pub extract: bool,

    /// Keep ZIP archives after extraction
    #[arg(long)]
    pub keep_archives: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Artifact directory (default: $KLINEMERGE_OUTPUT_DIR or merged_klines)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Comma-separated symbols (default: all)
    #[arg(short, long)]
    pub symbols: Option<String>,

    /// First day to consolidate (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START_DATE)]
    pub start_date: String,

    /// Last day to consolidate (YYYY-MM-DD, default: today UTC)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Directory containing ZIP archives (default: $KLINEMERGE_INPUT_DIR or downloaded_klines)
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Search the whole tree instead of the top two levels
    #[arg(short, long)]
    pub recursive: bool,

    /// Keep ZIP archives after extraction
    #[arg(long)]
    pub keep_archives: bool,
}

pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge(args) => commands::merge::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Extract(args) => commands::extract::run(args),
    }
}
