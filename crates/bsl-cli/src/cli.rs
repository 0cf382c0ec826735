use std::path::PathBuf;

use bsl_sdk::Key;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bsl",
    about = "BlobStoreLite - fixed-capacity circular blob store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store directory (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Slot count for a new store (overrides the config file)
    #[arg(long, global = true)]
    pub capacity: Option<usize>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a document in the next slot
    Add(AddArgs),
    /// Print a document by `latest`, slot number, or name
    Get(GetArgs),
    /// List documents, newest first
    List(ListArgs),
    /// Show store capacity, occupancy and bound names
    Info,
}

#[derive(Args)]
pub struct AddArgs {
    /// File to store, or `-` for stdin
    pub path: PathBuf,
    #[arg(short, long)]
    pub name: Option<String>,
    /// Metadata as a JSON value
    #[arg(short, long)]
    pub meta: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: Key,
    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
