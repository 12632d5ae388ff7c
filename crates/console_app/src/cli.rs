use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "console")]
#[command(about = "Browse, register and analyse media streams on the platform backend")]
pub struct Cli {
    /// Settings file (RON). Defaults to ./console.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Backend root URL, e.g. http://127.0.0.1:8000
    #[arg(long, env = "CONSOLE_BASE_URL")]
    pub base_url: Option<String>,
    /// Rows per feed page.
    #[arg(long)]
    pub page_size: Option<u32>,
    /// Also log to the terminal, at debug level.
    #[arg(long, short)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List streams, optionally narrowed to a category and keyword.
    List {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        keyword: Option<String>,
        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show the categories with their stream counts.
    Catalog,
    /// Register a new stream from an uploaded file or a stream URI.
    Add(AddArgs),
    /// Follow the live analysis of a stream until it completes.
    Analyze { id: i64 },
    /// Print the playback URL of a stream.
    Play { id: i64 },
    /// Poll the host's system info.
    Monitor {
        /// Stop after this many samples; 0 polls until the monitor gives up.
        #[arg(long, default_value_t = 0)]
        polls: u32,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    /// Category id.
    #[arg(long)]
    pub scenario: i64,
    /// Local file to upload as the stream source.
    #[arg(long, conflicts_with = "path", required_unless_present = "path")]
    pub file: Option<PathBuf>,
    /// Existing file name or stream URI (rtsp://, http://).
    #[arg(long)]
    pub path: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Analysis algorithm id.
    #[arg(long)]
    pub algo: Option<i64>,
}
