use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tui_dispatch_debug::DebugCliArgs;

use crate::api::DEFAULT_API_BASE;
use crate::search::DEFAULT_UNIVERSE_BATCH;
use crate::state::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE};

#[derive(Parser, Debug)]
#[command(name = "pokecards")]
#[command(about = "Paginated Pokemon card browser for the terminal")]
pub struct Args {
    /// Records fetched per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Search results revealed per "show more"
    #[arg(long, default_value_t = DEFAULT_SEARCH_PAGE_SIZE)]
    pub search_page_size: usize,

    /// Catalogue API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Listing batch size used when fetching the name index for search
    #[arg(long, default_value_t = DEFAULT_UNIVERSE_BATCH)]
    pub universe_batch: usize,

    /// Directory for log files (defaults to the user data dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(flatten)]
    pub debug: DebugCliArgs,
}

/// Runtime settings resolved from the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub page_size: usize,
    pub search_page_size: usize,
    pub api_base: String,
    pub timeout: Duration,
    pub universe_batch: usize,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            page_size: args.page_size.max(1),
            search_page_size: args.search_page_size.max(1),
            api_base: args.api_base.clone(),
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
            universe_batch: args.universe_batch.max(1),
            log_dir: args.log_dir.clone().unwrap_or_else(default_log_dir),
        }
    }
}

pub fn default_log_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join("pokecards").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
