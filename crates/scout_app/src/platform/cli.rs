use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use scout_engine::TransportKind;

#[derive(Debug, Parser)]
#[command(
    name = "scout",
    version,
    about = "Company search and number-guessing client for the scout server"
)]
pub struct Cli {
    /// RON configuration file (defaults to ./scout.ron when present).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server base URL, e.g. http://127.0.0.1:5000
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// How search results are delivered: streaming or batch.
    #[arg(long, value_name = "MODE")]
    pub transport: Option<TransportKind>,

    /// Companies allowed per search; 0 removes the limit.
    #[arg(long, value_name = "N")]
    pub max_companies: Option<usize>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    /// ./scout.log in the working directory.
    File,
    /// stderr.
    Terminal,
    Both,
    Off,
}
