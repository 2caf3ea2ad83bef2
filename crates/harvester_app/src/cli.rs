use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;

/// Download image attachments from messaging channels into
/// `<out>/<category>/<channel>/`.
#[derive(Debug, Parser)]
#[command(name = "harvester", version, about)]
pub struct Cli {
    /// Channels to harvest, in order. When empty, channels are discovered from
    /// the configured server and categories.
    pub channel_ids: Vec<String>,

    /// Config file (RON).
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Destination root directory.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Downloads in flight per chunk.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Print events as JSON lines instead of text.
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
