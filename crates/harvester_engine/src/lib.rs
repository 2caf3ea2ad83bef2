//! Harvester engine: IO pipeline for collecting and downloading channel media.
mod client;
mod download;
mod engine;
mod fetch;
mod harvest;
mod history;
mod persist;
mod rest;
mod sink;
mod types;

pub use client::ChannelClient;
pub use download::download_all;
pub use engine::EngineHandle;
pub use fetch::{FetchSettings, MediaFetcher, ReqwestFetcher};
pub use harvest::{HarvestSettings, Harvester, COMPLETE_MESSAGE, DEFAULT_DEST_ROOT};
pub use history::{fetch_history, HistoryOutcome, HistorySettings, HistoryStop, PAGE_DELAY, PAGE_SIZE};
pub use persist::{channel_dir, ensure_output_dir, prepare_channel_dir, PersistError};
pub use rest::{DiscordRestClient, RestSettings, DEFAULT_API_BASE};
pub use sink::{ChannelProgressSink, ProgressSink};
pub use types::{
    BatchReport, ClientError, ClientFailure, DownloadError, DownloadOutcome, EngineEvent,
    ErrorTarget, FailureKind, HarvestEvent, HarvestSummary,
};
