use std::fmt;

use harvester_core::{ChannelId, ChannelRef, HarvestPhase};
use serde::Serialize;
use thiserror::Error;

/// Observer-facing progress and error events, one variant per event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum HarvestEvent {
    SearchStatus {
        message: String,
    },
    SearchError {
        channel_id: ChannelId,
        error: String,
    },
    MediaSkipped {
        channel_id: ChannelId,
        file_name: String,
        channel_name: String,
        category_name: String,
    },
    MediaDownloaded {
        channel_id: ChannelId,
        file_name: String,
        channel_name: String,
        category_name: String,
        /// `(done/total)` within the channel's batch.
        progress: String,
    },
    DownloadError {
        #[serde(flatten)]
        target: ErrorTarget,
        error: String,
    },
    DownloadComplete {
        message: String,
    },
}

impl HarvestEvent {
    pub fn status(message: impl Into<String>) -> Self {
        HarvestEvent::SearchStatus {
            message: message.into(),
        }
    }
}

/// What a `download-error` refers to: one file, or a whole channel batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorTarget {
    FileName(String),
    ChannelId(ChannelId),
}

/// Events streamed out of the background engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Harvest(HarvestEvent),
    ChannelsListed(Result<Vec<ChannelRef>, ClientError>),
    HarvestFinished(HarvestSummary),
}

/// Counters for one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    pub phase: HarvestPhase,
    pub channels_searched: usize,
    pub channels_unresolved: usize,
    pub media_found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Result of one file in a download batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Skipped,
    Downloaded { progress_index: usize },
    Failed(DownloadError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub(crate) fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn settled(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DownloadError {
    pub kind: FailureKind,
    pub message: String,
}

impl DownloadError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "HTTP {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Failure talking to the messaging service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: ClientFailure,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFailure {
    InvalidUrl,
    Http(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for ClientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientFailure::InvalidUrl => write!(f, "invalid url"),
            ClientFailure::Http(code) => write!(f, "HTTP {code}"),
            ClientFailure::Timeout => write!(f, "timeout"),
            ClientFailure::Network => write!(f, "network error"),
            ClientFailure::Decode => write!(f, "unexpected response body"),
        }
    }
}
