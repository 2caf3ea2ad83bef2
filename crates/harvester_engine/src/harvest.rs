use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use harvester_core::{
    dedupe_channel_ids, extract_media, ChannelBatch, ChannelId, ChannelMediaBatch, HarvestPhase,
    PhotoCounter, DEFAULT_CONCURRENCY, MAX_MESSAGES, MAX_PHOTOS,
};

use crate::history::{fetch_history, HistorySettings, HistoryStop, PAGE_DELAY, PAGE_SIZE};
use crate::persist::prepare_channel_dir;
use crate::{
    download_all, ChannelClient, ErrorTarget, HarvestEvent, HarvestSummary, MediaFetcher,
    ProgressSink,
};

pub const DEFAULT_DEST_ROOT: &str = "./Downloads";
pub const COMPLETE_MESSAGE: &str = "All downloads complete!";

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub dest_root: PathBuf,
    pub message_cap: usize,
    pub photo_cap: usize,
    pub page_size: usize,
    pub page_delay: Duration,
    pub concurrency: usize,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            dest_root: PathBuf::from(DEFAULT_DEST_ROOT),
            message_cap: MAX_MESSAGES,
            photo_cap: MAX_PHOTOS,
            page_size: PAGE_SIZE,
            page_delay: PAGE_DELAY,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl HarvestSettings {
    pub fn with_dest_root(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            dest_root: dest_root.into(),
            ..Self::default()
        }
    }

    fn history(&self) -> HistorySettings {
        HistorySettings {
            page_size: self.page_size,
            page_delay: self.page_delay,
            message_cap: self.message_cap,
        }
    }
}

/// Drives a harvest: search every requested channel, then download what was
/// found into `<dest_root>/<category>/<channel>/`.
#[derive(Clone)]
pub struct Harvester {
    client: Arc<dyn ChannelClient>,
    fetcher: Arc<dyn MediaFetcher>,
    settings: HarvestSettings,
}

impl Harvester {
    pub fn new(
        client: Arc<dyn ChannelClient>,
        fetcher: Arc<dyn MediaFetcher>,
        settings: HarvestSettings,
    ) -> Self {
        Self {
            client,
            fetcher,
            settings,
        }
    }

    pub fn client(&self) -> &dyn ChannelClient {
        self.client.as_ref()
    }

    /// Run one harvest. Failures are reported through `sink` and never abort
    /// the run; the returned summary always ends in [`HarvestPhase::Complete`].
    pub async fn run_harvest(
        &self,
        channel_ids: &[ChannelId],
        sink: &dyn ProgressSink,
    ) -> HarvestSummary {
        let mut summary = HarvestSummary::default();

        engine_info!("Harvest searching {} channels", channel_ids.len());
        let batch = self.search(channel_ids, sink, &mut summary).await;

        summary.phase = summary.phase.next();
        engine_info!(
            "Harvest downloading {} files from {} channels",
            summary.media_found,
            batch.len()
        );
        sink.emit(HarvestEvent::status(format!(
            "Found {} media files in total (max {}). Starting download...",
            summary.media_found, self.settings.photo_cap
        )));
        for channel_batch in batch {
            self.download_channel(channel_batch, sink, &mut summary).await;
        }

        summary.phase = summary.phase.next();
        engine_info!(
            "Harvest complete downloaded={} skipped={} failed={}",
            summary.downloaded,
            summary.skipped,
            summary.failed
        );
        sink.emit(HarvestEvent::DownloadComplete {
            message: COMPLETE_MESSAGE.to_string(),
        });
        summary
    }

    async fn search(
        &self,
        channel_ids: &[ChannelId],
        sink: &dyn ProgressSink,
        summary: &mut HarvestSummary,
    ) -> ChannelMediaBatch {
        debug_assert_eq!(summary.phase, HarvestPhase::Searching);
        let history_settings = self.settings.history();
        let mut counter = PhotoCounter::with_cap(self.settings.photo_cap);
        let mut batch = ChannelMediaBatch::new();

        sink.emit(HarvestEvent::status("Searching for media files..."));

        for channel_id in dedupe_channel_ids(channel_ids.iter().cloned()) {
            if counter.is_exhausted() {
                engine_info!("Media cap {} reached; remaining channels skipped", counter.cap());
                break;
            }

            let channel = match self.client.resolve_channel(&channel_id).await {
                Ok(Some(channel)) => channel,
                Ok(None) => {
                    engine_debug!("Channel {} not found; skipped", channel_id);
                    summary.channels_unresolved += 1;
                    continue;
                }
                Err(err) => {
                    engine_warn!("Channel {} lookup failed: {}", channel_id, err);
                    sink.emit(HarvestEvent::SearchError {
                        channel_id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            summary.channels_searched += 1;
            sink.emit(HarvestEvent::status(format!(
                "Searching channel {}...",
                channel.name
            )));

            let history = fetch_history(self.client.as_ref(), &channel, &history_settings, sink).await;
            if let HistoryStop::Failed(err) = &history.stop {
                sink.emit(HarvestEvent::SearchError {
                    channel_id: channel.id.clone(),
                    error: err.to_string(),
                });
            }

            let media = extract_media(&history.messages, &mut counter);
            engine_debug!(
                "Channel {} messages={} media={} stop={:?}",
                channel.id,
                history.messages.len(),
                media.len(),
                history.stop
            );
            if !media.is_empty() {
                sink.emit(HarvestEvent::status(format!(
                    "{}: found {} media files. Total: {}/{}",
                    channel.name,
                    media.len(),
                    counter.collected(),
                    counter.cap()
                )));
                batch.record(channel, media);
            }
        }

        summary.media_found = batch.total_files();
        batch
    }

    async fn download_channel(
        &self,
        channel_batch: ChannelBatch,
        sink: &dyn ProgressSink,
        summary: &mut HarvestSummary,
    ) {
        let ChannelBatch { channel, files } = channel_batch;

        let dest_dir = match prepare_channel_dir(&self.settings.dest_root, &channel) {
            Ok(dir) => dir,
            Err(err) => {
                engine_error!("Cannot prepare directory for channel {}: {}", channel.id, err);
                sink.emit(HarvestEvent::DownloadError {
                    target: ErrorTarget::ChannelId(channel.id.clone()),
                    error: err.to_string(),
                });
                summary.failed += files.len();
                return;
            }
        };

        sink.emit(HarvestEvent::status(format!(
            "{}: downloading {} files...",
            channel.name,
            files.len()
        )));
        let report = download_all(
            self.fetcher.as_ref(),
            &files,
            &dest_dir,
            &channel,
            sink,
            self.settings.concurrency,
        )
        .await;

        summary.downloaded += report.downloaded;
        summary.skipped += report.skipped;
        summary.failed += report.failed;
    }
}
