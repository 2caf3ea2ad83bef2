use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use engine_logging::{engine_debug, engine_warn};
use futures_util::future::join_all;
use harvester_core::{chunk_ranges, ChannelRef, MediaFileDescriptor};

use crate::{
    BatchReport, DownloadOutcome, ErrorTarget, HarvestEvent, MediaFetcher, ProgressSink,
};

/// Download `files` into `dest_dir`, `concurrency` at a time.
///
/// Files are taken in consecutive chunks; a chunk starts only once every
/// download of the previous chunk has settled. Inside a chunk, events arrive
/// in completion order. Files already present are skipped without a request.
pub async fn download_all(
    fetcher: &dyn MediaFetcher,
    files: &[MediaFileDescriptor],
    dest_dir: &Path,
    channel: &ChannelRef,
    sink: &dyn ProgressSink,
    concurrency: usize,
) -> BatchReport {
    let total = files.len();
    let done = AtomicUsize::new(0);
    let mut report = BatchReport::default();

    for range in chunk_ranges(total, concurrency) {
        engine_debug!(
            "Download chunk channel={} files={}..{} of {}",
            channel.id,
            range.start,
            range.end,
            total
        );
        let outcomes = join_all(files[range].iter().map(|file| {
            download_one(fetcher, file, dest_dir, channel, sink, &done, total)
        }))
        .await;
        for outcome in &outcomes {
            report.record(outcome);
        }
    }

    report
}

async fn download_one(
    fetcher: &dyn MediaFetcher,
    file: &MediaFileDescriptor,
    dest_dir: &Path,
    channel: &ChannelRef,
    sink: &dyn ProgressSink,
    done: &AtomicUsize,
    total: usize,
) -> DownloadOutcome {
    let path = dest_dir.join(&file.file_name);

    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        done.fetch_add(1, Ordering::SeqCst);
        sink.emit(HarvestEvent::MediaSkipped {
            channel_id: channel.id.clone(),
            file_name: file.file_name.clone(),
            channel_name: channel.name.clone(),
            category_name: channel.category_name().to_string(),
        });
        return DownloadOutcome::Skipped;
    }

    match fetcher.fetch_to_file(&file.source_url, &path).await {
        Ok(_) => {
            let progress_index = done.fetch_add(1, Ordering::SeqCst) + 1;
            sink.emit(HarvestEvent::MediaDownloaded {
                channel_id: channel.id.clone(),
                file_name: file.file_name.clone(),
                channel_name: channel.name.clone(),
                category_name: channel.category_name().to_string(),
                progress: format!("({progress_index}/{total})"),
            });
            DownloadOutcome::Downloaded { progress_index }
        }
        Err(err) => {
            engine_warn!("Download failed file={} url={}: {}", file.file_name, file.source_url, err);
            sink.emit(HarvestEvent::DownloadError {
                target: ErrorTarget::FileName(file.file_name.clone()),
                error: err.to_string(),
            });
            DownloadOutcome::Failed(err)
        }
    }
}
