use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use harvester_core::{ChannelRef, FetchedMessage, MessageId, MessageSet, MAX_MESSAGES};

use crate::{ChannelClient, ClientError, HarvestEvent, ProgressSink};

pub const PAGE_SIZE: usize = 100;
pub const PAGE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct HistorySettings {
    pub page_size: usize,
    /// Fixed pause between page requests.
    pub page_delay: Duration,
    pub message_cap: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            page_delay: PAGE_DELAY,
            message_cap: MAX_MESSAGES,
        }
    }
}

/// Why pagination of one channel stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStop {
    /// The service returned an empty page.
    Exhausted,
    CapReached,
    /// A page held nothing older than the cursor, so the next request would
    /// repeat it.
    CursorStalled,
    /// A page request failed; messages gathered before it are kept.
    Failed(ClientError),
}

#[derive(Debug, Clone)]
pub struct HistoryOutcome {
    pub messages: Vec<FetchedMessage>,
    pub stop: HistoryStop,
}

/// Walk a channel's history backwards from the newest message, one page at a
/// time, until the service runs out, the cap is reached, or a request fails.
pub async fn fetch_history(
    client: &dyn ChannelClient,
    channel: &ChannelRef,
    settings: &HistorySettings,
    sink: &dyn ProgressSink,
) -> HistoryOutcome {
    let mut set = MessageSet::with_cap(settings.message_cap);
    let mut cursor: Option<MessageId> = None;

    let stop = loop {
        if set.is_full() {
            break HistoryStop::CapReached;
        }

        let page = match client
            .fetch_messages_before(&channel.id, cursor, settings.page_size)
            .await
        {
            Ok(page) => page,
            Err(err) => {
                engine_warn!(
                    "History fetch failed channel={} cursor={:?}: {}",
                    channel.id,
                    cursor,
                    err
                );
                break HistoryStop::Failed(err);
            }
        };

        let Some(oldest) = page.iter().map(|message| message.id).min() else {
            break HistoryStop::Exhausted;
        };

        let added = set.extend_page(page);
        engine_debug!(
            "History page channel={} added={} total={} oldest={}",
            channel.id,
            added,
            set.len(),
            oldest
        );
        sink.emit(HarvestEvent::status(format!(
            "{}: {} messages scanned (max {})",
            channel.name,
            set.len(),
            set.cap()
        )));

        if set.is_full() {
            break HistoryStop::CapReached;
        }
        if cursor.is_some_and(|previous| oldest >= previous) {
            engine_warn!(
                "History cursor did not advance channel={} cursor={}",
                channel.id,
                oldest
            );
            break HistoryStop::CursorStalled;
        }
        cursor = Some(oldest);

        if !settings.page_delay.is_zero() {
            tokio::time::sleep(settings.page_delay).await;
        }
    };

    HistoryOutcome {
        messages: set.into_messages(),
        stop,
    }
}
