#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use harvester_core::{Attachment, ChannelRef, FetchedMessage, MessageId};
use harvester_engine::{
    ChannelClient, ClientError, ClientFailure, DownloadError, FailureKind, HarvestEvent,
    MediaFetcher,
    ProgressSink,
};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<HarvestEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn attachment(name: &str, url: &str) -> Attachment {
    Attachment {
        name: name.to_string(),
        url: url.to_string(),
    }
}

/// Messages `1..=count`, each with one `img{id}.png` attachment under `base_url`.
pub fn image_history(count: u64, base_url: &str) -> Vec<FetchedMessage> {
    (1..=count)
        .map(|id| {
            FetchedMessage::new(
                id,
                vec![attachment(&format!("img{id}.png"), &format!("{base_url}/img/{id}"))],
            )
        })
        .collect()
}

/// In-memory messaging service.
#[derive(Default)]
pub struct FakeClient {
    channels: HashMap<String, ChannelRef>,
    histories: HashMap<String, Vec<FetchedMessage>>,
    /// Page requests (1-based) that fail for a channel.
    failing_page: HashMap<String, usize>,
    /// Re-send the cursor message at the top of every later page that has
    /// anything older.
    overlap: bool,
    /// Answer every page request with the newest page.
    ignore_cursor: bool,
    guild: Vec<ChannelRef>,
    pub page_calls: Mutex<Vec<(String, Option<MessageId>)>>,
    pub resolve_calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: ChannelRef, history: Vec<FetchedMessage>) -> Self {
        self.histories.insert(channel.id.clone(), history);
        self.guild.push(channel.clone());
        self.channels.insert(channel.id.clone(), channel);
        self
    }

    pub fn failing_on_page(mut self, channel_id: &str, page: usize) -> Self {
        self.failing_page.insert(channel_id.to_string(), page);
        self
    }

    pub fn overlapping(mut self) -> Self {
        self.overlap = true;
        self
    }

    pub fn ignoring_cursor(mut self) -> Self {
        self.ignore_cursor = true;
        self
    }

    pub fn page_count(&self, channel_id: &str) -> usize {
        self.page_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == channel_id)
            .count()
    }

    pub fn cursors(&self) -> Vec<Option<MessageId>> {
        self.page_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cursor)| *cursor)
            .collect()
    }
}

#[async_trait::async_trait]
impl ChannelClient for FakeClient {
    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelRef>, ClientError> {
        self.resolve_calls
            .lock()
            .unwrap()
            .push(channel_id.to_string());
        Ok(self.channels.get(channel_id).cloned())
    }

    async fn fetch_messages_before(
        &self,
        channel_id: &str,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>, ClientError> {
        let call = {
            let mut calls = self.page_calls.lock().unwrap();
            calls.push((channel_id.to_string(), before));
            calls.iter().filter(|(id, _)| id == channel_id).count()
        };
        if self.failing_page.get(channel_id) == Some(&call) {
            return Err(ClientError::new(ClientFailure::Http(500), "500 Internal Server Error"));
        }

        let mut history = self.histories.get(channel_id).cloned().unwrap_or_default();
        history.sort_by(|a, b| b.id.cmp(&a.id));
        let before = before.filter(|_| !self.ignore_cursor);
        let Some(cursor) = before else {
            return Ok(history.into_iter().take(limit).collect());
        };
        let older: Vec<FetchedMessage> = history
            .iter()
            .filter(|message| message.id < cursor)
            .cloned()
            .collect();
        if older.is_empty() {
            return Ok(older);
        }
        let repeated = history
            .into_iter()
            .find(|message| self.overlap && message.id == cursor);
        Ok(repeated.into_iter().chain(older).take(limit).collect())
    }

    async fn guild_channels(&self, _guild_id: &str) -> Result<Vec<ChannelRef>, ClientError> {
        Ok(self.guild.clone())
    }
}

/// Writes the URL as the file body, without touching the network.
#[derive(Default)]
pub struct FakeFetcher {
    pub requests: Mutex<Vec<String>>,
    failing: Vec<String>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.failing.iter().any(|failing| failing == url) {
            return Err(fake_download_error());
        }
        std::fs::write(dest, url.as_bytes()).unwrap();
        Ok(url.len() as u64)
    }
}

fn fake_download_error() -> DownloadError {
    DownloadError::new(FailureKind::HttpStatus(503), "HTTP 503")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Start(usize),
    End(usize),
}

/// Records start/end order and peak overlap of downloads.
#[derive(Default)]
pub struct TimelineFetcher {
    pub timeline: Mutex<Vec<Mark>>,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

#[async_trait::async_trait]
impl MediaFetcher for TimelineFetcher {
    async fn fetch_to_file(&self, url: &str, _dest: &Path) -> Result<u64, DownloadError> {
        let index: usize = url.rsplit('/').next().unwrap().parse().unwrap();
        self.timeline.lock().unwrap().push(Mark::Start(index));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis((index % 7) as u64)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.timeline.lock().unwrap().push(Mark::End(index));
        Ok(0)
    }
}
