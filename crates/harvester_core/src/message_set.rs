use std::collections::HashSet;

use crate::{FetchedMessage, MessageId};

/// Hard bound on messages collected from one channel.
pub const MAX_MESSAGES: usize = 10_000;

/// Messages collected from one channel's history, deduplicated by id and
/// kept in arrival order (newest first).
#[derive(Debug, Clone)]
pub struct MessageSet {
    cap: usize,
    seen: HashSet<MessageId>,
    messages: Vec<FetchedMessage>,
}

impl Default for MessageSet {
    fn default() -> Self {
        Self::with_cap(MAX_MESSAGES)
    }
}

impl MessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap,
            seen: HashSet::new(),
            messages: Vec::new(),
        }
    }

    /// Insert one page. Returns how many messages were new; duplicates and
    /// anything past the cap are dropped.
    pub fn extend_page(&mut self, page: impl IntoIterator<Item = FetchedMessage>) -> usize {
        let mut added = 0;
        for message in page {
            if self.is_full() {
                break;
            }
            if self.seen.insert(message.id) {
                self.messages.push(message);
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.seen.contains(&id)
    }

    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn messages(&self) -> &[FetchedMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<FetchedMessage> {
        self.messages
    }
}
