use crate::{ChannelId, ChannelRef, MediaFileDescriptor};

/// Media found in one channel, kept with the channel it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBatch {
    pub channel: ChannelRef,
    pub files: Vec<MediaFileDescriptor>,
}

/// Per-channel media collected during the search phase, in search order.
/// Empty batches are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMediaBatch {
    batches: Vec<ChannelBatch>,
}

impl ChannelMediaBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a channel's media. A later record for the same channel
    /// replaces the earlier one in place.
    pub fn record(&mut self, channel: ChannelRef, files: Vec<MediaFileDescriptor>) {
        if files.is_empty() {
            return;
        }
        match self
            .batches
            .iter_mut()
            .find(|batch| batch.channel.id == channel.id)
        {
            Some(existing) => {
                existing.channel = channel;
                existing.files = files;
            }
            None => self.batches.push(ChannelBatch { channel, files }),
        }
    }

    pub fn get(&self, channel_id: &str) -> Option<&[MediaFileDescriptor]> {
        self.batches
            .iter()
            .find(|batch| batch.channel.id == channel_id)
            .map(|batch| batch.files.as_slice())
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = &ChannelId> {
        self.batches.iter().map(|batch| &batch.channel.id)
    }

    pub fn total_files(&self) -> usize {
        self.batches.iter().map(|batch| batch.files.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelBatch> {
        self.batches.iter()
    }
}

impl IntoIterator for ChannelMediaBatch {
    type Item = ChannelBatch;
    type IntoIter = std::vec::IntoIter<ChannelBatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.into_iter()
    }
}
