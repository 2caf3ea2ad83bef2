//! Harvester core: pure domain model and the IO-free stages of a harvest.
mod batch;
mod chunk;
mod extract;
mod message_set;
mod model;
mod phase;
mod sanitize;
mod select;

pub use batch::{ChannelBatch, ChannelMediaBatch};
pub use chunk::{chunk_ranges, DEFAULT_CONCURRENCY};
pub use extract::{extract_media, is_media_name, PhotoCounter, MAX_PHOTOS, MEDIA_EXTENSIONS};
pub use message_set::{MessageSet, MAX_MESSAGES};
pub use model::{
    Attachment, CategoryRef, ChannelId, ChannelRef, FetchedMessage, MediaFileDescriptor,
    MessageId, UNCATEGORIZED,
};
pub use phase::HarvestPhase;
pub use sanitize::sanitize;
pub use select::{dedupe_channel_ids, select_channels};
