use harvester_core::{ChannelRef, FetchedMessage, MessageId};

use crate::ClientError;

/// Already-authenticated handle on the messaging service.
#[async_trait::async_trait]
pub trait ChannelClient: Send + Sync {
    /// Look a channel up by id. `Ok(None)` means the service has no such
    /// channel visible to this client.
    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelRef>, ClientError>;

    /// Up to `limit` messages strictly older than `before`, newest first.
    /// `before: None` starts from the most recent message.
    async fn fetch_messages_before(
        &self,
        channel_id: &str,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>, ClientError>;

    /// Message-bearing channels of a server, with their categories filled in.
    async fn guild_channels(&self, guild_id: &str) -> Result<Vec<ChannelRef>, ClientError>;
}
