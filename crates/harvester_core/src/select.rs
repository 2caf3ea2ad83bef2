use crate::{ChannelId, ChannelRef};

/// Channels whose parent category is one of `categories`, in listing order.
/// An empty category list selects every channel.
pub fn select_channels(channels: &[ChannelRef], categories: &[String]) -> Vec<ChannelId> {
    channels
        .iter()
        .filter(|channel| {
            categories.is_empty()
                || channel
                    .category
                    .as_ref()
                    .is_some_and(|category| categories.iter().any(|id| *id == category.id))
        })
        .map(|channel| channel.id.clone())
        .collect()
}

/// Drop repeated ids, keeping the first occurrence.
pub fn dedupe_channel_ids<I, S>(ids: I) -> Vec<ChannelId>
where
    I: IntoIterator<Item = S>,
    S: Into<ChannelId>,
{
    let mut unique: Vec<ChannelId> = Vec::new();
    for id in ids {
        let id = id.into();
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
