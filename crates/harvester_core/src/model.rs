use serde::Serialize;

/// Channel identifier as supplied by the caller and the remote service.
pub type ChannelId = String;

/// Message identifier. Newer messages carry larger ids.
pub type MessageId = u64;

/// Parent grouping of a channel, used only for directory naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
    pub category: Option<CategoryRef>,
}

impl ChannelRef {
    pub fn new(id: impl Into<ChannelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.category = Some(CategoryRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Category name used for the destination tree; falls back to
    /// [`UNCATEGORIZED`] for top-level channels.
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|category| category.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }
}

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    pub id: MessageId,
    pub attachments: Vec<Attachment>,
}

impl FetchedMessage {
    pub fn new(id: MessageId, attachments: Vec<Attachment>) -> Self {
        Self { id, attachments }
    }
}

/// One downloadable file, named `{message_id}_{attachment_name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFileDescriptor {
    pub file_name: String,
    pub source_url: String,
    pub message_id: MessageId,
}

impl MediaFileDescriptor {
    pub fn from_attachment(message_id: MessageId, attachment: &Attachment) -> Self {
        Self {
            file_name: format!("{message_id}_{}", attachment.name),
            source_url: attachment.url.clone(),
            message_id,
        }
    }
}
