use std::path::Path;

use crate::{FetchedMessage, MediaFileDescriptor};

/// Hard bound on media files collected across all channels of one run.
pub const MAX_PHOTOS: usize = 10_000;

pub const MEDIA_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Run-wide media counter shared by every channel's extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCounter {
    collected: usize,
    cap: usize,
}

impl Default for PhotoCounter {
    fn default() -> Self {
        Self::with_cap(MAX_PHOTOS)
    }
}

impl PhotoCounter {
    pub fn with_cap(cap: usize) -> Self {
        Self { collected: 0, cap }
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn is_exhausted(&self) -> bool {
        self.collected >= self.cap
    }

    /// Claim one slot. Check and increment happen together.
    fn try_claim(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.collected += 1;
        true
    }
}

/// True when the attachment name ends in one of [`MEDIA_EXTENSIONS`],
/// compared case-insensitively.
pub fn is_media_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MEDIA_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Filter messages down to image descriptors in arrival order, stopping as
/// soon as `counter` is exhausted. A channel that fills the cap midway keeps
/// what it collected before the cap.
pub fn extract_media(
    messages: &[FetchedMessage],
    counter: &mut PhotoCounter,
) -> Vec<MediaFileDescriptor> {
    let mut media = Vec::new();
    'messages: for message in messages {
        for attachment in &message.attachments {
            if counter.is_exhausted() {
                break 'messages;
            }
            if !is_media_name(&attachment.name) {
                continue;
            }
            if !counter.try_claim() {
                break 'messages;
            }
            media.push(MediaFileDescriptor::from_attachment(message.id, attachment));
        }
    }
    media
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_requires_a_stem() {
        assert!(!is_media_name(".png"));
        assert!(!is_media_name("png"));
        assert!(is_media_name("archive.tar.webp"));
    }

    #[test]
    fn counter_refuses_past_cap() {
        let mut counter = PhotoCounter::with_cap(1);
        assert!(counter.try_claim());
        assert!(!counter.try_claim());
        assert_eq!(counter.collected(), 1);
    }
}
