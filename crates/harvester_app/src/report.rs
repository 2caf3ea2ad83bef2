use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use harvester_engine::{ErrorTarget, HarvestEvent, HarvestSummary};
use serde_json::Value;

/// Renders engine output on stdout, as text or as JSON lines.
pub struct Reporter<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn event(&mut self, event: &HarvestEvent) -> Result<()> {
        if self.json {
            let line = stamped(serde_json::to_value(event)?);
            writeln!(self.out, "{line}")?;
        } else {
            writeln!(self.out, "{}", describe(event))?;
        }
        Ok(())
    }

    pub fn summary(&mut self, summary: &HarvestSummary) -> Result<()> {
        if self.json {
            let mut value = serde_json::to_value(summary)?;
            if let Value::Object(map) = &mut value {
                map.insert("event".into(), Value::from("summary"));
            }
            writeln!(self.out, "{}", stamped(value))?;
        } else {
            writeln!(
                self.out,
                "{} channels searched, {} media found: {} downloaded, {} skipped, {} failed",
                summary.channels_searched,
                summary.media_found,
                summary.downloaded,
                summary.skipped,
                summary.failed
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn stamped(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert("ts".into(), Value::from(Utc::now().to_rfc3339()));
    }
    value
}

pub fn describe(event: &HarvestEvent) -> String {
    match event {
        HarvestEvent::SearchStatus { message } => message.clone(),
        HarvestEvent::SearchError { channel_id, error } => {
            format!("search failed in channel {channel_id}: {error}")
        }
        HarvestEvent::MediaSkipped {
            file_name,
            channel_name,
            category_name,
            ..
        } => format!("skipped {category_name}/{channel_name}/{file_name} (already present)"),
        HarvestEvent::MediaDownloaded {
            file_name,
            channel_name,
            category_name,
            progress,
            ..
        } => format!("downloaded {category_name}/{channel_name}/{file_name} {progress}"),
        HarvestEvent::DownloadError { target, error } => match target {
            ErrorTarget::FileName(name) => format!("download failed for {name}: {error}"),
            ErrorTarget::ChannelId(id) => format!("download failed for channel {id}: {error}"),
        },
        HarvestEvent::DownloadComplete { message } => message.clone(),
    }
}
