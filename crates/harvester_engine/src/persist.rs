use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use harvester_core::{sanitize, ChannelRef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure `dir` is a directory, creating it and any missing parents.
/// Existing contents are left untouched.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::OutputDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .map_err(|err| PersistError::OutputDir(format!("{}: {err}", dir.display()))),
        Err(err) => Err(PersistError::OutputDir(format!("{}: {err}", dir.display()))),
    }
}

/// `<root>/<category>/<channel>` with both names sanitized.
pub fn channel_dir(root: &Path, channel: &ChannelRef) -> PathBuf {
    root.join(sanitize(channel.category_name()))
        .join(sanitize(&channel.name))
}

/// Resolve and create the destination directory for a channel's media.
pub fn prepare_channel_dir(root: &Path, channel: &ChannelRef) -> Result<PathBuf, PersistError> {
    let dir = channel_dir(root, channel);
    ensure_output_dir(&dir)?;
    Ok(dir)
}
