use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::StatusCode;
use tempfile::{Builder, NamedTempFile};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::{DownloadError, FailureKind};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Longest wait for the response head or for the next body chunk.
    pub idle_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(15),
            user_agent: concat!("harvester/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches one remote file onto disk.
#[async_trait::async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    /// On failure nothing is left at `dest`.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| DownloadError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn next_chunk<S>(&self, stream: &mut S) -> Result<Option<Bytes>, DownloadError>
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
    {
        match timeout(self.settings.idle_timeout, stream.next()).await {
            Err(_) => Err(timeout_error()),
            Ok(None) => Ok(None),
            Ok(Some(chunk)) => chunk.map(Some).map_err(map_reqwest_error),
        }
    }
}

#[async_trait::async_trait]
impl MediaFetcher for ReqwestFetcher {
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| DownloadError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = timeout(self.settings.idle_timeout, self.client.get(parsed).send())
            .await
            .map_err(|_| timeout_error())?
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        // Stream into a temp file beside the target; it is removed on drop
        // unless persisted, so an aborted body leaves nothing behind.
        let dir = dest
            .parent()
            .ok_or_else(|| DownloadError::new(FailureKind::Io, "destination has no parent"))?;
        let tmp = create_temp_in(dir).map_err(io_error)?;
        let mut file = tokio::fs::File::from_std(tmp.reopen().map_err(io_error)?);

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = self.next_chunk(&mut stream).await? {
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;
        drop(file);

        tmp.persist(dest).map_err(|err| io_error(err.error))?;
        Ok(written)
    }
}

/// Temp file created with the same mode as a plainly written file, so the
/// persisted download is not left owner-only.
fn create_temp_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn timeout_error() -> DownloadError {
    DownloadError::new(FailureKind::Timeout, "Timeout")
}

fn io_error(err: std::io::Error) -> DownloadError {
    DownloadError::new(FailureKind::Io, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::new(FailureKind::Timeout, err.to_string());
    }
    DownloadError::new(FailureKind::Network, err.to_string())
}
