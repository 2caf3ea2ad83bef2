use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use engine_logging::engine_debug;
use harvester_core::{Attachment, CategoryRef, ChannelRef, FetchedMessage, MessageId};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{ChannelClient, ClientError, ClientFailure};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v9";

const KIND_TEXT: u32 = 0;
const KIND_CATEGORY: u32 = 4;
const KIND_ANNOUNCEMENT: u32 = 5;

#[derive(Debug, Clone)]
pub struct RestSettings {
    pub api_base: String,
    /// Sent verbatim as the `Authorization` header.
    pub token: Option<String>,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("harvester/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: u32,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    position: i64,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    #[serde(default)]
    attachments: Vec<WireAttachment>,
}

#[derive(Debug, Deserialize)]
struct WireAttachment {
    filename: String,
    url: String,
}

/// [`ChannelClient`] over the service's JSON REST API.
pub struct DiscordRestClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<String>,
    categories: Mutex<HashMap<String, Option<CategoryRef>>>,
}

impl DiscordRestClient {
    pub fn new(settings: RestSettings) -> Result<Self, ClientError> {
        let api_base = Url::parse(&settings.api_base)
            .map_err(|err| ClientError::new(ClientFailure::InvalidUrl, err.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(ClientError::new(
                ClientFailure::InvalidUrl,
                format!("{api_base} cannot be used as an API base"),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|err| ClientError::new(ClientFailure::Network, err.to_string()))?;
        Ok(Self {
            http,
            api_base,
            token: settings.token,
            categories: Mutex::new(HashMap::new()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a JSON document; a 404 yields `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, ClientError> {
        engine_debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::new(
                ClientFailure::Http(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|err| ClientError::new(ClientFailure::Decode, err.to_string()))
    }

    async fn category(&self, category_id: &str) -> Result<Option<CategoryRef>, ClientError> {
        if let Some(cached) = self.cached_category(category_id) {
            return Ok(cached);
        }
        let wire: Option<WireChannel> = self.get_json(self.endpoint(&["channels", category_id])).await?;
        let category = wire.map(|wire| CategoryRef {
            name: wire.name.unwrap_or_else(|| wire.id.clone()),
            id: wire.id,
        });
        self.cache_category(category_id, category.clone());
        Ok(category)
    }

    fn cached_category(&self, category_id: &str) -> Option<Option<CategoryRef>> {
        self.categories
            .lock()
            .ok()
            .and_then(|cache| cache.get(category_id).cloned())
    }

    fn cache_category(&self, category_id: &str, category: Option<CategoryRef>) {
        if let Ok(mut cache) = self.categories.lock() {
            cache.insert(category_id.to_string(), category);
        }
    }
}

#[async_trait::async_trait]
impl ChannelClient for DiscordRestClient {
    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelRef>, ClientError> {
        let Some(wire) = self
            .get_json::<WireChannel>(self.endpoint(&["channels", channel_id]))
            .await?
        else {
            return Ok(None);
        };

        let category = match wire.parent_id.as_deref() {
            Some(parent_id) => self.category(parent_id).await?,
            None => None,
        };
        Ok(Some(ChannelRef {
            name: wire.name.unwrap_or_else(|| wire.id.clone()),
            id: wire.id,
            category,
        }))
    }

    async fn fetch_messages_before(
        &self,
        channel_id: &str,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>, ClientError> {
        let mut url = self.endpoint(&["channels", channel_id, "messages"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.to_string());
            if let Some(before) = before {
                query.append_pair("before", &before.to_string());
            }
        }

        let wire: Vec<WireMessage> = self.get_json(url).await?.ok_or_else(|| {
            ClientError::new(ClientFailure::Http(404), format!("channel {channel_id} not found"))
        })?;

        wire.into_iter()
            .map(|message| {
                let id = message.id.parse::<MessageId>().map_err(|err| {
                    ClientError::new(
                        ClientFailure::Decode,
                        format!("message id {:?}: {err}", message.id),
                    )
                })?;
                let attachments = message
                    .attachments
                    .into_iter()
                    .map(|attachment| Attachment {
                        name: attachment.filename,
                        url: attachment.url,
                    })
                    .collect();
                Ok(FetchedMessage::new(id, attachments))
            })
            .collect()
    }

    async fn guild_channels(&self, guild_id: &str) -> Result<Vec<ChannelRef>, ClientError> {
        let mut wire: Vec<WireChannel> = self
            .get_json(self.endpoint(&["guilds", guild_id, "channels"]))
            .await?
            .ok_or_else(|| {
                ClientError::new(ClientFailure::Http(404), format!("server {guild_id} not found"))
            })?;
        wire.sort_by_key(|channel| channel.position);

        let categories: HashMap<String, CategoryRef> = wire
            .iter()
            .filter(|channel| channel.kind == KIND_CATEGORY)
            .map(|channel| {
                let category = CategoryRef {
                    id: channel.id.clone(),
                    name: channel.name.clone().unwrap_or_else(|| channel.id.clone()),
                };
                (channel.id.clone(), category)
            })
            .collect();
        for (id, category) in &categories {
            self.cache_category(id, Some(category.clone()));
        }

        Ok(wire
            .into_iter()
            .filter(|channel| matches!(channel.kind, KIND_TEXT | KIND_ANNOUNCEMENT))
            .map(|channel| ChannelRef {
                category: channel
                    .parent_id
                    .as_ref()
                    .and_then(|parent| categories.get(parent).cloned()),
                name: channel.name.unwrap_or_else(|| channel.id.clone()),
                id: channel.id,
            })
            .collect())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(ClientFailure::Timeout, err.to_string());
    }
    ClientError::new(ClientFailure::Network, err.to_string())
}
