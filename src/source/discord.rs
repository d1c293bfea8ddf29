//! Discord REST history source
//!
//! ## API Reference
//!
//! - `GET {base}/guilds/{guild_id}/channels`: channel lookup by name
//! - `GET {base}/channels/{channel_id}/messages?limit=N&before=ID`: history
//!   page, newest-first, `limit` at most 100
//!
//! Requests authenticate with `Authorization: Bot <token>`.

use super::{MessageSource, SourceError, MAX_PAGE_SIZE};
use crate::model::{ChatMessage, MessageId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Guild text channels have type 0
const GUILD_TEXT: u8 = 0;

#[derive(Debug, Clone, Deserialize)]
struct ChannelPayload {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
    name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AuthorPayload {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagePayload {
    id: String,
    author: AuthorPayload,
    #[serde(default)]
    content: String,
    timestamp: DateTime<Utc>,
}

impl From<MessagePayload> for ChatMessage {
    fn from(payload: MessagePayload) -> Self {
        ChatMessage {
            id: payload.id,
            author_id: payload.author.id,
            content: payload.content,
            created_at: payload.timestamp,
        }
    }
}

pub struct DiscordHistorySource {
    client: reqwest::Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl DiscordHistorySource {
    pub fn new(api_base: &str, token: &str, channel_id: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    /// Find the text channel called `channel_name` in `guild_id`
    ///
    /// Returns `Ok(None)` when the guild has no such channel.
    pub async fn locate(
        api_base: &str,
        token: &str,
        guild_id: &str,
        channel_name: &str,
    ) -> Result<Option<Self>, SourceError> {
        let lookup = Self::new(api_base, token, "")?;
        let url = format!("{}/guilds/{}/channels", lookup.api_base, guild_id);
        let channels: Vec<ChannelPayload> = lookup.get_json(&url).await?;

        let Some(channel) = channels
            .into_iter()
            .find(|c| c.kind == GUILD_TEXT && c.name.as_deref() == Some(channel_name))
        else {
            return Ok(None);
        };

        log::info!("📍 Located #{} (channel {})", channel_name, channel.id);
        Ok(Some(Self {
            channel_id: channel.id,
            ..lookup
        }))
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl MessageSource for DiscordHistorySource {
    async fn fetch_page(
        &self,
        before: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, SourceError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let mut url = format!(
            "{}/channels/{}/messages?limit={}",
            self.api_base, self.channel_id, limit
        );
        if let Some(cursor) = before {
            url.push_str(&format!("&before={}", cursor));
        }

        let page: Vec<MessagePayload> = self.get_json(&url).await?;
        Ok(page.into_iter().map(ChatMessage::from).collect())
    }

    fn source_type(&self) -> &'static str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload_conversion() {
        let raw = r#"[{
            "id": "1200",
            "channel_id": "77",
            "author": {"id": "42", "username": "ana"},
            "content": "Wordle 1,000 3/6",
            "timestamp": "2024-03-10T08:15:00.000000+00:00",
            "attachments": []
        }]"#;

        let page: Vec<MessagePayload> = serde_json::from_str(raw).unwrap();
        let message = ChatMessage::from(page[0].clone());

        assert_eq!(message.id, "1200");
        assert_eq!(message.author_id, "42");
        assert_eq!(message.content, "Wordle 1,000 3/6");
        assert_eq!(message.created_at.to_rfc3339(), "2024-03-10T08:15:00+00:00");
    }

    #[test]
    fn test_channel_payload_filters_by_type() {
        let raw = r#"[
            {"id": "1", "type": 2, "name": "wordle"},
            {"id": "2", "type": 0, "name": "general"},
            {"id": "3", "type": 0, "name": "wordle"}
        ]"#;

        let channels: Vec<ChannelPayload> = serde_json::from_str(raw).unwrap();
        let found = channels
            .into_iter()
            .find(|c| c.kind == GUILD_TEXT && c.name.as_deref() == Some("wordle"))
            .unwrap();
        assert_eq!(found.id, "3");
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let source = DiscordHistorySource::new("https://example.test/api/", "t", "9").unwrap();
        assert_eq!(source.api_base, "https://example.test/api");
        assert_eq!(source.channel_id(), "9");
    }

    #[tokio::test]
    #[ignore] // Run only with DISCORD_TOKEN / DISCORD_TEST_CHANNEL set
    async fn test_fetch_live_page() {
        let token = std::env::var("DISCORD_TOKEN").unwrap();
        let channel = std::env::var("DISCORD_TEST_CHANNEL").unwrap();
        let source = DiscordHistorySource::new(DEFAULT_API_BASE, &token, &channel).unwrap();

        let page = source.fetch_page(None, 5).await.unwrap();
        assert!(page.len() <= 5);
    }
}
