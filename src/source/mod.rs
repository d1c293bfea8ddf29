//! Historical message sources for the backfill crawler
//!
//! A source pages backwards through a channel's history, newest-first. The
//! crawler only relies on the ordering and on an undersized page meaning the
//! start of history has been reached.

pub mod discord;
pub mod jsonl;

use crate::config::HistoryConfig;
use crate::model::{ChatMessage, MessageId};
use async_trait::async_trait;

pub use discord::DiscordHistorySource;
pub use jsonl::JsonlHistorySource;

/// Upper bound on a single page, imposed by the platform
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug)]
pub enum SourceError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    Io(std::io::Error),
    UnknownCursor(MessageId),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Http(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err)
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Http(e) => write!(f, "HTTP error: {}", e),
            SourceError::Status { status, body } => {
                write!(f, "Unexpected status {}: {}", status, body)
            }
            SourceError::Decode(e) => write!(f, "Decode error: {}", e),
            SourceError::Io(e) => write!(f, "IO error: {}", e),
            SourceError::UnknownCursor(id) => write!(f, "Unknown pagination cursor: {}", id),
        }
    }
}

impl std::error::Error for SourceError {}

/// Paginated, newest-first access to a channel's message history
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch up to `limit` messages strictly older than `before`
    /// (the most recent messages when `before` is `None`)
    async fn fetch_page(
        &self,
        before: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, SourceError>;

    /// Source type for logging
    fn source_type(&self) -> &'static str;
}

/// Build the configured history source
///
/// `Ok(None)` means backfill should be skipped: either no source is
/// configured or the designated channel does not exist in the guild.
pub async fn open_history_source(
    history: &HistoryConfig,
    channel_name: &str,
) -> Result<Option<Box<dyn MessageSource>>, SourceError> {
    match history {
        HistoryConfig::Discord {
            api_base,
            token,
            guild_id,
        } => {
            let source = DiscordHistorySource::locate(api_base, token, guild_id, channel_name).await?;
            if source.is_none() {
                log::warn!("⚠️  No #{} channel in guild {}", channel_name, guild_id);
            }
            Ok(source.map(|s| Box::new(s) as Box<dyn MessageSource>))
        }
        HistoryConfig::File(path) => {
            let source = JsonlHistorySource::open(path).await?;
            Ok(Some(Box::new(source)))
        }
        HistoryConfig::Disabled => Ok(None),
    }
}
