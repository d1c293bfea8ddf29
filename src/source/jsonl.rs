//! JSON-lines history export source
//!
//! Each non-blank line is one `ChatMessage`. The export is loaded once and
//! served newest-first, paging by message id like the REST source.

use super::{MessageSource, SourceError, MAX_PAGE_SIZE};
use crate::model::{ChatMessage, MessageId};
use async_trait::async_trait;
use std::path::Path;

pub struct JsonlHistorySource {
    /// Newest-first
    messages: Vec<ChatMessage>,
}

impl JsonlHistorySource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let source = Self::from_lines(&raw)?;
        log::info!(
            "📖 Loaded {} messages from {}",
            source.messages.len(),
            path.display()
        );
        Ok(source)
    }

    pub fn from_lines(raw: &str) -> Result<Self, SourceError> {
        let messages = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(serde_json::from_str::<ChatMessage>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_messages(messages))
    }

    pub fn from_messages(mut messages: Vec<ChatMessage>) -> Self {
        // Stable, so messages sharing a timestamp keep their export order
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[async_trait]
impl MessageSource for JsonlHistorySource {
    async fn fetch_page(
        &self,
        before: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, SourceError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = match before {
            None => 0,
            Some(cursor) => {
                self.messages
                    .iter()
                    .position(|m| &m.id == cursor)
                    .ok_or_else(|| SourceError::UnknownCursor(cursor.clone()))?
                    + 1
            }
        };

        Ok(self
            .messages
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn source_type(&self) -> &'static str {
        "jsonl"
    }
}
