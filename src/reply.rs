//! Reply sinks for formatted command responses

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

/// One leaderboard row: decorated label plus breakdown text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyEntry {
    pub label: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Leaderboard {
        title: String,
        range: String,
        entries: Vec<ReplyEntry>,
    },
    NoData {
        title: String,
        range: String,
    },
    UnknownPeriod {
        requested: String,
    },
}

#[derive(Debug)]
pub enum ReplyError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for ReplyError {
    fn from(err: std::io::Error) -> Self {
        ReplyError::Io(err)
    }
}

impl From<serde_json::Error> for ReplyError {
    fn from(err: serde_json::Error) -> Self {
        ReplyError::Serialization(err)
    }
}

impl std::fmt::Display for ReplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyError::Io(e) => write!(f, "IO error: {}", e),
            ReplyError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ReplyError {}

#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: &Reply) -> Result<(), ReplyError>;

    /// Sink type for logging
    fn sink_type(&self) -> &'static str;
}

/// Writes each reply as one JSON line on stdout
pub struct StdoutSink;

#[async_trait]
impl ReplySink for StdoutSink {
    async fn send(&self, reply: &Reply) -> Result<(), ReplyError> {
        let mut line = serde_json::to_vec(reply)?;
        line.push(b'\n');

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&line).await?;
        stdout.flush().await?;
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "stdout"
    }
}

/// Collects replies in memory
#[derive(Default)]
pub struct MemorySink {
    replies: Mutex<Vec<Reply>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ReplySink for MemorySink {
    async fn send(&self, reply: &Reply) -> Result<(), ReplyError> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(reply.clone());
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_serialization_is_tagged() {
        let reply = Reply::NoData {
            title: "Wordle Leaderboard: Today".to_string(),
            range: "Jan 01, 2024 to Jan 01, 2024".to_string(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "no_data");
        assert_eq!(json["title"], "Wordle Leaderboard: Today");
    }

    #[tokio::test]
    async fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        let reply = Reply::UnknownPeriod {
            requested: "week".to_string(),
        };
        sink.send(&reply).await.unwrap();
        assert_eq!(sink.replies(), vec![reply]);
        assert_eq!(sink.sink_type(), "memory");
    }
}
