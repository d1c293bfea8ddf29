//! Inbound live events (JSON lines from the platform bridge)

use crate::model::ChatMessage;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A new message posted in `channel`
    Message { channel: String, message: ChatMessage },
    /// A leaderboard request; `period` is validated by the command handler
    Stats { period: String },
}

impl InboundEvent {
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Read JSON-lines events from `reader` into `tx` until EOF or the receiver
/// is dropped
///
/// Returns the number of events forwarded. Undecodable lines are skipped.
pub async fn forward_lines<R>(reader: R, tx: mpsc::Sender<InboundEvent>) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match InboundEvent::from_line(line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    log::warn!("⚠️  Event channel closed, stopping reader");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => {
                log::warn!("⚠️  Skipping undecodable event line: {}", e);
            }
        }
    }

    Ok(forwarded)
}
