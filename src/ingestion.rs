//! Live ingestion - async channel processor for inbound events
//!
//! Main loop:
//! 1. Receives events from the platform bridge via mpsc channel
//! 2. Routes designated-channel messages through the parser into the store
//! 3. Answers stats requests through the command handler and reply sink
//! 4. Logs throughput periodically
//!
//! Nothing in here may take the loop down: parse misses are silent and
//! reply failures are logged.

use crate::commands;
use crate::events::InboundEvent;
use crate::model::ChatMessage;
use crate::parser;
use crate::reply::ReplySink;
use crate::store::ScoreStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Parse `message` and append any score to the store
///
/// Returns whether a score was recorded.
pub fn ingest_message(store: &ScoreStore, message: &ChatMessage) -> bool {
    match parser::parse(&message.content, message.created_at) {
        Some(record) => {
            log::debug!(
                "🎯 Recorded puzzle {} ({}/{}{}) for {}",
                record.puzzle_number,
                record.attempts,
                record.max_attempts,
                if record.hard_mode { "*" } else { "" },
                message.author_id
            );
            store.record(&message.author_id, record);
            true
        }
        None => {
            log::trace!("No score in message {}", message.id);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionTotals {
    pub messages: u64,
    pub recorded: u64,
    pub ignored_channel: u64,
    pub commands: u64,
}

/// Run the live event loop until the channel closes
///
/// Arguments:
/// - `rx`: Receiver end of the inbound event channel
/// - `store`: Shared score store
/// - `sink`: Reply sink for command responses
/// - `channel`: Designated channel name; messages elsewhere are ignored
pub async fn start_event_ingestion(
    mut rx: mpsc::Receiver<InboundEvent>,
    store: Arc<ScoreStore>,
    sink: Arc<dyn ReplySink>,
    channel: String,
) -> IngestionTotals {
    log::info!("🚀 Starting live ingestion");
    log::info!("   ├─ Channel: #{}", channel);
    log::info!("   └─ Reply sink: {}", sink.sink_type());

    let mut totals = IngestionTotals::default();
    let mut report_timer = interval(Duration::from_secs(30));
    report_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut window_recorded = 0u64;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    log::warn!("⚠️  Event channel closed, stopping ingestion");
                    break;
                };

                match event {
                    InboundEvent::Message { channel: from, message } if from == channel => {
                        totals.messages += 1;
                        if ingest_message(&store, &message) {
                            totals.recorded += 1;
                            window_recorded += 1;
                        }
                    }
                    InboundEvent::Message { .. } => {
                        totals.ignored_channel += 1;
                    }
                    InboundEvent::Stats { period } => {
                        totals.commands += 1;
                        let reply = commands::handle_stats(&store, &period, &chrono::Local::now());
                        if let Err(e) = sink.send(&reply).await {
                            log::error!("❌ Failed to send reply for '{}': {}", period, e);
                        }
                    }
                }
            }

            _ = report_timer.tick() => {
                if window_recorded > 0 {
                    log::info!(
                        "📊 Live ingest: {} new scores (total: {} scores from {} messages, {} users)",
                        window_recorded,
                        totals.recorded,
                        totals.messages,
                        store.user_count()
                    );
                    window_recorded = 0;
                }
            }
        }
    }

    log::info!(
        "✅ Live ingestion stopped: {} messages, {} scores, {} commands",
        totals.messages,
        totals.recorded,
        totals.commands
    );
    totals
}
