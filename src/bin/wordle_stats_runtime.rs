//! Wordle Stats Runtime
//!
//! This binary orchestrates the stats service:
//! - Creates the process-wide ScoreStore
//! - Spawns the one-shot history backfill (when a source is configured)
//! - Reads live events (JSON lines) from stdin into the ingestion loop
//! - Writes command replies to stdout as JSON lines
//!
//! Usage:
//!   cargo run --release --bin wordle_stats_runtime < events.jsonl
//!
//! Environment variables:
//!   WORDLE_CHANNEL - Designated channel name (default: wordle)
//!   DISCORD_TOKEN / DISCORD_GUILD_ID - REST backfill credentials
//!   HISTORY_FILE - JSONL history export (used when no token is set)
//!   BACKFILL_PAGE_DELAY_MS - Delay between history pages (default: 1000)
//!   EVENT_CHANNEL_BUFFER - Live event channel size (default: 1000)

use dotenv::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use wordle_stats::config::RuntimeConfig;
use wordle_stats::crawler::BackfillCrawler;
use wordle_stats::events::{forward_lines, InboundEvent};
use wordle_stats::ingestion::start_event_ingestion;
use wordle_stats::reply::{ReplySink, StdoutSink};
use wordle_stats::source::open_history_source;
use wordle_stats::store::ScoreStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = RuntimeConfig::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.rust_log))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Wordle Stats Runtime");
    info!("   ├─ Channel: #{}", config.channel_name);
    info!("   ├─ History: {}", redacted(&config));
    info!("   ├─ Page delay: {}ms", config.page_delay_ms);
    info!("   └─ Event buffer: {}", config.event_buffer);

    let store = Arc::new(ScoreStore::new());

    // Backfill runs alongside live ingestion; both append to the same store
    let backfill_store = Arc::clone(&store);
    let backfill_config = config.clone();
    let backfill = tokio::spawn(async move {
        let source = match open_history_source(&backfill_config.history, &backfill_config.channel_name).await {
            Ok(Some(source)) => source,
            Ok(None) => {
                warn!("⚠️  No history source available, skipping backfill");
                return;
            }
            Err(e) => {
                error!("❌ Could not open history source, skipping backfill: {}", e);
                return;
            }
        };

        let mut crawler = BackfillCrawler::new(
            chrono::Utc::now(),
            Duration::from_millis(backfill_config.page_delay_ms),
        );
        if let Err(e) = crawler.run(source.as_ref(), &backfill_store).await {
            // Partial history stays in the store; live traffic keeps flowing
            error!("❌ {}", e);
            warn!("⚠️  Leaderboards only cover partially backfilled history");
        }
    });

    let (tx, rx) = mpsc::channel::<InboundEvent>(config.event_buffer);
    let sink: Arc<dyn ReplySink> = Arc::new(StdoutSink);
    let ingestion = tokio::spawn(start_event_ingestion(
        rx,
        Arc::clone(&store),
        sink,
        config.channel_name.clone(),
    ));

    let forwarded = forward_lines(BufReader::new(tokio::io::stdin()), tx).await?;
    info!("📭 Event input closed after {} events", forwarded);

    let totals = ingestion.await?;
    info!(
        "   └─ Live totals: {} messages, {} scores, {} commands",
        totals.messages, totals.recorded, totals.commands
    );

    if !backfill.is_finished() {
        info!("⏳ Waiting for backfill to finish...");
    }
    backfill.await?;

    info!(
        "✅ Shutdown: {} scores from {} users",
        store.record_count(),
        store.user_count()
    );
    Ok(())
}

fn redacted(config: &RuntimeConfig) -> String {
    use wordle_stats::config::HistoryConfig;

    match &config.history {
        HistoryConfig::Discord { api_base, guild_id, .. } => {
            format!("discord (guild {}, {})", guild_id, api_base)
        }
        HistoryConfig::File(path) => format!("file ({})", path),
        HistoryConfig::Disabled => "disabled".to_string(),
    }
}
