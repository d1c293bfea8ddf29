//! Historical backfill crawler
//!
//! Pages backwards through channel history exactly once, newest-first,
//! until one of:
//! - an empty page,
//! - an undersized page (start of history),
//! - a message older than the horizon (one year before the crawl started).
//!
//! ```text
//! Start ──► Fetch ──page──► process_page ──Continue──► sleep ──► Fetch
//!             │                  │
//!             └─empty─► Done ◄───┴─Exhausted / HorizonReached
//! ```
//!
//! Page processing is synchronous and network-free so termination rules can
//! be tested without a source. Fetch errors abort the crawl and surface the
//! partial totals in [`BackfillError`].

use crate::model::{ChatMessage, MessageId};
use crate::parser;
use crate::source::{MessageSource, SourceError, MAX_PAGE_SIZE};
use crate::store::ScoreStore;
use chrono::{DateTime, Months, Utc};
use std::time::Duration;

/// How far back the crawl reaches
pub const HORIZON_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Start,
    Fetch,
    Done,
}

/// Result of processing one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Full page inside the horizon: more history may exist
    Continue,
    /// Empty or undersized page: upstream history is exhausted
    Exhausted,
    /// A message older than the horizon was reached
    HorizonReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    HorizonReached,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages: u32,
    /// Messages inside the horizon that were run through the parser
    pub scanned: u64,
    /// Score records appended to the store
    pub recorded: u64,
    pub stop: Option<StopReason>,
}

#[derive(Debug)]
pub struct BackfillError {
    pub report: CrawlReport,
    pub source: SourceError,
}

impl std::fmt::Display for BackfillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Backfill aborted after {} pages ({} scanned, {} recorded): {}",
            self.report.pages, self.report.scanned, self.report.recorded, self.source
        )
    }
}

impl std::error::Error for BackfillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub struct BackfillCrawler {
    state: CrawlState,
    horizon: DateTime<Utc>,
    batch_size: usize,
    page_delay: Duration,
    cursor: Option<MessageId>,
    report: CrawlReport,
}

impl BackfillCrawler {
    /// Crawler whose horizon is one year before `started_at`
    pub fn new(started_at: DateTime<Utc>, page_delay: Duration) -> Self {
        let horizon = started_at
            .checked_sub_months(Months::new(HORIZON_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::with_horizon(horizon, page_delay)
    }

    pub fn with_horizon(horizon: DateTime<Utc>, page_delay: Duration) -> Self {
        Self {
            state: CrawlState::Start,
            horizon,
            batch_size: MAX_PAGE_SIZE,
            page_delay,
            cursor: None,
            report: CrawlReport {
                pages: 0,
                scanned: 0,
                recorded: 0,
                stop: None,
            },
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn horizon(&self) -> DateTime<Utc> {
        self.horizon
    }

    pub fn cursor(&self) -> Option<&MessageId> {
        self.cursor.as_ref()
    }

    pub fn report(&self) -> &CrawlReport {
        &self.report
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn finish(&mut self, reason: StopReason) {
        self.state = CrawlState::Done;
        self.report.stop = Some(reason);
    }

    /// Feed one fetched page (newest-first) through the parser into `store`
    pub fn process_page(&mut self, page: &[ChatMessage], store: &ScoreStore) -> PageOutcome {
        self.report.pages += 1;

        if page.is_empty() {
            self.finish(StopReason::Exhausted);
            return PageOutcome::Exhausted;
        }

        for message in page {
            if message.created_at < self.horizon {
                self.finish(StopReason::HorizonReached);
                return PageOutcome::HorizonReached;
            }

            self.report.scanned += 1;
            if let Some(record) = parser::parse(&message.content, message.created_at) {
                log::trace!(
                    "Backfilled puzzle {} for {} ({})",
                    record.puzzle_number,
                    message.author_id,
                    message.id
                );
                store.record(&message.author_id, record);
                self.report.recorded += 1;
            }
        }

        // Oldest message of the page is the last one delivered
        self.cursor = page.last().map(|m| m.id.clone());

        if page.len() < self.batch_size {
            self.finish(StopReason::Exhausted);
            PageOutcome::Exhausted
        } else {
            self.state = CrawlState::Fetch;
            PageOutcome::Continue
        }
    }

    /// Drive the crawl to completion against `source`
    ///
    /// A crawler that already finished returns its previous report without
    /// touching the source again.
    pub async fn run(
        &mut self,
        source: &dyn MessageSource,
        store: &ScoreStore,
    ) -> Result<CrawlReport, BackfillError> {
        if self.state == CrawlState::Done {
            log::warn!("⚠️  Backfill already finished, not restarting");
            return Ok(self.report.clone());
        }

        log::info!(
            "📜 Starting backfill from {} (horizon: {}, delay: {}ms)",
            source.source_type(),
            self.horizon.to_rfc3339(),
            self.page_delay.as_millis()
        );
        self.state = CrawlState::Fetch;

        loop {
            let page = match source.fetch_page(self.cursor.as_ref(), self.batch_size).await {
                Ok(page) => page,
                Err(e) => {
                    self.finish(StopReason::Aborted);
                    log::error!(
                        "❌ Backfill fetch failed after {} pages ({} scanned, {} recorded): {}",
                        self.report.pages,
                        self.report.scanned,
                        self.report.recorded,
                        e
                    );
                    return Err(BackfillError {
                        report: self.report.clone(),
                        source: e,
                    });
                }
            };

            let outcome = self.process_page(&page, store);
            log::debug!(
                "   ├─ Page {}: {} messages, {:?} (scanned: {}, recorded: {})",
                self.report.pages,
                page.len(),
                outcome,
                self.report.scanned,
                self.report.recorded
            );

            if outcome != PageOutcome::Continue {
                break;
            }

            tokio::time::sleep(self.page_delay).await;
        }

        log::info!(
            "✅ Backfill complete: {} pages, {} messages scanned, {} scores recorded ({:?})",
            self.report.pages,
            self.report.scanned,
            self.report.recorded,
            self.report.stop
        );
        Ok(self.report.clone())
    }
}
