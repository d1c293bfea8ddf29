//! Integration tests for the history backfill crawl
//!
//! Key properties tested:
//! - Every message inside the horizon is visited exactly once
//! - A horizon between two messages stops the crawl without further fetches
//! - Fetch errors abort with partial totals
//! - The inter-page delay is always applied

#[cfg(test)]
mod backfill_tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use wordle_stats::crawler::{BackfillCrawler, CrawlState, StopReason};
    use wordle_stats::model::{ChatMessage, MessageId};
    use wordle_stats::source::{MessageSource, SourceError};
    use wordle_stats::store::ScoreStore;

    fn latest() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 20, 0, 0).unwrap()
    }

    /// Synthetic source: `count` messages newest-first, one hour apart.
    /// Every message is a score line so visits can be counted from the store.
    struct SyntheticSource {
        messages: Vec<ChatMessage>,
        fetches: AtomicUsize,
        fail_on_fetch: Option<usize>,
        cursors: Mutex<Vec<Option<MessageId>>>,
    }

    impl SyntheticSource {
        fn new(count: usize) -> Self {
            let messages = (0..count)
                .map(|i| ChatMessage {
                    id: format!("{}", 10_000 - i),
                    author_id: format!("user{}", i % 4),
                    content: format!("Wordle {} {}/6", 1_000 + count - i, i % 6 + 1),
                    created_at: latest() - ChronoDuration::hours(i as i64),
                })
                .collect();
            Self {
                messages,
                fetches: AtomicUsize::new(0),
                fail_on_fetch: None,
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, fetch: usize) -> Self {
            self.fail_on_fetch = Some(fetch);
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageSource for SyntheticSource {
        async fn fetch_page(
            &self,
            before: Option<&MessageId>,
            limit: usize,
        ) -> Result<Vec<ChatMessage>, SourceError> {
            let fetch = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            self.cursors.lock().unwrap().push(before.cloned());

            if self.fail_on_fetch == Some(fetch) {
                return Err(SourceError::Status {
                    status: 429,
                    body: "rate limited".to_string(),
                });
            }

            let offset = match before {
                None => 0,
                Some(cursor) => self.messages.iter().position(|m| &m.id == cursor).unwrap() + 1,
            };
            Ok(self.messages.iter().skip(offset).take(limit).cloned().collect())
        }

        fn source_type(&self) -> &'static str {
            "synthetic"
        }
    }

    fn stored_puzzles(store: &ScoreStore) -> Vec<u64> {
        let mut puzzles: Vec<u64> = store
            .all_users()
            .into_iter()
            .flat_map(|h| h.records.into_iter().map(|r| r.puzzle_number))
            .collect();
        puzzles.sort_unstable();
        puzzles
    }

    #[tokio::test]
    async fn test_visits_every_message_once() {
        let source = SyntheticSource::new(250);
        let store = ScoreStore::new();
        let mut crawler = BackfillCrawler::with_horizon(latest() - ChronoDuration::days(365), Duration::ZERO);

        let report = crawler.run(&source, &store).await.unwrap();

        assert_eq!(crawler.state(), CrawlState::Done);
        assert_eq!(report.stop, Some(StopReason::Exhausted));
        assert_eq!(report.scanned, 250);
        assert_eq!(report.recorded, 250);
        assert_eq!(report.pages, 3);
        assert_eq!(source.fetches(), 3);

        let puzzles = stored_puzzles(&store);
        let expected: Vec<u64> = (1_001..=1_250).collect();
        assert_eq!(puzzles, expected, "each message stored exactly once");

        // Each cursor is the oldest id of the previous page
        let cursors = source.cursors.lock().unwrap().clone();
        assert_eq!(
            cursors,
            vec![None, Some("9901".to_string()), Some("9801".to_string())]
        );
    }

    #[tokio::test]
    async fn test_exact_multiple_of_batch_needs_empty_page() {
        let source = SyntheticSource::new(200);
        let store = ScoreStore::new();
        let mut crawler = BackfillCrawler::with_horizon(latest() - ChronoDuration::days(365), Duration::ZERO);

        let report = crawler.run(&source, &store).await.unwrap();

        assert_eq!(source.fetches(), 3);
        assert_eq!(report.scanned, 200);
        assert_eq!(store.record_count(), 200);
    }

    #[tokio::test]
    async fn test_horizon_between_messages_stops_without_more_fetches() {
        let source = SyntheticSource::new(500);
        let store = ScoreStore::new();
        // Messages 0..=149 are newer than the horizon, 150 onwards older
        let horizon = latest() - ChronoDuration::minutes(149 * 60 + 30);
        let mut crawler = BackfillCrawler::with_horizon(horizon, Duration::ZERO);

        let report = crawler.run(&source, &store).await.unwrap();

        assert_eq!(report.stop, Some(StopReason::HorizonReached));
        assert_eq!(report.scanned, 150);
        assert_eq!(store.record_count(), 150);
        assert_eq!(source.fetches(), 2, "no page fetched after crossing the horizon");
        assert!(store
            .all_users()
            .iter()
            .flat_map(|h| h.records.iter())
            .all(|r| r.timestamp >= horizon));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let source = SyntheticSource::new(0);
        let store = ScoreStore::new();
        let mut crawler = BackfillCrawler::new(latest(), Duration::ZERO);

        let report = crawler.run(&source, &store).await.unwrap();

        assert_eq!(report.scanned, 0);
        assert_eq!(report.stop, Some(StopReason::Exhausted));
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_with_partial_totals() {
        let source = SyntheticSource::new(350).failing_on(3);
        let store = ScoreStore::new();
        let mut crawler = BackfillCrawler::with_horizon(latest() - ChronoDuration::days(365), Duration::ZERO);

        let err = crawler.run(&source, &store).await.unwrap_err();

        assert_eq!(err.report.scanned, 200);
        assert_eq!(err.report.recorded, 200);
        assert_eq!(err.report.stop, Some(StopReason::Aborted));
        assert!(matches!(err.source, SourceError::Status { status: 429, .. }));
        assert!(err.to_string().contains("200 scanned"));
        assert_eq!(store.record_count(), 200, "partial history is kept");
        assert_eq!(source.fetches(), 3, "no automatic retry");
    }

    #[tokio::test]
    async fn test_finished_crawler_does_not_restart() {
        let source = SyntheticSource::new(10);
        let store = ScoreStore::new();
        let mut crawler = BackfillCrawler::new(latest(), Duration::ZERO);

        let first = crawler.run(&source, &store).await.unwrap();
        let second = crawler.run(&source, &store).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.fetches(), 1);
        assert_eq!(store.record_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_pages() {
        let source = SyntheticSource::new(301);
        let store = ScoreStore::new();
        let mut crawler =
            BackfillCrawler::with_horizon(latest() - ChronoDuration::days(365), Duration::from_millis(1_500));

        let started = tokio::time::Instant::now();
        let report = crawler.run(&source, &store).await.unwrap();

        // Four fetches, three delays between them
        assert_eq!(source.fetches(), 4);
        assert_eq!(report.scanned, 301);
        assert!(started.elapsed() >= Duration::from_millis(4_500));
        assert!(started.elapsed() < Duration::from_millis(6_000));
    }
}
