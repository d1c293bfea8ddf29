//! Append-only in-memory score store
//!
//! One ordered history per user, in first-seen user order. Both the live
//! event loop and the backfill crawler append through a shared
//! `Arc<ScoreStore>`; each append happens under a single lock acquisition so
//! a record is inserted atomically.

use crate::model::{ScoreRecord, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Snapshot of one user's records, in append order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHistory {
    pub user_id: UserId,
    pub records: Vec<ScoreRecord>,
}

#[derive(Default)]
struct StoreInner {
    /// Position of each user in `histories`
    index: HashMap<UserId, usize>,
    histories: Vec<UserHistory>,
}

/// Process-scoped score store
#[derive(Default)]
pub struct ScoreStore {
    inner: Mutex<StoreInner>,
}

impl ScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is recovered: an append never leaves the inner state half-written.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record to `user_id`'s history, creating it on first use
    pub fn record(&self, user_id: &str, record: ScoreRecord) {
        let mut inner = self.lock();
        let StoreInner { index, histories } = &mut *inner;

        let slot = *index.entry(user_id.to_string()).or_insert_with(|| {
            histories.push(UserHistory {
                user_id: user_id.to_string(),
                records: Vec::new(),
            });
            histories.len() - 1
        });

        histories[slot].records.push(record);
    }

    /// Point-in-time copy of every user's history, in first-seen order
    pub fn all_users(&self) -> Vec<UserHistory> {
        self.lock().histories.clone()
    }

    pub fn user_count(&self) -> usize {
        self.lock().histories.len()
    }

    /// Total records across all users
    pub fn record_count(&self) -> usize {
        self.lock().histories.iter().map(|h| h.records.len()).sum()
    }
}
