//! Windowed leaderboard aggregation
//!
//! Uses a strict inclusive time cutoff on both ends: records outside
//! `[start, end]` are excluded from every figure.

use crate::model::{Distribution, UserStat};
use crate::store::{ScoreStore, UserHistory};
use chrono::{DateTime, Utc};

/// Mean of `sum / count` in hundredths, rounded half away from zero
///
/// Computed in integers so exact half-cent means (41/40 = 1.025) round up
/// regardless of their binary float representation.
pub fn average_cents(sum: u64, count: u32) -> u64 {
    let count = u64::from(count);
    (sum * 200 + count) / (2 * count)
}

/// Compute ranked statistics for every user with at least one record in
/// `[start, end]`
///
/// Sorted ascending by average (lower is better). Users with equal rounded
/// averages keep the store's first-seen order.
pub fn aggregate(store: &ScoreStore, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<UserStat> {
    aggregate_histories(&store.all_users(), start, end)
}

/// Same as [`aggregate`] over an explicit snapshot
pub fn aggregate_histories(
    histories: &[UserHistory],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<UserStat> {
    let mut stats: Vec<UserStat> = histories
        .iter()
        .filter_map(|history| user_stat(history, start, end))
        .collect();

    // sort_by is stable, so ties stay in first-seen order
    stats.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    stats
}

fn user_stat(history: &UserHistory, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<UserStat> {
    let mut distribution = Distribution::new();
    let mut sum: u64 = 0;
    let mut count: u32 = 0;

    for record in history
        .records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= end)
    {
        distribution.add(record.attempts);
        sum += u64::from(record.attempts);
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(UserStat {
        user_id: history.user_id.clone(),
        total_games: count,
        average_score: average_cents(sum, count) as f64 / 100.0,
        distribution,
    })
}
