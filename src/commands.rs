//! Stats command handling: period → window → ranked leaderboard reply

use crate::aggregator;
use crate::model::UserStat;
use crate::reply::{Reply, ReplyEntry};
use crate::store::ScoreStore;
use crate::window::Period;
use chrono::{DateTime, TimeZone};

/// Maximum rows in a leaderboard reply
pub const LEADERBOARD_SIZE: usize = 10;

const RANK_MARKERS: [&str; 4] = ["🥇", "🥈", "🥉", "🏅"];
const BUCKET_LABELS: [&str; 7] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "❌"];

/// Handle a raw period selector
///
/// Unknown selectors are rejected rather than answered with an empty window.
pub fn handle_stats<Tz: TimeZone>(store: &ScoreStore, selector: &str, now: &DateTime<Tz>) -> Reply
where
    Tz::Offset: std::fmt::Display,
{
    match Period::from_str(selector) {
        Some(period) => leaderboard(store, period, now),
        None => {
            log::warn!("⚠️  Rejected stats request with unknown period '{}'", selector);
            Reply::UnknownPeriod {
                requested: selector.to_string(),
            }
        }
    }
}

/// Build the leaderboard reply for `period` ending at `now`
pub fn leaderboard<Tz: TimeZone>(store: &ScoreStore, period: Period, now: &DateTime<Tz>) -> Reply
where
    Tz::Offset: std::fmt::Display,
{
    let (start, end) = period.window(now);
    let stats = aggregator::aggregate(store, start, end);

    let tz = now.timezone();
    let title = format!("Wordle Leaderboard: {}", period.label());
    let range = format!(
        "{} to {}",
        start.with_timezone(&tz).format("%b %d, %Y"),
        end.with_timezone(&tz).format("%b %d, %Y")
    );

    log::debug!(
        "Leaderboard {} [{} .. {}]: {} ranked users",
        period.as_str(),
        start.to_rfc3339(),
        end.to_rfc3339(),
        stats.len()
    );

    if stats.is_empty() {
        return Reply::NoData { title, range };
    }

    let entries = stats
        .iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(position, stat)| render_entry(position, stat))
        .collect();

    Reply::Leaderboard {
        title,
        range,
        entries,
    }
}

fn render_entry(position: usize, stat: &UserStat) -> ReplyEntry {
    let label = match RANK_MARKERS.get(position) {
        Some(marker) => format!("{} {}. <@{}>", marker, position + 1, stat.user_id),
        None => format!("{}. <@{}>", position + 1, stat.user_id),
    };

    let breakdown = BUCKET_LABELS
        .iter()
        .zip(stat.distribution.slots())
        .map(|(bucket, count)| format!("{} {}", bucket, count))
        .collect::<Vec<_>>()
        .join(" | ");

    ReplyEntry {
        label,
        body: format!(
            "Average: {:.2} | Games: {}\n{}",
            stat.average_score, stat.total_games, breakdown
        ),
    }
}
