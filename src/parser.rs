//! Score-line parser
//!
//! Recognises result lines of the form `Wordle 1,234 3/6*` anywhere in a
//! message. Everything else in the channel is ordinary chatter and yields
//! `None`.

use crate::model::{ScoreRecord, FAILED_ATTEMPT};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn score_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bWordle\s+([0-9]{1,3}(?:[,.][0-9]{3})+|[0-9]+)\s+([1-6Xx])/([0-9]+)(\*)?")
            .expect("score line pattern is valid")
    })
}

/// Parse a message body into a score record stamped with `timestamp`
///
/// Pure: the same text and timestamp always produce the same result.
pub fn parse(text: &str, timestamp: DateTime<Utc>) -> Option<ScoreRecord> {
    let caps = score_line().captures(text)?;

    let puzzle_number = caps[1]
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse::<u64>()
        .ok()?;

    let attempts = match &caps[2] {
        "X" | "x" => FAILED_ATTEMPT,
        digit => digit.parse::<u8>().ok()?,
    };

    let max_attempts = caps[3].parse::<u32>().ok()?;

    Some(ScoreRecord {
        puzzle_number,
        attempts,
        max_attempts,
        hard_mode: caps.get(4).is_some(),
        timestamp,
    })
}
