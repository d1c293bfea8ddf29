//! Core data model: parsed score records and derived per-user statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel attempt count for an unsolved puzzle (`X/6`)
pub const FAILED_ATTEMPT: u8 = 7;

/// Platform user identifier (opaque, compared as a string)
pub type UserId = String;

/// Opaque pagination marker referencing a single message
pub type MessageId = String;

/// One parsed puzzle result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub puzzle_number: u64,
    /// 1..=6 for a solve, `FAILED_ATTEMPT` for a miss
    pub attempts: u8,
    pub max_attempts: u32,
    pub hard_mode: bool,
    /// Creation time of the originating message
    pub timestamp: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn is_failure(&self) -> bool {
        self.attempts == FAILED_ATTEMPT
    }
}

/// A chat message as delivered by either the history source or the live stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Attempt distribution with one slot per outcome: 1..=6 and X
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    slots: [u32; 7],
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record; attempts outside 1..=7 are ignored
    pub fn add(&mut self, attempts: u8) {
        if (1..=FAILED_ATTEMPT).contains(&attempts) {
            self.slots[(attempts - 1) as usize] += 1;
        }
    }

    /// Count for a solved bucket (1..=6)
    pub fn solved_in(&self, attempts: u8) -> u32 {
        match attempts {
            1..=6 => self.slots[(attempts - 1) as usize],
            _ => 0,
        }
    }

    pub fn failed(&self) -> u32 {
        self.slots[6]
    }

    pub fn total(&self) -> u32 {
        self.slots.iter().sum()
    }

    /// Slots in display order: 1, 2, 3, 4, 5, 6, X
    pub fn slots(&self) -> &[u32; 7] {
        &self.slots
    }
}

/// Ranked statistics for one user inside a window (never persisted)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStat {
    pub user_id: UserId,
    pub total_games: u32,
    /// Mean attempts, rounded half away from zero to 2 decimals
    pub average_score: f64,
    pub distribution: Distribution,
}
