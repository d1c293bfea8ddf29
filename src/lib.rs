//! Wordle score tracking and leaderboards for a single chat channel
//!
//! ```text
//! history source ──► BackfillCrawler ─┐
//!                                      ├─► parser ──► ScoreStore ◄── aggregator ◄── commands ──► ReplySink
//! live events ─────► ingestion ───────┘
//! ```
//!
//! Scores live in memory for the lifetime of the process only.

pub mod aggregator;
pub mod commands;
pub mod config;
pub mod crawler;
pub mod events;
pub mod ingestion;
pub mod model;
pub mod parser;
pub mod reply;
pub mod source;
pub mod store;
pub mod window;

pub use aggregator::aggregate;
pub use crawler::{BackfillCrawler, BackfillError, CrawlReport};
pub use model::{ChatMessage, Distribution, ScoreRecord, UserStat};
pub use parser::parse;
pub use store::ScoreStore;
pub use window::Period;
