//! Player presence tracking
//!
//! Polls the game server's player list on a fixed interval, diffs it against
//! the last known set, and relays join/leave events to the notification
//! channel. Leave notices are short-lived: they are deleted a few seconds
//! after delivery, and the message bookkeeping that makes that possible is
//! purged periodically so it cannot grow without bound.

pub mod history;
pub mod parser;
pub mod tracker;

pub use history::NoticeHistory;
pub use parser::parse_player_list;
pub use tracker::{PresenceTracker, TrackerConfig};
