//! Durable per-message cache of AI scores and workflow state.
//!
//! Freshness of scores is not filtered here; callers decide with
//! [`ScoreEntry::is_fresh`](crate::ScoreEntry::is_fresh).

mod repository;

pub use repository::CacheStore;
