//! Mention Scanning Module
//!
//! Turns a batch of forum posts into a ranked list of ticker candidates:
//! a counting pass over post text, then a deterministic sort-and-truncate.

pub mod counter;
pub mod ranker;

pub use counter::count_mentions;
pub use ranker::rank_mentions;
