//! Media group aggregation
//!
//! Chat transports deliver a multi-photo submission as separate messages
//! sharing a group id. The [`Aggregator`] collects them and emits one
//! [`MediaGroup`] per burst after a quiet period.

mod aggregator;
mod types;

pub use aggregator::{Aggregator, DEFAULT_DEBOUNCE, FlushFn};
pub use types::{GroupKey, MediaGroup, MediaItem};
