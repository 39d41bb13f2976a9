//! Debounced media group aggregator

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::types::{GroupKey, MediaGroup, MediaItem};

/// Quiet period used when none is configured
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1200);

/// Called once per flushed batch, outside the aggregator lock
pub type FlushFn = Arc<dyn Fn(MediaGroup) + Send + Sync>;

/// An open batch and the timer that will flush it
struct Pending {
    group: MediaGroup,
    /// Identifies the live timer; a timer whose id no longer matches is stale
    timer_id: u64,
    timer: JoinHandle<()>,
}

/// State shared with timer tasks
struct Inner {
    debounce: Duration,
    on_flush: FlushFn,
    groups: Mutex<HashMap<GroupKey, Pending>>,
    next_timer: AtomicU64,
}

impl Inner {
    fn groups(&self) -> MutexGuard<'_, HashMap<GroupKey, Pending>> {
        self.groups.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Timer expiry: remove the batch if this timer is still the live one
    fn expire(&self, key: &GroupKey, timer_id: u64) {
        let group = {
            let mut groups = self.groups();
            match groups.get(key) {
                Some(pending) if pending.timer_id == timer_id => {
                    groups.remove(key).map(|p| p.group)
                }
                Some(_) => {
                    debug!(?key, timer_id, "Aggregator::expire: superseded timer, ignoring");
                    None
                }
                None => {
                    debug!(?key, timer_id, "Aggregator::expire: already flushed, ignoring");
                    None
                }
            }
        };

        if let Some(group) = group {
            info!(
                chat_id = group.chat_id,
                group_id = %group.group_id,
                items = group.file_refs.len(),
                "Flushing media group"
            );
            (self.on_flush)(group);
        }
    }
}

/// Coalesces bursts of media group items into single batches
///
/// Each [`Aggregator::add`] for a key restarts that key's quiet-period timer.
/// When a timer runs out the batch is removed and handed to the flush
/// callback exactly once. Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("debounce", &self.inner.debounce)
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl Aggregator {
    /// Create an aggregator; a zero debounce falls back to [`DEFAULT_DEBOUNCE`]
    pub fn new(debounce: Duration, on_flush: FlushFn) -> Self {
        let debounce = if debounce.is_zero() { DEFAULT_DEBOUNCE } else { debounce };
        debug!(?debounce, "Aggregator::new: called");
        Self {
            inner: Arc::new(Inner {
                debounce,
                on_flush,
                groups: Mutex::new(HashMap::new()),
                next_timer: AtomicU64::new(1),
            }),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Add an item to its batch and restart the batch timer
    ///
    /// Items without a group id or attachment reference are dropped.
    pub fn add(&self, item: MediaItem) {
        debug!(chat_id = item.chat_id, group_id = %item.group_id, "Aggregator::add: called");
        if !item.is_groupable() {
            debug!("Aggregator::add: missing group id or file ref, dropping");
            return;
        }

        let key = item.key();
        let timer_id = self.inner.next_timer.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + self.inner.debounce;

        let mut groups = self.inner.groups();
        let timer = self.spawn_timer(key.clone(), timer_id, deadline);
        match groups.get_mut(&key) {
            Some(pending) => {
                debug!(?key, items = pending.group.file_refs.len() + 1, "Aggregator::add: extending batch");
                pending.group.push(item);
                pending.timer.abort();
                pending.timer = timer;
                pending.timer_id = timer_id;
            }
            None => {
                debug!(?key, "Aggregator::add: opening batch");
                groups.insert(
                    key,
                    Pending {
                        group: MediaGroup::start(item),
                        timer_id,
                        timer,
                    },
                );
            }
        }
    }

    fn spawn_timer(&self, key: GroupKey, timer_id: u64, deadline: Instant) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            inner.expire(&key, timer_id);
        })
    }

    /// Number of open batches
    pub fn pending_count(&self) -> usize {
        self.inner.groups().len()
    }

    /// Flush every open batch now, in no particular order
    pub fn flush_all(&self) -> usize {
        debug!("Aggregator::flush_all: called");
        let drained: Vec<Pending> = self.inner.groups().drain().map(|(_, p)| p).collect();
        let count = drained.len();
        for pending in drained {
            pending.timer.abort();
            (self.inner.on_flush)(pending.group);
        }
        debug!(count, "Aggregator::flush_all: done");
        count
    }
}
