//! Keyed store of preview states

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use super::selection::FRAME_SLOTS;
use super::state::PreviewState;

/// (chat id, user id)
pub type StateKey = (i64, i64);

/// Preview states keyed by chat and user
///
/// A state is created on first access and lives until [`PreviewStore::reset`].
/// Every value handed out has already been reconciled against its layout, and
/// `update` runs its closure under the store lock so read-modify-write
/// sequences are atomic.
#[derive(Debug)]
pub struct PreviewStore {
    slots: usize,
    states: Mutex<HashMap<StateKey, PreviewState>>,
}

impl Default for PreviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::with_slots(FRAME_SLOTS)
    }

    /// Store whose states select from `slots` frame templates
    pub fn with_slots(slots: usize) -> Self {
        debug!(slots, "PreviewStore::with_slots: called");
        Self {
            slots,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of the state for a key, creating it if needed
    pub async fn get(&self, chat_id: i64, user_id: i64) -> PreviewState {
        debug!(chat_id, user_id, "PreviewStore::get: called");
        let mut states = self.states.lock().await;
        let st = states
            .entry((chat_id, user_id))
            .or_insert_with(|| PreviewState::with_slots(self.slots));
        st.reconcile();
        st.clone()
    }

    /// Apply `f` to the state for a key and return the reconciled result
    pub async fn update<F>(&self, chat_id: i64, user_id: i64, f: F) -> PreviewState
    where
        F: FnOnce(&mut PreviewState),
    {
        debug!(chat_id, user_id, "PreviewStore::update: called");
        let mut states = self.states.lock().await;
        let st = states
            .entry((chat_id, user_id))
            .or_insert_with(|| PreviewState::with_slots(self.slots));
        f(st);
        st.reconcile();
        st.updated_at = Utc::now();
        st.clone()
    }

    /// Replace the state for a key with defaults
    pub async fn reset(&self, chat_id: i64, user_id: i64) -> PreviewState {
        debug!(chat_id, user_id, "PreviewStore::reset: called");
        self.update(chat_id, user_id, PreviewState::reset).await
    }

    /// Number of live states
    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::layout::{GridPreset, LayoutMode, VerticalCount};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_creates_default_lazily() {
        let store = PreviewStore::new();
        assert!(store.is_empty().await);
        let st = store.get(1, 2).await;
        assert_eq!(st.frame_count(), 9);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_returns_reconciled_snapshot() {
        let store = PreviewStore::new();
        let st = store
            .update(1, 2, |st| {
                st.mode = LayoutMode::Vertical;
                st.vertical_count = VerticalCount::new(2).unwrap();
            })
            .await;
        assert_eq!(st.frames().len(), 2);
        assert_eq!(store.get(1, 2).await.frames().selected(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = PreviewStore::new();
        store.update(1, 1, |st| st.grid_preset = GridPreset::OneByOne).await;
        assert_eq!(store.get(1, 1).await.frame_count(), 1);
        assert_eq!(store.get(1, 2).await.frame_count(), 9);
        assert_eq!(store.get(2, 1).await.frame_count(), 9);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let store = PreviewStore::new();
        store.update(5, 5, |st| st.note = "x".to_string()).await;
        let st = store.reset(5, 5).await;
        assert!(st.note.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_keep_invariant() {
        let store = Arc::new(PreviewStore::new());
        store.update(1, 1, |st| st.grid_preset = GridPreset::ThreeByTwo).await;

        let mut handles = Vec::new();
        for i in 0..32usize {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update(1, 1, |st| st.toggle_frame(i % 9)).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let st = store.get(1, 1).await;
        assert_eq!(st.frames().len(), 6);
    }

    #[tokio::test]
    async fn test_smaller_universe() {
        let store = PreviewStore::with_slots(4);
        let st = store.get(1, 1).await;
        assert_eq!(st.frame_count(), 4);
        assert_eq!(st.selection_order_for_output(), vec![0, 1, 2, 3]);
    }
}
