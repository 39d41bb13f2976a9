//! Fixed-capacity frame selection with recency-based eviction
//!
//! A selection is an ordered set of slot indices drawn from `0..slots`.
//! Iteration order is recency order: the head is the least recently selected
//! slot and is the first to be evicted when a new slot pushes the selection
//! over capacity. Membership and the set of selected slots are the same
//! structure, so the order can never disagree with the selection.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of frame slots offered by the wizard
pub const FRAME_SLOTS: usize = 9;

/// Ordered set of selected slots, least recently selected first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSelection {
    slots: usize,
    order: IndexSet<usize>,
}

impl FrameSelection {
    /// All slots selected in ascending order
    pub fn full(slots: usize) -> Self {
        debug!(slots, "FrameSelection::full: called");
        Self {
            slots,
            order: (0..slots).collect(),
        }
    }

    /// Size of the slot universe
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Number of selected slots
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.order.contains(&idx)
    }

    /// Selected slots, least recently selected first
    pub fn order(&self) -> Vec<usize> {
        self.order.iter().copied().collect()
    }

    /// Selected slots in ascending index order
    pub fn selected(&self) -> Vec<usize> {
        let mut out = self.order();
        out.sort_unstable();
        out
    }

    /// Clamp a requested count into `[1, slots]`
    pub fn clamp_count(&self, n: usize) -> usize {
        n.max(1).min(self.slots.max(1))
    }

    /// Select every slot, ascending
    pub fn reset(&mut self) {
        debug!(slots = self.slots, "FrameSelection::reset: called");
        self.order = (0..self.slots).collect();
    }

    /// Bring the selection to exactly `n` slots
    ///
    /// A full board is reset to ascending order. Otherwise excess slots are
    /// dropped highest index first and missing slots are filled lowest index
    /// first; survivors keep their relative recency and new slots land at the
    /// recent end.
    pub fn reconcile(&mut self, n: usize) {
        let n = self.clamp_count(n);
        debug!(n, selected = self.order.len(), "FrameSelection::reconcile: called");

        if n == self.slots {
            if self.order.len() != n || !self.order.iter().copied().eq(0..n) {
                debug!("FrameSelection::reconcile: full board, resetting order");
                self.reset();
            }
            return;
        }

        // Stale entries from a previous universe are dropped first.
        let slots = self.slots;
        self.order.retain(|&idx| idx < slots);

        while self.order.len() > n {
            let Some(highest) = self.order.iter().copied().max() else {
                break;
            };
            debug!(highest, "FrameSelection::reconcile: dropping excess slot");
            self.order.shift_remove(&highest);
        }

        while self.order.len() < n {
            let Some(lowest) = self.lowest_unselected() else {
                break;
            };
            debug!(lowest, "FrameSelection::reconcile: filling missing slot");
            self.order.insert(lowest);
        }
    }

    /// Toggle one slot while keeping exactly `n` selected
    ///
    /// Out-of-range indices are clamped into the slot universe. On a full
    /// board every slot is mandatory and the toggle is ignored.
    pub fn toggle(&mut self, idx: usize, n: usize) {
        let n = self.clamp_count(n);
        if n == self.slots || self.slots == 0 {
            debug!(idx, "FrameSelection::toggle: full board, ignoring");
            return;
        }
        let idx = idx.min(self.slots - 1);

        if self.order.shift_remove(&idx) {
            debug!(idx, "FrameSelection::toggle: deselected, backfilling");
            while self.order.len() < n {
                let Some(lowest) = self.lowest_unselected() else {
                    break;
                };
                self.order.insert(lowest);
            }
            return;
        }

        debug!(idx, "FrameSelection::toggle: selected");
        self.order.insert(idx);
        while self.order.len() > n {
            // The slot just chosen always survives its own toggle.
            let Some(oldest) = self.order.iter().copied().find(|&s| s != idx) else {
                break;
            };
            debug!(oldest, "FrameSelection::toggle: evicting least recent");
            self.order.shift_remove(&oldest);
        }
    }

    /// The slots that feed output, in use order
    ///
    /// Takes the first `n` entries of the recency order and pads with the
    /// lowest unused selected slot, then the lowest unused slot at all.
    pub fn for_output(&self, n: usize) -> Vec<usize> {
        let n = self.clamp_count(n).min(self.slots);
        let mut out: Vec<usize> = self.order.iter().copied().take(n).collect();

        while out.len() < n {
            let next = (0..self.slots)
                .find(|i| !out.contains(i) && self.order.contains(i))
                .or_else(|| (0..self.slots).find(|i| !out.contains(i)));
            match next {
                Some(i) => out.push(i),
                None => break,
            }
        }
        out
    }

    fn lowest_unselected(&self) -> Option<usize> {
        (0..self.slots).find(|i| !self.order.contains(i))
    }
}

impl Default for FrameSelection {
    fn default() -> Self {
        Self::full(FRAME_SLOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selection(order: &[usize]) -> FrameSelection {
        FrameSelection {
            slots: FRAME_SLOTS,
            order: order.iter().copied().collect(),
        }
    }

    #[test]
    fn test_toggle_on_evicts_least_recent() {
        let mut sel = selection(&[0, 1, 2]);
        sel.toggle(5, 3);
        assert_eq!(sel.selected(), vec![1, 2, 5]);
        assert_eq!(sel.order(), vec![1, 2, 5]);
    }

    #[test]
    fn test_toggle_off_backfills_lowest() {
        let mut sel = selection(&[0, 1, 4]);
        sel.toggle(4, 3);
        assert_eq!(sel.order(), vec![0, 1, 2]);
    }

    #[test]
    fn test_toggle_off_lowest_moves_it_to_recent_end() {
        let mut sel = selection(&[0, 1, 2]);
        sel.toggle(0, 3);
        assert_eq!(sel.selected(), vec![0, 1, 2]);
        assert_eq!(sel.order(), vec![1, 2, 0]);
    }

    #[test]
    fn test_single_slot_toggle_moves_selection() {
        let mut sel = selection(&[3]);
        sel.toggle(7, 1);
        assert_eq!(sel.order(), vec![7]);
    }

    #[test]
    fn test_full_board_ignores_toggle() {
        let mut sel = FrameSelection::full(FRAME_SLOTS);
        sel.toggle(4, 9);
        assert_eq!(sel.order(), (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let mut sel = selection(&[0, 1]);
        sel.toggle(42, 2);
        assert_eq!(sel.order(), vec![1, 8]);
    }

    #[test]
    fn test_reconcile_shrink_drops_highest() {
        let mut sel = selection(&[6, 1, 8, 3]);
        sel.reconcile(2);
        assert_eq!(sel.order(), vec![1, 3]);
    }

    #[test]
    fn test_reconcile_grow_appends_lowest() {
        let mut sel = selection(&[5, 2]);
        sel.reconcile(4);
        assert_eq!(sel.order(), vec![5, 2, 0, 1]);
    }

    #[test]
    fn test_reconcile_full_board_resets_order() {
        let mut sel = selection(&[5, 2]);
        sel.reconcile(9);
        assert_eq!(sel.order(), (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_reconcile_clamps_count() {
        let mut sel = selection(&[5, 2]);
        sel.reconcile(0);
        assert_eq!(sel.len(), 1);
        sel.reconcile(99);
        assert_eq!(sel.len(), 9);
    }

    #[test]
    fn test_for_output_takes_recency_prefix() {
        let sel = selection(&[4, 1, 7]);
        assert_eq!(sel.for_output(3), vec![4, 1, 7]);
        assert_eq!(sel.for_output(2), vec![4, 1]);
    }

    #[test]
    fn test_for_output_pads_lowest_unused() {
        let sel = selection(&[4]);
        assert_eq!(sel.for_output(3), vec![4, 0, 1]);
    }

    #[test]
    fn test_universe_size_is_not_hard_coded() {
        let mut sel = FrameSelection::full(4);
        sel.reconcile(2);
        assert_eq!(sel.order(), vec![0, 1]);
        sel.toggle(3, 2);
        assert_eq!(sel.order(), vec![1, 3]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Toggle(usize),
        Resize(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0usize..12).prop_map(Op::Toggle), (0usize..12).prop_map(Op::Resize)]
    }

    proptest! {
        #[test]
        fn prop_selection_size_tracks_capacity(ops in proptest::collection::vec(op(), 1..60)) {
            let mut sel = FrameSelection::default();
            let mut n = 9usize;
            for op in ops {
                match op {
                    Op::Toggle(i) => sel.toggle(i, n),
                    Op::Resize(m) => {
                        n = m.clamp(1, 9);
                        sel.reconcile(n);
                    }
                }
                prop_assert_eq!(sel.len(), n);
                let mut sorted = sel.order();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), n);
                prop_assert!(sel.order().iter().all(|&i| i < 9));
                if n == 9 {
                    prop_assert_eq!(sel.order(), (0..9).collect::<Vec<_>>());
                }
            }
        }

        #[test]
        fn prop_toggled_on_slot_survives(start in proptest::collection::hash_set(0usize..9, 1..8), idx in 0usize..9) {
            let order: Vec<usize> = start.into_iter().collect();
            let n = order.len();
            let mut sel = selection(&order);
            let was_on = sel.contains(idx);
            sel.toggle(idx, n);
            if !was_on {
                prop_assert!(sel.contains(idx));
                prop_assert_eq!(sel.order().last().copied(), Some(idx));
            }
        }
    }
}
