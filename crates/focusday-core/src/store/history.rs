//! Snapshot-based undo/redo over the whole state tree.
//!
//! Full deep copies per mutation rather than diffs; the state is small
//! enough that simplicity wins. Snapshots never alias live state in
//! either direction: recording clones the pre-mutation state, and
//! restoring hands the caller an owned value to move into place.

use std::collections::VecDeque;

use crate::model::AppState;

/// Maximum number of retained undo snapshots.
pub const MAX_SNAPSHOTS: usize = 50;

/// Linear undo/redo history of full-state snapshots.
///
/// `record` is called with the state as it exists immediately before a
/// mutation, so the very first mutation makes the loaded/default state
/// undoable. A new mutation after an undo discards the redo branch; once
/// the window is full the oldest snapshot is evicted, keeping the most
/// recent [`MAX_SNAPSHOTS`] mutations undoable.
#[derive(Debug, Default)]
pub struct History {
    past: VecDeque<AppState>,
    future: Vec<AppState>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded undo snapshots.
    pub fn depth(&self) -> usize {
        self.past.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Record the state as it exists right before a mutation.
    pub fn record(&mut self, pre_state: &AppState) {
        self.future.clear();
        self.past.push_back(pre_state.clone());
        if self.past.len() > MAX_SNAPSHOTS {
            self.past.pop_front();
        }
    }

    /// Step back one mutation. `live` is the current state, which becomes
    /// redoable; the returned snapshot is the new live state. `None` when
    /// the history is exhausted.
    #[must_use]
    pub fn undo(&mut self, live: &AppState) -> Option<AppState> {
        let previous = self.past.pop_back()?;
        self.future.push(live.clone());
        Some(previous)
    }

    /// Step forward one undone mutation. `None` when there is nothing to
    /// redo.
    #[must_use]
    pub fn redo(&mut self, live: &AppState) -> Option<AppState> {
        let next = self.future.pop()?;
        self.past.push_back(live.clone());
        Some(next)
    }

    /// Forget everything (state import or reset).
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyLevel;
    use crate::model::Task;

    fn state_with_tasks(n: usize) -> AppState {
        let mut state = AppState::default();
        for i in 0..n {
            let mut task = Task::new(format!("task {i}"), EnergyLevel::Medium);
            task.id = format!("task-{i}");
            state.tasks.push(task);
        }
        state
    }

    #[test]
    fn empty_history_cannot_undo_or_redo() {
        let mut history = History::new();
        let live = AppState::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo(&live).is_none());
        assert!(history.redo(&live).is_none());
    }

    #[test]
    fn undo_returns_the_pre_mutation_state() {
        let mut history = History::new();
        let initial = state_with_tasks(0);
        let after = state_with_tasks(1);

        history.record(&initial);
        let restored = history.undo(&after).unwrap();
        assert_eq!(restored, initial);
        assert!(history.can_redo());
    }

    #[test]
    fn redo_restores_the_pre_undo_state() {
        let mut history = History::new();
        let initial = state_with_tasks(0);
        let after = state_with_tasks(1);

        history.record(&initial);
        let undone = history.undo(&after).unwrap();
        let redone = history.redo(&undone).unwrap();
        assert_eq!(redone, after);
        assert!(!history.can_redo());
    }

    #[test]
    fn full_undo_walks_back_to_the_first_state() {
        let mut history = History::new();
        let states: Vec<AppState> = (0..6).map(state_with_tasks).collect();
        for window in states.windows(2) {
            history.record(&window[0]);
        }

        let mut live = states.last().unwrap().clone();
        for expected in states.iter().rev().skip(1) {
            live = history.undo(&live).unwrap();
            assert_eq!(&live, expected);
        }
        assert!(history.undo(&live).is_none());
    }

    #[test]
    fn a_new_mutation_discards_the_redo_branch() {
        let mut history = History::new();
        let a = state_with_tasks(0);
        let b = state_with_tasks(1);
        let c = state_with_tasks(2);

        history.record(&a);
        let live = history.undo(&b).unwrap();
        assert_eq!(live, a);

        // Diverge: mutate again from the restored state.
        history.record(&live);
        let _ = c;
        assert!(!history.can_redo());
    }

    #[test]
    fn window_is_capped_and_evicts_oldest_first() {
        let mut history = History::new();
        for i in 0..(MAX_SNAPSHOTS + 10) {
            history.record(&state_with_tasks(i));
        }
        assert_eq!(history.depth(), MAX_SNAPSHOTS);

        // The oldest surviving snapshot is the 11th one recorded.
        let mut live = state_with_tasks(MAX_SNAPSHOTS + 10);
        let mut last = None;
        while let Some(prev) = history.undo(&live) {
            live = prev.clone();
            last = Some(prev);
        }
        assert_eq!(last.unwrap(), state_with_tasks(10));
    }

    #[test]
    fn snapshots_do_not_alias_live_state() {
        let mut history = History::new();
        let mut live = state_with_tasks(1);
        history.record(&live);

        // Mutating live state after recording must not alter the snapshot.
        live.tasks[0].text = "mutated".into();
        let restored = history.undo(&live).unwrap();
        assert_eq!(restored.tasks[0].text, "task 0");
    }

    #[test]
    fn clear_forgets_both_directions() {
        let mut history = History::new();
        let a = state_with_tasks(0);
        let b = state_with_tasks(1);
        history.record(&a);
        let _ = history.undo(&b).unwrap();
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
