//! Canonical application state and its mutation surface.
//!
//! The store owns the one live [`AppState`]. Every mutation runs the same
//! three steps, atomic from the caller's point of view:
//!
//! 1. snapshot the pre-mutation state into [`History`]
//! 2. apply the change in place
//! 3. persist the new state to durable storage
//!
//! Nested collections are never handed out mutably; edits go through the
//! closure-taking methods so that no mutation can bypass its snapshot.
//! Persistence failures never lose the in-memory mutation: the store
//! prunes old analytics and retries once, then continues in memory only.

mod history;
mod transfer;

pub use history::{History, MAX_SNAPSHOTS};
pub use transfer::ExportPayload;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::analytics;
use crate::energy::EnergyLevel;
use crate::error::{CoreError, Result, ValidationError};
use crate::model::{
    normalize_completion, AppState, Priority, Settings, Task, Thought, TimeBlock, PRIORITY_SLOTS,
};
use crate::session::FocusLedger;
use crate::storage::{KvStore, ANALYTICS_KEY, STATE_KEY};

/// How far back analytics records are kept when persistence runs out of
/// space.
const ANALYTICS_RETENTION_DAYS: i64 = 30;

/// Owner of the canonical application state.
pub struct Store<S: KvStore> {
    kv: S,
    state: AppState,
    history: History,
    /// Set after persistence has failed twice; the session then runs in
    /// memory only.
    degraded: bool,
}

impl<S: KvStore> Store<S> {
    /// Load state from storage.
    ///
    /// A missing or unreadable entry falls back to defaults; a readable
    /// one is decoded with defaults filling any missing fields, then
    /// structurally repaired and rolled over to the current day. Loading
    /// never fails.
    pub fn load(kv: S) -> Self {
        let mut state = match kv.get(STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AppState>(&raw) {
                Ok(state) => state,
                Err(err) => {
                    warn!(error = %err, "stored state unreadable, starting from defaults");
                    AppState::default()
                }
            },
            Ok(None) => AppState::default(),
            Err(err) => {
                warn!(error = %err, "state load failed, starting from defaults");
                AppState::default()
            }
        };
        state.migrate();
        state.roll_day(Utc::now().date_naive());

        let mut store = Self {
            kv,
            state,
            history: History::new(),
            degraded: false,
        };
        store.persist();
        store
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Read-only view of the live state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Whether persistence has been given up on for this session.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Look up a task by id. Collections are small; a scan is fine.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.state.tasks.iter().find(|t| t.id == id)
    }

    /// Look up a time block by id.
    pub fn time_block(&self, id: &str) -> Option<&TimeBlock> {
        self.state.time_blocks.iter().find(|b| b.id == id)
    }

    /// Tasks completed on the given calendar date. Falls back to the
    /// creation date when a completion timestamp is missing.
    pub fn tasks_completed_on(&self, date: NaiveDate) -> Vec<&Task> {
        self.state
            .tasks
            .iter()
            .filter(|t| {
                t.completed
                    && t.completed_at
                        .map(|at| at.date_naive())
                        .unwrap_or_else(|| t.created_at.date_naive())
                        == date
            })
            .collect()
    }

    /// The time block whose window covers `at`, if any.
    pub fn active_time_block(&self, at: NaiveTime) -> Option<&TimeBlock> {
        self.state.time_blocks.iter().find(|b| b.contains(at))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Edit one of the three priority slots in place.
    pub fn update_priority(
        &mut self,
        slot: u8,
        edit: impl FnOnce(&mut Priority),
    ) -> Result<(), ValidationError> {
        if slot == 0 || slot as usize > PRIORITY_SLOTS {
            return Err(ValidationError::InvalidPrioritySlot(slot));
        }
        self.mutate(|state| {
            let completed_now = {
                let priority = &mut state.priorities[(slot - 1) as usize];
                let was_completed = priority.completed;
                edit(priority);
                priority.id = slot;
                normalize_completion(priority.completed, &mut priority.completed_at);
                priority.completed && !was_completed
            };
            if completed_now {
                state.analytics.total_tasks_completed += 1;
            }
        });
        Ok(())
    }

    /// Create a task; returns its id.
    pub fn add_task(
        &mut self,
        text: impl Into<String>,
        energy: EnergyLevel,
        estimated_minutes: Option<u32>,
    ) -> String {
        let mut task = Task::new(text, energy);
        task.estimated_minutes = estimated_minutes;
        let id = task.id.clone();
        self.mutate(|state| state.tasks.push(task));
        id
    }

    /// Edit a task in place. Returns false when the id is unknown.
    pub fn update_task(&mut self, id: &str, edit: impl FnOnce(&mut Task)) -> bool {
        if !self.state.tasks.iter().any(|t| t.id == id) {
            return false;
        }
        self.mutate(|state| {
            let mut completed_now = false;
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                let was_completed = task.completed;
                edit(task);
                normalize_completion(task.completed, &mut task.completed_at);
                completed_now = task.completed && !was_completed;
            }
            if completed_now {
                state.analytics.total_tasks_completed += 1;
            }
        });
        true
    }

    /// Remove a task. Returns false when the id is unknown.
    pub fn delete_task(&mut self, id: &str) -> bool {
        if !self.state.tasks.iter().any(|t| t.id == id) {
            return false;
        }
        self.mutate(|state| state.tasks.retain(|t| t.id != id));
        true
    }

    /// Create a time block; returns its id.
    pub fn add_time_block(
        &mut self,
        start_time: &str,
        duration: u32,
        task: impl Into<String>,
        energy: EnergyLevel,
    ) -> Result<String, ValidationError> {
        let block = TimeBlock::new(start_time, duration, task, energy)?;
        let id = block.id.clone();
        self.mutate(|state| state.time_blocks.push(block));
        Ok(id)
    }

    /// Edit a time block in place. Returns false when the id is unknown.
    pub fn update_time_block(&mut self, id: &str, edit: impl FnOnce(&mut TimeBlock)) -> bool {
        if !self.state.time_blocks.iter().any(|b| b.id == id) {
            return false;
        }
        self.mutate(|state| {
            if let Some(block) = state.time_blocks.iter_mut().find(|b| b.id == id) {
                edit(block);
            }
        });
        true
    }

    /// Remove a time block. Returns false when the id is unknown.
    pub fn delete_time_block(&mut self, id: &str) -> bool {
        if !self.state.time_blocks.iter().any(|b| b.id == id) {
            return false;
        }
        self.mutate(|state| state.time_blocks.retain(|b| b.id != id));
        true
    }

    /// Capture a thought; returns its id.
    pub fn add_thought(&mut self, text: impl Into<String>) -> String {
        let thought = Thought::new(text);
        let id = thought.id.clone();
        self.mutate(|state| state.captured_thoughts.push(thought));
        id
    }

    /// Mark a captured thought as reviewed. Returns false when the id is
    /// unknown.
    pub fn review_thought(&mut self, id: &str) -> bool {
        if !self.state.captured_thoughts.iter().any(|t| t.id == id) {
            return false;
        }
        self.mutate(|state| {
            if let Some(thought) = state.captured_thoughts.iter_mut().find(|t| t.id == id) {
                thought.reviewed = true;
            }
        });
        true
    }

    /// Empty the capture list.
    pub fn clear_thoughts(&mut self) {
        self.mutate(|state| state.captured_thoughts.clear());
    }

    pub fn set_energy(&mut self, level: EnergyLevel) {
        self.mutate(|state| state.current_energy = level);
    }

    /// Advance the energy selector one step; returns the new level.
    pub fn cycle_energy(&mut self) -> EnergyLevel {
        let next = self.state.current_energy.next();
        self.set_energy(next);
        next
    }

    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) {
        self.mutate(|state| edit(&mut state.settings));
    }

    /// Note a break taken right now.
    pub fn record_break(&mut self) {
        self.mutate(|state| {
            state.analytics.total_breaks_taken += 1;
            state.last_break_time = Some(Utc::now());
        });
    }

    /// Add completed focus time to the running total.
    pub fn add_focus_minutes(&mut self, minutes: u32) {
        self.mutate(|state| state.analytics.total_focus_time += minutes);
    }

    /// Generic partial update: shallow-merge the top-level keys of
    /// `patch` over the current state. A patch that does not decode back
    /// into a valid state is rejected and the state is unchanged.
    pub fn apply_patch(&mut self, patch: Value) -> Result<()> {
        let Value::Object(fields) = patch else {
            return Err(CoreError::InvalidPatch("patch must be a JSON object".into()));
        };
        let merged = serde_json::to_value(&self.state)?;
        let Value::Object(mut current) = merged else {
            return Err(CoreError::InvalidPatch("state is not an object".into()));
        };
        for (key, value) in fields {
            current.insert(key, value);
        }
        let mut next: AppState = serde_json::from_value(Value::Object(current))
            .map_err(|err| CoreError::InvalidPatch(err.to_string()))?;
        next.migrate();
        self.mutate(|state| *state = next);
        Ok(())
    }

    // ── Undo/redo ────────────────────────────────────────────────────

    /// Step back one mutation. Returns false at the history boundary.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.state) {
            Some(previous) => {
                self.state = previous;
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Step forward one undone mutation. Returns false at the boundary.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.state) {
            Some(next) => {
                self.state = next;
                self.persist();
                true
            }
            None => false,
        }
    }

    // ── Import/export/reset ──────────────────────────────────────────

    /// Package the full state and the analytics log for export.
    pub fn export(&self) -> ExportPayload {
        ExportPayload {
            version: env!("CARGO_PKG_VERSION").to_string(),
            export_date: Utc::now(),
            state: self.state.clone(),
            analytics: self.stored_analytics(),
        }
    }

    /// Replace the state wholesale from an export payload.
    ///
    /// The current state is snapshotted first, so an import is undoable.
    /// A payload missing `version` or `state` is rejected with the state
    /// untouched.
    pub fn import(&mut self, json: &str) -> Result<()> {
        let payload = ExportPayload::parse(json)?;
        let mut next = payload.state;
        next.migrate();
        self.mutate(|state| *state = next);

        if !payload.analytics.is_null() {
            match serde_json::to_string(&payload.analytics) {
                Ok(raw) => {
                    if let Err(err) = self.kv.set(ANALYTICS_KEY, &raw) {
                        warn!(error = %err, "imported analytics not persisted");
                    }
                }
                Err(err) => warn!(error = %err, "imported analytics not serializable"),
            }
        }
        Ok(())
    }

    /// Return to defaults, discarding all history.
    pub fn reset(&mut self) {
        self.state = AppState::default();
        self.history.clear();
        self.persist();
    }

    /// Persist the current state outside a mutation; the host calls this
    /// on its periodic auto-save tick.
    pub fn flush(&mut self) {
        self.persist();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn mutate(&mut self, apply: impl FnOnce(&mut AppState)) {
        self.history.record(&self.state);
        apply(&mut self.state);
        self.persist();
    }

    /// Write the state entry. On failure, prune analytics older than the
    /// retention window and retry once; a second failure degrades the
    /// session to in-memory only. The in-memory state stays authoritative
    /// either way.
    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        let raw = match serde_json::to_string(&self.state) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "state serialization failed");
                return;
            }
        };
        if let Err(first) = self.kv.set(STATE_KEY, &raw) {
            debug!(error = %first, "state write failed, pruning analytics and retrying");
            let cutoff = Utc::now() - Duration::days(ANALYTICS_RETENTION_DAYS);
            if let Err(err) = analytics::prune_before(&self.kv, cutoff) {
                debug!(error = %err, "analytics prune failed");
            }
            if let Err(second) = self.kv.set(STATE_KEY, &raw) {
                warn!(error = %second, "state write failed twice, continuing in memory only");
                self.degraded = true;
            }
        }
    }

    fn stored_analytics(&self) -> Value {
        match self.kv.get(ANALYTICS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

impl<S: KvStore> FocusLedger for Store<S> {
    fn record_focus_minutes(&mut self, minutes: u32) {
        self.add_focus_minutes(minutes);
    }
}
