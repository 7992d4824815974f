//! Application state tree and its entities.
//!
//! [`AppState`] is the root aggregate: it is owned exclusively by the
//! store, snapshotted whole for undo/redo, and serialized whole for
//! persistence. Every field defaults, so states written by older versions
//! decode with the missing pieces filled in.

mod priority;
mod task;
mod thought;
mod time_block;

pub use priority::Priority;
pub use task::Task;
pub use thought::Thought;
pub use time_block::TimeBlock;

pub(crate) use time_block::parse_hhmm;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::energy::EnergyLevel;

/// Number of daily priority slots; fixed, never grows or shrinks.
pub const PRIORITY_SLOTS: usize = 3;

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default = "default_true")]
    pub sound_effects: bool,
    #[serde(default = "default_true")]
    pub keyboard_hints: bool,
    /// Focus session length in minutes.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    /// Minutes of work before a break reminder.
    #[serde(default = "default_break_interval")]
    pub break_interval: u32,
    #[serde(default)]
    pub accessible_font: bool,
}

// Default functions
fn default_theme() -> String {
    "dark".into()
}
fn default_true() -> bool {
    true
}
fn default_focus_duration() -> u32 {
    25
}
fn default_break_interval() -> u32 {
    90
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            reduced_motion: false,
            sound_effects: true,
            keyboard_hints: true,
            focus_duration: default_focus_duration(),
            break_interval: default_break_interval(),
            accessible_font: false,
        }
    }
}

/// Running usage counters kept inside the state tree.
///
/// The detailed event log lives in its own storage entry; these are the
/// cheap summaries the UI shows at a glance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub current_streak: u32,
    /// Cumulative completed focus time in minutes.
    #[serde(default)]
    pub total_focus_time: u32,
    #[serde(default)]
    pub total_tasks_completed: u32,
    #[serde(default)]
    pub total_breaks_taken: u32,
}

/// Root aggregate owned by the store; the unit of history snapshots.
///
/// `Clone` is a genuine deep copy (all data is owned), which is what makes
/// snapshots immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default = "default_priorities")]
    pub priorities: Vec<Priority>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub time_blocks: Vec<TimeBlock>,
    #[serde(default)]
    pub captured_thoughts: Vec<Thought>,
    #[serde(default)]
    pub current_energy: EnergyLevel,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub analytics: AnalyticsSummary,
    #[serde(default)]
    pub last_break_time: Option<DateTime<Utc>>,
    #[serde(default = "today")]
    pub last_active_date: NaiveDate,
}

fn default_priorities() -> Vec<Priority> {
    (1..=PRIORITY_SLOTS as u8).map(Priority::empty).collect()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            priorities: default_priorities(),
            tasks: Vec::new(),
            time_blocks: Vec::new(),
            captured_thoughts: Vec::new(),
            current_energy: EnergyLevel::default(),
            settings: Settings::default(),
            analytics: AnalyticsSummary::default(),
            last_break_time: None,
            last_active_date: today(),
        }
    }
}

impl AppState {
    /// Structural repair after decoding a stored or imported state.
    ///
    /// Restores the fixed-slot shape of `priorities`, the
    /// completed/completed_at pairing, and drops time blocks that no
    /// longer satisfy their own invariants. Idempotent.
    pub(crate) fn migrate(&mut self) {
        self.priorities.truncate(PRIORITY_SLOTS);
        while self.priorities.len() < PRIORITY_SLOTS {
            self.priorities
                .push(Priority::empty(self.priorities.len() as u8 + 1));
        }
        for (index, slot) in self.priorities.iter_mut().enumerate() {
            slot.id = index as u8 + 1;
            normalize_completion(slot.completed, &mut slot.completed_at);
        }
        for task in &mut self.tasks {
            normalize_completion(task.completed, &mut task.completed_at);
        }
        self.time_blocks
            .retain(|block| block.duration > 0 && parse_hhmm(&block.start_time).is_ok());
    }

    /// Day rollover on load: a consecutive active day extends the streak,
    /// a gap restarts it at one.
    pub(crate) fn roll_day(&mut self, today: NaiveDate) {
        if self.last_active_date == today {
            return;
        }
        self.analytics.current_streak = if self.last_active_date.succ_opt() == Some(today) {
            self.analytics.current_streak + 1
        } else {
            1
        };
        self.last_active_date = today;
    }
}

/// Keep the `completed_at` timestamp paired with the `completed` flag.
pub(crate) fn normalize_completion(completed: bool, completed_at: &mut Option<DateTime<Utc>>) {
    if completed {
        if completed_at.is_none() {
            *completed_at = Some(Utc::now());
        }
    } else {
        *completed_at = None;
    }
}
