//! Focus session engine.
//!
//! A caller-ticked state machine: no internal threads, the host calls
//! `tick()` periodically (nominally once a second) and the engine
//! measures elapsed time itself against a monotonic clock.
//!
//! ## State transitions
//!
//! ```text
//! Idle ──start_session──> Armed ──begin──> Running ⇄ Paused
//!                           ^                │
//!                           └──reset─────────┤
//!                                            ▼
//!                                        Completed ──begin──> Running
//!
//! Running/Paused/Armed/Completed ──exit──> Exited ──start_session──> Armed
//! ```
//!
//! Completion reports once to the focus ledger (cumulative focus time)
//! and the analytics sink, then leaves the engine re-armable with the
//! same context. Whether to suggest a break afterwards is the host's
//! call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use crate::analytics::AnalyticsSink;
use crate::energy::EnergyLevel;
use crate::events::SessionEvent;

/// Fallback focus length in minutes when a context carries no estimate.
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    /// Context loaded, timer not started.
    Armed,
    Running,
    Paused,
    /// Countdown finished and reported; re-armable with the same context.
    Completed,
    Exited,
}

/// What kind of item a session was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusKind {
    Priority,
    Task,
    TimeBlock,
}

/// Transient description of what a session is focused on.
///
/// Owned by the engine and discarded on exit; never persisted across
/// reloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusContext {
    pub task: String,
    pub kind: FocusKind,
    /// Index or id of the source item.
    pub ref_id: String,
    #[serde(default)]
    pub energy: EnergyLevel,
    /// Planned length in minutes.
    #[serde(default)]
    pub estimated_duration: Option<u32>,
}

/// Why a running session is currently paused.
///
/// Tracked explicitly so that a visibility change can only undo its own
/// pause: a session the user paused stays paused when the window comes
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseReason {
    /// The user paused explicitly.
    User,
    /// The host reported visibility loss; eligible for auto-resume.
    Visibility,
}

/// Receiver for completed focus minutes; implemented by the state store.
pub trait FocusLedger {
    fn record_focus_minutes(&mut self, minutes: u32);
}

/// Core focus session engine.
///
/// Collaborators are passed by reference to the call that needs them;
/// the engine holds no handles of its own.
pub struct FocusSession<C: Clock = SystemClock> {
    state: SessionState,
    context: Option<FocusContext>,
    default_minutes: u32,
    duration_min: u32,
    remaining_ms: u64,
    pause_reason: Option<PauseReason>,
    started_at: Option<DateTime<Utc>>,
    /// Monotonic timestamp of the last effective tick; `None` whenever
    /// the countdown is not running.
    last_tick_ms: Option<u64>,
    clock: C,
}

impl FocusSession<SystemClock> {
    /// Create an idle engine with the given fallback focus length.
    pub fn new(default_minutes: u32) -> Self {
        Self::with_clock(default_minutes, SystemClock::new())
    }
}

impl<C: Clock> FocusSession<C> {
    pub fn with_clock(default_minutes: u32, clock: C) -> Self {
        Self {
            state: SessionState::Idle,
            context: None,
            default_minutes: default_minutes.max(1),
            duration_min: 0,
            remaining_ms: 0,
            pause_reason: None,
            started_at: None,
            last_tick_ms: None,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whole seconds left on the countdown.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms / 1000
    }

    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        self.pause_reason
    }

    pub fn current_task(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.task.as_str())
    }

    pub fn context(&self) -> Option<&FocusContext> {
        self.context.as_ref()
    }

    /// Session length in minutes, once a context is loaded.
    pub fn duration_min(&self) -> u32 {
        self.duration_min
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load a context and arm the timer. Does not start ticking.
    pub fn start_session(&mut self, context: FocusContext) -> Option<SessionEvent> {
        match self.state {
            SessionState::Idle | SessionState::Completed | SessionState::Exited => {
                self.duration_min = context
                    .estimated_duration
                    .filter(|m| *m > 0)
                    .unwrap_or(self.default_minutes);
                self.remaining_ms = self.duration_ms();
                let task = context.task.clone();
                self.context = Some(context);
                self.state = SessionState::Armed;
                self.pause_reason = None;
                self.started_at = None;
                self.last_tick_ms = None;
                Some(SessionEvent::SessionArmed {
                    task,
                    duration_min: self.duration_min,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Start the countdown.
    pub fn begin(&mut self) -> Option<SessionEvent> {
        match self.state {
            SessionState::Armed | SessionState::Completed => {
                self.state = SessionState::Running;
                self.remaining_ms = self.duration_ms();
                self.started_at = Some(Utc::now());
                self.last_tick_ms = Some(self.clock.now_ms());
                self.pause_reason = None;
                Some(SessionEvent::SessionStarted {
                    duration_secs: u64::from(self.duration_min) * 60,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Call periodically. Only effective while Running; ticks in any
    /// other state are inert. When the countdown reaches zero the
    /// completion is reported exactly once to `ledger` and `sink`.
    pub fn tick(
        &mut self,
        ledger: &mut dyn FocusLedger,
        sink: &mut dyn AnalyticsSink,
    ) -> Option<SessionEvent> {
        if self.state != SessionState::Running {
            return None;
        }
        self.flush_elapsed();
        if self.remaining_ms > 0 {
            return None;
        }
        self.complete(ledger, sink)
    }

    /// Pause at the user's request.
    pub fn pause(&mut self) -> Option<SessionEvent> {
        self.pause_with(PauseReason::User)
    }

    /// The host lost sight of the session (window hidden).
    pub fn visibility_lost(&mut self) -> Option<SessionEvent> {
        self.pause_with(PauseReason::Visibility)
    }

    /// Resume a paused session, whatever paused it.
    pub fn resume(&mut self) -> Option<SessionEvent> {
        if self.state != SessionState::Paused {
            return None;
        }
        self.state = SessionState::Running;
        self.pause_reason = None;
        self.last_tick_ms = Some(self.clock.now_ms());
        Some(SessionEvent::SessionResumed {
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Visibility came back. Resumes only a session paused for
    /// visibility; a user pause stays paused.
    pub fn visibility_regained(&mut self) -> Option<SessionEvent> {
        if self.pause_reason != Some(PauseReason::Visibility) {
            return None;
        }
        self.resume()
    }

    /// Back to Armed with the full duration. No-op when idle or exited.
    pub fn reset(&mut self) -> Option<SessionEvent> {
        match self.state {
            SessionState::Armed
            | SessionState::Running
            | SessionState::Paused
            | SessionState::Completed => {
                self.state = SessionState::Armed;
                self.remaining_ms = self.duration_ms();
                self.last_tick_ms = None;
                self.pause_reason = None;
                self.started_at = None;
                Some(SessionEvent::SessionReset { at: Utc::now() })
            }
            SessionState::Idle | SessionState::Exited => None,
        }
    }

    /// Abandon the session and discard its context. Safe to call twice.
    pub fn exit(&mut self) -> Option<SessionEvent> {
        match self.state {
            SessionState::Idle | SessionState::Exited => None,
            _ => {
                self.state = SessionState::Exited;
                self.context = None;
                self.duration_min = 0;
                self.remaining_ms = 0;
                self.last_tick_ms = None;
                self.pause_reason = None;
                self.started_at = None;
                Some(SessionEvent::SessionExited { at: Utc::now() })
            }
        }
    }

    /// Propagate a settings change to the fallback focus length.
    pub fn set_default_minutes(&mut self, minutes: u32) {
        self.default_minutes = minutes.max(1);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn duration_ms(&self) -> u64 {
        u64::from(self.duration_min) * 60_000
    }

    fn flush_elapsed(&mut self) {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_tick_ms {
            self.remaining_ms = self.remaining_ms.saturating_sub(now.saturating_sub(last));
        }
        self.last_tick_ms = Some(now);
    }

    fn pause_with(&mut self, reason: PauseReason) -> Option<SessionEvent> {
        if self.state != SessionState::Running {
            return None;
        }
        self.flush_elapsed();
        self.last_tick_ms = None;
        self.state = SessionState::Paused;
        self.pause_reason = Some(reason);
        Some(SessionEvent::SessionPaused {
            remaining_secs: self.remaining_secs(),
            reason,
            at: Utc::now(),
        })
    }

    fn complete(
        &mut self,
        ledger: &mut dyn FocusLedger,
        sink: &mut dyn AnalyticsSink,
    ) -> Option<SessionEvent> {
        let context = self.context.clone()?;
        ledger.record_focus_minutes(self.duration_min);
        sink.record_focus_completion(self.duration_min, &context.task, &context);
        self.state = SessionState::Completed;
        self.remaining_ms = self.duration_ms();
        self.last_tick_ms = None;
        self.pause_reason = None;
        Some(SessionEvent::SessionCompleted {
            duration_min: self.duration_min,
            task: context.task,
            at: Utc::now(),
        })
    }
}
