//! Session lifecycle events.
//!
//! Every state change in the session engine produces an event; the host
//! renders them (page title, toasts, button labels) but the engine never
//! touches any presentation layer itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::PauseReason;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A context was loaded; the timer is armed but not ticking.
    SessionArmed {
        task: String,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    SessionStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u64,
        reason: PauseReason,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero; the completion has been reported.
    SessionCompleted {
        duration_min: u32,
        task: String,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    SessionExited {
        at: DateTime<Utc>,
    },
}
