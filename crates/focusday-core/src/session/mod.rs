//! Focus session engine: timer lifecycle and its clock.

mod clock;
mod machine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use machine::{
    FocusContext, FocusKind, FocusLedger, FocusSession, PauseReason, SessionState,
    DEFAULT_FOCUS_MINUTES,
};
