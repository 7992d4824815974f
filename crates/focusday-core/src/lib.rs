//! # Focusday Core Library
//!
//! Core state management for the Focusday daily planner. The library owns
//! the application state, its undo/redo history, and the focus session
//! timer; everything presentational (rendering, shortcuts, toasts) lives
//! in the host and only calls in.
//!
//! ## Architecture
//!
//! - **Store**: owns the one canonical [`AppState`]; every mutation
//!   snapshots the pre-mutation state into history, applies the change,
//!   and persists to durable key-value storage
//! - **History**: bounded window of full-state snapshots for undo/redo
//! - **Session engine**: a caller-ticked state machine that measures
//!   elapsed time against a monotonic clock
//! - **Storage**: two independent key-value entries (state, analytics),
//!   SQLite-backed on disk, in-memory for tests
//!
//! ## Key Components
//!
//! - [`Store`]: state owner and mutation surface
//! - [`History`]: snapshot undo/redo
//! - [`FocusSession`]: focus timer state machine
//! - [`EnergyLevel`]: energy tiers and the visibility rule
//! - [`EventLog`]: persisted analytics log

pub mod analytics;
pub mod energy;
pub mod error;
pub mod events;
pub mod model;
pub mod session;
pub mod storage;
pub mod store;

pub use analytics::{AnalyticsRecord, AnalyticsSink, EventLog, NullSink};
pub use energy::EnergyLevel;
pub use error::{CoreError, Result, ValidationError};
pub use events::SessionEvent;
pub use model::{AnalyticsSummary, AppState, Priority, Settings, Task, Thought, TimeBlock};
pub use session::{
    Clock, FocusContext, FocusKind, FocusLedger, FocusSession, ManualClock, PauseReason,
    SessionState, SystemClock, DEFAULT_FOCUS_MINUTES,
};
pub use storage::{KvStore, MemoryKv, SqliteKv, StorageError};
pub use store::{ExportPayload, History, Store, MAX_SNAPSHOTS};
