//! # Mnemo Core Library
//!
//! This library is the scheduling engine for Mnemo's spaced repetition:
//! it decides which cards are due, computes the next review date after a
//! graded recall attempt, and manages a bounded, re-orderable work queue
//! for a single study session under daily quotas. The surrounding
//! application (card editing, decks, UI) supplies a card snapshot and
//! persists the updated copies the engine hands back.
//!
//! ## Architecture
//!
//! - **Calendar**: pure calendar-day arithmetic, never timestamps, so a
//!   timezone can't shift a due date by a day
//! - **Scheduler**: SM-2-variant grading as a pure function over card
//!   state
//! - **Quota**: per-day review/new-card counters persisted in a
//!   key-value store
//! - **Session**: the Setup/Active/Complete queue state machine with
//!   FIFO re-queueing of failed cards
//! - **Storage**: a flat JSON key-value [`Store`] capability with SQLite
//!   and in-memory backings
//!
//! The engine is single-threaded and call-and-return: no operation
//! blocks or spawns background work.
//!
//! ## Key Components
//!
//! - [`StudyEngine`]: session orchestration over a persistent store
//! - [`SessionQueue`]: one in-flight study session
//! - [`grade_card`]: the grading function
//! - [`QuotaTracker`]: daily counters
//! - [`Store`]: key-value persistence capability

pub mod calendar;
pub mod card;
pub mod error;
pub mod quota;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod storage;

pub use card::{Card, Grade, DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
pub use error::{ConfigError, CoreError, StartError, StoreError};
pub use quota::{DayCounts, Limit, QuotaTracker};
pub use scheduler::{grade_card, SchedulerConfig, MATURE_INTERVAL_DAYS};
pub use session::{Mode, Scope, SessionQueue, SessionSummary, StudyEngine};
pub use stats::{Forecast, GradeTally};
pub use storage::{MemoryStore, SqliteStore, Store, StudyConfig};
