//! Core domain logic for the focus tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Time blocks: recorded work sessions on a task
//! - Focus scoring: consistency, time-of-day and duration sub-scores
//! - Task storage: id and tag lookup, priority filters, optimal ordering
//! - Insights: aggregate focus and completion metrics
//!
//! Nothing here reads the clock or generates identifiers; callers pass both in.

pub mod focus;
pub mod insights;
pub mod store;
pub mod task;
pub mod time_block;
pub mod types;

pub use focus::{FocusBreakdown, FocusConfig, focus_score};
pub use insights::Insights;
pub use store::{StoreError, TaskStore};
pub use task::{CloseOutcome, OpenOutcome, Task, TaskSpec};
pub use time_block::{TimeBlock, ensure_chronological};
pub use types::{Priority, TaskId, TaskStatus, ValidationError};
