//! Work sessions recorded against a task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// One contiguous recorded work session.
///
/// A block is open until [`TimeBlock::close`] sets its end; after that it is
/// never modified again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// When the session started.
    pub start: DateTime<Utc>,

    /// When the session ended, or `None` while it is still running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeBlock {
    /// Starts a new open block.
    pub const fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Builds an already closed block.
    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut block = Self::open(start);
        block.close(end)?;
        Ok(block)
    }

    /// Sets the end time. Closing an already closed block is a no-op.
    pub fn close(&mut self, end: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.end.is_some() {
            return Ok(());
        }
        if end < self.start {
            return Err(ValidationError::EndBeforeStart);
        }
        self.end = Some(end);
        Ok(())
    }

    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Session length in whole minutes, truncated. Open blocks count as zero.
    pub fn duration_minutes(&self) -> i64 {
        self.end.map_or(0, |end| (end - self.start).num_minutes())
    }

    /// Whether a block starting at `start` may follow this one.
    ///
    /// An open block is never followed; a closed one is followed by any start
    /// at or after its end.
    pub fn admits_next(&self, start: DateTime<Utc>) -> bool {
        self.end.is_some_and(|end| start >= end)
    }
}

/// Checks that every block starts at or after the end of the one before it.
pub fn ensure_chronological(blocks: &[TimeBlock]) -> Result<(), ValidationError> {
    if blocks.windows(2).all(|pair| pair[0].admits_next(pair[1].start)) {
        Ok(())
    } else {
        Err(ValidationError::StartBeforePreviousEnd)
    }
}
