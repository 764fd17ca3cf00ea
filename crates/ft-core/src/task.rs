//! Tasks and their work-session history.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::{FocusBreakdown, FocusConfig, focus_score};
use crate::time_block::TimeBlock;
use crate::types::{Priority, TaskId, TaskStatus, ValidationError};

/// The user-supplied fields of a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TaskSpec {
    /// A spec with only a title; everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Result of starting a work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new block was appended.
    Opened,
    /// The most recent block is still running; nothing was appended.
    AlreadyOpen,
}

/// Result of ending a work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The running block was closed and the focus score recomputed.
    Closed { duration_minutes: i64 },
    /// There was no running block.
    NoOpenBlock,
}

/// A unit of work with its recorded sessions and derived focus score.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    status: TaskStatus,
    tags: BTreeSet<String>,
    time_blocks: Vec<TimeBlock>,
    focus_score: f64,
}

impl Task {
    /// Creates a task in the `Todo` state with no sessions.
    ///
    /// The title must be non-blank. Tags are trimmed and de-duplicated; a
    /// blank tag is rejected.
    pub fn new(
        id: TaskId,
        spec: TaskSpec,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = spec.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        let mut tags = BTreeSet::new();
        for tag in &spec.tags {
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(ValidationError::Empty { field: "tag" });
            }
            tags.insert(tag.to_string());
        }

        Ok(Self {
            id,
            title: title.to_string(),
            description: spec.description,
            priority: spec.priority,
            deadline: spec.deadline,
            created_at,
            status: TaskStatus::Todo,
            tags,
            time_blocks: Vec::new(),
            focus_score: 0.0,
        })
    }

    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn priority(&self) -> Priority {
        self.priority
    }

    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Tags in sorted order.
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Sessions in the order they were opened.
    pub fn time_blocks(&self) -> &[TimeBlock] {
        &self.time_blocks
    }

    /// Focus score as of the last closed session; 0 before any session closes.
    pub const fn focus_score(&self) -> f64 {
        self.focus_score
    }

    /// Recomputes the score components from the current sessions.
    pub fn focus_breakdown(&self, config: &FocusConfig) -> Option<FocusBreakdown> {
        FocusBreakdown::compute(&self.time_blocks, config)
    }

    /// Total minutes across closed sessions.
    pub fn tracked_minutes(&self) -> i64 {
        self.time_blocks.iter().map(TimeBlock::duration_minutes).sum()
    }

    /// Whether the most recent session is still running.
    pub fn has_open_block(&self) -> bool {
        self.time_blocks.last().is_some_and(TimeBlock::is_open)
    }

    /// Starts a work session at `at`.
    ///
    /// `at` must not be earlier than the end of the previous session.
    pub fn open_time_block(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<OpenOutcome, ValidationError> {
        let Some(last) = self.time_blocks.last() else {
            return Ok(self.push_open_block(at));
        };
        if last.is_open() {
            tracing::debug!(task = %self.id, "time block already open");
            return Ok(OpenOutcome::AlreadyOpen);
        }
        if !last.admits_next(at) {
            tracing::debug!(task = %self.id, start = %at, "time block overlaps previous one");
            return Err(ValidationError::StartBeforePreviousEnd);
        }
        Ok(self.push_open_block(at))
    }

    fn push_open_block(&mut self, at: DateTime<Utc>) -> OpenOutcome {
        self.time_blocks.push(TimeBlock::open(at));
        tracing::debug!(task = %self.id, start = %at, "opened time block");
        OpenOutcome::Opened
    }

    /// Ends the running session at `at` and recomputes the focus score.
    pub fn close_time_block(
        &mut self,
        at: DateTime<Utc>,
        config: &FocusConfig,
    ) -> Result<CloseOutcome, ValidationError> {
        let Some(block) = self.time_blocks.last_mut().filter(|b| b.is_open()) else {
            tracing::debug!(task = %self.id, "no open time block to close");
            return Ok(CloseOutcome::NoOpenBlock);
        };
        block.close(at)?;
        let duration_minutes = block.duration_minutes();

        self.focus_score = focus_score(&self.time_blocks, config);
        tracing::debug!(
            task = %self.id,
            duration_minutes,
            focus_score = self.focus_score,
            "closed time block"
        );
        Ok(CloseOutcome::Closed { duration_minutes })
    }

    /// Moves the task to `status`, returning the previous one.
    pub fn set_status(&mut self, status: TaskStatus) -> TaskStatus {
        let previous = std::mem::replace(&mut self.status, status);
        if previous != status {
            tracing::debug!(task = %self.id, from = %previous, to = %status, "status changed");
        }
        previous
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] priority={} status={} focus={:.2}",
            self.title, self.id, self.priority, self.status, self.focus_score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, h, m, 0).unwrap()
    }

    fn task(title: &str) -> Task {
        Task::new(TaskId::new("task-1").unwrap(), TaskSpec::titled(title), at(8, 0)).unwrap()
    }

    fn log_session(task: &mut Task, start: DateTime<Utc>, minutes: i64) {
        assert_eq!(task.open_time_block(start).unwrap(), OpenOutcome::Opened);
        let outcome = task
            .close_time_block(start + Duration::minutes(minutes), &FocusConfig::default())
            .unwrap();
        assert_eq!(
            outcome,
            CloseOutcome::Closed {
                duration_minutes: minutes
            }
        );
    }

    #[test]
    fn new_task_defaults() {
        let t = task("Write docs");
        assert_eq!(t.status(), TaskStatus::Todo);
        assert_eq!(t.priority(), Priority::Medium);
        assert!(t.time_blocks().is_empty());
        assert!(t.focus_score().abs() < f64::EPSILON);
        assert_eq!(t.created_at(), at(8, 0));
    }

    #[test]
    fn new_task_rejects_blank_title() {
        let err = Task::new(TaskId::new("t").unwrap(), TaskSpec::titled("  "), at(8, 0))
            .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "title" });
    }

    #[test]
    fn new_task_normalizes_tags() {
        let spec = TaskSpec {
            title: "Login".to_string(),
            tags: vec![
                " security ".to_string(),
                "backend".to_string(),
                "security".to_string(),
            ],
            ..TaskSpec::default()
        };
        let t = Task::new(TaskId::new("t").unwrap(), spec, at(8, 0)).unwrap();
        let tags: Vec<&str> = t.tags().iter().map(String::as_str).collect();
        assert_eq!(tags, ["backend", "security"]);
    }

    #[test]
    fn new_task_rejects_blank_tag() {
        let spec = TaskSpec {
            title: "Login".to_string(),
            tags: vec![String::new()],
            ..TaskSpec::default()
        };
        let err = Task::new(TaskId::new("t").unwrap(), spec, at(8, 0)).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "tag" });
    }

    #[test]
    fn open_block_keeps_score_at_zero() {
        let mut t = task("Design");
        t.open_time_block(at(9, 0)).unwrap();
        assert!(t.has_open_block());
        assert!(t.focus_score().abs() < f64::EPSILON);
    }

    #[test]
    fn closing_recomputes_score() {
        let mut t = task("Design");
        log_session(&mut t, at(10, 0), 30);
        assert!((t.focus_score() - 2.5 / 3.0).abs() < 1e-9);
        assert_eq!(t.tracked_minutes(), 30);
    }

    #[test]
    fn second_open_while_running_is_rejected() {
        let mut t = task("Design");
        assert_eq!(t.open_time_block(at(9, 0)).unwrap(), OpenOutcome::Opened);
        assert_eq!(t.open_time_block(at(9, 5)).unwrap(), OpenOutcome::AlreadyOpen);
        assert_eq!(t.time_blocks().len(), 1);
    }

    #[test]
    fn open_before_previous_end_is_rejected() {
        let mut t = task("Design");
        log_session(&mut t, at(10, 0), 30);
        let score = t.focus_score();

        let err = t.open_time_block(at(9, 0)).unwrap_err();
        assert_eq!(err, ValidationError::StartBeforePreviousEnd);
        let err = t.open_time_block(at(10, 29)).unwrap_err();
        assert_eq!(err, ValidationError::StartBeforePreviousEnd);
        assert_eq!(t.time_blocks().len(), 1);
        assert!(!t.has_open_block());
        assert!((t.focus_score() - score).abs() < f64::EPSILON);
    }

    #[test]
    fn open_at_previous_end_is_allowed() {
        let mut t = task("Design");
        log_session(&mut t, at(10, 0), 30);
        log_session(&mut t, at(10, 30), 30);
        let breakdown = t.focus_breakdown(&FocusConfig::default()).unwrap();
        assert!((breakdown.consistency - 1.0).abs() < 1e-9);
    }

    #[test]
    fn accepted_sessions_keep_consistency_in_range() {
        let config = FocusConfig::default();
        let mut t = task("Design");
        let mut start = at(6, 0);
        for (gap, minutes) in [(0, 30), (2, 10), (95, 50), (0, 5), (300, 25)] {
            start += Duration::minutes(gap);
            log_session(&mut t, start, minutes);
            start += Duration::minutes(minutes);
            let consistency = t.focus_breakdown(&config).unwrap().consistency;
            assert!(
                (0.0..=1.0).contains(&consistency),
                "consistency {consistency} after {} sessions",
                t.time_blocks().len()
            );
        }
    }

    #[test]
    fn close_without_open_block_is_noop() {
        let config = FocusConfig::default();
        let mut t = task("Design");
        assert_eq!(
            t.close_time_block(at(9, 0), &config).unwrap(),
            CloseOutcome::NoOpenBlock
        );

        log_session(&mut t, at(9, 0), 30);
        let score = t.focus_score();
        assert_eq!(
            t.close_time_block(at(11, 0), &config).unwrap(),
            CloseOutcome::NoOpenBlock
        );
        assert!((t.focus_score() - score).abs() < f64::EPSILON);
        assert_eq!(t.time_blocks()[0].end, Some(at(9, 30)));
    }

    #[test]
    fn close_before_start_leaves_block_open() {
        let mut t = task("Design");
        t.open_time_block(at(9, 0)).unwrap();
        let err = t
            .close_time_block(at(8, 0), &FocusConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::EndBeforeStart);
        assert!(t.has_open_block());
    }

    #[test]
    fn breakdown_matches_stored_score() {
        let mut t = task("Design");
        log_session(&mut t, at(9, 0), 20);
        log_session(&mut t, at(9, 40), 50);
        let breakdown = t.focus_breakdown(&FocusConfig::default()).unwrap();
        assert!((breakdown.consistency - 1.0).abs() < 1e-9);
        assert!((breakdown.score - t.focus_score()).abs() < 1e-9);
    }

    #[test]
    fn set_status_returns_previous() {
        let mut t = task("Design");
        assert_eq!(t.set_status(TaskStatus::InProgress), TaskStatus::Todo);
        assert_eq!(t.set_status(TaskStatus::Completed), TaskStatus::InProgress);
        assert_eq!(t.status(), TaskStatus::Completed);
    }

    #[test]
    fn display_includes_score() {
        let mut t = task("Design");
        log_session(&mut t, at(10, 0), 30);
        assert_eq!(
            t.to_string(),
            "Design [task-1] priority=medium status=todo focus=0.83"
        );
    }
}
