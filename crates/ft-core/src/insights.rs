//! Aggregate productivity metrics over a [`TaskStore`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::TaskStore;
use crate::types::TaskStatus;

/// Summary statistics across every stored task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Insights {
    /// Mean focus score; 0 for an empty store.
    pub average_focus_score: f64,
    /// Fraction of tasks that are completed; 0 for an empty store.
    pub completion_rate: f64,
    /// Minutes across all closed sessions.
    pub tracked_minutes: i64,
}

impl Insights {
    pub fn from_store(store: &TaskStore) -> Self {
        Self {
            average_focus_score: average_focus_score(store),
            completion_rate: completion_rate(store),
            tracked_minutes: tracked_minutes(store),
        }
    }

    /// Metric name to value, in sorted key order.
    #[expect(
        clippy::cast_precision_loss,
        reason = "tracked minutes are far below 2^52"
    )]
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("average_focus_score", self.average_focus_score),
            ("completion_rate", self.completion_rate),
            ("tracked_minutes", self.tracked_minutes as f64),
        ])
    }
}

/// Mean focus score across all tasks; 0 for an empty store.
#[expect(clippy::cast_precision_loss, reason = "task counts are far below 2^52")]
pub fn average_focus_score(store: &TaskStore) -> f64 {
    let tasks = store.all_tasks();
    if tasks.is_empty() {
        return 0.0;
    }
    tasks.iter().map(|t| t.focus_score()).sum::<f64>() / tasks.len() as f64
}

/// Completed tasks over all tasks; 0 for an empty store.
#[expect(clippy::cast_precision_loss, reason = "task counts are far below 2^52")]
pub fn completion_rate(store: &TaskStore) -> f64 {
    let tasks = store.all_tasks();
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks
        .iter()
        .filter(|t| t.status() == TaskStatus::Completed)
        .count();
    completed as f64 / tasks.len() as f64
}

pub fn tracked_minutes(store: &TaskStore) -> i64 {
    store.all_tasks().iter().map(|t| t.tracked_minutes()).sum()
}
