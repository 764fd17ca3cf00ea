//! In-memory task storage with a tag index.
//!
//! # Ownership
//!
//! [`TaskStore`] is the sole owner of every task. The tag index maps each tag
//! to the [`TaskId`]s carrying it, in insertion order, and is resolved back
//! through the id map on every query. Tags are fixed when a task is created,
//! so mutation through [`TaskStore::get_mut`] cannot stale the index.
//!
//! # Thread Safety
//!
//! All mutation goes through `&mut self`. For shared access, wrap the store
//! in a `Mutex<TaskStore>`.

use std::collections::HashMap;

use thiserror::Error;

use crate::task::Task;
use crate::types::{Priority, TaskId, TaskStatus};

/// Store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A task with this ID is already stored.
    #[error("task already exists: {0}")]
    DuplicateId(TaskId),
    /// No task with this ID is stored.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Holds tasks keyed by ID and indexed by tag.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    tag_index: HashMap<String, Vec<TaskId>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task and indexes it under each of its tags.
    ///
    /// Re-inserting an existing ID is rejected and leaves the store unchanged.
    pub fn insert(&mut self, task: Task) -> Result<(), StoreError> {
        let id = task.id().clone();
        if self.tasks.contains_key(&id) {
            tracing::warn!(task = %id, "rejected duplicate task insert");
            return Err(StoreError::DuplicateId(id));
        }

        for tag in task.tags() {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .push(id.clone());
        }
        tracing::debug!(task = %id, tags = task.tags().len(), "inserted task");
        self.order.push(id.clone());
        self.tasks.insert(id, task);
        Ok(())
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Mutable access for logging sessions or changing status.
    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    /// Moves a stored task to `status`, returning the previous status.
    pub fn set_status(
        &mut self,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<TaskStatus, StoreError> {
        self.tasks
            .get_mut(id)
            .map(|task| task.set_status(status))
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks. Currently insertion order, but callers should not rely on it.
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.resolve(&self.order)
    }

    /// Tasks carrying `tag`, in insertion order. Unknown tags yield an empty list.
    pub fn by_tag(&self, tag: &str) -> Vec<&Task> {
        self.tag_index
            .get(tag)
            .map_or_else(Vec::new, |ids| self.resolve(ids))
    }

    pub fn by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.all_tasks()
            .into_iter()
            .filter(|task| task.priority() == priority)
            .collect()
    }

    /// Open tasks in the order they should be worked on.
    ///
    /// Completed tasks are dropped. The rest are sorted by priority, highest
    /// first, then by focus score, highest first. Ties keep insertion order.
    pub fn optimal_order(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .all_tasks()
            .into_iter()
            .filter(|task| task.status() != TaskStatus::Completed)
            .collect();
        tasks.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| b.focus_score().total_cmp(&a.focus_score()))
        });
        tasks
    }

    fn resolve(&self, ids: &[TaskId]) -> Vec<&Task> {
        ids.iter().filter_map(|id| self.tasks.get(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusConfig;
    use crate::task::TaskSpec;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, h, m, 0).unwrap()
    }

    fn make_task(id: &str, priority: Priority, tags: &[&str]) -> Task {
        let spec = TaskSpec {
            title: format!("Task {id}"),
            priority,
            tags: tags.iter().map(ToString::to_string).collect(),
            ..TaskSpec::default()
        };
        Task::new(TaskId::new(id).unwrap(), spec, at(8, 0)).unwrap()
    }

    fn with_session(mut task: Task, start: DateTime<Utc>, minutes: i64) -> Task {
        task.open_time_block(start).unwrap();
        task.close_time_block(start + Duration::minutes(minutes), &FocusConfig::default())
            .unwrap();
        task
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn insert_makes_task_reachable_by_id_and_tags() {
        let mut store = TaskStore::new();
        store
            .insert(make_task("a", Priority::High, &["backend", "security"]))
            .unwrap();

        let id = TaskId::new("a").unwrap();
        assert!(store.get(&id).is_some());
        assert_eq!(ids(&store.by_tag("backend")), ["a"]);
        assert_eq!(ids(&store.by_tag("security")), ["a"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_insert_is_rejected_without_side_effects() {
        let mut store = TaskStore::new();
        store.insert(make_task("a", Priority::High, &["backend"])).unwrap();

        let err = store
            .insert(make_task("a", Priority::Low, &["frontend"]))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(TaskId::new("a").unwrap()));
        assert_eq!(store.len(), 1);
        assert!(store.by_tag("frontend").is_empty());
        assert_eq!(ids(&store.by_tag("backend")), ["a"]);
        assert_eq!(
            store.get(&TaskId::new("a").unwrap()).unwrap().priority(),
            Priority::High
        );
    }

    #[test]
    fn unknown_tag_returns_empty() {
        let store = TaskStore::new();
        assert!(store.by_tag("x").is_empty());
    }

    #[test]
    fn disjoint_tags_return_exactly_their_tasks_in_insertion_order() {
        let mut store = TaskStore::new();
        store.insert(make_task("a", Priority::Low, &["red"])).unwrap();
        store.insert(make_task("b", Priority::Low, &["green"])).unwrap();
        store.insert(make_task("c", Priority::Low, &["blue"])).unwrap();
        store.insert(make_task("d", Priority::Low, &["red2"])).unwrap();

        assert_eq!(ids(&store.by_tag("red")), ["a"]);
        assert_eq!(ids(&store.by_tag("green")), ["b"]);
        assert_eq!(ids(&store.by_tag("blue")), ["c"]);
        assert_eq!(ids(&store.by_tag("red2")), ["d"]);
    }

    #[test]
    fn shared_tag_keeps_insertion_order() {
        let mut store = TaskStore::new();
        for id in ["z", "m", "a"] {
            store.insert(make_task(id, Priority::Low, &["ops"])).unwrap();
        }
        assert_eq!(ids(&store.by_tag("ops")), ["z", "m", "a"]);
        assert_eq!(ids(&store.all_tasks()), ["z", "m", "a"]);
    }

    #[test]
    fn by_priority_filters() {
        let mut store = TaskStore::new();
        store.insert(make_task("a", Priority::High, &[])).unwrap();
        store.insert(make_task("b", Priority::Medium, &[])).unwrap();
        store.insert(make_task("c", Priority::High, &[])).unwrap();

        assert_eq!(ids(&store.by_priority(Priority::High)), ["a", "c"]);
        assert!(store.by_priority(Priority::Urgent).is_empty());
    }

    #[test]
    fn optimal_order_sorts_by_priority_then_score() {
        let mut store = TaskStore::new();
        store.insert(make_task("low", Priority::Low, &[])).unwrap();
        store
            .insert(with_session(make_task("high-short", Priority::High, &[]), at(9, 0), 5))
            .unwrap();
        store
            .insert(with_session(make_task("high-ideal", Priority::High, &[]), at(10, 0), 30))
            .unwrap();
        store.insert(make_task("urgent", Priority::Urgent, &[])).unwrap();

        assert_eq!(
            ids(&store.optimal_order()),
            ["urgent", "high-ideal", "high-short", "low"]
        );
    }

    #[test]
    fn optimal_order_excludes_completed() {
        let mut store = TaskStore::new();
        store.insert(make_task("a", Priority::Urgent, &[])).unwrap();
        store.insert(make_task("b", Priority::Low, &[])).unwrap();
        store
            .set_status(&TaskId::new("a").unwrap(), TaskStatus::Completed)
            .unwrap();

        let order = store.optimal_order();
        assert_eq!(ids(&order), ["b"]);
        assert!(order.iter().all(|t| t.status() != TaskStatus::Completed));
    }

    #[test]
    fn optimal_order_is_stable_for_ties() {
        let mut store = TaskStore::new();
        for id in ["first", "second", "third"] {
            store.insert(make_task(id, Priority::Medium, &[])).unwrap();
        }
        assert_eq!(ids(&store.optimal_order()), ["first", "second", "third"]);
    }

    #[test]
    fn set_status_unknown_id_is_not_found() {
        let mut store = TaskStore::new();
        let id = TaskId::new("missing").unwrap();
        let err = store.set_status(&id, TaskStatus::Blocked).unwrap_err();
        assert_eq!(err.to_string(), "task not found: missing");
    }

    #[test]
    fn sessions_logged_through_store_update_score() {
        let mut store = TaskStore::new();
        store.insert(make_task("a", Priority::High, &["backend"])).unwrap();
        let id = TaskId::new("a").unwrap();

        let task = store.get_mut(&id).unwrap();
        task.open_time_block(at(10, 0)).unwrap();
        task.close_time_block(at(10, 30), &FocusConfig::default())
            .unwrap();

        let by_tag = store.by_tag("backend");
        assert!((by_tag[0].focus_score() - 2.5 / 3.0).abs() < 1e-9);
    }
}
