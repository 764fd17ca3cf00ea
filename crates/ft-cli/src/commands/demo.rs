//! Demo command: replays a small scenario through every store query.
//!
//! Two tasks are created, one work session is logged on the first, and the
//! store is then listed, filtered by priority and tag, summarized and put in
//! optimal order.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use ft_core::{
    FocusConfig, Insights, Priority, Task, TaskId, TaskSpec, TaskStore, ValidationError,
};
use serde::Serialize;

use crate::Config;

/// The priority and tag filters shown in the demo report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoQuery {
    pub priority: Priority,
    pub tag: String,
}

/// Builds the demo store.
///
/// The first task gets one session of `session_minutes` ending at `now`.
pub fn build_store(
    now: DateTime<Utc>,
    session_minutes: i64,
    focus: &FocusConfig,
    mut next_id: impl FnMut() -> Result<TaskId, ValidationError>,
) -> Result<TaskStore> {
    if session_minutes <= 0 {
        bail!("demo.session_minutes must be positive, got {session_minutes}");
    }

    let mut login = Task::new(
        next_id()?,
        TaskSpec {
            title: "Implement Login System".to_string(),
            description: "Create OAuth2 authentication".to_string(),
            priority: Priority::High,
            deadline: Some(now + Duration::days(3)),
            tags: vec!["backend".to_string(), "security".to_string()],
        },
        now,
    )?;
    let homepage = Task::new(
        next_id()?,
        TaskSpec {
            title: "Design Homepage".to_string(),
            description: "Create responsive design for homepage".to_string(),
            priority: Priority::Medium,
            deadline: Some(now + Duration::days(5)),
            tags: vec!["frontend".to_string(), "design".to_string()],
        },
        now,
    )?;

    login.open_time_block(now - Duration::minutes(session_minutes))?;
    login.close_time_block(now, focus)?;

    let mut store = TaskStore::new();
    store.insert(login)?;
    store.insert(homepage)?;
    Ok(store)
}

/// Formats the demo results for a terminal.
pub fn format_demo(store: &TaskStore, query: &DemoQuery) -> String {
    let mut output = String::new();

    writeln!(output, "=== Focus Tracker Demo ===").unwrap();

    write_section(&mut output, "All tasks", &store.all_tasks());
    write_section(
        &mut output,
        &format!("Tasks by priority ({})", query.priority),
        &store.by_priority(query.priority),
    );
    write_section(
        &mut output,
        &format!("Tasks by tag ({})", query.tag),
        &store.by_tag(&query.tag),
    );

    writeln!(output).unwrap();
    writeln!(output, "Productivity insights:").unwrap();
    for (name, value) in Insights::from_store(store).as_map() {
        writeln!(output, "  {name}: {value:.2}").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Optimal task order:").unwrap();
    for (rank, task) in store.optimal_order().iter().enumerate() {
        writeln!(
            output,
            "  {}. {} (priority: {})",
            rank + 1,
            task.title(),
            task.priority()
        )
        .unwrap();
    }

    output
}

fn write_section(output: &mut String, heading: &str, tasks: &[&Task]) {
    writeln!(output).unwrap();
    writeln!(output, "{heading}:").unwrap();
    if tasks.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for task in tasks {
        writeln!(output, "  {task}").unwrap();
    }
}

/// JSON demo structure.
#[derive(Debug, Serialize)]
pub struct JsonDemo<'a> {
    pub tasks: Vec<&'a Task>,
    pub by_priority: JsonQuery<'a>,
    pub by_tag: JsonQuery<'a>,
    pub insights: Insights,
    pub optimal_order: Vec<&'a TaskId>,
}

#[derive(Debug, Serialize)]
pub struct JsonQuery<'a> {
    pub key: String,
    pub tasks: Vec<&'a TaskId>,
}

fn ids<'a>(tasks: Vec<&'a Task>) -> Vec<&'a TaskId> {
    tasks.into_iter().map(Task::id).collect()
}

/// Formats the demo results as JSON.
pub fn format_demo_json(store: &TaskStore, query: &DemoQuery) -> Result<String> {
    let demo = JsonDemo {
        tasks: store.all_tasks(),
        by_priority: JsonQuery {
            key: query.priority.to_string(),
            tasks: ids(store.by_priority(query.priority)),
        },
        by_tag: JsonQuery {
            key: query.tag.clone(),
            tasks: ids(store.by_tag(&query.tag)),
        },
        insights: Insights::from_store(store),
        optimal_order: ids(store.optimal_order()),
    };
    Ok(serde_json::to_string_pretty(&demo)?)
}

/// Runs the demo command.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    query: &DemoQuery,
    json: bool,
) -> Result<()> {
    let store = build_store(
        Utc::now(),
        config.demo.session_minutes,
        &config.focus,
        || TaskId::new(uuid::Uuid::new_v4().to_string()),
    )
    .context("failed to build demo tasks")?;
    tracing::debug!(tasks = store.len(), "built demo store");

    if json {
        writeln!(writer, "{}", format_demo_json(&store, query)?)?;
    } else {
        write!(writer, "{}", format_demo(&store, query))?;
    }
    Ok(())
}
