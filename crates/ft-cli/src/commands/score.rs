//! Score command for rating an ad-hoc list of work sessions.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ft_core::{FocusBreakdown, FocusConfig, TimeBlock, ensure_chronological};
use serde::Serialize;

use super::util::{format_minutes, parse_session};
use crate::Config;

/// Scored sessions, ready for output.
#[derive(Debug, Serialize)]
pub struct ScoreReport {
    pub sessions: Vec<TimeBlock>,
    pub tracked_minutes: i64,
    pub breakdown: FocusBreakdown,
}

/// Parses `START..END` arguments into closed, non-overlapping blocks in
/// chronological order.
pub fn parse_blocks(args: &[String], now: DateTime<Utc>) -> Result<Vec<TimeBlock>> {
    let mut blocks = args
        .iter()
        .map(|arg| {
            let (start, end) = parse_session(arg, now)?;
            TimeBlock::closed(start, end).with_context(|| format!("invalid session {arg}"))
        })
        .collect::<Result<Vec<_>>>()?;
    blocks.sort_by_key(|b| b.start);
    ensure_chronological(&blocks).context("sessions must not overlap")?;
    Ok(blocks)
}

/// Scores `blocks`. Returns `None` for an empty list.
pub fn score_blocks(blocks: Vec<TimeBlock>, focus: &FocusConfig) -> Option<ScoreReport> {
    let breakdown = FocusBreakdown::compute(&blocks, focus)?;
    let tracked_minutes = blocks.iter().map(TimeBlock::duration_minutes).sum();
    Some(ScoreReport {
        sessions: blocks,
        tracked_minutes,
        breakdown,
    })
}

/// Formats a score report for a terminal.
pub fn format_score(report: &ScoreReport) -> String {
    let mut output = String::new();
    let b = &report.breakdown;
    writeln!(
        output,
        "Sessions:     {} ({} tracked)",
        report.sessions.len(),
        format_minutes(report.tracked_minutes)
    )
    .unwrap();
    writeln!(output, "Consistency:  {:.2}", b.consistency).unwrap();
    writeln!(output, "Time of day:  {:.2}", b.time_of_day).unwrap();
    writeln!(output, "Duration:     {:.2}", b.duration).unwrap();
    writeln!(output, "Focus score:  {:.2}", b.score).unwrap();
    output
}

/// Runs the score command.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    sessions: &[String],
    json: bool,
) -> Result<()> {
    let blocks = parse_blocks(sessions, Utc::now())?;
    let Some(report) = score_blocks(blocks, &config.focus) else {
        writeln!(writer, "No sessions to score.")?;
        return Ok(());
    };
    tracing::debug!(
        sessions = report.sessions.len(),
        score = report.breakdown.score,
        "scored sessions"
    );

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(writer, "{}", format_score(&report))?;
    }
    Ok(())
}
