//! Focus score calculation.
//!
//! A task's focus score blends three sub-scores computed over its closed
//! time blocks:
//!
//! 1. **Consistency**: how regular the gaps between consecutive sessions are.
//! 2. **Time of day**: the longest average session length among the hours of
//!    day in which sessions started, relative to a reference length.
//! 3. **Duration**: how close each session is to the ideal length window.
//!
//! The overall score is their unweighted mean, recomputed in full whenever a
//! block closes. A task with no closed blocks scores 0.

use std::collections::BTreeMap;

use chrono::{FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::time_block::TimeBlock;
use crate::types::ValidationError;

/// Tunable parameters for focus scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Shortest session length (minutes) that earns a full duration score.
    /// Default: 25.
    pub ideal_min_minutes: f64,

    /// Longest session length (minutes) that earns a full duration score.
    /// Default: 45.
    pub ideal_max_minutes: f64,

    /// Session length (minutes) that maps to a time-of-day score of 1.0.
    /// Default: 60.
    pub reference_minutes: f64,

    /// Offset from UTC, in minutes, used to bucket sessions by hour of day.
    /// Default: 0.
    pub utc_offset_minutes: i32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            ideal_min_minutes: 25.0,
            ideal_max_minutes: 45.0,
            reference_minutes: 60.0,
            utc_offset_minutes: 0,
        }
    }
}

impl FocusConfig {
    /// Checks that the window is well formed and the divisors are positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.ideal_min_minutes >= 0.0 && self.ideal_min_minutes <= self.ideal_max_minutes) {
            return Err(ValidationError::InvalidFocusConfig(
                "ideal_min_minutes must be between 0 and ideal_max_minutes",
            ));
        }
        if self.ideal_max_minutes <= 0.0 {
            return Err(ValidationError::InvalidFocusConfig(
                "ideal_max_minutes must be positive",
            ));
        }
        if self.reference_minutes.is_nan() || self.reference_minutes <= 0.0 {
            return Err(ValidationError::InvalidFocusConfig(
                "reference_minutes must be positive",
            ));
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(ValidationError::InvalidFocusConfig(
                "utc_offset_minutes must be within one day",
            ));
        }
        Ok(())
    }

    /// The offset used for hour-of-day bucketing. Out-of-range offsets fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

/// The three focus sub-scores and their mean.
///
/// The time-of-day and duration components are not clamped: a peak hour
/// averaging more than `reference_minutes` pushes time of day above 1.0, and
/// sessions far outside the ideal window push duration below 0.0. The
/// overall score can therefore leave \[0.0, 1.0\].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocusBreakdown {
    pub consistency: f64,
    pub time_of_day: f64,
    pub duration: f64,
    pub score: f64,
}

impl FocusBreakdown {
    /// Scores the closed blocks in `blocks`, in the order given.
    ///
    /// Returns `None` when no block has closed yet.
    pub fn compute(blocks: &[TimeBlock], config: &FocusConfig) -> Option<Self> {
        let closed: Vec<&TimeBlock> = blocks.iter().filter(|b| !b.is_open()).collect();
        if closed.is_empty() {
            return None;
        }

        let consistency = consistency_score(&closed);
        let time_of_day = time_of_day_score(&closed, config);
        let duration = duration_score(&closed, config);

        Some(Self {
            consistency,
            time_of_day,
            duration,
            score: (consistency + time_of_day + duration) / 3.0,
        })
    }
}

/// Overall focus score for a sequence of blocks; 0 when none has closed.
pub fn focus_score(blocks: &[TimeBlock], config: &FocusConfig) -> f64 {
    FocusBreakdown::compute(blocks, config).map_or(0.0, |b| b.score)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "gap counts and minute values are far below 2^52"
)]
fn consistency_score(closed: &[&TimeBlock]) -> f64 {
    if closed.len() < 2 {
        return 1.0;
    }

    let gaps: Vec<f64> = closed
        .windows(2)
        .filter_map(|pair| {
            let prev_end = pair[0].end?;
            // overlap counts as no gap so the denominator stays >= 1
            Some((pair[1].start - prev_end).num_minutes().max(0) as f64)
        })
        .collect();
    if gaps.is_empty() {
        return 1.0;
    }

    let count = gaps.len() as f64;
    let avg_gap = gaps.iter().sum::<f64>() / count;
    let variance = gaps.iter().map(|g| (g - avg_gap).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();

    // +1 keeps the ratio finite when sessions are back to back
    (1.0 - std_dev / (avg_gap + 1.0)).max(0.0)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "session counts and minute values are far below 2^52"
)]
fn time_of_day_score(closed: &[&TimeBlock], config: &FocusConfig) -> f64 {
    let offset = config.offset();
    let mut by_hour: BTreeMap<u32, (i64, usize)> = BTreeMap::new();
    for block in closed {
        let hour = block.start.with_timezone(&offset).hour();
        let (total, count) = by_hour.entry(hour).or_insert((0, 0));
        *total += block.duration_minutes();
        *count += 1;
    }

    let peak = by_hour
        .values()
        .map(|&(total, count)| total as f64 / count as f64)
        .reduce(f64::max);

    peak.map_or(0.0, |p| p / config.reference_minutes)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "session counts and minute values are far below 2^52"
)]
fn duration_score(closed: &[&TimeBlock], config: &FocusConfig) -> f64 {
    let (min, max) = (config.ideal_min_minutes, config.ideal_max_minutes);
    let total: f64 = closed
        .iter()
        .map(|block| {
            let minutes = block.duration_minutes() as f64;
            if (min..=max).contains(&minutes) {
                1.0
            } else {
                1.0 - (minutes - min).abs().min((minutes - max).abs()) / max
            }
        })
        .sum();
    total / closed.len() as f64
}
