//! Workloads and their steps.
//!
//! A workload is a unit of work with a deadline, an overall hour budget,
//! and an ordered list of steps (tasks). Each step carries the two
//! preference knobs supplied by the preference collaborator: a suggested
//! contiguous block length and a time-of-day bucket.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::store::PreferenceSource;

/// Convert fractional hours to a duration, rounded to whole milliseconds.
pub(crate) fn hours_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Preferred time-of-day bucket for a task.
///
/// Four fixed wall-clock ranges; `Night` wraps past midnight. Consumed as
/// opaque preference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 - 12:00
    Morning,
    /// 12:00 - 17:00
    Afternoon,
    /// 17:00 - 21:00
    Evening,
    /// 21:00 - 06:00 (wraps past midnight)
    Night,
}

impl TimeOfDay {
    /// Get the bucket's wall-clock bounds as (start hour, end hour).
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Self::Morning => (6, 12),
            Self::Afternoon => (12, 17),
            Self::Evening => (17, 21),
            Self::Night => (21, 6),
        }
    }

    /// Check if an hour of day falls in this bucket, wrap-aware.
    pub fn contains_hour(&self, hour: u32) -> bool {
        let (start, end) = self.bounds();
        if start < end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }

    /// Get the bucket an hour of day falls in.
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Get the bucket an instant falls in (UTC wall clock).
    pub fn of_instant(instant: DateTime<Utc>) -> Self {
        Self::of_hour(instant.hour())
    }
}

/// A single step of a workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub workload_id: String,
    pub name: String,
    /// Share of the workload's expected hours this step takes (0..=1)
    pub percent_of_total: f64,
    /// Suggested contiguous block length in hours, if known
    pub preferred_hours: Option<f64>,
    /// Preferred time-of-day bucket
    pub time_of_day: TimeOfDay,
}

/// A unit of work with a deadline and ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub id: String,
    pub name: String,
    pub deadline: DateTime<Utc>,
    /// Total hour budget across all steps
    pub expected_hours: f64,
    /// Steps in execution order
    pub tasks: Vec<Task>,
}

impl Workload {
    /// Get the hour budget as a duration.
    pub fn expected_duration(&self) -> Duration {
        hours_duration(self.expected_hours)
    }

    /// Overwrite each step's preference knobs from the preference
    /// collaborator, where it has an opinion.
    pub fn apply_preferences(&mut self, prefs: &dyn PreferenceSource) {
        for task in &mut self.tasks {
            if let Some(hours) = prefs.preferred_consecutive_hours(&task.id) {
                task.preferred_hours = Some(hours);
            }
            if let Some(bucket) = prefs.preferred_time_of_day(&task.id) {
                task.time_of_day = bucket;
            }
        }
    }
}
