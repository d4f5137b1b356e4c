//! Time block types.
//!
//! A timeline is made of two kinds of block: fixed blocks the scheduler
//! must route around, and work blocks it is free to move.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::workload::Task;

/// What a block is: an immovable obstacle, or movable scheduled work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    /// Immovable commitment outside the scheduler's control. Carries no
    /// task.
    Fixed,
    /// Reschedulable work. Always carries the task it was placed for.
    Work { task: Task },
}

/// A single interval on the timeline.
///
/// Invariant: `end > start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl TimeBlock {
    /// Create a fixed block.
    ///
    /// # Panics
    /// Panics if `end <= start`. Use [`try_fixed`](Self::try_fixed) for a
    /// non-panicking version.
    pub fn fixed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::try_fixed(start, end).expect("TimeBlock::fixed: end must be greater than start")
    }

    /// Create a fixed block, returning a Result.
    ///
    /// # Errors
    /// Returns an error if `end <= start`.
    pub fn try_fixed(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimelineError> {
        Self::try_new(BlockKind::Fixed, start, end)
    }

    /// Create a work block carrying `task`.
    ///
    /// # Panics
    /// Panics if `end <= start`. Use [`try_work`](Self::try_work) for a
    /// non-panicking version.
    pub fn work(task: Task, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::try_work(task, start, end).expect("TimeBlock::work: end must be greater than start")
    }

    /// Create a work block, returning a Result.
    ///
    /// # Errors
    /// Returns an error if `end <= start`.
    pub fn try_work(
        task: Task,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, TimelineError> {
        Self::try_new(BlockKind::Work { task }, start, end)
    }

    fn try_new(
        kind: BlockKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, TimelineError> {
        if end <= start {
            return Err(TimelineError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            start,
            end,
            kind,
        })
    }

    /// Get the block's duration.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the scheduler may move this block.
    pub fn is_movable(&self) -> bool {
        matches!(self.kind, BlockKind::Work { .. })
    }

    /// The task this block was placed for, if it is a work block.
    pub fn task(&self) -> Option<&Task> {
        match &self.kind {
            BlockKind::Work { task } => Some(task),
            BlockKind::Fixed => None,
        }
    }

    /// The owning workload's id, if this is a work block.
    pub fn workload_id(&self) -> Option<&str> {
        self.task().map(|t| t.workload_id.as_str())
    }

    /// Check if this block overlaps another in time.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{Task, TimeOfDay};

    fn base() -> DateTime<Utc> {
        Utc::now()
    }

    fn make_task() -> Task {
        Task {
            id: "t1".to_string(),
            workload_id: "w1".to_string(),
            name: "Draft".to_string(),
            percent_of_total: 1.0,
            preferred_hours: None,
            time_of_day: TimeOfDay::Morning,
        }
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let t0 = base();
        assert!(TimeBlock::try_fixed(t0, t0).is_err());
        assert!(TimeBlock::try_fixed(t0 + Duration::hours(1), t0).is_err());
        assert!(TimeBlock::try_work(make_task(), t0, t0).is_err());
    }

    #[test]
    fn test_kind_helpers() {
        let t0 = base();
        let fixed = TimeBlock::fixed(t0, t0 + Duration::hours(1));
        let work = TimeBlock::work(make_task(), t0 + Duration::hours(2), t0 + Duration::hours(3));

        assert!(!fixed.is_movable());
        assert!(fixed.task().is_none());
        assert!(work.is_movable());
        assert_eq!(work.workload_id(), Some("w1"));
        assert_eq!(work.duration(), Duration::hours(1));
    }

    #[test]
    fn test_overlap() {
        let t0 = base();
        let a = TimeBlock::fixed(t0, t0 + Duration::hours(2));
        let b = TimeBlock::fixed(t0 + Duration::hours(1), t0 + Duration::hours(3));
        let c = TimeBlock::fixed(t0 + Duration::hours(2), t0 + Duration::hours(3));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Touching endpoints do not overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_serde_round_trip() {
        let t0 = base();
        let work = TimeBlock::work(make_task(), t0, t0 + Duration::hours(1));
        let json = serde_json::to_string(&work).unwrap();
        let back: TimeBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(work, back);
    }
}
