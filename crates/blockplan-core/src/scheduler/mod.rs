//! The scheduling engine.
//!
//! This module places a workload's steps into free time and rebalances
//! the result:
//! - [`Allocator`]: capacity check, first-fit placement with a single
//!   compaction retry, then decompaction
//! - [`compact`]: removes gaps by sliding movable blocks earlier
//! - [`decompact`]: respreads blocks and breaks up same-workload runs
//! - [`exchange`]: swaps the tasks of two work blocks
//! - [`apply_resize`]: applies one user edit against its neighbors
//!
//! All-or-nothing: `insert_workload` either returns a complete updated
//! timeline or fails with `InsufficientTime`, leaving the input alone.

mod compact;
mod decompact;
mod resize;
mod swap;

pub use compact::compact;
pub use decompact::decompact;
pub use resize::{apply_resize, ResizeKind};
pub use swap::exchange;

use chrono::{DateTime, Duration, Utc};

use crate::block::TimeBlock;
use crate::error::ScheduleError;
use crate::store::WorkloadLookup;
use crate::timeline::{exists_capacity, Timeline};
use crate::workload::{hours_duration, Task, Workload};

/// Tunable placement parameters, threaded through every pass.
#[derive(Debug, Clone)]
pub struct ScheduleParams {
    /// Block length in hours when a step has no preference
    pub default_block_hours: f64,
    /// Smallest block worth placing, in hours; smaller remainders are
    /// dropped
    pub min_block_hours: f64,
    /// Two same-workload blocks closer than this are a run the reorder
    /// pass tries to break
    pub same_workload_gap: Duration,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            default_block_hours: 2.0,
            min_block_hours: 0.25,
            same_workload_gap: Duration::minutes(60),
        }
    }
}

/// Places workloads onto a timeline.
pub struct Allocator {
    params: ScheduleParams,
}

impl Allocator {
    /// Create an allocator with default parameters.
    pub fn new() -> Self {
        Self {
            params: ScheduleParams::default(),
        }
    }

    /// Create with custom parameters.
    pub fn with_params(params: ScheduleParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScheduleParams {
        &self.params
    }

    /// Place every step of `workload` into free time on `timeline`,
    /// then decompact the range. Returns a new timeline; the input is
    /// never mutated, so a failure exposes no partial state.
    ///
    /// # Errors
    /// `InvalidWorkload` for malformed input, `InsufficientTime` when the
    /// range cannot hold the workload's hour budget or a block cannot be
    /// placed even after one compaction pass.
    pub fn insert_workload(
        &self,
        timeline: &Timeline,
        range_start: DateTime<Utc>,
        workload: &Workload,
        lookup: &dyn WorkloadLookup,
    ) -> Result<Timeline, ScheduleError> {
        // 1. Reject malformed input before any scan.
        self.validate(workload)?;

        // 2. Aggregate capacity check; no mutation on failure.
        if !exists_capacity(timeline.as_slice(), range_start, workload) {
            return Err(ScheduleError::InsufficientTime);
        }

        // 3. Convert steps into near-uniform blocks and place them
        //    first-fit, on a working copy.
        let mut updated = timeline.clone();
        let mut cursor = range_start;

        for task in &workload.tasks {
            let hours = workload.expected_hours * task.percent_of_total;
            let target = task.preferred_hours.unwrap_or(self.params.default_block_hours);

            // Guard against float noise right at a multiple of the target.
            let full_blocks = ((hours / target) + 1e-9).floor() as i64;
            let remainder = hours - full_blocks as f64 * target;

            for _ in 0..full_blocks {
                self.place_block(
                    &mut updated,
                    &mut cursor,
                    task,
                    hours_duration(target),
                    range_start,
                    workload.deadline,
                )?;
            }
            if remainder >= self.params.min_block_hours {
                self.place_block(
                    &mut updated,
                    &mut cursor,
                    task,
                    hours_duration(remainder),
                    range_start,
                    workload.deadline,
                )?;
            }
            // Remainders below the minimum are dropped.
        }

        // 4. Rebalance the whole range. The inserted workload overlays
        //    the lookup so its own deadlines resolve.
        let overlay = OverlayLookup { workload, inner: lookup };
        decompact(
            &mut updated,
            range_start,
            workload.deadline,
            &self.params,
            &overlay,
        );

        Ok(updated)
    }

    /// Place one block: scan forward from the cursor for the first gap
    /// that fits; on failure compact the whole range once, following the
    /// cursor through the pass, and retry the identical scan exactly
    /// once.
    fn place_block(
        &self,
        timeline: &mut Timeline,
        cursor: &mut DateTime<Utc>,
        task: &Task,
        length: Duration,
        range_start: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        let start = match find_first_fit(timeline.as_slice(), *cursor, deadline, length) {
            Some(start) => start,
            None => {
                let tracked = compact(timeline, range_start, deadline, Some(*cursor));
                if let Some(instant) = tracked {
                    *cursor = instant;
                }
                find_first_fit(timeline.as_slice(), *cursor, deadline, length)
                    .ok_or(ScheduleError::InsufficientTime)?
            }
        };

        timeline.insert_sorted(TimeBlock::work(task.clone(), start, start + length));
        *cursor = start;
        Ok(())
    }

    fn validate(&self, workload: &Workload) -> Result<(), ScheduleError> {
        let invalid = |reason: &str| ScheduleError::InvalidWorkload {
            reason: reason.to_string(),
        };

        if workload.tasks.is_empty() {
            return Err(invalid("workload has no steps"));
        }
        if !workload.expected_hours.is_finite() || workload.expected_hours <= 0.0 {
            return Err(invalid("expected hours must be positive"));
        }
        for task in &workload.tasks {
            if !task.percent_of_total.is_finite()
                || task.percent_of_total <= 0.0
                || task.percent_of_total > 1.0
            {
                return Err(invalid("step percent must be in (0, 1]"));
            }
            if let Some(hours) = task.preferred_hours {
                if !hours.is_finite() || hours <= 0.0 {
                    return Err(invalid("preferred block length must be positive"));
                }
            }
        }
        if self.params.default_block_hours <= 0.0 || self.params.min_block_hours <= 0.0 {
            return Err(invalid("block length parameters must be positive"));
        }
        Ok(())
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

/// First-fit: the start of the first chronological gap at or after
/// `from` that holds `length` and ends by `deadline`.
fn find_first_fit(
    blocks: &[TimeBlock],
    from: DateTime<Utc>,
    deadline: DateTime<Utc>,
    length: Duration,
) -> Option<DateTime<Utc>> {
    let mut cursor = from;
    for block in blocks {
        if block.end <= cursor {
            continue;
        }
        if block.start - cursor >= length {
            // Any later gap starts later still, so the deadline check is
            // final
            return (cursor + length <= deadline).then_some(cursor);
        }
        cursor = cursor.max(block.end);
    }
    (cursor + length <= deadline).then_some(cursor)
}

/// Resolves the workload being inserted ahead of the caller's lookup.
struct OverlayLookup<'a> {
    workload: &'a Workload,
    inner: &'a dyn WorkloadLookup,
}

impl WorkloadLookup for OverlayLookup<'_> {
    fn lookup_workload(&self, task_id: &str) -> Option<Workload> {
        if self.workload.tasks.iter().any(|t| t.id == task_id) {
            return Some(self.workload.clone());
        }
        self.inner.lookup_workload(task_id)
    }
}
