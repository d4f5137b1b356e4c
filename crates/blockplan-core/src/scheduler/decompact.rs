//! Decompaction: reintroducing spacing and variety after placement.
//!
//! The pass spreads movable blocks over the range with near-uniform gaps,
//! walking in reverse chronological order, then reorders long runs of
//! same-workload blocks by swapping tasks with a different-workload
//! neighbor.

use chrono::{DateTime, Duration, Utc};

use crate::block::TimeBlock;
use crate::scheduler::swap::exchange;
use crate::scheduler::ScheduleParams;
use crate::store::WorkloadLookup;
use crate::timeline::{locate_insertion_index, Timeline};

/// Spread movable blocks in `[range_start, range_end]` and break up
/// same-workload runs.
///
/// Redistribution never moves a block earlier than its pre-pass start,
/// never past its owning workload's deadline, and never into a fixed
/// block; an invalid proposal keeps the block where it was and the pass
/// continues. Fixed blocks are never touched.
pub fn decompact(
    timeline: &mut Timeline,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    params: &ScheduleParams,
    lookup: &dyn WorkloadLookup,
) {
    let anchor = locate_insertion_index(timeline.as_slice(), range_start);

    // 1. Working set: blocks from the anchor whose end stays in range.
    let set_len = timeline.as_slice()[anchor..]
        .iter()
        .take_while(|b| b.end <= range_end)
        .count();
    if set_len == 0 {
        return;
    }
    let set_end = anchor + set_len;

    redistribute(timeline, range_start, range_end, anchor, set_end, lookup);
    reorder(timeline, anchor, set_end, params, lookup);
}

fn redistribute(
    timeline: &mut Timeline,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    anchor: usize,
    set_end: usize,
    lookup: &dyn WorkloadLookup,
) {
    let blocks = timeline.blocks_mut();

    let movable: Vec<usize> = (anchor..set_end).filter(|&i| blocks[i].is_movable()).collect();
    if movable.is_empty() {
        return;
    }
    let fixed: Vec<(DateTime<Utc>, DateTime<Utc>)> = (anchor..set_end)
        .filter(|&i| !blocks[i].is_movable())
        .map(|i| (blocks[i].start, blocks[i].end))
        .collect();

    // 2. Free-time budget and near-uniform target gap.
    let occupied: Duration = blocks[anchor..set_end]
        .iter()
        .map(|b| b.duration())
        .fold(Duration::zero(), |acc, d| acc + d);
    let slack = ((range_end - range_start) - occupied).max(Duration::zero());
    let mut avg_gap = slack / movable.len() as i32;

    // The frontier is where the next (chronologically later) block
    // begins; proposals must end at or before it. A block straddling the
    // range end caps it.
    let mut frontier = match blocks.get(set_end) {
        Some(next) if next.start < range_end => next.start,
        _ => range_end,
    };

    // 3. Reverse-chronological walk.
    for (walked, &i) in movable.iter().rev().enumerate() {
        let pre_start = blocks[i].start;
        let duration = blocks[i].duration();

        let proposal = frontier - avg_gap - duration;
        let resolved = resolve_obstacles(proposal, duration, pre_start, frontier, &fixed);

        let accepted = match resolved {
            Some(start) if start < pre_start => None,
            Some(start) => match deadline_of(&blocks[i], lookup) {
                Some(deadline) if start + duration <= deadline => Some(start),
                // Unknown workloads reject conservatively
                _ => None,
            },
            None => None,
        };

        match accepted {
            Some(start) => {
                blocks[i].start = start;
                blocks[i].end = start + duration;
                frontier = start;
            }
            None => {
                // Keep the pre-pass placement and respread what is left.
                frontier = pre_start;
                let remaining = &movable[..movable.len() - walked - 1];
                if !remaining.is_empty() {
                    avg_gap = remaining_gap(blocks, remaining, &fixed, range_start, frontier);
                }
            }
        }
    }

    // A forward obstacle resolution can hop a fixed block.
    blocks.sort_by_key(|b| b.start);
}

/// Move a proposal clear of fixed blocks. Backward first (just before
/// each obstacle); if that under-runs the block's own pre-pass start, one
/// forward resolution (just after the obstacles) is tried instead, capped
/// at the frontier.
fn resolve_obstacles(
    proposal: DateTime<Utc>,
    duration: Duration,
    pre_start: DateTime<Utc>,
    frontier: DateTime<Utc>,
    fixed: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Option<DateTime<Utc>> {
    let mut start = proposal;
    while let Some(&(obstacle_start, _)) = overlapping(start, duration, fixed) {
        start = obstacle_start - duration;
    }
    if start >= pre_start {
        return Some(start);
    }

    let mut start = proposal;
    while let Some(&(_, obstacle_end)) = overlapping(start, duration, fixed) {
        start = obstacle_end;
    }
    // A result still before the pre-pass start is rejected by the caller.
    (start + duration <= frontier).then_some(start)
}

fn overlapping<'a>(
    start: DateTime<Utc>,
    duration: Duration,
    fixed: &'a [(DateTime<Utc>, DateTime<Utc>)],
) -> Option<&'a (DateTime<Utc>, DateTime<Utc>)> {
    fixed
        .iter()
        .find(|(f_start, f_end)| *f_start < start + duration && *f_end > start)
}

/// Recompute the target gap over the movable blocks not yet walked,
/// within `[range_start, frontier]`.
fn remaining_gap(
    blocks: &[TimeBlock],
    remaining: &[usize],
    fixed: &[(DateTime<Utc>, DateTime<Utc>)],
    range_start: DateTime<Utc>,
    frontier: DateTime<Utc>,
) -> Duration {
    let movable_time: Duration = remaining
        .iter()
        .map(|&i| blocks[i].duration())
        .fold(Duration::zero(), |acc, d| acc + d);
    let fixed_time: Duration = fixed
        .iter()
        .filter(|(_, end)| *end <= frontier)
        .map(|(start, end)| *end - *start)
        .fold(Duration::zero(), |acc, d| acc + d);

    let slack = ((frontier - range_start) - movable_time - fixed_time).max(Duration::zero());
    slack / remaining.len() as i32
}

/// Break up same-workload runs: for each consecutive movable triple whose
/// gaps are within the threshold, swap tasks so no two blocks of the same
/// workload sit next to each other. Rejected swaps are skipped.
fn reorder(
    timeline: &mut Timeline,
    anchor: usize,
    set_end: usize,
    params: &ScheduleParams,
    lookup: &dyn WorkloadLookup,
) {
    if set_end < anchor + 3 {
        return;
    }

    for i in anchor..=set_end - 3 {
        let blocks = timeline.as_slice();
        let (a, b, c) = (&blocks[i], &blocks[i + 1], &blocks[i + 2]);
        let (wa, wb, wc) = match (a.workload_id(), b.workload_id(), c.workload_id()) {
            (Some(wa), Some(wb), Some(wc)) => (wa, wb, wc),
            // A fixed block already breaks the run
            _ => continue,
        };
        if b.start - a.end > params.same_workload_gap || c.start - b.end > params.same_workload_gap
        {
            continue;
        }

        let swap = if wa == wb && wb != wc {
            // A A B -> A B A
            Some((b.id.clone(), c.id.clone()))
        } else if wb == wc && wa != wb {
            // A B B -> B A B
            Some((a.id.clone(), b.id.clone()))
        } else {
            None
        };

        if let Some((first_id, second_id)) = swap {
            // A rejected swap (deadline, slack, direction) is skipped.
            let _ = exchange(timeline, &first_id, &second_id, lookup);
        }
    }
}

fn deadline_of(block: &TimeBlock, lookup: &dyn WorkloadLookup) -> Option<DateTime<Utc>> {
    let task = block.task()?;
    lookup.lookup_workload(&task.id).map(|w| w.deadline)
}
