//! Pure ordering helpers over a start-sorted block slice.

use chrono::{DateTime, Duration, Utc};

use crate::block::TimeBlock;
use crate::workload::Workload;

/// Find the index at which a block starting at `instant` would be
/// inserted to keep the slice start-sorted.
///
/// Returns 0 for an empty slice or an instant at or before the first
/// start, `len` for an instant past the last start. A tie with an
/// existing start resolves to inserting before that element.
pub fn locate_insertion_index(blocks: &[TimeBlock], instant: DateTime<Utc>) -> usize {
    blocks.partition_point(|b| b.start < instant)
}

/// Insert a block at its sorted position.
pub fn insert_sorted(blocks: &mut Vec<TimeBlock>, block: TimeBlock) {
    let index = locate_insertion_index(blocks, block.start);
    blocks.insert(index, block);
}

/// Aggregate free time between `range_start` and `deadline` around the
/// given blocks: the lead-in before the first block, every inter-block
/// gap, and the tail after the last block. An empty slice yields the full
/// range. Signed arithmetic, so blocks straddling either bound subtract
/// naturally.
pub fn free_capacity(
    blocks: &[TimeBlock],
    range_start: DateTime<Utc>,
    deadline: DateTime<Utc>,
) -> Duration {
    let (first, last) = match (blocks.first(), blocks.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return deadline - range_start,
    };

    let mut free = (first.start - range_start) + (deadline - last.end);
    for pair in blocks.windows(2) {
        free = free + (pair[1].start - pair[0].end);
    }
    free
}

/// Whether the free time in `[range_start, workload.deadline]` covers the
/// workload's hour budget.
pub fn exists_capacity(
    blocks: &[TimeBlock],
    range_start: DateTime<Utc>,
    workload: &Workload,
) -> bool {
    free_capacity(blocks, range_start, workload.deadline) >= workload.expected_duration()
}
