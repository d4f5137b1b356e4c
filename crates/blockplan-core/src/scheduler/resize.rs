//! User-initiated block edits: resizes and drags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::TimeBlock;
use crate::error::RejectedEdit;
use crate::timeline::{locate_insertion_index, Timeline};

/// How an edit changes a block's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeKind {
    /// Start moves later, end stays
    ShrinkTop,
    /// End moves earlier, start stays
    ShrinkBottom,
    /// Start moves earlier, end stays
    GrowTop,
    /// End moves later, start stays
    GrowBottom,
    /// Both bounds move
    Drag,
}

impl ResizeKind {
    /// Classify an edit from the old and new bounds.
    pub fn classify(
        old_start: DateTime<Utc>,
        old_end: DateTime<Utc>,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Self {
        use std::cmp::Ordering::*;
        match (new_start.cmp(&old_start), new_end.cmp(&old_end)) {
            (Greater, Equal) => Self::ShrinkTop,
            (Equal, Less) => Self::ShrinkBottom,
            (Less, Equal) => Self::GrowTop,
            (Equal, Greater) => Self::GrowBottom,
            _ => Self::Drag,
        }
    }
}

/// Apply one resize/move to a work block, validating against its
/// immediate neighbors.
///
/// Shrinks (new bounds nested in the old) are always accepted. Grows and
/// drags are rejected with no mutation if the new bounds overlap the
/// immediate predecessor or successor. Fixed blocks cannot be edited.
pub fn apply_resize(
    timeline: &mut Timeline,
    block_id: &str,
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
) -> Result<ResizeKind, RejectedEdit> {
    if new_end <= new_start {
        return Err(RejectedEdit::InvertedBounds {
            start: new_start,
            end: new_end,
        });
    }
    let index = timeline
        .find_index(block_id)
        .ok_or_else(|| RejectedEdit::UnknownBlock(block_id.to_string()))?;
    if !timeline.as_slice()[index].is_movable() {
        return Err(RejectedEdit::FixedBlock);
    }

    let (old_start, old_end) = {
        let block = &timeline.as_slice()[index];
        (block.start, block.end)
    };
    let kind = ResizeKind::classify(old_start, old_end, new_start, new_end);

    // Nested bounds cannot collide with anything.
    let nested = new_start >= old_start && new_end <= old_end;

    // Pull the block out so the neighbor lookup sees everyone else.
    let mut block = timeline.blocks_mut().remove(index);
    if nested || check_neighbors(timeline.as_slice(), new_start, new_end).is_ok() {
        block.start = new_start;
        block.end = new_end;
        timeline.insert_sorted(block);
        return Ok(kind);
    }

    // Rejected: put the block back untouched.
    timeline.insert_sorted(block);
    Err(RejectedEdit::NeighborOverlap)
}

fn check_neighbors(
    blocks: &[TimeBlock],
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
) -> Result<(), RejectedEdit> {
    let index = locate_insertion_index(blocks, new_start);
    if index > 0 && blocks[index - 1].end > new_start {
        return Err(RejectedEdit::NeighborOverlap);
    }
    if index < blocks.len() && blocks[index].start < new_end {
        return Err(RejectedEdit::NeighborOverlap);
    }
    Ok(())
}
