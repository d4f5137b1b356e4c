//! The timeline: a start-sorted, non-overlapping sequence of blocks.
//!
//! Invariants held after every core mutation:
//! - blocks are sorted ascending by start;
//! - adjacent blocks satisfy `block[i].end <= block[i+1].start`.
//!
//! The core exclusively owns a timeline for the duration of one call;
//! there is no internal locking, and the caller serializes operations
//! against the same logical timeline.

mod ordering;

pub use ordering::{exists_capacity, free_capacity, insert_sorted, locate_insertion_index};

use serde::{Deserialize, Serialize};

use crate::block::TimeBlock;
use crate::error::TimelineError;

/// An ordered sequence of non-overlapping time blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    blocks: Vec<TimeBlock>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Build a timeline from blocks, sorting by start and rejecting any
    /// overlap.
    ///
    /// # Errors
    /// Returns `TimelineError::OverlappingBlocks` naming the first
    /// offending pair.
    pub fn from_blocks(mut blocks: Vec<TimeBlock>) -> Result<Self, TimelineError> {
        blocks.sort_by_key(|b| b.start);
        for pair in blocks.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(TimelineError::OverlappingBlocks {
                    first: pair[0].id.clone(),
                    second: pair[1].id.clone(),
                });
            }
        }
        Ok(Self { blocks })
    }

    /// Merge the two store fetches into one timeline.
    pub fn merge(
        fixed: Vec<TimeBlock>,
        work: Vec<TimeBlock>,
    ) -> Result<Self, TimelineError> {
        let mut blocks = fixed;
        blocks.extend(work);
        Self::from_blocks(blocks)
    }

    pub fn as_slice(&self) -> &[TimeBlock] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeBlock> {
        self.blocks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TimeBlock> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Find the index of the block with the given id.
    pub fn find_index(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }

    /// Insert a block at its sorted position.
    pub fn insert_sorted(&mut self, block: TimeBlock) {
        ordering::insert_sorted(&mut self.blocks, block);
    }

    /// Mutable access for the scheduler passes. Callers must restore the
    /// sort/non-overlap invariants before returning.
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<TimeBlock> {
        &mut self.blocks
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimeBlock;
    type IntoIter = std::slice::Iter<'a, TimeBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
