//! Core error types for blockplan-core.
//!
//! This module defines the error hierarchy using thiserror. Scheduling
//! failures, rejected edits, timeline construction problems, and storage
//! failures each get their own enum, unified under [`PlanError`] at the
//! planner boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level error for the planner facade.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Scheduling failed
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// A user-initiated edit was rejected
    #[error("Rejected edit: {0}")]
    Edit(#[from] RejectedEdit),

    /// The timeline could not be constructed
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// The storage collaborator failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by the allocator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Not enough free time before the deadline, either up front or after
    /// the single compaction retry. No partial state is retained.
    #[error("Insufficient time before the deadline to place the workload")]
    InsufficientTime,

    /// The workload failed validation before any scan began
    #[error("Invalid workload: {reason}")]
    InvalidWorkload { reason: String },
}

/// Rejection causes for block edits and swaps.
///
/// These are returned, never panicked: a rejected edit leaves the
/// timeline untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectedEdit {
    /// The proposed bounds overlap an immediate neighbor
    #[error("Edit would overlap a neighboring block")]
    NeighborOverlap,

    /// The change would push a task past its workload's deadline
    #[error("Edit would push task '{task_id}' past its workload deadline")]
    DeadlineBreach { task_id: String },

    /// Unequal-duration swaps only support the push-front direction
    #[error("Swap direction is unsupported for these block durations")]
    UnsupportedSwap,

    /// Fixed blocks are outside the scheduler's control
    #[error("Fixed blocks cannot be edited")]
    FixedBlock,

    /// No workload is known for the task, so deadline safety cannot be
    /// verified
    #[error("No workload found for task '{task_id}'")]
    UnknownWorkload { task_id: String },

    /// end must be strictly greater than start
    #[error("Invalid bounds: end ({end}) must be greater than start ({start})")]
    InvertedBounds {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The gap after the target block cannot absorb the size change
    #[error("Not enough slack after the block to absorb the change")]
    InsufficientSlack,

    /// No block with this id exists in the timeline
    #[error("No block '{0}' in the timeline")]
    UnknownBlock(String),
}

/// Timeline construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Two blocks occupy overlapping time
    #[error("Blocks '{first}' and '{second}' overlap")]
    OverlappingBlocks { first: String, second: String },
}

/// Storage collaborator errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store reported a failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for PlanError
pub type Result<T, E = PlanError> = std::result::Result<T, E>;
