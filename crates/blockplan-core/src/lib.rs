//! # Blockplan Core Library
//!
//! This library provides the core scheduling engine for Blockplan: given
//! a workload with a deadline, an hour budget, and ordered steps, it
//! places work blocks into free time on a timeline of fixed commitments
//! and other reschedulable work, then rebalances the result so work is
//! spread out and interleaved across workloads.
//!
//! ## Architecture
//!
//! - **Timeline**: a start-sorted, non-overlapping block sequence with
//!   pure ordering helpers
//! - **Scheduler**: first-fit placement with a single compaction retry,
//!   decompaction with a reorder pass, block swaps, and user edits
//! - **Store**: collaborator traits for persistence and learned
//!   preferences; the core itself performs no I/O
//! - **Planner**: facade wiring fetch, allocation, and persistence
//!
//! ## Key Components
//!
//! - [`Allocator`]: places a workload, all-or-nothing
//! - [`Timeline`] / [`TimeBlock`]: the interval data model
//! - [`Planner`]: fetch -> allocate -> persist facade
//! - [`TimelineStore`] / [`PreferenceSource`]: the collaborator seams

pub mod block;
pub mod error;
pub mod planner;
pub mod scheduler;
pub mod store;
pub mod template;
pub mod timeline;
pub mod workload;

pub use block::{BlockKind, TimeBlock};
pub use error::{PlanError, RejectedEdit, ScheduleError, StoreError, TimelineError};
pub use planner::Planner;
pub use scheduler::{
    apply_resize, compact, decompact, exchange, Allocator, ResizeKind, ScheduleParams,
};
pub use store::{MemoryStore, PreferenceSource, TimelineStore, WorkloadLookup};
pub use template::{TemplateStep, WorkloadTemplate};
pub use timeline::{exists_capacity, free_capacity, locate_insertion_index, Timeline};
pub use workload::{Task, TimeOfDay, Workload};
