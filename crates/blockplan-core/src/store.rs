//! Collaborator traits for persistence and preferences.
//!
//! The core performs no I/O itself: blocks and workloads come in through
//! these traits and leave through `persist_timeline`, called only after a
//! fully successful operation. [`MemoryStore`] is an in-memory
//! implementation for tests and embedders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::block::TimeBlock;
use crate::error::StoreError;
use crate::workload::{TimeOfDay, Workload};

/// Resolves a task to its owning workload, needed for deadline checks
/// during decompaction and block swaps.
pub trait WorkloadLookup {
    /// Look up the workload owning the given task.
    fn lookup_workload(&self, task_id: &str) -> Option<Workload>;
}

/// Storage collaborator for timelines.
pub trait TimelineStore: WorkloadLookup {
    /// Fetch fixed blocks intersecting the range, sorted by start.
    fn fetch_fixed_blocks(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>, StoreError>;

    /// Fetch work blocks intersecting the range, sorted by start.
    fn fetch_work_blocks(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>, StoreError>;

    /// Commit changed blocks, all or nothing.
    fn persist_timeline(&mut self, changed: &[TimeBlock]) -> Result<(), StoreError>;
}

/// The preference-learning subsystem's output surface: two opaque knobs
/// per task. Read-only; the core never calls back into the learner.
pub trait PreferenceSource {
    /// Preferred contiguous block length in hours, if learned.
    fn preferred_consecutive_hours(&self, task_id: &str) -> Option<f64>;

    /// Preferred time-of-day bucket, if learned.
    fn preferred_time_of_day(&self, task_id: &str) -> Option<TimeOfDay>;
}

/// In-memory store backing all three collaborator traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: HashMap<String, TimeBlock>,
    workloads: HashMap<String, Workload>,
    /// task id -> owning workload id
    task_index: HashMap<String, String>,
    preferences: HashMap<String, (Option<f64>, Option<TimeOfDay>)>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a block.
    pub fn add_block(&mut self, block: TimeBlock) {
        self.blocks.insert(block.id.clone(), block);
    }

    /// Register a workload and index its tasks.
    pub fn add_workload(&mut self, workload: Workload) {
        for task in &workload.tasks {
            self.task_index.insert(task.id.clone(), workload.id.clone());
        }
        self.workloads.insert(workload.id.clone(), workload);
    }

    /// Record learned preferences for a task.
    pub fn set_preference(
        &mut self,
        task_id: impl Into<String>,
        hours: Option<f64>,
        time_of_day: Option<TimeOfDay>,
    ) {
        self.preferences.insert(task_id.into(), (hours, time_of_day));
    }

    /// Get a block by id.
    pub fn block(&self, block_id: &str) -> Option<&TimeBlock> {
        self.blocks.get(block_id)
    }

    /// Number of stored blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn fetch_blocks(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        movable: bool,
    ) -> Vec<TimeBlock> {
        let mut blocks: Vec<TimeBlock> = self
            .blocks
            .values()
            .filter(|b| b.is_movable() == movable)
            .filter(|b| b.start < range_end && b.end > range_start)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| b.start);
        blocks
    }
}

impl WorkloadLookup for MemoryStore {
    fn lookup_workload(&self, task_id: &str) -> Option<Workload> {
        let workload_id = self.task_index.get(task_id)?;
        self.workloads.get(workload_id).cloned()
    }
}

impl TimelineStore for MemoryStore {
    fn fetch_fixed_blocks(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>, StoreError> {
        Ok(self.fetch_blocks(range_start, range_end, false))
    }

    fn fetch_work_blocks(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>, StoreError> {
        Ok(self.fetch_blocks(range_start, range_end, true))
    }

    fn persist_timeline(&mut self, changed: &[TimeBlock]) -> Result<(), StoreError> {
        for block in changed {
            self.blocks.insert(block.id.clone(), block.clone());
        }
        Ok(())
    }
}

impl PreferenceSource for MemoryStore {
    fn preferred_consecutive_hours(&self, task_id: &str) -> Option<f64> {
        self.preferences.get(task_id).and_then(|(hours, _)| *hours)
    }

    fn preferred_time_of_day(&self, task_id: &str) -> Option<TimeOfDay> {
        self.preferences.get(task_id).and_then(|(_, bucket)| *bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn make_workload() -> Workload {
        crate::template::WorkloadTemplate::exam_prep().instantiate("Finals", t(10_000), 6.0)
    }

    #[test]
    fn test_fetch_sorted_and_filtered() {
        let mut store = MemoryStore::new();
        let workload = make_workload();
        let task = workload.tasks[0].clone();

        store.add_block(TimeBlock::fixed(t(120), t(180)));
        store.add_block(TimeBlock::fixed(t(0), t(60)));
        store.add_block(TimeBlock::work(task, t(200), t(260)));

        let fixed = store.fetch_fixed_blocks(t(0), t(300)).unwrap();
        assert_eq!(fixed.len(), 2);
        assert!(fixed[0].start < fixed[1].start);

        let work = store.fetch_work_blocks(t(0), t(300)).unwrap();
        assert_eq!(work.len(), 1);

        // A block entirely outside the range is not fetched
        let fixed = store.fetch_fixed_blocks(t(60), t(120)).unwrap();
        assert!(fixed.is_empty());
    }

    #[test]
    fn test_lookup_workload_by_task() {
        let mut store = MemoryStore::new();
        let workload = make_workload();
        let task_id = workload.tasks[1].id.clone();
        store.add_workload(workload.clone());

        let found = store.lookup_workload(&task_id).unwrap();
        assert_eq!(found.id, workload.id);
        assert!(store.lookup_workload("missing").is_none());
    }

    #[test]
    fn test_persist_upserts() {
        let mut store = MemoryStore::new();
        let mut block = TimeBlock::fixed(t(0), t(60));
        let id = block.id.clone();
        store.add_block(block.clone());

        block.start = t(30);
        store.persist_timeline(std::slice::from_ref(&block)).unwrap();

        assert_eq!(store.block(&id).unwrap().start, t(30));
        assert_eq!(store.block_count(), 1);
    }

    #[test]
    fn test_preferences() {
        let mut store = MemoryStore::new();
        store.set_preference("t1", Some(1.5), Some(TimeOfDay::Evening));

        assert_eq!(store.preferred_consecutive_hours("t1"), Some(1.5));
        assert_eq!(store.preferred_time_of_day("t1"), Some(TimeOfDay::Evening));
        assert_eq!(store.preferred_consecutive_hours("t2"), None);
    }
}
