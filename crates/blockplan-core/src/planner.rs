//! The planner facade: fetch, allocate, persist.
//!
//! Wires the storage collaborator to the scheduling engine. Persistence
//! only happens after a fully successful operation, so the store never
//! sees partial state.

use chrono::{DateTime, Utc};

use crate::block::TimeBlock;
use crate::error::PlanError;
use crate::scheduler::{apply_resize, Allocator, ResizeKind, ScheduleParams};
use crate::store::TimelineStore;
use crate::timeline::Timeline;
use crate::workload::Workload;

/// Facade over one storage collaborator.
pub struct Planner<S: TimelineStore> {
    store: S,
    allocator: Allocator,
}

impl<S: TimelineStore> Planner<S> {
    /// Create a planner with default scheduling parameters.
    pub fn new(store: S) -> Self {
        Self {
            store,
            allocator: Allocator::new(),
        }
    }

    /// Create with custom parameters.
    pub fn with_params(store: S, params: ScheduleParams) -> Self {
        Self {
            store,
            allocator: Allocator::with_params(params),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Schedule a workload into `[range_start, workload.deadline]` and
    /// persist the changed blocks.
    ///
    /// # Errors
    /// Scheduling failures and store failures surface unchanged; nothing
    /// is persisted unless the whole operation succeeded.
    pub fn insert_workload(
        &mut self,
        workload: &Workload,
        range_start: DateTime<Utc>,
    ) -> Result<Timeline, PlanError> {
        let fixed = self
            .store
            .fetch_fixed_blocks(range_start, workload.deadline)?;
        let work = self
            .store
            .fetch_work_blocks(range_start, workload.deadline)?;
        let timeline = Timeline::merge(fixed, work)?;

        let updated = self
            .allocator
            .insert_workload(&timeline, range_start, workload, &self.store)?;

        let changed = changed_blocks(&timeline, &updated);
        self.store.persist_timeline(&changed)?;
        Ok(updated)
    }

    /// Apply one user edit to a block and persist it on success.
    pub fn apply_resize(
        &mut self,
        timeline: &mut Timeline,
        block_id: &str,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<ResizeKind, PlanError> {
        let kind = apply_resize(timeline, block_id, new_start, new_end)?;

        if let Some(index) = timeline.find_index(block_id) {
            let block = timeline.as_slice()[index].clone();
            self.store.persist_timeline(std::slice::from_ref(&block))?;
        }
        Ok(kind)
    }
}

/// Blocks that are new, moved, or carry a different task than before.
fn changed_blocks(before: &Timeline, after: &Timeline) -> Vec<TimeBlock> {
    after
        .iter()
        .filter(|block| {
            match before.find_index(&block.id) {
                None => true,
                Some(index) => {
                    let old = &before.as_slice()[index];
                    old.start != block.start
                        || old.end != block.end
                        || old.task().map(|t| &t.id) != block.task().map(|t| &t.id)
                }
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::template::WorkloadTemplate;
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_changed_blocks_detects_new_and_moved() {
        let a = TimeBlock::fixed(t(0), t(60));
        let mut moved = TimeBlock::fixed(t(120), t(180));
        let fresh = TimeBlock::fixed(t(300), t(360));

        let before = Timeline::from_blocks(vec![a.clone(), moved.clone()]).unwrap();
        moved.start = t(90);
        moved.end = t(150);
        let after = Timeline::from_blocks(vec![a, moved.clone(), fresh.clone()]).unwrap();

        let changed = changed_blocks(&before, &after);
        let ids: Vec<_> = changed.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(changed.len(), 2);
        assert!(ids.contains(&moved.id.as_str()));
        assert!(ids.contains(&fresh.id.as_str()));
    }

    #[test]
    fn test_failed_insert_persists_nothing() {
        let mut store = MemoryStore::new();
        store.add_block(TimeBlock::fixed(t(0), t(540)));
        let block_count = store.block_count();

        let workload =
            WorkloadTemplate::standard_project().instantiate("Too big", t(600), 4.0);
        let mut planner = Planner::new(store);

        let result = planner.insert_workload(&workload, t(0));
        assert!(result.is_err());
        assert_eq!(planner.store().block_count(), block_count);
    }
}
