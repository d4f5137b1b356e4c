//! Block swaps: exchanging the tasks carried by two work blocks.

use crate::error::RejectedEdit;
use crate::store::WorkloadLookup;
use crate::timeline::Timeline;
use crate::workload::Task;

/// Exchange the tasks of two work blocks, identified by id.
///
/// Equal durations swap task payloads in place, provided neither task
/// lands past its owning workload's deadline. Unequal durations support
/// only the push-front direction: the earlier block must be the shorter;
/// its slot stretches to the longer duration (the gap to its successor
/// must absorb the difference) and receives the longer task, while the
/// later slot shrinks to the shorter duration, start-aligned. The
/// symmetric direction rejects.
///
/// Persisting the task exchange is the caller's responsibility.
pub fn exchange(
    timeline: &mut Timeline,
    first_id: &str,
    second_id: &str,
    lookup: &dyn WorkloadLookup,
) -> Result<(), RejectedEdit> {
    let first = timeline
        .find_index(first_id)
        .ok_or_else(|| RejectedEdit::UnknownBlock(first_id.to_string()))?;
    let second = timeline
        .find_index(second_id)
        .ok_or_else(|| RejectedEdit::UnknownBlock(second_id.to_string()))?;
    let (earlier, later) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };

    let earlier_task = task_of(timeline, earlier)?;
    let later_task = task_of(timeline, later)?;

    let earlier_dur = timeline.as_slice()[earlier].duration();
    let later_dur = timeline.as_slice()[later].duration();

    if earlier_dur == later_dur {
        // Tasks trade slots; slot bounds stay put.
        check_deadline(&later_task, timeline.as_slice()[earlier].end, lookup)?;
        check_deadline(&earlier_task, timeline.as_slice()[later].end, lookup)?;

        set_task(timeline, earlier, later_task);
        set_task(timeline, later, earlier_task);
        return Ok(());
    }

    // Push-front: the earlier block must be the shorter one.
    if earlier_dur > later_dur {
        return Err(RejectedEdit::UnsupportedSwap);
    }

    let stretched_end = timeline.as_slice()[earlier].start + later_dur;
    if let Some(next) = timeline.get(earlier + 1) {
        if stretched_end > next.start {
            return Err(RejectedEdit::InsufficientSlack);
        }
    }
    let shrunk_end = timeline.as_slice()[later].start + earlier_dur;

    check_deadline(&later_task, stretched_end, lookup)?;
    check_deadline(&earlier_task, shrunk_end, lookup)?;

    let blocks = timeline.blocks_mut();
    blocks[earlier].end = stretched_end;
    blocks[later].end = shrunk_end;
    set_task(timeline, earlier, later_task);
    set_task(timeline, later, earlier_task);
    Ok(())
}

fn task_of(timeline: &Timeline, index: usize) -> Result<Task, RejectedEdit> {
    timeline.as_slice()[index]
        .task()
        .cloned()
        .ok_or(RejectedEdit::FixedBlock)
}

fn check_deadline(
    task: &Task,
    new_end: chrono::DateTime<chrono::Utc>,
    lookup: &dyn WorkloadLookup,
) -> Result<(), RejectedEdit> {
    let workload = lookup
        .lookup_workload(&task.id)
        .ok_or_else(|| RejectedEdit::UnknownWorkload {
            task_id: task.id.clone(),
        })?;
    if new_end > workload.deadline {
        return Err(RejectedEdit::DeadlineBreach {
            task_id: task.id.clone(),
        });
    }
    Ok(())
}

fn set_task(timeline: &mut Timeline, index: usize, task: Task) {
    use crate::block::BlockKind;
    timeline.blocks_mut()[index].kind = BlockKind::Work { task };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TimeBlock;
    use crate::store::MemoryStore;
    use crate::workload::{TimeOfDay, Workload};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn make_workload(id: &str, task_id: &str, deadline_min: i64) -> Workload {
        Workload {
            id: id.to_string(),
            name: format!("Workload {}", id),
            deadline: t(deadline_min),
            expected_hours: 4.0,
            tasks: vec![Task {
                id: task_id.to_string(),
                workload_id: id.to_string(),
                name: format!("Task {}", task_id),
                percent_of_total: 1.0,
                preferred_hours: None,
                time_of_day: TimeOfDay::Morning,
            }],
        }
    }

    fn setup(deadline_a: i64, deadline_b: i64) -> (MemoryStore, Task, Task) {
        let wl_a = make_workload("wa", "ta", deadline_a);
        let wl_b = make_workload("wb", "tb", deadline_b);
        let (task_a, task_b) = (wl_a.tasks[0].clone(), wl_b.tasks[0].clone());

        let mut store = MemoryStore::new();
        store.add_workload(wl_a);
        store.add_workload(wl_b);
        (store, task_a, task_b)
    }

    #[test]
    fn test_equal_duration_swap() {
        let (store, task_a, task_b) = setup(600, 600);
        let block_a = TimeBlock::work(task_a, t(0), t(120));
        let block_b = TimeBlock::work(task_b, t(240), t(360));
        let (id_a, id_b) = (block_a.id.clone(), block_b.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, block_b]).unwrap();

        exchange(&mut timeline, &id_a, &id_b, &store).unwrap();

        assert_eq!(timeline.get(0).unwrap().task().unwrap().id, "tb");
        assert_eq!(timeline.get(1).unwrap().task().unwrap().id, "ta");
        // Slot bounds stay put
        assert_eq!(timeline.get(0).unwrap().end, t(120));
        assert_eq!(timeline.get(1).unwrap().end, t(360));
    }

    #[test]
    fn test_equal_duration_deadline_breach_rejects() {
        // Task "ta" would land in the later slot, past its deadline
        let (store, task_a, task_b) = setup(300, 600);
        let block_a = TimeBlock::work(task_a, t(0), t(120));
        let block_b = TimeBlock::work(task_b, t(240), t(360));
        let (id_a, id_b) = (block_a.id.clone(), block_b.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, block_b]).unwrap();
        let before = timeline.clone();

        let result = exchange(&mut timeline, &id_a, &id_b, &store);
        assert!(matches!(result, Err(RejectedEdit::DeadlineBreach { .. })));
        assert_eq!(timeline, before);
    }

    #[test]
    fn test_push_front_swap() {
        let (store, task_a, task_b) = setup(600, 600);
        // Shorter block first, 120 min of slack before the longer one
        let block_a = TimeBlock::work(task_a, t(0), t(60));
        let block_b = TimeBlock::work(task_b, t(180), t(300));
        let (id_a, id_b) = (block_a.id.clone(), block_b.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, block_b]).unwrap();

        exchange(&mut timeline, &id_a, &id_b, &store).unwrap();

        let first = timeline.get(0).unwrap();
        let second = timeline.get(1).unwrap();
        assert_eq!(first.task().unwrap().id, "tb");
        assert_eq!((first.start, first.end), (t(0), t(120)));
        assert_eq!(second.task().unwrap().id, "ta");
        assert_eq!((second.start, second.end), (t(180), t(240)));
    }

    #[test]
    fn test_push_front_without_slack_rejects() {
        let (store, task_a, task_b) = setup(600, 600);
        // Only 30 min between the blocks; stretching needs 60
        let block_a = TimeBlock::work(task_a, t(0), t(60));
        let block_b = TimeBlock::work(task_b, t(90), t(210));
        let (id_a, id_b) = (block_a.id.clone(), block_b.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, block_b]).unwrap();
        let before = timeline.clone();

        let result = exchange(&mut timeline, &id_a, &id_b, &store);
        assert!(matches!(result, Err(RejectedEdit::InsufficientSlack)));
        assert_eq!(timeline, before);
    }

    #[test]
    fn test_push_back_direction_rejects() {
        let (store, task_a, task_b) = setup(600, 600);
        // Longer block first: the symmetric case is unsupported
        let block_a = TimeBlock::work(task_a, t(0), t(120));
        let block_b = TimeBlock::work(task_b, t(180), t(240));
        let (id_a, id_b) = (block_a.id.clone(), block_b.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, block_b]).unwrap();

        let result = exchange(&mut timeline, &id_a, &id_b, &store);
        assert!(matches!(result, Err(RejectedEdit::UnsupportedSwap)));
    }

    #[test]
    fn test_fixed_target_rejects() {
        let (store, task_a, _) = setup(600, 600);
        let block_a = TimeBlock::work(task_a, t(0), t(60));
        let fixed = TimeBlock::fixed(t(120), t(180));
        let (id_a, id_f) = (block_a.id.clone(), fixed.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, fixed]).unwrap();

        let result = exchange(&mut timeline, &id_a, &id_f, &store);
        assert!(matches!(result, Err(RejectedEdit::FixedBlock)));
    }

    #[test]
    fn test_unknown_workload_rejects() {
        let store = MemoryStore::new(); // no workloads registered
        let task = make_workload("wa", "ta", 600).tasks[0].clone();
        let other = make_workload("wb", "tb", 600).tasks[0].clone();
        let block_a = TimeBlock::work(task, t(0), t(60));
        let block_b = TimeBlock::work(other, t(120), t(180));
        let (id_a, id_b) = (block_a.id.clone(), block_b.id.clone());
        let mut timeline = Timeline::from_blocks(vec![block_a, block_b]).unwrap();

        let result = exchange(&mut timeline, &id_a, &id_b, &store);
        assert!(matches!(result, Err(RejectedEdit::UnknownWorkload { .. })));
    }
}
