//! Compaction: removing idle gaps by sliding movable blocks earlier.

use chrono::{DateTime, Utc};

use crate::timeline::{locate_insertion_index, Timeline};

/// Slide movable blocks in `[range_start, range_end]` earlier until the
/// gaps between them close. Fixed blocks are barriers: they never move,
/// and pushing resumes from their end.
///
/// The walk anchors on the first block starting at or after
/// `range_start`; that block keeps its place. Blocks whose end exceeds
/// `range_end` stop the walk.
///
/// `tracked_instant` lets a caller follow a block through the pass: if it
/// equals a block's pre-move start, the returned value is translated by
/// the same delta. The caller's instant is never mutated through an
/// alias; the updated value is returned.
pub fn compact(
    timeline: &mut Timeline,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    tracked_instant: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let blocks = timeline.blocks_mut();
    let anchor = locate_insertion_index(blocks, range_start);
    let mut tracked = tracked_instant;

    if anchor >= blocks.len() {
        return tracked;
    }

    let mut push_to = blocks[anchor].end;
    for block in blocks.iter_mut().skip(anchor + 1) {
        if block.end > range_end {
            break;
        }
        if !block.is_movable() {
            push_to = block.end;
            continue;
        }

        let duration = block.duration();
        if tracked == Some(block.start) {
            tracked = Some(push_to);
        }
        block.start = push_to;
        block.end = push_to + duration;
        push_to = block.end;
    }

    tracked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TimeBlock;
    use crate::workload::{Task, TimeOfDay};
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn make_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            workload_id: "w1".to_string(),
            name: format!("Task {}", id),
            percent_of_total: 1.0,
            preferred_hours: None,
            time_of_day: TimeOfDay::Morning,
        }
    }

    fn work(id: &str, start_min: i64, end_min: i64) -> TimeBlock {
        TimeBlock::work(make_task(id), t(start_min), t(end_min))
    }

    #[test]
    fn test_gaps_close_behind_anchor() {
        let mut timeline = Timeline::from_blocks(vec![
            work("a", 60, 120),
            work("b", 180, 240),
            work("c", 300, 330),
        ])
        .unwrap();

        compact(&mut timeline, t(0), t(600), None);

        // The anchor block never moves; later blocks pack against it
        let starts: Vec<_> = timeline.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![t(60), t(120), t(180)]);
    }

    #[test]
    fn test_fixed_block_is_a_barrier() {
        let mut timeline = Timeline::from_blocks(vec![
            work("a", 60, 120),
            TimeBlock::fixed(t(180), t(240)),
            work("b", 300, 360),
        ])
        .unwrap();

        compact(&mut timeline, t(0), t(600), None);

        let fixed = timeline.get(1).unwrap();
        assert_eq!((fixed.start, fixed.end), (t(180), t(240)));
        // Pushing resumes from the fixed block's end
        assert_eq!(timeline.get(2).unwrap().start, t(240));
    }

    #[test]
    fn test_zero_gap_is_a_noop() {
        let blocks = vec![work("a", 0, 60), work("b", 60, 120), work("c", 120, 150)];
        let mut timeline = Timeline::from_blocks(blocks).unwrap();
        let before = timeline.clone();

        compact(&mut timeline, t(0), t(600), None);
        assert_eq!(timeline, before);
    }

    #[test]
    fn test_tracked_instant_follows_its_block() {
        let mut timeline =
            Timeline::from_blocks(vec![work("a", 0, 60), work("b", 120, 180)]).unwrap();

        let tracked = compact(&mut timeline, t(0), t(600), Some(t(120)));
        assert_eq!(tracked, Some(t(60)));
    }

    #[test]
    fn test_tracked_instant_unmatched_is_returned_unchanged() {
        let mut timeline =
            Timeline::from_blocks(vec![work("a", 0, 60), work("b", 120, 180)]).unwrap();

        let tracked = compact(&mut timeline, t(0), t(600), Some(t(90)));
        assert_eq!(tracked, Some(t(90)));
    }

    #[test]
    fn test_stops_past_range_end() {
        let mut timeline =
            Timeline::from_blocks(vec![work("a", 0, 60), work("b", 120, 300)]).unwrap();

        compact(&mut timeline, t(0), t(240), None);

        // Block "b" ends past the range and is left alone
        assert_eq!(timeline.get(1).unwrap().start, t(120));
    }
}
