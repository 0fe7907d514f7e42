//! Stats overlay text shared by both renderers

use lotview_playback::Frame;

/// Overlay lines for a frame: a status line followed by the counters.
///
/// ```text
/// Time: 3 | Cars: 2 | Step 4/10
/// Parked: 1 | Spawned: 2 | Exited: 0 | Failed plans: 0
/// Avg steps to park: 6.5
/// ```
pub fn stats_lines(frame: &Frame) -> Vec<String> {
    let stats = &frame.stats;
    let mut lines = vec![
        format!(
            "Time: {} | Cars: {} | Step {}/{}",
            frame.t,
            frame.poses.len(),
            frame.index + 1,
            frame.snapshot_count
        ),
        format!(
            "Parked: {} | Spawned: {} | Exited: {} | Failed plans: {}",
            stats.total_parked,
            stats.arriving_cars_spawned,
            stats.initial_active_cars_exited,
            stats.total_failed_plans
        ),
    ];

    if let Some(avg) = stats.average_steps_to_park {
        lines.push(format!("Avg steps to park: {avg:.1}"));
    }
    if let Some(avg) = stats.average_steps_to_exit {
        lines.push(format!("Avg steps to exit: {avg:.1}"));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotview_core::AggregateCounters;

    fn frame(stats: AggregateCounters) -> Frame {
        Frame {
            index: 3,
            snapshot_count: 10,
            t: 3,
            progress: 0.0,
            poses: Vec::new(),
            stats,
        }
    }

    #[test]
    fn test_status_line() {
        let lines = stats_lines(&frame(AggregateCounters::default()));
        assert_eq!(lines[0], "Time: 3 | Cars: 0 | Step 4/10");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_averages_only_when_reported() {
        let lines = stats_lines(&frame(AggregateCounters {
            total_parked: 4,
            average_steps_to_park: Some(6.5),
            ..Default::default()
        }));
        assert_eq!(lines[1], "Parked: 4 | Spawned: 0 | Exited: 0 | Failed plans: 0");
        assert_eq!(lines[2], "Avg steps to park: 6.5");
        assert_eq!(lines.len(), 3);
    }
}
