//! Final calendar layout
//!
//! After rebalancing only the task→resource labeling is authoritative. Each
//! resource's timeline is rebuilt from the origin, its tasks taken in slack
//! order, which yields consistent start/end times and lead times.

use loadsplit_core::{AllocationSegment, Task, TaskLeadTime, Time};
use tracing::info;

use crate::greedy::{place_task, slack_order};
use crate::ledger::ResourceLedger;

/// Final segments and per-task lead times
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    /// Grouped by resource in ledger order, each group in slack order
    pub segments: Vec<AllocationSegment>,
    /// Indexed like the task input
    pub lead_times: Vec<TaskLeadTime>,
}

/// Lay out every task on its labeled resource.
///
/// Cursors are reset first; effort and load factors are left as they are.
/// Calling this again with the same labeling produces the same result.
pub fn materialize(
    tasks: &[Task],
    labeling: &[usize],
    ledger: &mut ResourceLedger,
    day_length: Time,
) -> Materialized {
    ledger.reset_cursors();

    let mut segments = Vec::with_capacity(tasks.len());
    let mut finishes = vec![0; tasks.len()];

    for resource in 0..ledger.len() {
        let members = (0..tasks.len()).filter(|&i| labeling[i] == resource);
        for task_idx in slack_order(tasks, members) {
            finishes[task_idx] =
                place_task(&tasks[task_idx], ledger, resource, day_length, &mut segments);
        }
    }

    let lead_times: Vec<TaskLeadTime> = tasks
        .iter()
        .zip(labeling)
        .zip(&finishes)
        .map(|((task, &resource), &finish)| TaskLeadTime {
            task_id: task.id.clone(),
            resource_id: ledger.state(resource).id.clone(),
            finish,
            lead_time: task.deadline.saturating_sub(finish),
        })
        .collect();

    let missed = lead_times.iter().filter(|l| l.is_late()).count();
    info!(
        segments = segments.len(),
        missed_deadlines = missed,
        "materialized final calendar"
    );

    Materialized {
        segments,
        lead_times,
    }
}
