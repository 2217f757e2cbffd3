//! Greedy slack-priority allocation
//!
//! Tasks are taken in urgency order (ascending slack, input order on ties)
//! and each goes whole to the resource with the lowest load factor at that
//! moment. Nothing is reconsidered; balancing is left to the rebalancer.

use loadsplit_core::{AllocationError, AllocationSegment, Task, Time};
use tracing::{debug, trace};

use crate::calendar::split_effort;
use crate::ledger::ResourceLedger;

/// Result of the greedy phase
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyOutcome {
    /// Segments in placement order
    pub segments: Vec<AllocationSegment>,
    /// Resource index of each task, indexed by task input position
    pub labeling: Vec<usize>,
}

/// Order task indices by ascending slack, breaking ties by input position.
pub fn slack_order(tasks: &[Task], members: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut order: Vec<usize> = members.into_iter().collect();
    order.sort_by_key(|&i| (tasks[i].slack(), i));
    order
}

/// Place one task from the resource's cursor, append its segments and
/// advance the cursor. Returns the task's finish time.
pub(crate) fn place_task(
    task: &Task,
    ledger: &mut ResourceLedger,
    resource: usize,
    day_length: Time,
    segments: &mut Vec<AllocationSegment>,
) -> Time {
    let state = ledger.state(resource);
    let layout = split_effort(state.cursor, task.effort, state.daily_capacity, day_length);

    for &(start, end) in &layout.pieces {
        trace!(task = %task.id, resource = %state.id, start, end, "segment");
        segments.push(AllocationSegment {
            task_id: task.id.clone(),
            resource_id: state.id.clone(),
            resource_name: state.name.clone(),
            start,
            end,
            task_effort: task.effort,
            deadline: task.deadline,
            slack: task.slack(),
        });
    }

    let finish = layout.finish().unwrap_or(state.cursor);
    ledger.advance_cursor(resource, layout.cursor);
    finish
}

/// Run the greedy phase on a fresh ledger.
pub fn allocate_greedy(
    tasks: &[Task],
    ledger: &mut ResourceLedger,
    day_length: Time,
) -> Result<GreedyOutcome, AllocationError> {
    let mut segments = Vec::with_capacity(tasks.len());
    let mut labeling = vec![0; tasks.len()];

    for task_idx in slack_order(tasks, 0..tasks.len()) {
        let task = &tasks[task_idx];
        let resource = ledger.least_loaded().ok_or(AllocationError::NoResources {
            task_count: tasks.len(),
        })?;

        let finish = place_task(task, ledger, resource, day_length, &mut segments);
        ledger.apply_assignment(resource, task.effort);
        labeling[task_idx] = resource;

        debug!(
            task = %task.id,
            resource = %ledger.state(resource).id,
            slack = task.slack(),
            finish,
            load = ledger.load_factor(resource),
            "greedy placement"
        );
    }

    Ok(GreedyOutcome { segments, labeling })
}
