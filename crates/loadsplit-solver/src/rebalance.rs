//! Iterative load rebalancing
//!
//! Bounded local search over whole-task moves. A task may move to another
//! resource when that lowers the load it would sit under, and only if it is
//! at least as urgent as every task already there, so the per-resource slack
//! order rebuilt by the materializer keeps it in front.
//!
//! Only resource membership changes here; segment times are recomputed
//! afterwards.

use loadsplit_core::{Task, TaskMove, Time};
use tracing::{debug, info};

use crate::ledger::ResourceLedger;

/// Result of the rebalancing phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebalanceOutcome {
    /// Moves in the order they were applied
    pub moves: Vec<TaskMove>,
    /// Passes executed, at most the iteration budget
    pub passes: usize,
}

/// Whether `resource` may receive a task with the given slack: every task
/// labeled there must have at least that much slack.
pub fn accepts(tasks: &[Task], labeling: &[usize], resource: usize, slack: Time) -> bool {
    labeling
        .iter()
        .zip(tasks)
        .filter(|&(&r, _)| r == resource)
        .all(|(_, task)| task.slack() >= slack)
}

/// Best destination for a task, with its post-move load factor.
///
/// Scans the other resources in order and keeps the feasible one with the
/// lowest hypothetical load strictly below the task's current load; earlier
/// resources win ties.
pub fn best_destination(
    tasks: &[Task],
    labeling: &[usize],
    ledger: &ResourceLedger,
    task_idx: usize,
) -> Option<(usize, f64)> {
    let task = &tasks[task_idx];
    let current = labeling[task_idx];
    let mut best: Option<usize> = None;
    let mut best_load = ledger.load_factor(current);

    for candidate in (0..ledger.len()).filter(|&r| r != current) {
        let load = ledger.hypothetical_load(candidate, task.effort);
        if load < best_load && accepts(tasks, labeling, candidate, task.slack()) {
            best = Some(candidate);
            best_load = load;
        }
    }

    best.map(|r| (r, best_load))
}

/// Run up to `iterations` passes over the tasks in input order.
///
/// A pass without any move ends the phase, since later passes would see the
/// same state.
pub fn rebalance(
    tasks: &[Task],
    labeling: &mut [usize],
    ledger: &mut ResourceLedger,
    iterations: usize,
) -> RebalanceOutcome {
    let mut outcome = RebalanceOutcome::default();

    for pass in 1..=iterations {
        outcome.passes = pass;
        let moves_before = outcome.moves.len();

        for task_idx in 0..tasks.len() {
            let Some((to, to_load_after)) = best_destination(tasks, labeling, ledger, task_idx)
            else {
                continue;
            };

            let task = &tasks[task_idx];
            let from = labeling[task_idx];
            let from_load_before = ledger.load_factor(from);

            ledger.apply_removal(from, task.effort);
            ledger.apply_assignment(to, task.effort);
            labeling[task_idx] = to;

            let task_move = TaskMove {
                task_id: task.id.clone(),
                from: ledger.state(from).id.clone(),
                to: ledger.state(to).id.clone(),
                pass,
                from_load_before,
                to_load_after,
            };
            debug!(
                task = %task_move.task_id,
                from = %task_move.from,
                to = %task_move.to,
                pass,
                from_load_before,
                to_load_after,
                "rebalance move"
            );
            outcome.moves.push(task_move);
        }

        if outcome.moves.len() == moves_before {
            debug!(pass, "rebalancing settled");
            break;
        }
    }

    info!(
        passes = outcome.passes,
        moves = outcome.moves.len(),
        "rebalancing finished"
    );
    outcome
}
