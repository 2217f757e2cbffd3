//! # loadsplit-solver
//!
//! Greedy slack-priority allocator with iterative load rebalancing.
//!
//! The allocation runs in three phases over a shared [`ResourceLedger`]:
//! - **Greedy**: tasks in ascending slack order, each to the least loaded resource
//! - **Rebalance**: bounded passes of whole-task moves that lower load imbalance
//! - **Materialize**: per-resource replay in slack order for final times
//!
//! Every phase lays work out with the day-aware [`calendar`] splitter.
//!
//! ## Example
//!
//! ```rust
//! use loadsplit_core::{Allocator, Resource, Task};
//! use loadsplit_solver::SlackBalancer;
//!
//! let tasks = vec![Task::new("N-1").effort(250).deadline(3000)];
//! let resources = vec![Resource::new("ana").daily_capacity(100)];
//!
//! let allocation = SlackBalancer::new().allocate(&tasks, &resources)?;
//! let starts: Vec<i64> = allocation.segments.iter().map(|s| s.start).collect();
//! assert_eq!(starts, vec![0, 1440, 2880]);
//! # Ok::<(), loadsplit_core::AllocationError>(())
//! ```

pub mod calendar;
pub mod greedy;
pub mod ledger;
pub mod materialize;
pub mod rebalance;
pub mod validation;

pub use calendar::{split_effort, split_next, Split, TaskLayout};
pub use greedy::{allocate_greedy, slack_order, GreedyOutcome};
pub use ledger::{ResourceLedger, ResourceState};
pub use materialize::{materialize, Materialized};
pub use rebalance::{rebalance, RebalanceOutcome};
pub use validation::{collect_input_errors, validate_input};

use loadsplit_core::{
    Allocation, AllocationError, Allocator, Resource, Task, Time, DEFAULT_DAY_LENGTH,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Tunables of the allocator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocatorConfig {
    /// Length of a calendar day; capacities are measured from each day start
    pub day_length: Time,
    /// Maximum rebalancing passes (0 keeps the greedy assignment)
    pub rebalancing_iterations: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            day_length: DEFAULT_DAY_LENGTH,
            rebalancing_iterations: 5,
        }
    }
}

impl AllocatorConfig {
    /// Set the day length
    pub fn day_length(mut self, day_length: Time) -> Self {
        self.day_length = day_length;
        self
    }

    /// Set the rebalancing budget
    pub fn rebalancing_iterations(mut self, iterations: usize) -> Self {
        self.rebalancing_iterations = iterations;
        self
    }
}

/// Slack-priority allocator with load rebalancing
#[derive(Clone, Debug, Default)]
pub struct SlackBalancer {
    pub config: AllocatorConfig,
}

impl SlackBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// Set the rebalancing budget
    pub fn rebalancing_iterations(mut self, iterations: usize) -> Self {
        self.config.rebalancing_iterations = iterations;
        self
    }

    /// Set the day length
    pub fn day_length(mut self, day_length: Time) -> Self {
        self.config.day_length = day_length;
        self
    }
}

impl Allocator for SlackBalancer {
    fn allocate(
        &self,
        tasks: &[Task],
        resources: &[Resource],
    ) -> Result<Allocation, AllocationError> {
        validate_input(tasks, resources, &self.config)?;
        let day_length = self.config.day_length;

        let mut ledger = ResourceLedger::new(resources);
        let GreedyOutcome { mut labeling, .. } = allocate_greedy(tasks, &mut ledger, day_length)?;
        info!(
            tasks = tasks.len(),
            resources = resources.len(),
            assigned_effort = ledger.total_assigned(),
            "greedy allocation done"
        );

        let RebalanceOutcome { moves, passes } = rebalance(
            tasks,
            &mut labeling,
            &mut ledger,
            self.config.rebalancing_iterations,
        );

        let Materialized {
            segments,
            lead_times,
        } = materialize(tasks, &labeling, &mut ledger, day_length);

        Ok(Allocation {
            segments,
            lead_times,
            resource_loads: ledger.resource_loads(&labeling),
            moves,
            passes,
        })
    }
}
