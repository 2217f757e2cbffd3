//! # loadsplit-core
//!
//! Core domain model and traits for the loadsplit allocation engine.
//!
//! This crate provides:
//! - Domain types: `Task`, `Resource`, `AllocationSegment`, `Allocation`
//! - Core traits: `Allocator`, `Renderer`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use loadsplit_core::{Resource, Task};
//!
//! let tasks = vec![
//!     Task::new("N-100").effort(300).deadline(500),
//!     Task::new("N-101").effort(200).deadline(1000),
//! ];
//! let resources = vec![Resource::new("ana").name("Ana").daily_capacity(480)];
//!
//! assert_eq!(tasks[0].slack(), 200);
//! assert_eq!(resources[0].daily_capacity, 480);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Identifier of a task
pub type TaskId = String;

/// Unique identifier for a resource
pub type ResourceId = String;

/// Absolute time or duration in scheduling units (minutes by convention)
pub type Time = i64;

/// Length of a calendar day in minutes
pub const DEFAULT_DAY_LENGTH: Time = 1440;

// ============================================================================
// Task
// ============================================================================

/// A unit of work that must be placed on exactly one resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Work required, in the same unit as resource capacity
    pub effort: Time,
    /// Absolute time by which the effort should be complete
    pub deadline: Time,
}

impl Task {
    /// Create a new task with zero effort and a zero deadline
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            effort: 0,
            deadline: 0,
        }
    }

    /// Set the effort
    pub fn effort(mut self, effort: Time) -> Self {
        self.effort = effort;
        self
    }

    /// Set the deadline
    pub fn deadline(mut self, deadline: Time) -> Self {
        self.deadline = deadline;
        self
    }

    /// Scheduling margin: `deadline - effort`.
    ///
    /// Negative when the deadline is unattainable even if the task starts
    /// at time zero. Saturates at the bounds of [`Time`].
    pub fn slack(&self) -> Time {
        self.deadline.saturating_sub(self.effort)
    }
}

// ============================================================================
// Resource
// ============================================================================

/// A person or station that executes tasks within a daily working window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier
    pub id: ResourceId,
    /// Human-readable name
    pub name: String,
    /// Usable time at the start of each day
    pub daily_capacity: Time,
}

impl Resource {
    /// Create a new resource with the given ID and a full 8-hour day
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            daily_capacity: 480,
        }
    }

    /// Set the resource name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the daily capacity
    pub fn daily_capacity(mut self, capacity: Time) -> Self {
        self.daily_capacity = capacity;
        self
    }
}

// ============================================================================
// Allocation (Result)
// ============================================================================

/// One contiguous slice of a task on a resource, within a single working day
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSegment {
    pub task_id: TaskId,
    pub resource_id: ResourceId,
    pub resource_name: String,
    /// Inclusive start time
    pub start: Time,
    /// Exclusive end time
    pub end: Time,
    pub task_effort: Time,
    pub deadline: Time,
    pub slack: Time,
}

impl AllocationSegment {
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

/// Final completion margin of a task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLeadTime {
    pub task_id: TaskId,
    pub resource_id: ResourceId,
    /// End of the task's last segment
    pub finish: Time,
    /// `deadline - finish`; negative means the deadline is missed
    pub lead_time: Time,
}

impl TaskLeadTime {
    pub fn is_late(&self) -> bool {
        self.lead_time < 0
    }
}

/// Final workload of a resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceLoad {
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub total_effort: Time,
    pub load_factor: f64,
    pub task_count: usize,
}

/// A task relabeled from one resource to another during rebalancing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskMove {
    pub task_id: TaskId,
    pub from: ResourceId,
    pub to: ResourceId,
    /// 1-based rebalancing pass in which the move happened
    pub pass: usize,
    /// Load factor of `from` just before the move
    pub from_load_before: f64,
    /// Load factor of `to` just after the move
    pub to_load_after: f64,
}

/// The result of allocating tasks to resources
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Segments grouped by resource (resource input order), each group in slack order
    pub segments: Vec<AllocationSegment>,
    /// One entry per task, in task input order
    pub lead_times: Vec<TaskLeadTime>,
    /// One entry per resource, in resource input order
    pub resource_loads: Vec<ResourceLoad>,
    /// Rebalancing moves in the order they were applied
    pub moves: Vec<TaskMove>,
    /// Number of rebalancing passes executed
    pub passes: usize,
}

impl Allocation {
    /// Segments of one task, in time order
    pub fn segments_for_task<'a>(
        &'a self,
        task_id: &'a str,
    ) -> impl Iterator<Item = &'a AllocationSegment> + 'a {
        self.segments.iter().filter(move |s| s.task_id == task_id)
    }

    /// Segments placed on one resource, in time order
    pub fn segments_for_resource<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> impl Iterator<Item = &'a AllocationSegment> + 'a {
        self.segments.iter().filter(move |s| s.resource_id == resource_id)
    }

    /// Get the lead time entry of a task
    pub fn lead_time(&self, task_id: &str) -> Option<&TaskLeadTime> {
        self.lead_times.iter().find(|l| l.task_id == task_id)
    }

    /// Get the final load of a resource
    pub fn resource_load(&self, resource_id: &str) -> Option<&ResourceLoad> {
        self.resource_loads.iter().find(|r| r.resource_id == resource_id)
    }

    /// Tasks finishing after their deadline
    pub fn missed_deadlines(&self) -> Vec<&TaskLeadTime> {
        self.lead_times.iter().filter(|l| l.is_late()).collect()
    }

    /// Latest segment end, or zero for an empty allocation
    pub fn makespan(&self) -> Time {
        self.segments.iter().map(|s| s.end).max().unwrap_or(0)
    }

    pub fn summary(&self) -> AllocationSummary {
        let (min_load, max_load) = self
            .resource_loads
            .iter()
            .map(|r| r.load_factor)
            .fold(None, |acc: Option<(f64, f64)>, load| match acc {
                None => Some((load, load)),
                Some((lo, hi)) => Some((lo.min(load), hi.max(load))),
            })
            .unwrap_or((0.0, 0.0));

        AllocationSummary {
            task_count: self.lead_times.len(),
            segment_count: self.segments.len(),
            resource_count: self.resource_loads.len(),
            makespan: self.makespan(),
            missed_deadlines: self.missed_deadlines().len(),
            load_spread: max_load - min_load,
            moves: self.moves.len(),
            passes: self.passes,
        }
    }
}

/// Aggregate figures for reporting
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub task_count: usize,
    pub segment_count: usize,
    pub resource_count: usize,
    pub makespan: Time,
    pub missed_deadlines: usize,
    /// Highest minus lowest resource load factor
    pub load_spread: f64,
    pub moves: usize,
    pub passes: usize,
}

// ============================================================================
// Traits
// ============================================================================

/// Core allocation abstraction
pub trait Allocator: Send + Sync {
    /// Assign every task to a resource and lay it out on that resource's calendar
    fn allocate(&self, tasks: &[Task], resources: &[Resource])
        -> Result<Allocation, AllocationError>;
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render an allocation to the output format
    fn render(&self, allocation: &Allocation) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Input defects detected before allocation starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("Invalid resource '{id}': {reason}")]
    InvalidResource { id: ResourceId, reason: String },

    #[error("Invalid task '{id}': {reason}")]
    InvalidTask { id: TaskId, reason: String },

    #[error("No resources available for {task_count} task(s)")]
    NoResources { task_count: usize },

    #[error("Duplicate task ID: {0}")]
    DuplicateTaskId(TaskId),

    #[error("Duplicate resource ID: {0}")]
    DuplicateResourceId(ResourceId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
