//! Integration tests for the full allocation pipeline
//!
//! Concrete scenarios with hand-computed calendars, plus determinism and
//! error reporting through the `Allocator` trait.

use loadsplit_core::{Allocation, AllocationError, Allocator, Resource, Task, Time};
use loadsplit_solver::{allocate_greedy, ResourceLedger, SlackBalancer};
use pretty_assertions::assert_eq;

fn spans(allocation: &Allocation) -> Vec<(&str, &str, Time, Time)> {
    allocation
        .segments
        .iter()
        .map(|s| (s.task_id.as_str(), s.resource_id.as_str(), s.start, s.end))
        .collect()
}

fn two_shift_workers() -> Vec<Resource> {
    vec![
        Resource::new("r1").name("Ana").daily_capacity(480),
        Resource::new("r2").name("Bruno").daily_capacity(480),
    ]
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn urgent_task_first_then_balance() {
    let tasks = vec![
        Task::new("t500").effort(300).deadline(500),
        Task::new("t1000").effort(200).deadline(1000),
        Task::new("t2000").effort(400).deadline(2000),
    ];

    let allocation = SlackBalancer::new()
        .allocate(&tasks, &two_shift_workers())
        .unwrap();

    assert_eq!(
        spans(&allocation),
        vec![
            ("t500", "r1", 0, 300),
            ("t1000", "r2", 0, 200),
            ("t2000", "r2", 200, 480),
            ("t2000", "r2", 1440, 1560),
        ]
    );

    // The split remainder starts exactly on a day boundary
    let remainder = allocation.segments_for_task("t2000").nth(1).unwrap();
    assert_eq!(remainder.start % 1440, 0);

    for segment in &allocation.segments {
        assert!(segment.duration() <= 480);
    }

    let leads: Vec<(&str, Time)> = allocation
        .lead_times
        .iter()
        .map(|l| (l.task_id.as_str(), l.lead_time))
        .collect();
    assert_eq!(leads, vec![("t500", 200), ("t1000", 800), ("t2000", 440)]);

    assert_eq!(allocation.resource_load("r1").unwrap().total_effort, 300);
    assert_eq!(allocation.resource_load("r2").unwrap().total_effort, 600);
    assert!(allocation.moves.is_empty());
}

#[test]
fn single_resource_splits_over_three_days() {
    let tasks = vec![Task::new("long").effort(250).deadline(5000)];
    let resources = vec![Resource::new("solo").daily_capacity(100)];

    let allocation = SlackBalancer::new().allocate(&tasks, &resources).unwrap();

    let pieces: Vec<(Time, Time)> = allocation
        .segments
        .iter()
        .map(|s| (s.start, s.duration()))
        .collect();
    assert_eq!(pieces, vec![(0, 100), (1440, 100), (2880, 50)]);
    assert_eq!(allocation.lead_time("long").unwrap().finish, 2930);
}

#[test]
fn rebalanced_tasks_get_fresh_times() {
    let tasks = vec![
        Task::new("t1").effort(100).deadline(100),
        Task::new("t2").effort(40).deadline(50),
        Task::new("t3").effort(40).deadline(60),
    ];
    let resources = vec![
        Resource::new("small").daily_capacity(100),
        Resource::new("large").daily_capacity(400),
    ];

    let allocation = SlackBalancer::new().allocate(&tasks, &resources).unwrap();

    assert_eq!(
        spans(&allocation),
        vec![
            ("t2", "small", 0, 40),
            ("t1", "large", 0, 100),
            ("t3", "large", 100, 140),
        ]
    );
    assert_eq!(allocation.moves.len(), 2);
    assert_eq!(allocation.passes, 2);
    assert_eq!(allocation.resource_load("small").unwrap().total_effort, 40);
    assert_eq!(allocation.resource_load("large").unwrap().total_effort, 140);
    assert_eq!(allocation.resource_load("large").unwrap().task_count, 2);
    assert_eq!(allocation.lead_time("t3").unwrap().lead_time, -80);
    assert_eq!(allocation.missed_deadlines().len(), 1);
}

#[test]
fn zero_iterations_keeps_greedy_layout() {
    let tasks = vec![
        Task::new("t1").effort(100).deadline(100),
        Task::new("t2").effort(40).deadline(50),
        Task::new("t3").effort(40).deadline(60),
    ];
    let resources = vec![
        Resource::new("small").daily_capacity(100),
        Resource::new("large").daily_capacity(400),
    ];

    let allocation = SlackBalancer::new()
        .rebalancing_iterations(0)
        .allocate(&tasks, &resources)
        .unwrap();

    let mut ledger = ResourceLedger::new(&resources);
    let greedy = allocate_greedy(&tasks, &mut ledger, 1440).unwrap();

    let key = |s: &loadsplit_core::AllocationSegment| (s.resource_id.clone(), s.start);
    let mut expected = greedy.segments.clone();
    expected.sort_by_key(key);
    let mut actual = allocation.segments.clone();
    actual.sort_by_key(key);

    assert_eq!(actual, expected);
    assert_eq!(allocation.passes, 0);
    assert!(allocation.moves.is_empty());
}

#[test]
fn back_to_back_tasks_skip_the_idle_part_of_the_day() {
    // First task fills the working window exactly; the next starts on day two
    let tasks = vec![
        Task::new("fill").effort(480).deadline(480),
        Task::new("next").effort(60).deadline(3000),
    ];
    let resources = vec![Resource::new("r1").daily_capacity(480)];

    let allocation = SlackBalancer::new().allocate(&tasks, &resources).unwrap();

    assert_eq!(
        spans(&allocation),
        vec![("fill", "r1", 0, 480), ("next", "r1", 1440, 1500)]
    );
}

#[test]
fn custom_day_length() {
    let tasks = vec![Task::new("a").effort(90).deadline(1000)];
    let resources = vec![Resource::new("r1").daily_capacity(40)];

    let allocation = SlackBalancer::new()
        .day_length(60)
        .allocate(&tasks, &resources)
        .unwrap();

    let starts: Vec<Time> = allocation.segments.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0, 60, 120]);
}

#[test]
fn negative_slack_is_scheduled_not_rejected() {
    let tasks = vec![Task::new("hopeless").effort(500).deadline(100)];
    let allocation = SlackBalancer::new()
        .allocate(&tasks, &two_shift_workers())
        .unwrap();

    let lead = allocation.lead_time("hopeless").unwrap();
    assert!(lead.is_late());
    assert_eq!(allocation.segments[0].slack, -400);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn allocation_is_deterministic() {
    let tasks: Vec<Task> = (0..30)
        .map(|i| {
            Task::new(format!("task_{i}"))
                .effort(30 + (i * 37) % 200)
                .deadline(500 + (i * 91) % 3000)
        })
        .collect();
    let resources = vec![
        Resource::new("a").daily_capacity(480),
        Resource::new("b").daily_capacity(240),
        Resource::new("c").daily_capacity(360),
    ];

    let solver = SlackBalancer::new().rebalancing_iterations(10);
    let first = solver.allocate(&tasks, &resources).unwrap();
    let second = solver.allocate(&tasks, &resources).unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// Error taxonomy
// =============================================================================

#[test]
fn invalid_resource_produces_no_segments() {
    let tasks = vec![Task::new("a").effort(10).deadline(100)];
    let resources = vec![Resource::new("broken").daily_capacity(0)];

    let result = SlackBalancer::new().allocate(&tasks, &resources);
    assert!(matches!(
        result,
        Err(AllocationError::InvalidResource { ref id, .. }) if id == "broken"
    ));
}

#[test]
fn invalid_task_is_reported() {
    let tasks = vec![Task::new("empty").effort(-5).deadline(100)];
    let result = SlackBalancer::new().allocate(&tasks, &two_shift_workers());
    assert!(matches!(
        result,
        Err(AllocationError::InvalidTask { ref id, .. }) if id == "empty"
    ));
}

#[test]
fn no_resources_is_reported() {
    let tasks = vec![Task::new("a").effort(10).deadline(100)];
    let result = SlackBalancer::new().allocate(&tasks, &[]);
    assert_eq!(result, Err(AllocationError::NoResources { task_count: 1 }));
}

#[test]
fn duplicate_task_ids_are_rejected() {
    let tasks = vec![
        Task::new("dup").effort(10).deadline(100),
        Task::new("dup").effort(20).deadline(200),
    ];
    let result = SlackBalancer::new().allocate(&tasks, &two_shift_workers());
    assert_eq!(result, Err(AllocationError::DuplicateTaskId("dup".into())));
}
