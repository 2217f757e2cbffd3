//! Input checks run before any allocation phase.
//!
//! Every defect here is a caller-input problem: a resource that cannot host
//! work, a task with nothing to do, or identifiers that would make the
//! task→resource labeling ambiguous.

use std::collections::HashSet;

use loadsplit_core::{AllocationError, Resource, Task};

use crate::AllocatorConfig;

/// Validate input, stopping at the first defect.
pub fn validate_input(
    tasks: &[Task],
    resources: &[Resource],
    config: &AllocatorConfig,
) -> Result<(), AllocationError> {
    match collect_input_errors(tasks, resources, config).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Collect every input defect.
///
/// Order: configuration, resources, missing resources, tasks (each list in
/// input order).
pub fn collect_input_errors(
    tasks: &[Task],
    resources: &[Resource],
    config: &AllocatorConfig,
) -> Vec<AllocationError> {
    let mut errors = Vec::new();

    if config.day_length <= 0 {
        errors.push(AllocationError::InvalidConfig(format!(
            "day length must be positive, got {}",
            config.day_length
        )));
    }

    let mut resource_ids = HashSet::new();
    for resource in resources {
        if !resource_ids.insert(resource.id.as_str()) {
            errors.push(AllocationError::DuplicateResourceId(resource.id.clone()));
        }
        if resource.daily_capacity <= 0 {
            errors.push(AllocationError::InvalidResource {
                id: resource.id.clone(),
                reason: format!(
                    "daily capacity must be positive, got {}",
                    resource.daily_capacity
                ),
            });
        } else if config.day_length > 0 && resource.daily_capacity > config.day_length {
            errors.push(AllocationError::InvalidResource {
                id: resource.id.clone(),
                reason: format!(
                    "daily capacity {} exceeds the day length {}",
                    resource.daily_capacity, config.day_length
                ),
            });
        }
    }

    if resources.is_empty() && !tasks.is_empty() {
        errors.push(AllocationError::NoResources {
            task_count: tasks.len(),
        });
    }

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id.as_str()) {
            errors.push(AllocationError::DuplicateTaskId(task.id.clone()));
        }
        if task.effort <= 0 {
            errors.push(AllocationError::InvalidTask {
                id: task.id.clone(),
                reason: format!("effort must be positive, got {}", task.effort),
            });
        } else if task.deadline.checked_sub(task.effort).is_none() {
            errors.push(AllocationError::InvalidTask {
                id: task.id.clone(),
                reason: format!(
                    "deadline {} minus effort {} is out of range",
                    task.deadline, task.effort
                ),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> AllocatorConfig {
        AllocatorConfig::default()
    }

    #[test]
    fn valid_input_passes() {
        let tasks = vec![Task::new("a").effort(10).deadline(100)];
        let resources = vec![Resource::new("r1").daily_capacity(480)];
        assert_eq!(validate_input(&tasks, &resources, &config()), Ok(()));
    }

    #[test]
    fn empty_input_is_valid() {
        assert_eq!(validate_input(&[], &[], &config()), Ok(()));
    }

    #[test]
    fn zero_capacity_is_invalid_resource() {
        let resources = vec![Resource::new("r1").daily_capacity(0)];
        let err = validate_input(&[], &resources, &config()).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidResource { ref id, .. } if id == "r1"));
    }

    #[test]
    fn capacity_above_day_length_is_invalid_resource() {
        let resources = vec![Resource::new("r1").daily_capacity(2000)];
        let err = validate_input(&[], &resources, &config()).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidResource { .. }));
    }

    #[test]
    fn non_positive_effort_is_invalid_task() {
        let tasks = vec![Task::new("a").effort(0).deadline(10)];
        let resources = vec![Resource::new("r1")];
        let err = validate_input(&tasks, &resources, &config()).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InvalidTask {
                id: "a".into(),
                reason: "effort must be positive, got 0".into(),
            }
        );
    }

    #[test]
    fn slack_out_of_range_is_invalid_task() {
        let tasks = vec![
            Task::new("ok").effort(10).deadline(-100),
            Task::new("far").effort(10).deadline(i64::MIN),
        ];
        let resources = vec![Resource::new("r1")];
        let errors = collect_input_errors(&tasks, &resources, &config());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], AllocationError::InvalidTask { ref id, .. } if id == "far"));
    }

    #[test]
    fn tasks_without_resources() {
        let tasks = vec![Task::new("a").effort(5), Task::new("b").effort(5)];
        let err = validate_input(&tasks, &[], &config()).unwrap_err();
        assert_eq!(err, AllocationError::NoResources { task_count: 2 });
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let tasks = vec![Task::new("a").effort(5), Task::new("a").effort(7)];
        let resources = vec![Resource::new("r1"), Resource::new("r1")];
        let errors = collect_input_errors(&tasks, &resources, &config());
        assert_eq!(
            errors,
            vec![
                AllocationError::DuplicateResourceId("r1".into()),
                AllocationError::DuplicateTaskId("a".into()),
            ]
        );
    }

    #[test]
    fn bad_day_length_is_reported_first() {
        let config = AllocatorConfig::default().day_length(0);
        let resources = vec![Resource::new("r1").daily_capacity(-1)];
        let errors = collect_input_errors(&[], &resources, &config);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], AllocationError::InvalidConfig(_)));
    }
}
