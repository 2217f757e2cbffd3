//! Per-resource runtime bookkeeping shared by the allocation phases.

use std::collections::HashMap;

use loadsplit_core::{Resource, ResourceId, ResourceLoad, Time};

/// Runtime state of one resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    pub id: ResourceId,
    pub name: String,
    pub daily_capacity: Time,
    /// Next free time on this resource's timeline
    pub cursor: Time,
    /// Effort of all tasks currently assigned, whole tasks only
    pub total_effort: Time,
    /// `total_effort / daily_capacity`
    pub load_factor: f64,
}

impl ResourceState {
    fn new(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            name: resource.name.clone(),
            daily_capacity: resource.daily_capacity,
            cursor: 0,
            total_effort: 0,
            load_factor: 0.0,
        }
    }

    fn load_with(&self, effort: Time) -> f64 {
        effort as f64 / self.daily_capacity as f64
    }

    fn recompute_load(&mut self) {
        self.load_factor = self.load_with(self.total_effort);
    }
}

/// Arena of resource states indexed by the resource's input position.
///
/// Every mutation goes through this API so each phase's effect on the
/// shared state stays auditable.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    states: Vec<ResourceState>,
    index: HashMap<ResourceId, usize>,
}

impl ResourceLedger {
    /// Build a zeroed ledger; resources keep their input order.
    pub fn new(resources: &[Resource]) -> Self {
        let states: Vec<ResourceState> = resources.iter().map(ResourceState::new).collect();
        let index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { states, index }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[ResourceState] {
        &self.states
    }

    pub fn state(&self, resource: usize) -> &ResourceState {
        &self.states[resource]
    }

    /// Arena position of a resource ID
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn load_factor(&self, resource: usize) -> f64 {
        self.states[resource].load_factor
    }

    /// Load factor the resource would have with `effort` more work
    pub fn hypothetical_load(&self, resource: usize, effort: Time) -> f64 {
        let state = &self.states[resource];
        state.load_with(state.total_effort + effort)
    }

    pub fn cursor(&self, resource: usize) -> Time {
        self.states[resource].cursor
    }

    pub fn total_effort(&self, resource: usize) -> Time {
        self.states[resource].total_effort
    }

    /// Effort assigned across all resources
    pub fn total_assigned(&self) -> Time {
        self.states.iter().map(|s| s.total_effort).sum()
    }

    /// Resource with the lowest load factor; the earliest one wins ties.
    pub fn least_loaded(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, state) in self.states.iter().enumerate() {
            match best {
                Some((_, load)) if state.load_factor >= load => {}
                _ => best = Some((i, state.load_factor)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn apply_assignment(&mut self, resource: usize, effort: Time) {
        let state = &mut self.states[resource];
        state.total_effort += effort;
        state.recompute_load();
    }

    pub fn apply_removal(&mut self, resource: usize, effort: Time) {
        let state = &mut self.states[resource];
        state.total_effort -= effort;
        state.recompute_load();
    }

    pub fn advance_cursor(&mut self, resource: usize, cursor: Time) {
        self.states[resource].cursor = cursor;
    }

    /// Rewind every timeline to the origin; effort and load are kept.
    pub fn reset_cursors(&mut self) {
        for state in &mut self.states {
            state.cursor = 0;
        }
    }

    /// Final per-resource workload for a task→resource labeling
    pub fn resource_loads(&self, labeling: &[usize]) -> Vec<ResourceLoad> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| ResourceLoad {
                resource_id: state.id.clone(),
                resource_name: state.name.clone(),
                total_effort: state.total_effort,
                load_factor: state.load_factor,
                task_count: labeling.iter().filter(|&&r| r == i).count(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger() -> ResourceLedger {
        ResourceLedger::new(&[
            Resource::new("r1").daily_capacity(100),
            Resource::new("r2").name("Bruno").daily_capacity(400),
        ])
    }

    #[test]
    fn starts_zeroed() {
        let ledger = ledger();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.index_of("r2"), Some(1));
        assert_eq!(ledger.index_of("r3"), None);
        assert_eq!(ledger.state(1).name, "Bruno");
        assert_eq!(ledger.cursor(0), 0);
        assert_eq!(ledger.load_factor(1), 0.0);
    }

    #[test]
    fn assignment_and_removal_recompute_load() {
        let mut ledger = ledger();
        ledger.apply_assignment(1, 200);
        assert_eq!(ledger.total_effort(1), 200);
        assert_eq!(ledger.load_factor(1), 0.5);

        ledger.apply_removal(1, 100);
        assert_eq!(ledger.total_effort(1), 100);
        assert_eq!(ledger.load_factor(1), 0.25);
        assert_eq!(ledger.total_assigned(), 100);
    }

    #[test]
    fn hypothetical_load_does_not_mutate() {
        let mut ledger = ledger();
        ledger.apply_assignment(0, 50);
        assert_eq!(ledger.hypothetical_load(0, 50), 1.0);
        assert_eq!(ledger.load_factor(0), 0.5);
    }

    #[test]
    fn least_loaded_prefers_first_on_ties() {
        let mut ledger = ledger();
        assert_eq!(ledger.least_loaded(), Some(0));

        ledger.apply_assignment(0, 10); // 0.1
        assert_eq!(ledger.least_loaded(), Some(1));

        ledger.apply_assignment(1, 40); // 0.1
        assert_eq!(ledger.least_loaded(), Some(0));

        assert_eq!(ResourceLedger::new(&[]).least_loaded(), None);
    }

    #[test]
    fn reset_keeps_effort() {
        let mut ledger = ledger();
        ledger.apply_assignment(0, 80);
        ledger.advance_cursor(0, 1520);
        ledger.reset_cursors();
        assert_eq!(ledger.cursor(0), 0);
        assert_eq!(ledger.total_effort(0), 80);
        assert_eq!(ledger.load_factor(0), 0.8);
    }

    #[test]
    fn resource_loads_count_labeled_tasks() {
        let mut ledger = ledger();
        ledger.apply_assignment(1, 120);
        let loads = ledger.resource_loads(&[1, 1]);
        assert_eq!(loads[0].task_count, 0);
        assert_eq!(loads[1].task_count, 2);
        assert_eq!(loads[1].total_effort, 120);
        assert_eq!(loads[1].resource_name, "Bruno");
    }
}
