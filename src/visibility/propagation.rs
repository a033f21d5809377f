//! Diffusion of task knowledge along the visibility graph.
//!
//! When task visibility is restricted, an agent learns every task that is
//! visible to any agent it can reach. Reachability is exactly component
//! membership, so the union is computed once per component and shared by its
//! members. Knowledge never crosses components.

use std::collections::BTreeSet;

use super::{Component, TaskVisibility};
use crate::utility::UtilityMatrix;

/// Per-agent sets of tasks available for bidding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    sets: Vec<Vec<usize>>,
}

impl Availability {
    /// Tasks available to `agent`, ascending.
    pub fn for_agent(&self, agent: usize) -> &[usize] {
        &self.sets[agent]
    }

    /// Returns true if `task` is available to `agent`.
    pub fn contains(&self, agent: usize, task: usize) -> bool {
        self.sets[agent].binary_search(&task).is_ok()
    }

    /// Number of agents covered.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Computes available tasks for every agent and fills missing utilities.
///
/// For each agent `s`, `available[s]` is the set of tasks directly visible to
/// any agent of `s`'s component. Whenever a task becomes available to `s` and
/// the utility of `(s, task)` is still unknown, `fill(s, task)` is asked for a
/// value; returning `None` leaves the entry unknown (the agent then cannot bid
/// on it).
///
/// `components` must partition the agents of `task_visibility`.
pub fn propagate<F>(
    components: &[Component],
    task_visibility: &TaskVisibility,
    utilities: &mut UtilityMatrix,
    mut fill: F,
) -> Availability
where
    F: FnMut(usize, usize) -> Option<f64>,
{
    let mut sets = vec![Vec::new(); task_visibility.n_agents()];

    for component in components {
        let known: BTreeSet<usize> = component
            .agents()
            .iter()
            .flat_map(|&agent| task_visibility.visible_tasks(agent))
            .collect();
        let known: Vec<usize> = known.into_iter().collect();

        for &agent in component.agents() {
            for &task in &known {
                if !utilities.is_known(agent, task) {
                    if let Some(value) = fill(agent, task) {
                        utilities.discover(agent, task, value);
                    }
                }
            }
            sets[agent] = known.clone();
        }
    }

    Availability { sets }
}
