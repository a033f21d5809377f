//! Mutual-best greedy assignment.
//!
//! A cheap baseline: fast, deterministic, no optimality guarantee.

use super::{check_capacities, AssignmentStrategy};
use crate::assignment::Assignment;
use crate::error::AuctionError;
use crate::utility::UtilityMatrix;

/// Greedy assignment by mutual preference.
///
/// Repeatedly, each pending agent looks at its best open task (highest
/// positive utility, lowest index on ties). It keeps the task unless another
/// pending agent values that task strictly more. Taking a task uses one unit
/// of its capacity. An agent with no positive open task stays unassigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

impl GreedyStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// Best open task of `agent` with strictly positive utility.
fn best_open(utilities: &UtilityMatrix, remaining: &[u32], agent: usize) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (task, &value) in utilities.row(agent).iter().enumerate() {
        if remaining[task] == 0 || value <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((task, value));
        }
    }
    best
}

impl AssignmentStrategy for GreedyStrategy {
    fn assign(
        &self,
        utilities: &UtilityMatrix,
        capacities: &[u32],
    ) -> Result<Assignment, AuctionError> {
        check_capacities(utilities, capacities)?;
        let n = utilities.n_agents();
        let mut remaining = capacities.to_vec();
        let mut pending = vec![true; n];
        let mut tasks = vec![None; n];
        let mut total = 0.0;

        while pending.contains(&true) {
            let mut progress = false;
            for agent in 0..n {
                if !pending[agent] {
                    continue;
                }
                let Some((task, value)) = best_open(utilities, &remaining, agent) else {
                    pending[agent] = false;
                    progress = true;
                    continue;
                };
                let contested = (0..n).any(|other| {
                    other != agent && pending[other] && utilities.get(other, task) > value
                });
                if contested {
                    continue;
                }
                tasks[agent] = Some(task);
                total += value;
                remaining[task] -= 1;
                pending[agent] = false;
                progress = true;
            }
            if !progress {
                break;
            }
        }

        Ok(Assignment::new(tasks, total))
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}
