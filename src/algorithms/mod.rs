pub mod auction;
pub mod greedy;
pub mod hungarian;

pub use auction::{AuctionSolver, Orchestrator};
pub use greedy::GreedyStrategy;
pub use hungarian::HungarianOracle;

use crate::assignment::Assignment;
use crate::error::AuctionError;
use crate::utility::{UtilityMatrix, UNKNOWN_UTILITY};

/// Solves a capacity-bounded assignment over a full utility matrix.
///
/// `capacities[t]` is the number of agents task `t` accepts. Unknown entries
/// are never assigned and any agent may stay unassigned.
///
/// # Errors
///
/// Implementations return `DimensionMismatch` when `capacities` does not have
/// one entry per task, plus any strategy-specific precondition error.
pub trait AssignmentStrategy {
    fn assign(
        &self,
        utilities: &UtilityMatrix,
        capacities: &[u32],
    ) -> Result<Assignment, AuctionError>;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &str;
}

/// One-to-one view of a capacitated problem: task `t` becomes `capacities[t]`
/// identical slots.
#[derive(Debug, Clone)]
pub(crate) struct SlotExpansion {
    slot_task: Vec<usize>,
    matrix: UtilityMatrix,
}

impl SlotExpansion {
    pub(crate) fn new(
        utilities: &UtilityMatrix,
        capacities: &[u32],
    ) -> Result<Self, AuctionError> {
        check_capacities(utilities, capacities)?;
        let slot_task: Vec<usize> = capacities
            .iter()
            .enumerate()
            .flat_map(|(task, &cap)| std::iter::repeat(task).take(cap as usize))
            .collect();

        let n_agents = utilities.n_agents();
        let mut matrix = UtilityMatrix::unknown(n_agents, slot_task.len());
        for agent in 0..n_agents {
            for (slot, &task) in slot_task.iter().enumerate() {
                matrix.discover(agent, slot, utilities.get(agent, task));
            }
        }
        Ok(Self { slot_task, matrix })
    }

    pub(crate) fn matrix(&self) -> &UtilityMatrix {
        &self.matrix
    }

    /// Maps per-agent slots back to tasks and totals the original utilities.
    pub(crate) fn collapse(
        &self,
        slots: &[Option<usize>],
        utilities: &UtilityMatrix,
    ) -> Assignment {
        let tasks: Vec<Option<usize>> = slots
            .iter()
            .map(|slot| slot.map(|s| self.slot_task[s]))
            .collect();
        let total = tasks
            .iter()
            .enumerate()
            .filter_map(|(agent, task)| task.map(|t| utilities.get(agent, t)))
            .filter(|&u| u != UNKNOWN_UTILITY)
            .sum();
        Assignment::new(tasks, total)
    }
}

pub(crate) fn check_capacities(
    utilities: &UtilityMatrix,
    capacities: &[u32],
) -> Result<(), AuctionError> {
    if capacities.len() != utilities.n_tasks() {
        return Err(AuctionError::DimensionMismatch {
            what: "capacity vector",
            expected: utilities.n_tasks(),
            found: capacities.len(),
        });
    }
    Ok(())
}
