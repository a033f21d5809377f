//! Epsilon-relaxed auction assignment.
//!
//! Agents bid for tasks whose prices rise with every accepted bid. An agent is
//! *happy* when its current profit (utility minus price, 0 when unassigned) is
//! within ε of the best profit it could get; the auction stops once a whole
//! pass leaves every agent happy. The result is within `n·ε` of the optimum.
//!
//! 1. **Seeding**: each agent, in order, takes the first unclaimed task among
//!    its candidates. Prices start at 0.
//!
//! 2. **Bidding**: agents are visited in index order on one shared state, so a
//!    later agent sees the prices and evictions of earlier ones in the same
//!    pass. An unhappy agent either
//!    - drops its task when doing nothing (the dummy option, profit 0) is best,
//!      with no price change, or
//!    - takes its best task, evicting the holder to unassigned, and raises the
//!      price by `best - second_best + ε`.
//!
//! 3. **Decomposition**: agents are split into connected components of the
//!    visibility graph. Components are solved on separate threads and merged;
//!    a task claimed by several components goes to the highest-utility claim.
//!
//! # Module Structure
//!
//! - [`bidding`] - Per-component bidding loop
//! - [`observer`] - Instrumentation hooks and counters
//! - [`orchestrator`] - Threaded solve and claim merge
//! - `state` - Prices and the agent/task mapping

pub mod bidding;
pub mod observer;
pub mod orchestrator;
mod state;

#[cfg(test)]
mod tests;

pub use bidding::{solve_component, ComponentProblem, ComponentSolution};
pub use observer::{AuctionObserver, AuctionStats, BidEvent, NoopObserver, PassSnapshot};
pub use orchestrator::{AuctionOutcome, ClaimConflict, ComponentReport, Orchestrator};

use super::{AssignmentStrategy, SlotExpansion};
use crate::assignment::Assignment;
use crate::config::validate_epsilon;
use crate::error::AuctionError;
use crate::utility::UtilityMatrix;

/// Auction over a single, fully visible component.
///
/// As an [`AssignmentStrategy`] it expands every task into `capacity` slots
/// and runs the auction on the expanded matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuctionSolver {
    epsilon: f64,
}

impl AuctionSolver {
    /// # Errors
    ///
    /// `InvalidEpsilon` unless `epsilon` is finite and strictly positive.
    pub fn new(epsilon: f64) -> Result<Self, AuctionError> {
        validate_epsilon(epsilon)?;
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Runs the auction with every agent in one component and one slot per task.
    pub fn solve_matrix(&self, utilities: &UtilityMatrix) -> ComponentSolution {
        self.solve_matrix_observed(utilities, &mut NoopObserver)
    }

    pub fn solve_matrix_observed<O: AuctionObserver>(
        &self,
        utilities: &UtilityMatrix,
        observer: &mut O,
    ) -> ComponentSolution {
        let agents: Vec<usize> = (0..utilities.n_agents()).collect();
        let problem = ComponentProblem {
            agents: &agents,
            utilities,
            availability: None,
        };
        solve_component(&problem, self.epsilon, observer)
    }
}

impl Default for AuctionSolver {
    fn default() -> Self {
        Self { epsilon: 1e-5 }
    }
}

impl AssignmentStrategy for AuctionSolver {
    fn assign(
        &self,
        utilities: &UtilityMatrix,
        capacities: &[u32],
    ) -> Result<Assignment, AuctionError> {
        let slots = SlotExpansion::new(utilities, capacities)?;
        let solution = self.solve_matrix(slots.matrix());
        Ok(slots.collapse(&solution.tasks, utilities))
    }

    fn name(&self) -> &str {
        "Auction"
    }
}
