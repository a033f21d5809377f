//! auctioneer - decentralized task assignment by epsilon-relaxed auction
//!
//! Agents and tasks live in the plane. Agents that see each other (within a
//! visibility radius) form connected components; each component runs its own
//! auction on a separate thread and the per-component results are merged into
//! one assignment. Within a component the total utility is within `n·ε` of the
//! optimum.
//!
//! ```
//! use auctioneer::{solve_auction, Position, SolverConfig};
//!
//! let agents = [Position::new(0.0, 0.0), Position::new(10.0, 0.0)];
//! let tasks = [Position::new(1.0, 0.0), Position::new(9.0, 0.0)];
//! let outcome = solve_auction(&agents, &tasks, &SolverConfig::default()).unwrap();
//! assert_eq!(outcome.assignment.tasks(), &[Some(0), Some(1)]);
//! ```

pub mod algorithms;
pub mod assignment;
pub mod config;
pub mod error;
pub mod geometry;
pub mod problem;
pub mod utility;
pub mod visibility;

pub use algorithms::auction::{AuctionObserver, AuctionOutcome, AuctionStats, NoopObserver};
pub use algorithms::{
    AssignmentStrategy, AuctionSolver, GreedyStrategy, HungarianOracle, Orchestrator,
};
pub use assignment::Assignment;
pub use config::{SolverConfig, TaskKnowledge};
pub use error::AuctionError;
pub use geometry::Position;
pub use problem::AuctionProblem;
pub use utility::{UtilityMatrix, UtilityModel, UNKNOWN_UTILITY};

/// Solves the assignment of `agents` to `tasks` described by `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a position is not
/// finite. Nothing is solved in that case.
pub fn solve_auction(
    agents: &[Position],
    tasks: &[Position],
    config: &SolverConfig,
) -> Result<AuctionOutcome, AuctionError> {
    let problem = AuctionProblem::from_positions(agents, tasks, config)?;
    let orchestrator = Orchestrator::from_config(config)?;
    Ok(orchestrator.solve(&problem))
}
