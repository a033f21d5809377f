//! Parallel solve of all components and the merge of their claims.

use std::panic;
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::bidding::{solve_component, ComponentProblem, ComponentSolution};
use super::observer::{AuctionObserver, NoopObserver};
use crate::assignment::Assignment;
use crate::config::{validate_epsilon, SolverConfig};
use crate::error::AuctionError;
use crate::problem::AuctionProblem;
use crate::utility::UtilityMatrix;

/// Summary of one component solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentReport {
    /// Agents of the component in discovery order.
    pub agents: Vec<usize>,
    /// Total utility of the component's own assignment, before the merge.
    pub local_utility: f64,
    pub passes: usize,
}

/// A task claimed by agents of several components.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimConflict {
    pub task: usize,
    /// Agent that kept the task.
    pub winner: usize,
    /// Agents left unassigned by the merge, ascending.
    pub losers: Vec<usize>,
}

/// Merged result of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuctionOutcome {
    pub assignment: Assignment,
    /// One report per component, in partition order.
    pub components: Vec<ComponentReport>,
    /// Cross-component claims resolved by the merge, ascending by task.
    pub conflicts: Vec<ClaimConflict>,
}

impl AuctionOutcome {
    /// Sum over tasks of the retained claim's utility.
    pub fn total_utility(&self) -> f64 {
        self.assignment.total_utility()
    }
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    agent: usize,
    utility: f64,
}

impl Claim {
    /// Higher utility wins; equal utilities go to the lower agent index.
    fn beats(&self, other: &Claim) -> bool {
        self.utility > other.utility || (self.utility == other.utility && self.agent < other.agent)
    }
}

/// Per-task best claim plus every claimant, filled as components finish.
///
/// The winner of a task does not depend on submission order.
#[derive(Debug)]
struct MergeBoard {
    best: Vec<Option<Claim>>,
    claimants: Vec<Vec<usize>>,
}

impl MergeBoard {
    fn new(n_tasks: usize) -> Self {
        Self {
            best: vec![None; n_tasks],
            claimants: vec![Vec::new(); n_tasks],
        }
    }

    fn submit(&mut self, solution: &ComponentSolution, utilities: &UtilityMatrix) {
        for (agent, task) in solution.pairs() {
            let claim = Claim {
                agent,
                utility: utilities.get(agent, task),
            };
            self.claimants[task].push(agent);
            let slot = &mut self.best[task];
            if slot.map_or(true, |current| claim.beats(&current)) {
                *slot = Some(claim);
            }
        }
    }

    fn finish(self, n_agents: usize) -> (Assignment, Vec<ClaimConflict>) {
        let MergeBoard { best, claimants } = self;
        let mut tasks = vec![None; n_agents];
        let mut total = 0.0;
        let mut conflicts = Vec::new();

        for (task, (claim, mut agents)) in best.into_iter().zip(claimants).enumerate() {
            let Some(claim) = claim else { continue };
            tasks[claim.agent] = Some(task);
            total += claim.utility;

            agents.retain(|&a| a != claim.agent);
            if !agents.is_empty() {
                agents.sort_unstable();
                debug!(task, winner = claim.agent, losers = ?agents, "claim conflict resolved");
                conflicts.push(ClaimConflict {
                    task,
                    winner: claim.agent,
                    losers: agents,
                });
            }
        }

        (Assignment::new(tasks, total), conflicts)
    }
}

/// Runs the auction on every component in parallel and merges the results.
///
/// Each component gets its own scoped thread with thread-local prices; the
/// problem is shared read-only. Claims are merged under a single mutex once a
/// component finishes. When components claim the same task the best claim is
/// kept and the other claimants end up unassigned; they are not re-auctioned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orchestrator {
    epsilon: f64,
}

impl Orchestrator {
    /// # Errors
    ///
    /// `InvalidEpsilon` unless `epsilon` is finite and strictly positive.
    pub fn new(epsilon: f64) -> Result<Self, AuctionError> {
        validate_epsilon(epsilon)?;
        Ok(Self { epsilon })
    }

    /// Takes epsilon from a validated configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self, AuctionError> {
        config.validate()?;
        Ok(Self {
            epsilon: config.epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn solve(&self, problem: &AuctionProblem) -> AuctionOutcome {
        self.solve_observed::<NoopObserver>(problem).0
    }

    /// Solves with one fresh observer per component.
    ///
    /// Observers are returned in component order. Observers see global agent
    /// indices.
    pub fn solve_observed<O>(&self, problem: &AuctionProblem) -> (AuctionOutcome, Vec<O>)
    where
        O: AuctionObserver + Default + Send,
    {
        let epsilon = self.epsilon;
        let utilities = problem.utilities();
        let availability = problem.availability();
        let board = Mutex::new(MergeBoard::new(problem.n_tasks()));

        info!(
            agents = problem.n_agents(),
            tasks = problem.n_tasks(),
            components = problem.components().len(),
            epsilon,
            "auction run started"
        );

        let solved: Vec<(ComponentReport, O)> = thread::scope(|scope| {
            let handles: Vec<_> = problem
                .components()
                .iter()
                .enumerate()
                .map(|(index, component)| {
                    let board = &board;
                    scope.spawn(move || {
                        let mut observer = O::default();
                        let input = ComponentProblem {
                            agents: component.agents(),
                            utilities,
                            availability,
                        };
                        let solution = solve_component(&input, epsilon, &mut observer);
                        debug!(
                            component = index,
                            agents = solution.agents.len(),
                            utility = solution.total_utility,
                            passes = solution.passes,
                            "component solved"
                        );

                        board.lock().submit(&solution, utilities);

                        let report = ComponentReport {
                            agents: solution.agents,
                            local_utility: solution.total_utility,
                            passes: solution.passes,
                        };
                        (report, observer)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        let (assignment, conflicts) = board.into_inner().finish(problem.n_agents());
        let (components, observers): (Vec<_>, Vec<_>) = solved.into_iter().unzip();

        info!(
            assigned = assignment.assigned_count(),
            total_utility = assignment.total_utility(),
            conflicts = conflicts.len(),
            "auction run finished"
        );

        let outcome = AuctionOutcome {
            assignment,
            components,
            conflicts,
        };
        (outcome, observers)
    }
}
