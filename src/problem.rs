//! Validated input of an auction run.

use crate::config::{SolverConfig, TaskKnowledge};
use crate::error::AuctionError;
use crate::geometry::Position;
use crate::utility::UtilityMatrix;
use crate::visibility::{
    partition, propagate, Availability, Component, TaskVisibility, VisibilityGraph,
};

/// Everything the orchestrator needs: utilities, the agent graph, its
/// components and, when task knowledge is restricted, per-agent availability.
///
/// Construction performs all validation, so solving a problem never fails.
#[derive(Debug, Clone)]
pub struct AuctionProblem {
    utilities: UtilityMatrix,
    graph: VisibilityGraph,
    components: Vec<Component>,
    availability: Option<Availability>,
}

impl AuctionProblem {
    /// Builds a problem from agent and task positions.
    ///
    /// Under [`TaskKnowledge::Global`] every utility is computed up front.
    /// Under [`TaskKnowledge::Local`] agents start with no knowledge and learn
    /// the tasks seen by their component; only those utilities are computed.
    ///
    /// # Errors
    ///
    /// Any [`SolverConfig::validate`] error, or `NonFinitePosition`.
    pub fn from_positions(
        agents: &[Position],
        tasks: &[Position],
        config: &SolverConfig,
    ) -> Result<Self, AuctionError> {
        config.validate()?;
        check_positions("agent", agents)?;
        check_positions("task", tasks)?;

        let model = config.utility_model();
        let graph = VisibilityGraph::from_positions(agents, config.visibility_radius);
        let components = partition(&graph);

        let (utilities, availability) = match config.task_knowledge {
            TaskKnowledge::Global => (UtilityMatrix::from_positions(agents, tasks, &model), None),
            TaskKnowledge::Local => {
                let mut utilities = UtilityMatrix::unknown(agents.len(), tasks.len());
                let seen = TaskVisibility::from_positions(agents, tasks, config.visibility_radius);
                let availability = propagate(&components, &seen, &mut utilities, |agent, task| {
                    Some(model.utility(&agents[agent], &tasks[task]))
                });
                (utilities, Some(availability))
            }
        };

        Ok(Self {
            utilities,
            graph,
            components,
            availability,
        })
    }

    /// Builds a problem from precomputed utilities and visibility.
    ///
    /// With `task_visibility`, agents may only bid on tasks seen by their
    /// component; entries outside that set are never filled in, so an agent
    /// whose available tasks are all unknown stays unassigned.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the graph or task visibility does not match the
    /// utility matrix.
    pub fn from_matrices(
        mut utilities: UtilityMatrix,
        graph: VisibilityGraph,
        task_visibility: Option<TaskVisibility>,
    ) -> Result<Self, AuctionError> {
        expect_len("visibility graph", utilities.n_agents(), graph.len())?;
        let components = partition(&graph);

        let availability = match task_visibility {
            Some(seen) => {
                expect_len("task visibility rows", utilities.n_agents(), seen.n_agents())?;
                expect_len("task visibility columns", utilities.n_tasks(), seen.n_tasks())?;
                Some(propagate(&components, &seen, &mut utilities, |_, _| None))
            }
            None => None,
        };

        Ok(Self {
            utilities,
            graph,
            components,
            availability,
        })
    }

    /// A single component holding every agent, with global task knowledge.
    pub fn fully_visible(utilities: UtilityMatrix) -> Self {
        let graph = VisibilityGraph::complete(utilities.n_agents());
        let components = partition(&graph);
        Self {
            utilities,
            graph,
            components,
            availability: None,
        }
    }

    pub fn utilities(&self) -> &UtilityMatrix {
        &self.utilities
    }

    pub fn graph(&self) -> &VisibilityGraph {
        &self.graph
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Per-agent available tasks, `None` under global knowledge.
    pub fn availability(&self) -> Option<&Availability> {
        self.availability.as_ref()
    }

    pub fn n_agents(&self) -> usize {
        self.utilities.n_agents()
    }

    pub fn n_tasks(&self) -> usize {
        self.utilities.n_tasks()
    }
}

fn check_positions(role: &'static str, positions: &[Position]) -> Result<(), AuctionError> {
    match positions.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(AuctionError::NonFinitePosition { role, index }),
        None => Ok(()),
    }
}

fn expect_len(what: &'static str, expected: usize, found: usize) -> Result<(), AuctionError> {
    if expected == found {
        Ok(())
    } else {
        Err(AuctionError::DimensionMismatch {
            what,
            expected,
            found,
        })
    }
}
