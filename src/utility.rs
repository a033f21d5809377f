//! Pairwise agent/task utilities.
//!
//! [`UtilityModel`] turns positions into an inverse-distance utility and
//! [`UtilityMatrix`] stores one value per agent/task pair, with
//! [`UNKNOWN_UTILITY`] marking pairs the agent does not know about.

use crate::error::AuctionError;
use crate::geometry::Position;

/// Sentinel for a task that is unknown to (or ineligible for) an agent.
pub const UNKNOWN_UTILITY: f64 = f64::NEG_INFINITY;

/// Saturating inverse-distance utility.
///
/// ```text
/// utility(a, t) = max_utility / (|a - t| + distance_offset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityModel {
    pub max_utility: f64,
    pub distance_offset: f64,
}

impl UtilityModel {
    /// Creates a new utility model.
    pub fn new(max_utility: f64, distance_offset: f64) -> Self {
        Self {
            max_utility,
            distance_offset,
        }
    }

    /// Utility of an agent at `agent` performing a task at `task`.
    pub fn utility(&self, agent: &Position, task: &Position) -> f64 {
        self.max_utility / (agent.distance_to(task) + self.distance_offset)
    }

    /// The largest value [`Self::utility`] can return (at zero distance).
    pub fn upper_bound(&self) -> f64 {
        self.max_utility / self.distance_offset
    }
}

impl Default for UtilityModel {
    fn default() -> Self {
        Self::new(30.0, 0.1)
    }
}

/// Dense `n_agents × n_tasks` utility matrix, row-major by agent.
///
/// # Invariants
///
/// - Every entry is finite or [`UNKNOWN_UTILITY`]
/// - A known entry is never overwritten; [`Self::discover`] only fills unknown cells
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityMatrix {
    n_agents: usize,
    n_tasks: usize,
    values: Vec<f64>,
}

impl UtilityMatrix {
    /// Creates a matrix with every entry unknown.
    pub fn unknown(n_agents: usize, n_tasks: usize) -> Self {
        Self {
            n_agents,
            n_tasks,
            values: vec![UNKNOWN_UTILITY; n_agents * n_tasks],
        }
    }

    /// Creates a matrix from row-major values.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `values.len() != n_agents * n_tasks`
    /// - `InvalidUtility` if an entry is NaN or positive infinity
    pub fn new(n_agents: usize, n_tasks: usize, values: Vec<f64>) -> Result<Self, AuctionError> {
        if values.len() != n_agents * n_tasks {
            return Err(AuctionError::DimensionMismatch {
                what: "utility matrix",
                expected: n_agents * n_tasks,
                found: values.len(),
            });
        }
        let matrix = Self {
            n_agents,
            n_tasks,
            values,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Creates a matrix from one row per agent.
    ///
    /// The task count is taken from the first row; an empty slice gives a
    /// `0 × 0` matrix.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, AuctionError> {
        let n_tasks = rows.first().map_or(0, |r| r.as_ref().len());
        let mut values = Vec::with_capacity(rows.len() * n_tasks);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != n_tasks {
                return Err(AuctionError::RaggedMatrix {
                    what: "utility matrix",
                    row,
                    expected: n_tasks,
                    found: r.len(),
                });
            }
            values.extend_from_slice(r);
        }
        Self::new(rows.len(), n_tasks, values)
    }

    /// Fills every entry from the utility model.
    pub fn from_positions(agents: &[Position], tasks: &[Position], model: &UtilityModel) -> Self {
        let values = agents
            .iter()
            .flat_map(|a| tasks.iter().map(move |t| model.utility(a, t)))
            .collect();
        Self {
            n_agents: agents.len(),
            n_tasks: tasks.len(),
            values,
        }
    }

    pub fn n_agents(&self) -> usize {
        self.n_agents
    }

    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    /// Returns the utility of `agent` for `task` ([`UNKNOWN_UTILITY`] if unknown).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, agent: usize, task: usize) -> f64 {
        assert!(task < self.n_tasks, "task index {task} out of range");
        self.values[agent * self.n_tasks + task]
    }

    /// Returns true if the entry is known.
    pub fn is_known(&self, agent: usize, task: usize) -> bool {
        self.get(agent, task) != UNKNOWN_UTILITY
    }

    /// Returns the utility row of an agent.
    pub fn row(&self, agent: usize) -> &[f64] {
        &self.values[agent * self.n_tasks..(agent + 1) * self.n_tasks]
    }

    /// Iterates over the tasks known to `agent`, in task order.
    pub fn known_tasks(&self, agent: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(agent)
            .iter()
            .enumerate()
            .filter(|(_, &u)| u != UNKNOWN_UTILITY)
            .map(|(task, _)| task)
    }

    /// Stores `value` if the entry is still unknown.
    ///
    /// Returns true if the entry was written. A known entry is left untouched.
    pub fn discover(&mut self, agent: usize, task: usize, value: f64) -> bool {
        let idx = agent * self.n_tasks + task;
        if self.values[idx] == UNKNOWN_UTILITY && value.is_finite() {
            self.values[idx] = value;
            true
        } else {
            false
        }
    }

    /// Largest absolute value among known entries, or 0 when none is known.
    pub fn max_abs(&self) -> f64 {
        self.values
            .iter()
            .filter(|u| u.is_finite())
            .fold(0.0_f64, |acc, u| acc.max(u.abs()))
    }

    fn validate(&self) -> Result<(), AuctionError> {
        for (idx, &value) in self.values.iter().enumerate() {
            if value.is_nan() || value == f64::INFINITY {
                return Err(AuctionError::InvalidUtility {
                    agent: idx / self.n_tasks,
                    task: idx % self.n_tasks,
                    value,
                });
            }
        }
        Ok(())
    }
}
