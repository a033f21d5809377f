//! Assignment results.

use std::fmt;

/// Mapping from agents to tasks with its total utility.
///
/// `None` means the agent is unassigned (it took the zero-utility dummy
/// option) and contributes nothing to the total.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    tasks: Vec<Option<usize>>,
    total_utility: f64,
}

impl Assignment {
    /// Creates an assignment with every agent unassigned.
    pub fn unassigned(n_agents: usize) -> Self {
        Self {
            tasks: vec![None; n_agents],
            total_utility: 0.0,
        }
    }

    pub(crate) fn new(tasks: Vec<Option<usize>>, total_utility: f64) -> Self {
        Self {
            tasks,
            total_utility,
        }
    }

    /// Number of agents covered.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task assigned to `agent`, if any.
    pub fn task_of(&self, agent: usize) -> Option<usize> {
        self.tasks.get(agent).copied().flatten()
    }

    /// First agent holding `task`, if any.
    pub fn agent_of(&self, task: usize) -> Option<usize> {
        self.tasks.iter().position(|&t| t == Some(task))
    }

    /// Agent → task mapping.
    pub fn tasks(&self) -> &[Option<usize>] {
        &self.tasks
    }

    /// Sum of the utilities of assigned agents.
    pub fn total_utility(&self) -> f64 {
        self.total_utility
    }

    /// Number of agents holding a task.
    pub fn assigned_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_some()).count()
    }

    /// Iterates over `(agent, task)` pairs of assigned agents.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tasks
            .iter()
            .enumerate()
            .filter_map(|(agent, task)| task.map(|t| (agent, t)))
    }

    /// Flat index form with `-1` for unassigned agents.
    pub fn as_indices(&self) -> Vec<i64> {
        self.tasks
            .iter()
            .map(|t| t.map_or(-1, |task| task as i64))
            .collect()
    }

    /// Number of agents holding each task.
    pub fn holders_per_task(&self, n_tasks: usize) -> Vec<u32> {
        let mut counts = vec![0; n_tasks];
        for (_, task) in self.pairs() {
            counts[task] += 1;
        }
        counts
    }

    /// Returns true if no task is held by more than one agent.
    pub fn is_one_to_one(&self) -> bool {
        let mut held: Vec<usize> = self.pairs().map(|(_, t)| t).collect();
        let n = held.len();
        held.sort_unstable();
        held.dedup();
        held.len() == n
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, task) in self.tasks.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match task {
                Some(t) => write!(f, "{t}")?,
                None => write!(f, "-")?,
            }
        }
        write!(f, "] utility {:.4}", self.total_utility)
    }
}
