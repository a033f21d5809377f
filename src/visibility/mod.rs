//! Visibility relations between agents and between agents and tasks.
//!
//! - [`VisibilityGraph`] - symmetric agent adjacency derived from a radius
//! - [`TaskVisibility`] - which tasks each agent sees directly
//! - [`components`] - breadth-first decomposition into connected components
//! - [`propagation`] - diffusion of task knowledge inside a component

pub mod components;
pub mod propagation;

pub use components::{partition, Component};
pub use propagation::{propagate, Availability};

use crate::error::AuctionError;
use crate::geometry::Position;
use petgraph::graph::{NodeIndex, UnGraph};

/// Undirected agent adjacency.
///
/// # Invariants
///
/// - Symmetric: `are_adjacent(i, j) == are_adjacent(j, i)`
/// - No self loops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityGraph {
    n: usize,
    adjacency: Vec<bool>,
}

impl VisibilityGraph {
    /// Creates a graph with `n` isolated agents.
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            adjacency: vec![false; n * n],
        }
    }

    /// Creates a graph where every pair of distinct agents is adjacent.
    pub fn complete(n: usize) -> Self {
        let mut graph = Self::empty(n);
        for i in 0..n {
            for j in 0..n {
                graph.adjacency[i * n + j] = i != j;
            }
        }
        graph
    }

    /// Connects every pair of distinct agents at most `radius` apart.
    ///
    /// A radius of zero or less yields an empty graph.
    pub fn from_positions(agents: &[Position], radius: f64) -> Self {
        let n = agents.len();
        let mut graph = Self::empty(n);
        if radius <= 0.0 {
            return graph;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if agents[i].distance_to(&agents[j]) <= radius {
                    graph.connect(i, j);
                }
            }
        }
        graph
    }

    /// Builds a graph from a square boolean matrix. The diagonal is ignored.
    ///
    /// # Errors
    ///
    /// - `RaggedMatrix` if a row does not have one entry per agent
    /// - `AsymmetricVisibility` if `rows[i][j] != rows[j][i]`
    pub fn from_matrix<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, AuctionError> {
        let n = rows.len();
        for (row, r) in rows.iter().enumerate() {
            if r.as_ref().len() != n {
                return Err(AuctionError::RaggedMatrix {
                    what: "visibility matrix",
                    row,
                    expected: n,
                    found: r.as_ref().len(),
                });
            }
        }

        let mut graph = Self::empty(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let forward = rows[i].as_ref()[j];
                if forward != rows[j].as_ref()[i] {
                    return Err(AuctionError::AsymmetricVisibility { row: i, col: j });
                }
                if forward {
                    graph.connect(i, j);
                }
            }
        }
        Ok(graph)
    }

    fn connect(&mut self, i: usize, j: usize) {
        self.adjacency[i * self.n + j] = true;
        self.adjacency[j * self.n + i] = true;
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns true if agents `i` and `j` see each other.
    pub fn are_adjacent(&self, i: usize, j: usize) -> bool {
        self.adjacency[i * self.n + j]
    }

    /// Neighbours of `agent` in ascending index order.
    pub fn neighbors(&self, agent: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[agent * self.n..(agent + 1) * self.n]
            .iter()
            .enumerate()
            .filter(|(_, &adjacent)| adjacent)
            .map(|(j, _)| j)
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().filter(|&&a| a).count() / 2
    }

    /// Exports the graph as a petgraph `UnGraph` whose node `i` carries agent index `i`.
    pub fn to_graph(&self) -> UnGraph<usize, ()> {
        let mut graph = UnGraph::with_capacity(self.n, self.edge_count());
        for agent in 0..self.n {
            graph.add_node(agent);
        }
        for i in 0..self.n {
            for j in self.neighbors(i).filter(|&j| j > i) {
                graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
            }
        }
        graph
    }
}

/// Direct agent → task visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskVisibility {
    n_agents: usize,
    n_tasks: usize,
    visible: Vec<bool>,
}

impl TaskVisibility {
    /// Every agent sees every task.
    pub fn all(n_agents: usize, n_tasks: usize) -> Self {
        Self {
            n_agents,
            n_tasks,
            visible: vec![true; n_agents * n_tasks],
        }
    }

    /// Agent `i` sees task `k` iff they are at most `radius` apart.
    pub fn from_positions(agents: &[Position], tasks: &[Position], radius: f64) -> Self {
        let visible = agents
            .iter()
            .flat_map(|a| tasks.iter().map(move |t| a.distance_to(t) <= radius))
            .collect();
        Self {
            n_agents: agents.len(),
            n_tasks: tasks.len(),
            visible,
        }
    }

    /// Builds the relation from one row per agent with `n_tasks` entries each.
    pub fn from_matrix<R: AsRef<[bool]>>(rows: &[R], n_tasks: usize) -> Result<Self, AuctionError> {
        let mut visible = Vec::with_capacity(rows.len() * n_tasks);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != n_tasks {
                return Err(AuctionError::RaggedMatrix {
                    what: "task visibility matrix",
                    row,
                    expected: n_tasks,
                    found: r.len(),
                });
            }
            visible.extend_from_slice(r);
        }
        Ok(Self {
            n_agents: rows.len(),
            n_tasks,
            visible,
        })
    }

    pub fn n_agents(&self) -> usize {
        self.n_agents
    }

    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    /// Returns true if `agent` sees `task` directly.
    pub fn sees(&self, agent: usize, task: usize) -> bool {
        self.visible[agent * self.n_tasks + task]
    }

    /// Tasks seen directly by `agent`, in task order.
    pub fn visible_tasks(&self, agent: usize) -> impl Iterator<Item = usize> + '_ {
        self.visible[agent * self.n_tasks..(agent + 1) * self.n_tasks]
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(task, _)| task)
    }
}
