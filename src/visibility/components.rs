//! Breadth-first decomposition of the visibility graph.

use std::collections::VecDeque;

use super::VisibilityGraph;

/// A maximal set of mutually reachable agents.
///
/// Agents are stored in breadth-first discovery order; the first agent is the
/// lowest index of the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    agents: Vec<usize>,
}

impl Component {
    /// Agent indices in discovery order.
    pub fn agents(&self) -> &[usize] {
        &self.agents
    }

    /// Number of agents in the component (never zero).
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The agent the traversal started from.
    pub fn root(&self) -> usize {
        self.agents[0]
    }

    pub fn contains(&self, agent: usize) -> bool {
        self.agents.contains(&agent)
    }

    /// Agent indices sorted ascending.
    pub fn sorted_agents(&self) -> Vec<usize> {
        let mut agents = self.agents.clone();
        agents.sort_unstable();
        agents
    }
}

/// Partitions the agents into connected components.
///
/// Traversal starts from every unvisited agent in index order and expands
/// neighbours in ascending index order, so identical graphs always produce
/// identical components. O(n²) on the dense adjacency.
pub fn partition(graph: &VisibilityGraph) -> Vec<Component> {
    let n = graph.len();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);

        let mut agents = Vec::new();
        while let Some(u) = queue.pop_front() {
            agents.push(u);
            for v in graph.neighbors(u) {
                if !visited[v] {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        components.push(Component { agents });
    }

    components
}
