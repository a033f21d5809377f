//! Exact assignment via the Hungarian method.
//!
//! Used as the reference optimum when measuring the auction's accuracy; the
//! auction never calls it.

use super::{AssignmentStrategy, SlotExpansion};
use crate::assignment::Assignment;
use crate::error::AuctionError;
use crate::utility::UtilityMatrix;

/// Exact maximum-utility assignment.
///
/// Tasks are expanded into `capacity` slots and every agent gets a private
/// zero-utility column, so declining is allowed exactly as in the auction.
/// Unknown entries are priced far below any real option and are never part of
/// the result. O(n·k²) for `n` agents and `k` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianOracle;

impl HungarianOracle {
    pub fn new() -> Self {
        Self
    }

    /// Solves the one-slot-per-task problem.
    pub fn solve_matrix(&self, utilities: &UtilityMatrix) -> Assignment {
        let mut tasks = vec![None; utilities.n_agents()];
        let mut total = 0.0;
        for (agent, task) in maximize(utilities) {
            tasks[agent] = Some(task);
            total += utilities.get(agent, task);
        }
        Assignment::new(tasks, total)
    }
}

impl AssignmentStrategy for HungarianOracle {
    fn assign(
        &self,
        utilities: &UtilityMatrix,
        capacities: &[u32],
    ) -> Result<Assignment, AuctionError> {
        let slots = SlotExpansion::new(utilities, capacities)?;
        let mut chosen = vec![None; utilities.n_agents()];
        for (agent, slot) in maximize(slots.matrix()) {
            chosen[agent] = Some(slot);
        }
        Ok(slots.collapse(&chosen, utilities))
    }

    fn name(&self) -> &str {
        "Hungarian"
    }
}

/// Returns the `(agent, task)` pairs of a maximum-utility matching that may
/// leave agents unassigned.
fn maximize(utilities: &UtilityMatrix) -> Vec<(usize, usize)> {
    let n = utilities.n_agents();
    let m = utilities.n_tasks();
    if n == 0 {
        return Vec::new();
    }

    // Columns m..m+n are the dummy options, one per agent.
    let cols = m + n;
    let forbidden = 1.0 + 2.0 * n as f64 * utilities.max_abs();
    let benefit = |agent: usize, col: usize| -> f64 {
        if col >= m {
            0.0
        } else if utilities.is_known(agent, col) {
            utilities.get(agent, col)
        } else {
            -forbidden
        }
    };

    let top = (0..n)
        .flat_map(|agent| (0..cols).map(move |col| (agent, col)))
        .map(|(agent, col)| benefit(agent, col))
        .fold(0.0_f64, f64::max);
    let cost: Vec<f64> = (0..n)
        .flat_map(|agent| (0..cols).map(move |col| (agent, col)))
        .map(|(agent, col)| top - benefit(agent, col))
        .collect();

    let column_of = min_cost_rows(&cost, n, cols);
    column_of
        .into_iter()
        .enumerate()
        .filter(|&(agent, col)| col < m && utilities.is_known(agent, col))
        .collect()
}

/// Potential-based Hungarian method on a row-major `rows × cols` cost matrix
/// with `rows <= cols`. Returns the column matched to each row.
fn min_cost_rows(cost: &[f64], rows: usize, cols: usize) -> Vec<usize> {
    debug_assert!(rows <= cols);
    let a = |i: usize, j: usize| cost[(i - 1) * cols + (j - 1)];

    // 1-based; row/column 0 is the virtual start.
    let mut u = vec![0.0; rows + 1];
    let mut v = vec![0.0; cols + 1];
    let mut p = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];

    for i in 1..=rows {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; cols + 1];
        let mut used = vec![false; cols + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=cols {
                if used[j] {
                    continue;
                }
                let reduced = a(i0, j) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=cols {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut column_of = vec![0; rows];
    for j in 1..=cols {
        if p[j] != 0 {
            column_of[p[j] - 1] = j - 1;
        }
    }
    column_of
}
