//! Mutable auction state of a single component.

/// Prices and the two-way agent/task mapping of one component solve.
///
/// Agents are addressed by their local position in the component; tasks by
/// their global index.
///
/// # Invariants
///
/// - `assignment[a] == Some(t)` iff `holder[t] == Some(a)`
/// - prices never decrease
#[derive(Debug, Clone)]
pub(crate) struct AuctionState {
    prices: Vec<f64>,
    assignment: Vec<Option<usize>>,
    holder: Vec<Option<usize>>,
}

impl AuctionState {
    /// Zero prices, nobody assigned.
    pub(crate) fn new(n_agents: usize, n_tasks: usize) -> Self {
        Self {
            prices: vec![0.0; n_tasks],
            assignment: vec![None; n_agents],
            holder: vec![None; n_tasks],
        }
    }

    /// Gives each agent, in order, the first unclaimed task among its candidates.
    pub(crate) fn seed_greedy(&mut self, candidates: &[Vec<usize>]) {
        for (local, tasks) in candidates.iter().enumerate() {
            if let Some(&task) = tasks.iter().find(|&&t| self.holder[t].is_none()) {
                self.assignment[local] = Some(task);
                self.holder[task] = Some(local);
            }
        }
    }

    pub(crate) fn task_of(&self, local: usize) -> Option<usize> {
        self.assignment[local]
    }

    pub(crate) fn price(&self, task: usize) -> f64 {
        self.prices[task]
    }

    pub(crate) fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub(crate) fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    /// Drops the agent's task, if any, without touching prices.
    pub(crate) fn release(&mut self, local: usize) -> Option<usize> {
        let task = self.assignment[local].take()?;
        self.holder[task] = None;
        Some(task)
    }

    /// Hands `task` to `local` and raises its price by `increment`.
    ///
    /// The previous holder becomes unassigned (it is not moved to the
    /// bidder's old task) and the bidder's old task is released. Returns the
    /// evicted agent.
    pub(crate) fn award(&mut self, local: usize, task: usize, increment: f64) -> Option<usize> {
        debug_assert!(increment > 0.0, "price increments must be positive");
        let evicted = self.holder[task].take();
        if let Some(previous) = evicted {
            debug_assert_ne!(previous, local, "an agent never outbids itself");
            self.assignment[previous] = None;
        }
        self.release(local);
        self.assignment[local] = Some(task);
        self.holder[task] = Some(local);
        self.prices[task] += increment;
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_seed_takes_first_unclaimed_candidate() {
        let mut state = AuctionState::new(3, 3);
        state.seed_greedy(&[vec![1, 2], vec![1, 0], vec![1]]);
        assert_eq!(state.assignment(), &[Some(1), Some(0), None]);
        assert!(state.prices().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn award_evicts_without_cascade() {
        let mut state = AuctionState::new(2, 2);
        state.seed_greedy(&[vec![0], vec![1]]);
        let evicted = state.award(1, 0, 0.5);
        assert_eq!(evicted, Some(0));
        // agent 0 is unassigned, not moved to agent 1's old task
        assert_eq!(state.task_of(0), None);
        assert_eq!(state.task_of(1), Some(0));
        assert_eq!(state.price(0), 0.5);
        assert_eq!(state.price(1), 0.0);
    }

    #[test]
    fn award_on_free_task_releases_previous() {
        let mut state = AuctionState::new(1, 2);
        state.seed_greedy(&[vec![0, 1]]);
        assert_eq!(state.award(0, 1, 1.0), None);
        assert_eq!(state.task_of(0), Some(1));
        assert_eq!(state.release(0), Some(1));
        assert_eq!(state.release(0), None);
    }

    #[test]
    fn release_keeps_price() {
        let mut state = AuctionState::new(1, 1);
        state.award(0, 0, 2.0);
        assert_eq!(state.release(0), Some(0));
        assert_eq!(state.price(0), 2.0);
        assert_eq!(state.task_of(0), None);
    }
}
