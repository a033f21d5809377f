//! Instrumentation hooks for the bidding loop.
//!
//! The solver is generic over an [`AuctionObserver`]. Every hook has an empty
//! default body, so [`NoopObserver`] compiles down to nothing; expensive
//! quantities such as the running utility are only computed when an observer
//! asks the [`PassSnapshot`] for them.

use std::collections::BTreeMap;
use std::fmt;

use crate::utility::UtilityMatrix;

/// A successful bid: `agent` took `task` and raised its price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidEvent {
    /// Global index of the bidding agent.
    pub agent: usize,
    pub task: usize,
    pub price_before: f64,
    pub price_after: f64,
    /// Global index of the agent that lost `task`, if it was held.
    pub evicted: Option<usize>,
}

/// Read-only view of a component's state at the end of a pass.
#[derive(Debug, Clone, Copy)]
pub struct PassSnapshot<'a> {
    /// 1-based pass number.
    pub pass: usize,
    /// True if no agent changed its mind during this pass.
    pub all_happy: bool,
    pub(crate) agents: &'a [usize],
    pub(crate) assignment: &'a [Option<usize>],
    pub(crate) prices: &'a [f64],
    pub(crate) utilities: &'a UtilityMatrix,
}

impl PassSnapshot<'_> {
    /// Sum of utilities of the component's currently assigned agents.
    pub fn running_utility(&self) -> f64 {
        self.agents
            .iter()
            .zip(self.assignment)
            .filter_map(|(&agent, task)| task.map(|t| self.utilities.get(agent, t)))
            .sum()
    }

    /// Current task prices (global task indices).
    pub fn prices(&self) -> &[f64] {
        self.prices
    }

    /// Task held by the `local`-th agent of the component.
    pub fn task_of_local(&self, local: usize) -> Option<usize> {
        self.assignment[local]
    }
}

/// Observes the bidding loop without influencing it.
pub trait AuctionObserver {
    /// Called after every accepted bid.
    fn on_bid(&mut self, _bid: &BidEvent) {}

    /// Called when an agent drops its task in favour of the dummy option.
    fn on_release(&mut self, _agent: usize, _task: usize) {}

    /// Called once at the end of every pass.
    fn on_pass(&mut self, _snapshot: &PassSnapshot<'_>) {}
}

impl<O: AuctionObserver + ?Sized> AuctionObserver for &mut O {
    fn on_bid(&mut self, bid: &BidEvent) {
        (**self).on_bid(bid);
    }

    fn on_release(&mut self, agent: usize, task: usize) {
        (**self).on_release(agent, task);
    }

    fn on_pass(&mut self, snapshot: &PassSnapshot<'_>) {
        (**self).on_pass(snapshot);
    }
}

/// Observer that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AuctionObserver for NoopObserver {}

/// Counters and per-pass utility trace for one component solve.
#[derive(Debug, Clone, Default)]
pub struct AuctionStats {
    /// Number of passes over the agents.
    pub passes: usize,
    /// Number of accepted bids (one price raise each).
    pub bids: usize,
    /// Number of bids that evicted a holder.
    pub evictions: usize,
    /// Number of voluntary releases to the dummy option.
    pub releases: usize,
    /// Running utility at the end of each pass.
    pub running_utility: Vec<f64>,
    raises_per_task: BTreeMap<usize, usize>,
}

impl AuctionStats {
    /// Number of price raises `task` received.
    pub fn raises_for(&self, task: usize) -> usize {
        self.raises_per_task.get(&task).copied().unwrap_or(0)
    }

    /// Largest number of price raises any single task received.
    pub fn max_raises_per_task(&self) -> usize {
        self.raises_per_task.values().copied().max().unwrap_or(0)
    }

    /// Folds another component's counters into this one.
    pub fn absorb(&mut self, other: &AuctionStats) {
        self.passes = self.passes.max(other.passes);
        self.bids += other.bids;
        self.evictions += other.evictions;
        self.releases += other.releases;
        for (&task, &raises) in &other.raises_per_task {
            *self.raises_per_task.entry(task).or_insert(0) += raises;
        }
    }
}

impl AuctionObserver for AuctionStats {
    fn on_bid(&mut self, bid: &BidEvent) {
        self.bids += 1;
        if bid.evicted.is_some() {
            self.evictions += 1;
        }
        *self.raises_per_task.entry(bid.task).or_insert(0) += 1;
    }

    fn on_release(&mut self, _agent: usize, _task: usize) {
        self.releases += 1;
    }

    fn on_pass(&mut self, snapshot: &PassSnapshot<'_>) {
        self.passes = snapshot.pass;
        self.running_utility.push(snapshot.running_utility());
    }
}

impl fmt::Display for AuctionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Auction Stats ===")?;
        writeln!(f, "  Passes:                  {}", self.passes)?;
        writeln!(f, "  Bids:                    {}", self.bids)?;
        writeln!(f, "  Evictions:               {}", self.evictions)?;
        writeln!(f, "  Releases:                {}", self.releases)?;
        writeln!(f, "  Max raises on one task:  {}", self.max_raises_per_task())?;
        match self.running_utility.last() {
            Some(u) => writeln!(f, "  Final running utility:   {u:.4}"),
            None => writeln!(f, "  Final running utility:   -"),
        }
    }
}
