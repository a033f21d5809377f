//! The bidding loop for one connected component.

use tracing::trace;

use super::observer::{AuctionObserver, BidEvent, PassSnapshot};
use super::state::AuctionState;
use crate::utility::UtilityMatrix;
use crate::visibility::Availability;

/// Round-off allowance of the happiness test, relative to the largest utility
/// magnitude in the component.
///
/// Right after its own bid an agent sits exactly on the `best - epsilon`
/// boundary; without this allowance floating-point noise can declare it
/// unhappy and make it drop a task it just paid for.
const ROUNDOFF: f64 = 1e-12;

/// Input of one component solve.
#[derive(Debug, Clone, Copy)]
pub struct ComponentProblem<'a> {
    /// Global indices of the component's agents, in bidding order.
    pub agents: &'a [usize],
    /// Shared utility matrix (rows of other components are never read).
    pub utilities: &'a UtilityMatrix,
    /// Per-agent available tasks, when task knowledge is restricted.
    pub availability: Option<&'a Availability>,
}

impl ComponentProblem<'_> {
    /// Tasks an agent may bid on: known utility and, if restricted, available.
    fn candidates(&self, agent: usize) -> Vec<usize> {
        match self.availability {
            Some(availability) => availability
                .for_agent(agent)
                .iter()
                .copied()
                .filter(|&task| self.utilities.is_known(agent, task))
                .collect(),
            None => self.utilities.known_tasks(agent).collect(),
        }
    }
}

/// Result of one component solve.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSolution {
    /// Global agent indices, same order as the input.
    pub agents: Vec<usize>,
    /// Task held by each agent of `agents`.
    pub tasks: Vec<Option<usize>>,
    /// Sum of the utilities of assigned agents.
    pub total_utility: f64,
    /// Number of passes until every agent was happy.
    pub passes: usize,
}

impl ComponentSolution {
    /// `(global agent, task)` pairs of assigned agents.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.agents
            .iter()
            .zip(&self.tasks)
            .filter_map(|(&agent, task)| task.map(|t| (agent, t)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Choice {
    Task(usize),
    Dummy,
}

/// Best and second-best profit an agent can reach.
#[derive(Debug, Clone, Copy)]
struct Offer {
    choice: Choice,
    best: f64,
    second: f64,
}

/// Scans candidates in order, then the dummy option at profit 0.
///
/// Ties keep the first-found option, so the dummy only wins when every task
/// is strictly worse than doing nothing.
fn best_offer(candidates: &[usize], row: &[f64], state: &AuctionState) -> Offer {
    let mut offer = Offer {
        choice: Choice::Dummy,
        best: f64::NEG_INFINITY,
        second: f64::NEG_INFINITY,
    };
    let options = candidates
        .iter()
        .map(|&task| (Choice::Task(task), row[task] - state.price(task)))
        .chain(std::iter::once((Choice::Dummy, 0.0)));

    for (choice, profit) in options {
        if profit > offer.best {
            offer.second = offer.best;
            offer.best = profit;
            offer.choice = choice;
        } else if profit > offer.second {
            offer.second = profit;
        }
    }
    offer
}

/// Runs the epsilon-relaxed auction on one component.
///
/// Agents bid in order on one shared state: a later agent in a pass already
/// sees the prices and evictions caused by earlier ones. The loop stops after
/// the first pass in which every agent is happy, i.e.
/// `current_profit >= best_profit - epsilon`, where an unassigned agent's
/// profit is 0.
///
/// `epsilon` must be strictly positive; callers validate it before spawning.
pub fn solve_component<O>(
    problem: &ComponentProblem<'_>,
    epsilon: f64,
    observer: &mut O,
) -> ComponentSolution
where
    O: AuctionObserver,
{
    let agents = problem.agents;
    let utilities = problem.utilities;
    let candidates: Vec<Vec<usize>> = agents.iter().map(|&a| problem.candidates(a)).collect();

    let scale = agents
        .iter()
        .zip(&candidates)
        .flat_map(|(&agent, tasks)| tasks.iter().map(move |&t| utilities.get(agent, t).abs()))
        .fold(1.0_f64, f64::max);
    let slack = ROUNDOFF * scale;

    let mut state = AuctionState::new(agents.len(), utilities.n_tasks());
    state.seed_greedy(&candidates);

    let mut pass = 0;
    loop {
        pass += 1;
        let mut all_happy = true;

        for (local, &agent) in agents.iter().enumerate() {
            let row = utilities.row(agent);
            let current = state
                .task_of(local)
                .map_or(0.0, |task| row[task] - state.price(task));
            let offer = best_offer(&candidates[local], row, &state);

            if current >= offer.best - epsilon - slack {
                continue;
            }
            all_happy = false;

            match offer.choice {
                Choice::Dummy => {
                    if let Some(task) = state.release(local) {
                        observer.on_release(agent, task);
                    }
                }
                Choice::Task(task) => {
                    let price_before = state.price(task);
                    let increment = offer.best - offer.second + epsilon;
                    let evicted = state.award(local, task, increment);
                    observer.on_bid(&BidEvent {
                        agent,
                        task,
                        price_before,
                        price_after: state.price(task),
                        evicted: evicted.map(|e| agents[e]),
                    });
                }
            }
        }

        trace!(pass, all_happy, "auction pass finished");
        observer.on_pass(&PassSnapshot {
            pass,
            all_happy,
            agents,
            assignment: state.assignment(),
            prices: state.prices(),
            utilities,
        });

        if all_happy {
            break;
        }
    }

    let tasks = state.assignment().to_vec();
    let total_utility = agents
        .iter()
        .zip(&tasks)
        .filter_map(|(&agent, task)| task.map(|t| utilities.get(agent, t)))
        .sum();

    ComponentSolution {
        agents: agents.to_vec(),
        tasks,
        total_utility,
        passes: pass,
    }
}
