//! Test suite for the auction solver and orchestrator.

use super::*;
use crate::algorithms::HungarianOracle;
use crate::config::{SolverConfig, TaskKnowledge};
use crate::geometry::Position;
use crate::problem::AuctionProblem;
use crate::utility::UNKNOWN_UTILITY;
use crate::visibility::{partition, VisibilityGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Helper to build a matrix from literal rows.
fn matrix(rows: &[&[f64]]) -> UtilityMatrix {
    UtilityMatrix::from_rows(rows).unwrap()
}

/// Uniform utilities in `[1, 30)` from a fixed seed.
fn random_matrix(seed: u64, n: usize, m: usize) -> UtilityMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..n * m).map(|_| rng.gen_range(1.0..30.0)).collect();
    UtilityMatrix::new(n, m, values).unwrap()
}

fn random_positions(rng: &mut StdRng, count: usize) -> Vec<Position> {
    (0..count)
        .map(|_| Position::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect()
}

fn solve(utilities: &UtilityMatrix, epsilon: f64) -> ComponentSolution {
    AuctionSolver::new(epsilon).unwrap().solve_matrix(utilities)
}

/// Allowed shortfall below the optimum for `n` agents.
fn gap_bound(n: usize, epsilon: f64) -> f64 {
    n as f64 * epsilon * (1.0 + 1e-6) + 1e-9
}

/// Records every price vector and bid.
#[derive(Debug, Default)]
struct PriceRecorder {
    prices: Vec<Vec<f64>>,
    bids: Vec<BidEvent>,
}

impl AuctionObserver for PriceRecorder {
    fn on_bid(&mut self, bid: &BidEvent) {
        self.bids.push(*bid);
    }

    fn on_pass(&mut self, snapshot: &PassSnapshot<'_>) {
        self.prices.push(snapshot.prices().to_vec());
    }
}

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn test_dominant_diagonal() {
        let u = matrix(&[&[9.0, 2.0, 1.0], &[3.0, 8.0, 2.0], &[1.0, 2.0, 7.0]]);
        let solution = solve(&u, 0.01);
        assert_eq!(solution.tasks, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(solution.total_utility, 24.0);
        assert_eq!(solution.total_utility, HungarianOracle.solve_matrix(&u).total_utility());
    }

    #[test]
    fn test_dominant_diagonal_needs_one_pass() {
        let u = matrix(&[&[9.0, 2.0, 1.0], &[3.0, 8.0, 2.0], &[1.0, 2.0, 7.0]]);
        let mut stats = AuctionStats::default();
        AuctionSolver::new(0.01).unwrap().solve_matrix_observed(&u, &mut stats);
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.bids, 0);
        assert_eq!(stats.running_utility, vec![24.0]);
    }

    #[test]
    fn test_more_agents_than_tasks() {
        let u = matrix(&[&[5.0], &[3.0]]);
        let solution = solve(&u, 0.01);
        assert_eq!(solution.tasks, vec![Some(0), None]);
        assert_eq!(solution.total_utility, 5.0);
    }

    #[test]
    fn test_eviction_goes_to_unassigned() {
        let u = matrix(&[&[5.0], &[3.0]]);
        let mut recorder = PriceRecorder::default();
        AuctionSolver::new(0.01)
            .unwrap()
            .solve_matrix_observed(&u, &mut recorder);

        assert_eq!(recorder.bids.len(), 2);
        let first = recorder.bids[0];
        assert_eq!((first.agent, first.task, first.evicted), (1, 0, Some(0)));
        assert!((first.price_after - 3.01).abs() < 1e-9);
        let second = recorder.bids[1];
        assert_eq!((second.agent, second.task, second.evicted), (0, 0, Some(1)));
        assert!((second.price_after - 5.01).abs() < 1e-9);
    }

    #[test]
    fn test_visibility_pairs() {
        let u = matrix(&[
            &[4.0, 1.0, UNKNOWN_UTILITY, UNKNOWN_UTILITY],
            &[3.0, 2.0, UNKNOWN_UTILITY, UNKNOWN_UTILITY],
            &[UNKNOWN_UTILITY, UNKNOWN_UTILITY, 1.0, 5.0],
            &[UNKNOWN_UTILITY, UNKNOWN_UTILITY, 6.0, 2.0],
        ]);
        let graph = VisibilityGraph::from_matrix(&[
            [false, true, false, false],
            [true, false, false, false],
            [false, false, false, true],
            [false, false, true, false],
        ])
        .unwrap();
        let problem = AuctionProblem::from_matrices(u.clone(), graph, None).unwrap();
        let outcome = Orchestrator::new(0.01).unwrap().solve(&problem);

        assert_eq!(outcome.components.len(), 2);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(
            outcome.assignment.tasks(),
            &[Some(0), Some(1), Some(3), Some(2)]
        );
        // 4 + 2 for the first pair, 5 + 6 for the second
        assert_eq!(outcome.total_utility(), 17.0);
        assert_eq!(outcome.total_utility(), HungarianOracle.solve_matrix(&u).total_utility());
    }

    #[test]
    fn test_visibility_pairs_from_positions() {
        let agents = [
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
            Position::new(100.0, 0.0),
            Position::new(101.0, 0.0),
        ];
        let tasks = [
            Position::new(0.0, 1.0),
            Position::new(1.0, 2.0),
            Position::new(100.0, 3.0),
            Position::new(101.0, 1.0),
        ];
        let config = SolverConfig {
            visibility_radius: 5.0,
            task_knowledge: TaskKnowledge::Local,
            epsilon: 1e-3,
            ..SolverConfig::default()
        };
        let outcome = crate::solve_auction(&agents, &tasks, &config).unwrap();
        assert_eq!(outcome.components.len(), 2);

        let mut separate = 0.0;
        for pair in [0..2, 2..4] {
            let sub = crate::solve_auction(&agents[pair.clone()], &tasks[pair], &config).unwrap();
            separate += sub.total_utility();
        }
        assert!((outcome.total_utility() - separate).abs() < 1e-9);
    }

    #[test]
    fn test_agent_without_candidates_stays_unassigned() {
        let u = matrix(&[
            &[UNKNOWN_UTILITY, UNKNOWN_UTILITY],
            &[2.0, 7.0],
        ]);
        let solution = solve(&u, 0.01);
        assert_eq!(solution.tasks, vec![None, Some(1)]);
        assert_eq!(solution.total_utility, 7.0);
    }

    #[test]
    fn test_negative_utility_is_declined() {
        let u = matrix(&[&[-4.0, -1.0]]);
        let solution = solve(&u, 0.01);
        assert_eq!(solution.tasks, vec![None]);
        assert_eq!(solution.total_utility, 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        let solution = solve(&UtilityMatrix::unknown(0, 0), 0.1);
        assert!(solution.tasks.is_empty());
        assert_eq!(solution.passes, 1);

        let solution = solve(&UtilityMatrix::unknown(2, 0), 0.1);
        assert_eq!(solution.tasks, vec![None, None]);
    }

    #[test]
    fn test_rejects_non_positive_epsilon() {
        assert_eq!(AuctionSolver::new(0.0), Err(AuctionError::InvalidEpsilon(0.0)));
        assert!(AuctionSolver::new(-0.5).is_err());
        assert!(AuctionSolver::new(f64::INFINITY).is_err());
        assert_eq!(AuctionSolver::default().epsilon(), 1e-5);
    }
}

#[cfg(test)]
mod invariants {
    use super::*;

    #[test]
    fn test_prices_never_decrease() {
        for seed in 0..20 {
            let u = random_matrix(seed, 6, 5);
            let mut recorder = PriceRecorder::default();
            AuctionSolver::new(0.05)
                .unwrap()
                .solve_matrix_observed(&u, &mut recorder);

            for bid in &recorder.bids {
                assert!(bid.price_after > bid.price_before, "seed {seed}: {bid:?}");
            }
            for pair in recorder.prices.windows(2) {
                for (before, after) in pair[0].iter().zip(&pair[1]) {
                    assert!(after >= before, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn test_termination_bound() {
        for seed in 0..20 {
            let epsilon = 0.01;
            let u = random_matrix(seed, 7, 7);
            let mut stats = AuctionStats::default();
            AuctionSolver::new(epsilon)
                .unwrap()
                .solve_matrix_observed(&u, &mut stats);

            let bound = (u.max_abs() / epsilon).floor() as usize + 1;
            assert!(stats.max_raises_per_task() <= bound, "seed {seed}");
            // every pass but the last changes something
            assert!(stats.passes <= stats.bids + stats.releases + 1, "seed {seed}");
        }
    }

    #[test]
    fn test_observer_does_not_change_result() {
        let u = random_matrix(7, 9, 6);
        let solver = AuctionSolver::new(1e-3).unwrap();
        let plain = solver.solve_matrix(&u);
        let mut stats = AuctionStats::default();
        let observed = solver.solve_matrix_observed(&u, &mut stats);
        assert_eq!(plain, observed);
        assert_eq!(stats.passes, plain.passes);
        assert_eq!(stats.running_utility.last().copied(), Some(plain.total_utility));
    }

    #[test]
    fn test_optimality_gap_at_fifty() {
        for seed in 0..3 {
            let epsilon = 1e-3;
            let u = random_matrix(100 + seed, 50, 50);
            let solution = solve(&u, epsilon);
            let optimum = HungarianOracle.solve_matrix(&u).total_utility();
            assert!(solution.total_utility <= optimum + 1e-9);
            assert!(optimum - solution.total_utility <= gap_bound(50, epsilon), "seed {seed}");
        }
    }

    #[test]
    fn test_strategy_respects_capacities() {
        let u = random_matrix(3, 8, 3);
        let capacities = [2, 1, 3];
        let assignment = AuctionSolver::new(1e-3).unwrap().assign(&u, &capacities).unwrap();
        let optimum = HungarianOracle.assign(&u, &capacities).unwrap();

        for (held, cap) in assignment.holders_per_task(3).iter().zip(capacities) {
            assert!(*held <= cap);
        }
        assert!(optimum.total_utility() - assignment.total_utility() <= gap_bound(8, 1e-3));
        assert_eq!(AuctionSolver::default().name(), "Auction");
    }
}

#[cfg(test)]
mod orchestration {
    use super::*;

    fn scattered(seed: u64, knowledge: TaskKnowledge) -> AuctionProblem {
        let mut rng = StdRng::seed_from_u64(seed);
        let agents = random_positions(&mut rng, 20);
        let tasks = random_positions(&mut rng, 15);
        let config = SolverConfig {
            visibility_radius: 20.0,
            task_knowledge: knowledge,
            epsilon: 1e-3,
            ..SolverConfig::default()
        };
        AuctionProblem::from_positions(&agents, &tasks, &config).unwrap()
    }

    #[test]
    fn test_merged_assignment_is_feasible() {
        for seed in 0..10 {
            let problem = scattered(seed, TaskKnowledge::Global);
            let outcome = Orchestrator::new(1e-3).unwrap().solve(&problem);
            let assignment = &outcome.assignment;

            assert!(assignment.is_one_to_one(), "seed {seed}");
            let recomputed: f64 = assignment
                .pairs()
                .map(|(agent, task)| problem.utilities().get(agent, task))
                .sum();
            assert!((recomputed - assignment.total_utility()).abs() < 1e-9);

            for conflict in &outcome.conflicts {
                assert_eq!(assignment.agent_of(conflict.task), Some(conflict.winner));
                for &loser in &conflict.losers {
                    assert_eq!(assignment.task_of(loser), None);
                }
            }
        }
    }

    #[test]
    fn test_local_knowledge_respects_availability() {
        for seed in 0..10 {
            let problem = scattered(seed, TaskKnowledge::Local);
            let availability = problem.availability().unwrap();
            let outcome = Orchestrator::new(1e-3).unwrap().solve(&problem);
            assert!(outcome.assignment.is_one_to_one());

            for (agent, task) in outcome.assignment.pairs() {
                assert!(availability.contains(agent, task), "seed {seed}");
            }
            if outcome.conflicts.is_empty() {
                let per_component: f64 = outcome.components.iter().map(|c| c.local_utility).sum();
                assert!((per_component - outcome.total_utility()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_solve_is_deterministic() {
        let problem = scattered(42, TaskKnowledge::Global);
        let orchestrator = Orchestrator::new(1e-3).unwrap();
        let first = orchestrator.solve(&problem);
        for _ in 0..5 {
            assert_eq!(orchestrator.solve(&problem), first);
        }
    }

    #[test]
    fn test_one_observer_per_component() {
        let problem = scattered(5, TaskKnowledge::Global);
        let (outcome, stats) = Orchestrator::new(1e-3)
            .unwrap()
            .solve_observed::<AuctionStats>(&problem);

        assert_eq!(stats.len(), problem.components().len());
        for (report, stats) in outcome.components.iter().zip(&stats) {
            assert_eq!(report.passes, stats.passes);
        }

        let mut total = AuctionStats::default();
        stats.iter().for_each(|s| total.absorb(s));
        assert_eq!(total.passes, outcome.components.iter().map(|c| c.passes).max().unwrap());
    }

    #[test]
    fn test_reports_follow_partition() {
        let problem = scattered(9, TaskKnowledge::Local);
        let outcome = Orchestrator::new(1e-3).unwrap().solve(&problem);
        let reported: Vec<&[usize]> = outcome.components.iter().map(|c| c.agents.as_slice()).collect();
        let expected: Vec<&[usize]> = problem.components().iter().map(|c| c.agents()).collect();
        assert_eq!(reported, expected);
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    /// Two groups with disjoint task sets; each group is a clique.
    fn split_instance(seed: u64, a: usize, ka: usize, b: usize, kb: usize) -> (AuctionProblem, UtilityMatrix, UtilityMatrix) {
        let left = random_matrix(seed, a, ka);
        let right = random_matrix(seed.wrapping_add(1), b, kb);

        let n = a + b;
        let mut values = vec![UNKNOWN_UTILITY; n * (ka + kb)];
        for agent in 0..a {
            for task in 0..ka {
                values[agent * (ka + kb) + task] = left.get(agent, task);
            }
        }
        for agent in 0..b {
            for task in 0..kb {
                values[(a + agent) * (ka + kb) + ka + task] = right.get(agent, task);
            }
        }
        let full = UtilityMatrix::new(n, ka + kb, values).unwrap();

        let rows: Vec<Vec<bool>> = (0..n)
            .map(|i| (0..n).map(|j| i != j && (i < a) == (j < a)).collect())
            .collect();
        let graph = VisibilityGraph::from_matrix(&rows).unwrap();
        let problem = AuctionProblem::from_matrices(full, graph, None).unwrap();
        (problem, left, right)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_optimality_gap(seed in any::<u64>(), n in 1usize..8, m in 1usize..8) {
            let epsilon = 1e-3;
            let u = random_matrix(seed, n, m);
            let solution = solve(&u, epsilon);
            let optimum = HungarianOracle.solve_matrix(&u).total_utility();

            prop_assert!(solution.total_utility <= optimum + 1e-9);
            prop_assert!(optimum - solution.total_utility <= gap_bound(n, epsilon));
        }

        #[test]
        fn test_solution_is_one_to_one(seed in any::<u64>(), n in 1usize..10, m in 1usize..10) {
            let u = random_matrix(seed, n, m);
            let solution = solve(&u, 0.01);
            let mut held: Vec<usize> = solution.tasks.iter().flatten().copied().collect();
            let count = held.len();
            held.sort_unstable();
            held.dedup();
            prop_assert_eq!(held.len(), count);
            prop_assert_eq!(count, n.min(m));
        }

        #[test]
        fn test_component_independence(
            seed in any::<u64>(),
            a in 1usize..5,
            ka in 1usize..5,
            b in 1usize..5,
            kb in 1usize..5,
        ) {
            let (problem, left, right) = split_instance(seed, a, ka, b, kb);
            let orchestrator = Orchestrator::new(1e-3).unwrap();
            let joint = orchestrator.solve(&problem);

            let separate = orchestrator.solve(&AuctionProblem::fully_visible(left)).total_utility()
                + orchestrator.solve(&AuctionProblem::fully_visible(right)).total_utility();

            prop_assert_eq!(joint.components.len(), 2);
            prop_assert!(joint.conflicts.is_empty());
            prop_assert!((joint.total_utility() - separate).abs() < 1e-9);
        }

        #[test]
        fn test_partition_is_idempotent(edges in prop::collection::vec((0usize..12, 0usize..12), 0..30)) {
            let mut rows = vec![vec![false; 12]; 12];
            for &(i, j) in &edges {
                rows[i][j] = true;
                rows[j][i] = true;
            }
            let graph = VisibilityGraph::from_matrix(&rows).unwrap();

            let first = partition(&graph);
            let second = partition(&graph);
            prop_assert_eq!(&first, &second);

            let mut seen: Vec<usize> = first.iter().flat_map(|c| c.agents().iter().copied()).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..12).collect::<Vec<_>>());
            prop_assert_eq!(first.len(), petgraph::algo::connected_components(&graph.to_graph()));

            for &(i, j) in edges.iter().filter(|(i, j)| i != j) {
                let ci = first.iter().position(|c| c.contains(i));
                let cj = first.iter().position(|c| c.contains(j));
                prop_assert_eq!(ci, cj);
            }
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_support {
    use super::*;

    #[test]
    fn test_outcome_serializes() {
        let u = matrix(&[&[5.0], &[3.0]]);
        let outcome = Orchestrator::new(0.01)
            .unwrap()
            .solve(&AuctionProblem::fully_visible(u));

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"total_utility\":5.0"));
        let back: AuctionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"epsilon": 0.5, "task_knowledge": "local"}"#).unwrap();
        assert_eq!(config.epsilon, 0.5);
        assert_eq!(config.task_knowledge, TaskKnowledge::Local);
        assert_eq!(config.max_utility, SolverConfig::default().max_utility);
    }
}
