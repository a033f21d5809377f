//! Solves a small fixed scenario and compares it with the exact optimum.
//!
//! Run with `RUST_LOG=auctioneer=debug cargo run --example auction_demo` to see
//! per-component and merge events.

use auctioneer::{
    AssignmentStrategy, AuctionError, AuctionProblem, AuctionStats, GreedyStrategy, HungarianOracle,
    Orchestrator, Position, SolverConfig, TaskKnowledge, UtilityMatrix,
};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), AuctionError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // two clusters plus a straggler
    let agents = [
        Position::new(5.0, 5.0),
        Position::new(12.0, 8.0),
        Position::new(9.0, 15.0),
        Position::new(70.0, 72.0),
        Position::new(78.0, 65.0),
        Position::new(40.0, 95.0),
    ];
    let tasks = [
        Position::new(6.0, 9.0),
        Position::new(15.0, 12.0),
        Position::new(3.0, 18.0),
        Position::new(74.0, 70.0),
        Position::new(80.0, 60.0),
        Position::new(65.0, 80.0),
        Position::new(42.0, 90.0),
    ];

    for knowledge in [TaskKnowledge::Global, TaskKnowledge::Local] {
        let config = SolverConfig {
            visibility_radius: 20.0,
            task_knowledge: knowledge,
            epsilon: 1e-3,
            ..SolverConfig::default()
        };
        let problem = AuctionProblem::from_positions(&agents, &tasks, &config)?;
        let (outcome, stats) =
            Orchestrator::from_config(&config)?.solve_observed::<AuctionStats>(&problem);

        println!("--- {knowledge:?} task knowledge ---");
        println!("components: {}", outcome.components.len());
        for (agent, task) in outcome.assignment.pairs() {
            println!("  agent {agent} {} -> task {task} {}", agents[agent], tasks[task]);
        }
        for conflict in &outcome.conflicts {
            println!(
                "  task {} kept by agent {}, dropped {:?}",
                conflict.task, conflict.winner, conflict.losers
            );
        }
        println!("auction:   {}", outcome.assignment);

        let mut total = AuctionStats::default();
        stats.iter().for_each(|s| total.absorb(s));
        print!("{total}");
    }

    let config = SolverConfig::default();
    let utilities = UtilityMatrix::from_positions(&agents, &tasks, &config.utility_model());
    let capacities = vec![1u32; tasks.len()];
    let exact = HungarianOracle.assign(&utilities, &capacities)?;
    let greedy = GreedyStrategy.assign(&utilities, &capacities)?;
    let auction = auctioneer::solve_auction(&agents, &tasks, &config)?;

    println!("--- fully visible ---");
    println!("{:<10} {}", HungarianOracle.name(), exact);
    println!("{:<10} {}", GreedyStrategy.name(), greedy);
    println!("{:<10} {}", "Auction", auction.assignment);
    println!(
        "accuracy: {:.4}%",
        100.0 * auction.total_utility() / exact.total_utility()
    );

    Ok(())
}
