use clap::Parser;
use log::warn;
use logic_magnets::engine::{PuzzleConfig, PuzzleState};
use logic_magnets::solver::{solve_with_limits, Algorithm, SearchLimits, SolveError};
use std::collections::HashMap;

/// Runs every search strategy on the same seeded random puzzles.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of random puzzles to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: usize,

    /// Seed of the first puzzle; later puzzles use the following seeds
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    #[clap(long, default_value_t = 4)]
    rows: usize,

    #[clap(long, default_value_t = 4)]
    cols: usize,

    /// Red and Purple magnets per puzzle
    #[clap(long, default_value_t = 1)]
    magnets: usize,

    /// Gray pieces per puzzle
    #[clap(long, default_value_t = 2)]
    grays: usize,

    /// Expansion budget for each search
    #[clap(short, long, default_value_t = 50_000)]
    max_expansions: usize,
}

#[derive(Default)]
struct Tally {
    solved: usize,
    failed: usize,
    total_moves: usize,
    total_expanded: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let limits = SearchLimits {
        max_expansions: Some(args.max_expansions),
    };

    let mut tallies: HashMap<Algorithm, Tally> = HashMap::new();

    println!("Starting solver evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let config = match PuzzleConfig::random_with_seed(
            args.rows,
            args.cols,
            args.magnets,
            args.grays,
            current_seed,
        ) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Cannot generate puzzles: {}", e);
                std::process::exit(1);
            }
        };
        let state = match PuzzleState::from_config(&config) {
            Ok(state) => state,
            Err(e) => {
                warn!("seed {} produced an invalid puzzle: {}", current_seed, e);
                continue;
            }
        };

        println!("\nEvaluating Board {} (Seed: {})\n{}", board_idx, current_seed, state.board());

        for algorithm in Algorithm::ALL {
            let tally = tallies.entry(algorithm).or_default();
            match solve_with_limits(algorithm, &state, &limits) {
                Ok(solution) => {
                    println!(
                        "  {:<14} Moves: {:<4} Expanded: {}",
                        algorithm,
                        solution.moves.len(),
                        solution.expanded
                    );
                    tally.solved += 1;
                    tally.total_moves += solution.moves.len();
                    tally.total_expanded += solution.expanded;
                }
                Err(e) => {
                    println!("  {:<14} {}", algorithm, e);
                    tally.failed += 1;
                    if let SolveError::NoSolution { expanded }
                    | SolveError::DeadEnd { expanded, .. }
                    | SolveError::BudgetExhausted { expanded } = e
                    {
                        tally.total_expanded += expanded;
                    }
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", args.boards);
    println!("\n--- Averages ---");

    for algorithm in Algorithm::ALL {
        let Some(tally) = tallies.get(&algorithm) else {
            continue;
        };
        let runs = tally.solved + tally.failed;
        if runs == 0 {
            continue;
        }
        let avg_moves = if tally.solved == 0 {
            0.0
        } else {
            tally.total_moves as f64 / tally.solved as f64
        };
        println!(
            "{:<14}: solved {}/{}, average moves = {:.2}, average expanded = {:.1}",
            algorithm,
            tally.solved,
            runs,
            avg_moves,
            tally.total_expanded as f64 / runs as f64
        );
    }
}
