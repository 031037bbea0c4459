use clap::Parser;
use log::info;
use logic_magnets::engine::{PuzzleConfig, PuzzleState};
use logic_magnets::levels::level;
use logic_magnets::solver::{solve_with_limits, Algorithm, SearchLimits};
use logic_magnets::utils::config_from_str;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search strategy: bfs, dfs, ucs, hill-climbing or astar
    #[clap(short, long, default_value = "bfs")]
    algorithm: Algorithm,

    /// Stop after expanding this many states
    #[clap(short, long)]
    max_expansions: Option<usize>,

    /// Solve a built-in level instead of a file
    #[clap(short, long, conflicts_with = "puzzle_file")]
    level: Option<usize>,

    /// Path to a puzzle file, one row per line
    #[clap(required_unless_present = "level")]
    puzzle_file: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<PuzzleConfig, String> {
    if let Some(number) = args.level {
        return level(number)
            .ok_or_else(|| format!("There is no level {}", number))?
            .map_err(|e| format!("Invalid level {}: {}", number, e));
    }
    let path = args
        .puzzle_file
        .as_ref()
        .ok_or_else(|| "No puzzle given".to_string())?;
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    config_from_str(&content).map_err(|e| format!("Invalid puzzle format: {}", e))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let state = match load_config(&args)
        .and_then(|config| PuzzleState::from_config(&config).map_err(|e| e.to_string()))
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Initial board:\n{}\n", state.board());
    info!("searching with {}", args.algorithm);

    let limits = SearchLimits {
        max_expansions: args.max_expansions,
    };
    match solve_with_limits(args.algorithm, &state, &limits) {
        Ok(solution) => {
            println!(
                "Solution found by {} ({} states expanded):\n",
                args.algorithm, solution.expanded
            );
            if solution.moves.is_empty() {
                println!("  Already solved.");
            }
            for (i, description) in solution.descriptions().iter().enumerate() {
                println!("  Move {}: {}", i + 1, description);
            }
            println!("\nFinal board:\n{}", solution.final_board);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", args.algorithm, e);
            ExitCode::FAILURE
        }
    }
}
