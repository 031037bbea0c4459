use clap::Parser;
use logic_magnets::engine::{PuzzleConfig, PuzzleState};
use logic_magnets::levels::{level, LEVELS};
use logic_magnets::solver::{solve, Algorithm};
use logic_magnets::utils::config_from_str;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Built-in level to play
    #[clap(short, long, default_value_t = 1, conflicts_with = "puzzle_file")]
    level: usize,

    /// Print the board as plain text instead of ANSI colours
    #[clap(long)]
    plain: bool,

    /// Play a puzzle file instead of a built-in level
    puzzle_file: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<PuzzleConfig, String> {
    match &args.puzzle_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            config_from_str(&content).map_err(|e| format!("Invalid puzzle format: {}", e))
        }
        None => level(args.level)
            .ok_or_else(|| format!("Levels are numbered 1 to {}", LEVELS.len()))?
            .map_err(|e| format!("Invalid level {}: {}", args.level, e)),
    }
}

fn parse_coords(parts: &[&str]) -> Option<((usize, usize), (usize, usize))> {
    let nums: Vec<usize> = parts.iter().map(|p| p.parse().ok()).collect::<Option<_>>()?;
    match nums[..] {
        [r1, c1, r2, c2] => Some(((r1, c1), (r2, c2))),
        _ => None,
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut game = match load_config(&args)
        .and_then(|config| PuzzleState::from_config(&config).map_err(|e| e.to_string()))
    {
        Ok(game) => game,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    println!("Welcome to Logic Magnets!");
    println!("Move a magnet with 'row col row col'. Capital letters are off target.");

    loop {
        println!("---------------------");
        println!("Steps: {}", game.steps());
        if args.plain {
            println!("{}", game.board());
        } else {
            let last_moved = game.moves().last().map(|mv| mv.to);
            println!("{}", game.board().to_string_with_highlight(last_moved));
        }

        if game.is_goal() {
            println!();
            println!("---------------------");
            println!("Solved in {} steps!", game.steps());
            println!("---------------------");
            break;
        }

        print!("Enter a move (r1 c1 r2 c2), 'u' to undo, 'reset', 'solve <algorithm>' or 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts[..] {
            ["q"] => {
                println!("Thanks for playing!");
                break;
            }
            ["u"] => match game.undo_last_move() {
                Some(mv) => println!("Undid {}.", mv),
                None => println!("Nothing to undo."),
            },
            ["reset"] => {
                game.reset();
                println!("Puzzle reset.");
            }
            ["solve", name] => match name.parse::<Algorithm>() {
                Ok(algorithm) => match solve(algorithm, &game) {
                    Ok(solution) => {
                        println!("{} found {} moves:", algorithm, solution.moves.len());
                        for description in solution.descriptions() {
                            println!("  {}", description);
                        }
                    }
                    Err(e) => println!("{}: {}", algorithm, e),
                },
                Err(e) => println!("{}", e),
            },
            _ => match parse_coords(&parts) {
                Some((from, to)) => match game.play(from, to) {
                    Ok(mv) => println!("Moved {}.", mv),
                    Err(e) => println!("Invalid move: {}", e),
                },
                None => println!("Invalid input format. Use 'r1 c1 r2 c2', 'u', 'reset', 'solve bfs' or 'q'."),
            },
        }
    }
}
