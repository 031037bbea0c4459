//! # Logic Magnets Library
//!
//! This library provides the core engine for the Logic Magnets sliding-magnet
//! puzzle and five search strategies that solve it.
//!
//! It is used by three binaries:
//! - `magnets_player`: Allows interactive play via the command line, with undo.
//! - `magnets_solver`: Takes a puzzle and an algorithm, then prints the
//!   sequence of moves that reaches the goal.
//! - `solver_evaluator`: Runs every algorithm over seeded random puzzles and
//!   compares solution lengths and search effort.
//!
//! ## Modules
//! - `engine`: Pieces, the board with its pull/push magnet physics, and
//!   `PuzzleState` (move application and undo history).
//! - `canonical`: The order-independent `StateKey` used for duplicate detection.
//! - `heuristics`: The nearest-target Manhattan distance score.
//! - `solver`: Breadth-first, depth-first, uniform-cost, hill-climbing and A*.
//! - `utils`: Parsing puzzles from their text form.
//! - `levels`: Built-in puzzles.

pub mod canonical;
pub mod engine;
pub mod heuristics;
pub mod levels;
pub mod solver;
pub mod utils;
