//! Search strategies over the puzzle's state graph.
//!
//! All solvers share the same contract: they start from a `PuzzleState`, only
//! ever move Red and Purple magnets, deduplicate states by their canonical
//! `StateKey`, and return either the moves that reach a goal state or a
//! `SolveError`.
use crate::canonical::StateKey;
use crate::engine::{Board, Move, PuzzleState};
use crate::heuristics::heuristic;
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The available search strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// FIFO frontier; finds a solution with the fewest moves.
    BreadthFirst,
    /// LIFO frontier; no optimality guarantee.
    DepthFirst,
    /// Cheapest accumulated cost first, one per move.
    UniformCost,
    /// Always follows the best-scoring unvisited successor. Not complete.
    HillClimbing,
    /// Accumulated cost plus heuristic.
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::UniformCost,
        Algorithm::HillClimbing,
        Algorithm::AStar,
    ];

    /// The short name accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BreadthFirst => "bfs",
            Algorithm::DepthFirst => "dfs",
            Algorithm::UniformCost => "ucs",
            Algorithm::HillClimbing => "hill-climbing",
            Algorithm::AStar => "astar",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown algorithm '{0}', expected one of: bfs, dfs, ucs, hill-climbing, astar")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Algorithm::BreadthFirst),
            "dfs" | "depth-first" => Ok(Algorithm::DepthFirst),
            "ucs" | "uniform-cost" => Ok(Algorithm::UniformCost),
            "hill" | "hill-climbing" => Ok(Algorithm::HillClimbing),
            "astar" | "a-star" | "a*" => Ok(Algorithm::AStar),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

/// Optional bounds on a search. The default is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of states whose successors may be generated.
    pub max_expansions: Option<usize>,
}

/// Represents a solution found by a solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Moves from the initial state to the goal state, in order.
    pub moves: Vec<Move>,
    /// Number of states expanded during the search.
    pub expanded: usize,
    /// The goal board reached by the moves.
    pub final_board: Board,
}

impl Solution {
    /// Human-readable move descriptions, e.g. `"P(0, 2) to (1, 0)"`.
    pub fn descriptions(&self) -> Vec<String> {
        self.moves.iter().map(Move::to_string).collect()
    }
}

/// Why a search ended without a solution.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("no solution found after expanding {expanded} states")]
    NoSolution { expanded: usize },
    /// Hill climbing reached a state whose successors were all visited.
    #[error("hill climbing got stuck after {} moves", .moves.len())]
    DeadEnd { moves: Vec<Move>, expanded: usize },
    #[error("search stopped after expanding {expanded} states")]
    BudgetExhausted { expanded: usize },
}

/// Solves the puzzle from `initial` with the given algorithm and no limits.
///
/// # Examples
/// ```
/// use logic_magnets::engine::PuzzleState;
/// use logic_magnets::solver::{solve, Algorithm};
/// use logic_magnets::utils::config_from_str_array;
///
/// let config = config_from_str_array(&["..P..", "TGTGT", "....."]).unwrap();
/// let state = PuzzleState::from_config(&config).unwrap();
/// let solution = solve(Algorithm::BreadthFirst, &state).unwrap();
/// assert_eq!(solution.descriptions(), vec!["P(0, 2) to (1, 0)"]);
/// ```
pub fn solve(algorithm: Algorithm, initial: &PuzzleState) -> Result<Solution, SolveError> {
    solve_with_limits(algorithm, initial, &SearchLimits::default())
}

/// Solves the puzzle from `initial` with the given algorithm, within `limits`.
pub fn solve_with_limits(
    algorithm: Algorithm,
    initial: &PuzzleState,
    limits: &SearchLimits,
) -> Result<Solution, SolveError> {
    let result = match algorithm {
        Algorithm::BreadthFirst => breadth_first(initial, limits),
        Algorithm::DepthFirst => depth_first(initial, limits),
        Algorithm::UniformCost => uniform_cost(initial, limits),
        Algorithm::HillClimbing => hill_climbing(initial, limits),
        Algorithm::AStar => a_star(initial, limits),
    };
    match &result {
        Ok(solution) => info!(
            "{}: solved in {} moves, {} states expanded",
            algorithm,
            solution.moves.len(),
            solution.expanded
        ),
        Err(err) => info!("{}: {}", algorithm, err),
    }
    result
}

/// Every state reachable from `state` in one move.
///
/// Magnets are taken in row-major order of their position and each one's
/// destinations in row-major order; this order decides all tie-breaking.
pub fn successors(state: &PuzzleState) -> Vec<(Move, PuzzleState)> {
    let board = state.board();
    board
        .magnets()
        .flat_map(|magnet| {
            board
                .generate_moves(magnet.position)
                .into_iter()
                .map(move |to| (magnet, to))
        })
        .filter_map(|(magnet, to)| {
            // generated destinations always pass can_move_to
            let next = state.make_move(magnet.position, to).ok()?;
            let mv = Move {
                kind: magnet.kind,
                from: magnet.position,
                to,
            };
            Some((mv, next))
        })
        .collect()
}

struct Budget {
    limit: Option<usize>,
    expanded: usize,
}

impl Budget {
    fn new(limits: &SearchLimits) -> Self {
        Budget {
            limit: limits.max_expansions,
            expanded: 0,
        }
    }

    fn expand(&mut self) -> Result<(), SolveError> {
        if self.limit.is_some_and(|limit| self.expanded >= limit) {
            return Err(SolveError::BudgetExhausted {
                expanded: self.expanded,
            });
        }
        self.expanded += 1;
        Ok(())
    }
}

/// Priority-queue entry ordered for a min-heap on `(priority, seq)`.
///
/// `seq` grows with every push, so equal priorities pop first-in first-out.
struct Queued<T> {
    priority: (usize, usize),
    seq: usize,
    item: T,
}

impl<T> PartialEq for Queued<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Queued<T> {}

impl<T> PartialOrd for Queued<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Queued<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn fresh(initial: &PuzzleState) -> PuzzleState {
    PuzzleState::new(initial.board().clone())
}

fn found(moves: Vec<Move>, budget: &Budget, state: PuzzleState) -> Result<Solution, SolveError> {
    Ok(Solution {
        moves,
        expanded: budget.expanded,
        final_board: state.board().clone(),
    })
}

/// Breadth-first search. Returns a solution with the fewest moves.
pub fn breadth_first(initial: &PuzzleState, limits: &SearchLimits) -> Result<Solution, SolveError> {
    let mut budget = Budget::new(limits);
    let mut visited: HashSet<StateKey> = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(initial.key());
    queue.push_back((fresh(initial), Vec::new()));

    while let Some((state, moves)) = queue.pop_front() {
        if state.is_goal() {
            return found(moves, &budget, state);
        }
        budget.expand()?;
        debug!("bfs: expanding depth {}:\n{}", moves.len(), state.board());

        for (mv, next) in successors(&state) {
            if visited.insert(next.key()) {
                let mut path = moves.clone();
                path.push(mv);
                queue.push_back((next, path));
            }
        }
    }

    Err(SolveError::NoSolution {
        expanded: budget.expanded,
    })
}

/// Depth-first search. Finds some solution, usually not the shortest.
pub fn depth_first(initial: &PuzzleState, limits: &SearchLimits) -> Result<Solution, SolveError> {
    let mut budget = Budget::new(limits);
    let mut visited: HashSet<StateKey> = HashSet::new();
    let mut stack = Vec::new();

    visited.insert(initial.key());
    stack.push((fresh(initial), Vec::new()));

    while let Some((state, moves)) = stack.pop() {
        if state.is_goal() {
            return found(moves, &budget, state);
        }
        budget.expand()?;
        debug!("dfs: expanding depth {}:\n{}", moves.len(), state.board());

        for (mv, next) in successors(&state) {
            if visited.insert(next.key()) {
                let mut path = moves.clone();
                path.push(mv);
                stack.push((next, path));
            }
        }
    }

    Err(SolveError::NoSolution {
        expanded: budget.expanded,
    })
}

/// Uniform-cost search with a cost of one per move.
///
/// With uniform step costs this expands states in the same order as
/// breadth-first search.
pub fn uniform_cost(initial: &PuzzleState, limits: &SearchLimits) -> Result<Solution, SolveError> {
    let mut budget = Budget::new(limits);
    let mut visited: HashSet<StateKey> = HashSet::new();
    let mut frontier = BinaryHeap::new();
    let mut seq = 0;

    visited.insert(initial.key());
    frontier.push(Queued {
        priority: (0, 0),
        seq,
        item: (fresh(initial), Vec::new()),
    });

    while let Some(Queued {
        priority: (cost, _),
        item: (state, moves),
        ..
    }) = frontier.pop()
    {
        if state.is_goal() {
            return found(moves, &budget, state);
        }
        budget.expand()?;
        debug!("ucs: expanding cost {}:\n{}", cost, state.board());

        for (mv, next) in successors(&state) {
            if visited.insert(next.key()) {
                let mut path = moves.clone();
                path.push(mv);
                seq += 1;
                frontier.push(Queued {
                    priority: (cost + 1, 0),
                    seq,
                    item: (next, path),
                });
            }
        }
    }

    Err(SolveError::NoSolution {
        expanded: budget.expanded,
    })
}

/// Greedy hill climbing on the heuristic.
///
/// Each step moves to the unvisited successor with the lowest heuristic score,
/// the first generated one on ties, even if it scores worse than the current
/// state. The search never backtracks: when every successor has been visited
/// it gives up with `SolveError::DeadEnd`, carrying the moves taken so far,
/// even if a solution exists elsewhere.
pub fn hill_climbing(initial: &PuzzleState, limits: &SearchLimits) -> Result<Solution, SolveError> {
    let mut budget = Budget::new(limits);
    let mut visited: HashSet<StateKey> = HashSet::new();
    let mut current = fresh(initial);
    let mut moves = Vec::new();

    while !current.is_goal() {
        visited.insert(current.key());
        budget.expand()?;

        let best = successors(&current)
            .into_iter()
            .filter(|(_, next)| !visited.contains(&next.key()))
            .map(|(mv, next)| (heuristic(&next), mv, next))
            .min_by_key(|(score, _, _)| *score);

        match best {
            Some((score, mv, next)) => {
                debug!("hill climbing: {} (score {})", mv, score);
                moves.push(mv);
                current = next;
            }
            None => {
                return Err(SolveError::DeadEnd {
                    moves,
                    expanded: budget.expanded,
                })
            }
        }
    }

    found(moves, &budget, current)
}

/// A* search on accumulated cost plus heuristic.
///
/// Costs and parent links are kept per canonical key. A state is queued again
/// whenever a strictly cheaper path to it is found, and stale queue entries are
/// skipped. The heuristic can overestimate, so the result is not guaranteed to
/// be the shortest solution.
pub fn a_star(initial: &PuzzleState, limits: &SearchLimits) -> Result<Solution, SolveError> {
    let mut budget = Budget::new(limits);
    let mut best_cost: HashMap<StateKey, usize> = HashMap::new();
    let mut came_from: HashMap<StateKey, (StateKey, Move)> = HashMap::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0;

    let start = fresh(initial);
    best_cost.insert(start.key(), 0);
    open.push(Queued {
        priority: (heuristic(&start), 0),
        seq,
        item: start,
    });

    while let Some(Queued {
        priority: (_, cost),
        item: state,
        ..
    }) = open.pop()
    {
        let key = state.key();
        if best_cost.get(&key).is_some_and(|&best| cost > best) {
            debug!("a*: skipping stale entry at cost {} for {}", cost, key);
            continue;
        }
        if state.is_goal() {
            let moves = reconstruct_path(&came_from, key);
            return found(moves, &budget, state);
        }
        budget.expand()?;
        debug!("a*: expanding cost {}:\n{}", cost, state.board());

        for (mv, next) in successors(&state) {
            let next_key = next.key();
            let next_cost = cost + 1;
            if best_cost
                .get(&next_key)
                .map_or(true, |&known| next_cost < known)
            {
                best_cost.insert(next_key.clone(), next_cost);
                came_from.insert(next_key, (key.clone(), mv));
                seq += 1;
                open.push(Queued {
                    priority: (next_cost + heuristic(&next), next_cost),
                    seq,
                    item: next,
                });
            }
        }
    }

    Err(SolveError::NoSolution {
        expanded: budget.expanded,
    })
}

fn reconstruct_path(came_from: &HashMap<StateKey, (StateKey, Move)>, goal: StateKey) -> Vec<Move> {
    let mut path = Vec::new();
    let mut key = goal;
    while let Some((parent, mv)) = came_from.get(&key) {
        path.push(*mv);
        key = parent.clone();
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Piece, PieceKind, PuzzleConfig};
    use crate::levels::level;
    use crate::utils::config_from_str_array;

    fn state(rows: &[&str]) -> PuzzleState {
        PuzzleState::from_config(&config_from_str_array(rows).unwrap()).unwrap()
    }

    fn level_state(number: usize) -> PuzzleState {
        PuzzleState::from_config(&level(number).unwrap().unwrap()).unwrap()
    }

    fn assert_solves(initial: &PuzzleState, solution: &Solution) {
        let end = initial.apply_moves(&solution.moves).unwrap();
        assert!(end.is_goal(), "moves {:?} do not reach the goal", solution.descriptions());
        assert_eq!(end.board(), &solution.final_board);
    }

    const COMPLETE: [Algorithm; 4] = [
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::UniformCost,
        Algorithm::AStar,
    ];

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>(), Ok(algorithm));
        }
        assert_eq!("A*".parse::<Algorithm>(), Ok(Algorithm::AStar));
        assert_eq!("hill".parse::<Algorithm>(), Ok(Algorithm::HillClimbing));
        assert!("greedy".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_successors_only_move_magnets() {
        let s = state(&["R.G", "..T"]);
        let next = successors(&s);
        // four free cells, one magnet
        assert_eq!(next.len(), 4);
        assert!(next.iter().all(|(mv, _)| mv.kind == PieceKind::Red));
        assert_eq!(next[0].0.to_string(), "R(0, 0) to (0, 1)");
        assert_eq!(next[3].0.to_string(), "R(0, 0) to (1, 2)");
        assert!(successors(&state(&["G.T"])).is_empty());
    }

    #[test]
    fn test_already_solved_returns_no_moves() {
        let s = state(&["gTgTp"]);
        for algorithm in Algorithm::ALL {
            let solution = solve(algorithm, &s).unwrap();
            assert!(solution.moves.is_empty(), "{} moved a solved puzzle", algorithm);
            assert_eq!(solution.expanded, 0);
        }
    }

    #[test]
    fn test_single_push_solves_row() {
        // grays at 1 and 3, targets at 0, 2 and 4
        let config = PuzzleConfig::new(
            1,
            5,
            vec![
                Piece::new(PieceKind::Gray, (0, 1)),
                Piece::new(PieceKind::Gray, (0, 3)),
                Piece::new(PieceKind::Purple, (0, 4)),
            ],
            vec![(0, 0), (0, 2), (0, 4)],
        );
        let s = PuzzleState::from_config(&config).unwrap();
        let solution = solve(Algorithm::BreadthFirst, &s).unwrap();
        assert_eq!(solution.descriptions(), vec!["P(0, 4) to (0, 0)"]);
        assert_eq!(solution.final_board.to_string(), "p.g.g");
    }

    #[test]
    fn test_bfs_level_one() {
        let s = level_state(1);
        let solution = solve(Algorithm::BreadthFirst, &s).unwrap();
        assert_eq!(solution.descriptions(), vec!["P(0, 2) to (1, 0)"]);
        assert_solves(&s, &solution);
    }

    #[test]
    fn test_bfs_and_ucs_level_two() {
        let s = level_state(2);
        let expected = vec!["P(2, 0) to (0, 2)", "R(2, 3) to (2, 0)"];
        for algorithm in [Algorithm::BreadthFirst, Algorithm::UniformCost] {
            let solution = solve(algorithm, &s).unwrap();
            assert_eq!(solution.descriptions(), expected, "{}", algorithm);
            assert_solves(&s, &solution);
        }
    }

    #[test]
    fn test_every_complete_solver_solves_levels() {
        for number in [1, 2] {
            let s = level_state(number);
            let shortest = solve(Algorithm::BreadthFirst, &s).unwrap().moves.len();
            for algorithm in COMPLETE {
                let solution = solve(algorithm, &s).unwrap();
                assert_solves(&s, &solution);
                assert!(solution.moves.len() >= shortest);
            }
        }
    }

    #[test]
    fn test_a_star_matches_bfs_length() {
        for rows in [&["..P..", "TGTGT", "....."][..], &["gpTG."][..]] {
            let s = state(rows);
            let bfs = solve(Algorithm::BreadthFirst, &s).unwrap();
            let a_star = solve(Algorithm::AStar, &s).unwrap();
            assert_solves(&s, &a_star);
            assert_eq!(a_star.moves.len(), bfs.moves.len());
        }
    }

    #[test]
    fn test_row_needs_three_pushes() {
        let s = state(&["gpTG."]);
        let solution = solve(Algorithm::BreadthFirst, &s).unwrap();
        assert_eq!(
            solution.descriptions(),
            vec!["P(0, 1) to (0, 4)", "P(0, 4) to (0, 3)", "P(0, 3) to (0, 2)"]
        );
        assert_eq!(solution.final_board.to_string(), "ggp..");
    }

    #[test]
    fn test_hill_climbing_gets_stuck_where_bfs_succeeds() {
        let s = state(&["gpTG."]);
        assert!(solve(Algorithm::BreadthFirst, &s).is_ok());

        match solve(Algorithm::HillClimbing, &s) {
            Err(SolveError::DeadEnd { moves, .. }) => {
                let taken: Vec<String> = moves.iter().map(Move::to_string).collect();
                assert_eq!(
                    taken,
                    vec!["P(0, 1) to (0, 2)", "P(0, 2) to (0, 1)", "P(0, 1) to (0, 3)"]
                );
            }
            other => panic!("expected a dead end, got {:?}", other),
        }
    }

    #[test]
    fn test_hill_climbing_level_two() {
        let s = level_state(2);
        let solution = solve(Algorithm::HillClimbing, &s).unwrap();
        assert_solves(&s, &solution);
    }

    #[test]
    fn test_unsolvable_puzzle() {
        // the purple magnet can only push the gray further from the targets
        let s = state(&["GpT"]);
        for algorithm in COMPLETE {
            assert!(
                matches!(solve(algorithm, &s), Err(SolveError::NoSolution { .. })),
                "{} found a solution",
                algorithm
            );
        }
        assert_eq!(
            solve(Algorithm::HillClimbing, &s),
            Err(SolveError::DeadEnd {
                moves: vec![Move {
                    kind: PieceKind::Purple,
                    from: (0, 1),
                    to: (0, 2)
                }],
                expanded: 2,
            })
        );
    }

    #[test]
    fn test_no_magnets_means_no_solution() {
        let s = state(&["G.T"]);
        assert_eq!(
            solve(Algorithm::BreadthFirst, &s),
            Err(SolveError::NoSolution { expanded: 1 })
        );
    }

    #[test]
    fn test_budget_exhausted() {
        let s = level_state(2);
        // no solution is one expansion away
        let one = SearchLimits {
            max_expansions: Some(1),
        };
        for algorithm in Algorithm::ALL {
            assert_eq!(
                solve_with_limits(algorithm, &s, &one),
                Err(SolveError::BudgetExhausted { expanded: 1 }),
                "{}",
                algorithm
            );
        }

        let three = SearchLimits {
            max_expansions: Some(3),
        };
        assert_eq!(
            solve_with_limits(Algorithm::BreadthFirst, &s, &three),
            Err(SolveError::BudgetExhausted { expanded: 3 })
        );
        assert!(solve_with_limits(Algorithm::BreadthFirst, &s, &SearchLimits::default()).is_ok());
    }

    #[test]
    fn test_solver_ignores_initial_history() {
        let mut s = level_state(1);
        s.play((0, 2), (2, 2)).unwrap();
        let solution = solve(Algorithm::BreadthFirst, &s).unwrap();
        assert_solves(&s, &solution);
        assert_eq!(s.steps(), 1);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SolveError::NoSolution { expanded: 4 }.to_string(),
            "no solution found after expanding 4 states"
        );
        let dead_end = SolveError::DeadEnd {
            moves: Vec::new(),
            expanded: 1,
        };
        assert_eq!(dead_end.to_string(), "hill climbing got stuck after 0 moves");
    }
}
