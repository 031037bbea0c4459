use crate::engine::{Board, Position, PuzzleState};

/// Manhattan distance between two cells.
pub fn manhattan_distance(a: Position, b: Position) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Distance from `pos` to the closest target, or `None` if the board has no targets.
pub fn nearest_target_distance(board: &Board, pos: Position) -> Option<usize> {
    board
        .targets()
        .iter()
        .map(|&target| manhattan_distance(pos, target))
        .min()
}

/// Sums, over every piece, the Manhattan distance to its nearest target.
///
/// Gray pieces count as well as magnets. Several pieces may share the same
/// nearest target, and a single move can shift many pieces at once through a
/// chain reaction, so the score can overestimate the moves left. It guides
/// hill climbing and A* but does not guarantee an optimal solution.
///
/// # Examples
/// ```
/// use logic_magnets::engine::Board;
/// use logic_magnets::heuristics::board_heuristic;
/// use logic_magnets::utils::config_from_str_array;
///
/// let board = Board::new(&config_from_str_array(&["R.T", "G.."]).unwrap()).unwrap();
/// assert_eq!(board_heuristic(&board), 2 + 3);
/// ```
pub fn board_heuristic(board: &Board) -> usize {
    board
        .pieces()
        .filter_map(|piece| nearest_target_distance(board, piece.position))
        .sum()
}

/// The heuristic score of a search state.
pub fn heuristic(state: &PuzzleState) -> usize {
    board_heuristic(state.board())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config_from_str_array;

    fn board(rows: &[&str]) -> Board {
        Board::new(&config_from_str_array(rows).unwrap()).unwrap()
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(manhattan_distance((0, 0), (0, 0)), 0);
        assert_eq!(manhattan_distance((3, 1), (0, 4)), 6);
        assert_eq!(manhattan_distance((0, 4), (3, 1)), 6);
    }

    #[test]
    fn test_nearest_target_distance() {
        let b = board(&["T...T", ".....", "..R.."]);
        assert_eq!(nearest_target_distance(&b, (2, 2)), Some(4));
        assert_eq!(nearest_target_distance(&b, (0, 3)), Some(1));
        assert_eq!(nearest_target_distance(&board(&["R.."]), (0, 0)), None);
    }

    #[test]
    fn test_goal_scores_zero() {
        let b = board(&["..P..", "TGTGT", "....."]);
        assert_eq!(board_heuristic(&b), 1 + 1 + 1);
        let mut solved = b.clone();
        solved.move_magnet((0, 2), (1, 0)).unwrap();
        assert!(solved.is_goal());
        assert_eq!(board_heuristic(&solved), 0);
    }

    #[test]
    fn test_pieces_may_share_a_target() {
        // both grays measure against the single target
        let b = board(&["G.T.G"]);
        assert_eq!(board_heuristic(&b), 4);
    }

    #[test]
    fn test_no_targets_scores_zero() {
        assert_eq!(board_heuristic(&board(&["RG", "P."])), 0);
    }

    #[test]
    fn test_state_heuristic_matches_board() {
        let config = config_from_str_array(&["R..T", "G..."]).unwrap();
        let state = PuzzleState::from_config(&config).unwrap();
        assert_eq!(heuristic(&state), board_heuristic(state.board()));
        assert_eq!(heuristic(&state), 3 + 4);
    }
}
