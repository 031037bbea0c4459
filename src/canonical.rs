//! Canonical keys for puzzle states.
//!
//! Every solver deduplicates states through a `StateKey`. The key lists each
//! piece's position and kind in row-major order, so it depends only on the
//! physical layout and never on how the pieces were listed or which moves led
//! to the layout. The rendered grid is a pure function of these pairs and the
//! puzzle's fixed target set, so it adds nothing to the key.
use crate::engine::{Board, PieceKind, Position};
use itertools::Itertools;
use std::fmt;

/// An order-independent, hashable summary of a board layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    rows: usize,
    cols: usize,
    pieces: Box<[(Position, PieceKind)]>,
}

impl fmt::Display for StateKey {
    /// A compact one-line form for logs, e.g. `3x3 G(0, 1) R(2, 2)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pieces = self
            .pieces
            .iter()
            .map(|((r, c), kind)| format!("{}({}, {})", kind.to_char(), r, c))
            .join(" ");
        write!(f, "{}x{} {}", self.rows, self.cols, pieces)
    }
}

/// Computes the canonical key of a board.
///
/// # Examples
/// ```
/// use logic_magnets::canonical::state_key;
/// use logic_magnets::engine::{Board, Piece, PieceKind, PuzzleConfig};
///
/// let red = Piece::new(PieceKind::Red, (0, 0));
/// let gray = Piece::new(PieceKind::Gray, (1, 1));
/// let a = Board::new(&PuzzleConfig::new(2, 2, vec![red, gray], vec![])).unwrap();
/// let b = Board::new(&PuzzleConfig::new(2, 2, vec![gray, red], vec![])).unwrap();
/// assert_eq!(state_key(&a), state_key(&b));
/// ```
pub fn state_key(board: &Board) -> StateKey {
    StateKey {
        rows: board.rows(),
        cols: board.cols(),
        pieces: board
            .pieces()
            .map(|piece| (piece.position, piece.kind))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Piece, PuzzleConfig, PuzzleState};
    use crate::utils::config_from_str_array;

    fn board_of(pieces: Vec<Piece>) -> Board {
        Board::new(&PuzzleConfig::new(3, 3, pieces, vec![(2, 2)])).unwrap()
    }

    #[test]
    fn test_key_ignores_piece_order() {
        let pieces = vec![
            Piece::new(PieceKind::Gray, (0, 1)),
            Piece::new(PieceKind::Purple, (2, 0)),
            Piece::new(PieceKind::Red, (1, 1)),
        ];
        let mut reversed = pieces.clone();
        reversed.reverse();
        assert_eq!(state_key(&board_of(pieces)), state_key(&board_of(reversed)));
    }

    #[test]
    fn test_key_differs_on_position() {
        let a = board_of(vec![
            Piece::new(PieceKind::Gray, (0, 1)),
            Piece::new(PieceKind::Red, (1, 1)),
        ]);
        let b = board_of(vec![
            Piece::new(PieceKind::Gray, (0, 2)),
            Piece::new(PieceKind::Red, (1, 1)),
        ]);
        assert_ne!(state_key(&a), state_key(&b));
    }

    #[test]
    fn test_key_differs_on_kind() {
        let a = board_of(vec![Piece::new(PieceKind::Red, (1, 1))]);
        let b = board_of(vec![Piece::new(PieceKind::Purple, (1, 1))]);
        assert_ne!(state_key(&a), state_key(&b));
    }

    #[test]
    fn test_key_display() {
        let b = board_of(vec![
            Piece::new(PieceKind::Red, (2, 2)),
            Piece::new(PieceKind::Gray, (0, 1)),
        ]);
        assert_eq!(state_key(&b).to_string(), "3x3 G(0, 1) R(2, 2)");
    }

    #[test]
    fn test_key_is_path_independent() {
        // two different first moves that end in the same layout
        let config = config_from_str_array(&["R..", "...", "..T"]).unwrap();
        let start = PuzzleState::from_config(&config).unwrap();
        let direct = start.make_move((0, 0), (2, 2)).unwrap();
        let detour = start
            .make_move((0, 0), (1, 1))
            .and_then(|s| s.make_move((1, 1), (2, 2)))
            .unwrap();
        assert_eq!(direct.key(), detour.key());
        assert_eq!(
            direct.key(),
            state_key(&board_of(vec![Piece::new(PieceKind::Red, (2, 2))]))
        );
    }
}
