use crate::engine::{Piece, PieceKind, Position, PuzzleConfig};
use thiserror::Error;

/// Reasons a text puzzle cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("puzzle has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnknownCell { ch: char, row: usize, col: usize },
}

/// Parses an array of string slices into a `PuzzleConfig`.
///
/// Each string slice is one row of the board, starting from row 0, and every
/// row must have the same number of characters. Valid characters are:
/// - '.': an empty cell
/// - 'T': an empty target cell
/// - 'R', 'P', 'G': a Red magnet, Purple magnet or Gray piece
/// - 'r', 'p', 'g': the same pieces standing on a target cell
///
/// # Returns
/// * `Ok(PuzzleConfig)` whose pieces and targets are listed in row-major order.
/// * `Err(ParseError)` if there are no rows, the rows differ in length, or an
///   unrecognized character is encountered.
///
/// # Examples
/// ```
/// use logic_magnets::engine::{Piece, PieceKind};
/// use logic_magnets::utils::config_from_str_array;
///
/// let config = config_from_str_array(&["..P..", "TGTGT", "....."]).unwrap();
/// assert_eq!((config.rows, config.cols), (3, 5));
/// assert_eq!(config.pieces[0], Piece::new(PieceKind::Purple, (0, 2)));
/// assert_eq!(config.targets, vec![(1, 0), (1, 2), (1, 4)]);
///
/// assert!(config_from_str_array(&["RXB"]).is_err());
/// assert!(config_from_str_array(&["R..", "R"]).is_err());
/// ```
pub fn config_from_str_array(s: &[&str]) -> Result<PuzzleConfig, ParseError> {
    let cols = s.first().ok_or(ParseError::Empty)?.chars().count();
    if cols == 0 {
        return Err(ParseError::Empty);
    }

    let mut pieces = Vec::new();
    let mut targets: Vec<Position> = Vec::new();

    for (r, row_str) in s.iter().enumerate() {
        let found = row_str.chars().count();
        if found != cols {
            return Err(ParseError::RaggedRow {
                row: r,
                expected: cols,
                found,
            });
        }

        for (c, ch) in row_str.chars().enumerate() {
            let (kind, on_target) = match ch {
                '.' => (None, false),
                'T' => (None, true),
                'R' => (Some(PieceKind::Red), false),
                'P' => (Some(PieceKind::Purple), false),
                'G' => (Some(PieceKind::Gray), false),
                'r' => (Some(PieceKind::Red), true),
                'p' => (Some(PieceKind::Purple), true),
                'g' => (Some(PieceKind::Gray), true),
                _ => return Err(ParseError::UnknownCell { ch, row: r, col: c }),
            };
            if on_target {
                targets.push((r, c));
            }
            if let Some(kind) = kind {
                pieces.push(Piece::new(kind, (r, c)));
            }
        }
    }

    Ok(PuzzleConfig::new(s.len(), cols, pieces, targets))
}

/// Parses a whole puzzle text, one row per line.
///
/// Surrounding whitespace on each line and blank lines are ignored, so puzzle
/// files and indented string literals can be read directly.
pub fn config_from_str(text: &str) -> Result<PuzzleConfig, ParseError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    config_from_str_array(&rows)
}
