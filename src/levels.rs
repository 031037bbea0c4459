//! Built-in puzzles.
use crate::engine::PuzzleConfig;
use crate::utils::{config_from_str_array, ParseError};

/// The shipped puzzles in text form, easiest first.
pub const LEVELS: &[&[&str]] = &[
    // one Purple magnet, two Gray pieces between three targets
    &["..P..", "TGTGT", "....."],
    // one Red and one Purple magnet, three Gray pieces
    &[".GT.", "TgG.", "pT.R"],
];

/// Returns the 1-based `number`th built-in puzzle, or `None` if there is no such level.
pub fn level(number: usize) -> Option<Result<PuzzleConfig, ParseError>> {
    let rows = LEVELS.get(number.checked_sub(1)?)?;
    Some(config_from_str_array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;

    #[test]
    fn test_all_levels_build() {
        for number in 1..=LEVELS.len() {
            let config = level(number).unwrap().unwrap();
            let board = Board::new(&config).unwrap();
            assert!(!board.is_goal(), "level {} starts solved", number);
            assert_eq!(config.pieces.len(), config.targets.len());
        }
    }

    #[test]
    fn test_level_numbers_are_one_based() {
        assert!(level(0).is_none());
        assert!(level(LEVELS.len() + 1).is_none());
        assert_eq!(level(1).unwrap().unwrap().rows, 3);
    }
}
