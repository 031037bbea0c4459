//! Core engine for the Logic Magnets puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `PieceKind` and `Piece`: Gray blocks and the two kinds of magnet.
//! - `PuzzleConfig`: The explicit description of a puzzle (size, pieces, targets).
//! - `Board`: The grid, the magnet pull/push physics and the goal check.
//! - `PuzzleState`: Pure move application for the solvers, plus the move log
//!   and undo history used by interactive front-ends.
use itertools::{iproduct, Either, Itertools};
use log::trace;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::canonical::{state_key, StateKey};

/// A `(row, column)` cell coordinate, 0-based.
pub type Position = (usize, usize);

/// The kind of a piece on the board.
///
/// Only magnets can be moved by the player. Gray pieces are passive: they are
/// dragged or pushed by a magnet's chain reaction but never move on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    /// A passive block.
    Gray,
    /// A magnet that pulls collinear pieces one step towards itself.
    Red,
    /// A magnet that pushes collinear pieces one step away from itself.
    Purple,
}

/// The chain reaction a magnet triggers after it lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reaction {
    Pull,
    Push,
}

impl PieceKind {
    /// Converts the kind to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use logic_magnets::engine::PieceKind;
    /// assert_eq!(PieceKind::Red.to_char(), 'R');
    /// assert_eq!(PieceKind::Gray.to_char(), 'G');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            PieceKind::Gray => 'G',
            PieceKind::Red => 'R',
            PieceKind::Purple => 'P',
        }
    }

    /// Returns `true` for the kinds a player may move directly.
    pub fn is_magnet(&self) -> bool {
        self.reaction().is_some()
    }

    fn reaction(&self) -> Option<Reaction> {
        match self {
            PieceKind::Gray => None,
            PieceKind::Red => Some(Reaction::Pull),
            PieceKind::Purple => Some(Reaction::Push),
        }
    }

    /// Returns the ANSI background colour code for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            PieceKind::Gray => "47",
            PieceKind::Red => "41",
            PieceKind::Purple => "45",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Gray => "Gray",
            PieceKind::Red => "Red",
            PieceKind::Purple => "Purple",
        };
        f.write_str(name)
    }
}

/// A piece and the cell it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub position: Position,
}

impl Piece {
    pub fn new(kind: PieceKind, position: Position) -> Self {
        Piece { kind, position }
    }
}

/// The content of one grid cell, derived from the board's pieces and targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    /// An unoccupied target cell.
    Target,
    Occupied(PieceKind),
}

/// A single player move: the magnet of `kind` at `from` was sent to `to`.
///
/// Its `Display` form is the move notation used in solver output.
///
/// ```
/// use logic_magnets::engine::{Move, PieceKind};
/// let mv = Move { kind: PieceKind::Purple, from: (0, 2), to: (1, 0) };
/// assert_eq!(mv.to_string(), "P(0, 2) to (1, 0)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub kind: PieceKind,
    pub from: Position,
    pub to: Position,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) to ({}, {})",
            self.kind.to_char(),
            self.from.0,
            self.from.1,
            self.to.0,
            self.to.1
        )
    }
}

/// Reasons a `PuzzleConfig` cannot be turned into a `Board`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions must be non-zero, got {rows}x{cols}")]
    EmptyBoard { rows: usize, cols: usize },
    #[error("{kind} piece at {position:?} lies outside the {rows}x{cols} board")]
    PieceOutOfBounds {
        kind: PieceKind,
        position: Position,
        rows: usize,
        cols: usize,
    },
    #[error("more than one piece placed at {0:?}")]
    DuplicatePiece(Position),
    #[error("target {0:?} lies outside the board")]
    TargetOutOfBounds(Position),
    #[error("{pieces} pieces do not fit on a {rows}x{cols} board")]
    TooManyPieces {
        pieces: usize,
        rows: usize,
        cols: usize,
    },
}

/// Reasons a requested move is rejected. The board is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("there is no piece at {0:?}")]
    NoPiece(Position),
    #[error("{0} pieces cannot be moved directly")]
    Immovable(PieceKind),
    #[error("cell {0:?} is occupied or outside the board")]
    Blocked(Position),
}

/// The full description of a puzzle: its size, starting pieces and targets.
///
/// Piece order is irrelevant; two configs listing the same pieces in a
/// different order build equal boards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleConfig {
    pub rows: usize,
    pub cols: usize,
    pub pieces: Vec<Piece>,
    pub targets: Vec<Position>,
}

impl PuzzleConfig {
    pub fn new(rows: usize, cols: usize, pieces: Vec<Piece>, targets: Vec<Position>) -> Self {
        PuzzleConfig {
            rows,
            cols,
            pieces,
            targets,
        }
    }

    /// Creates a random puzzle from a seed.
    ///
    /// The same arguments always produce the same puzzle. Pieces are placed on
    /// distinct cells, each magnet is Red or Purple with equal probability, and
    /// there are exactly as many distinct targets as pieces. The result is not
    /// guaranteed to be solvable.
    ///
    /// # Errors
    /// `ConfigError::EmptyBoard` for a zero dimension and
    /// `ConfigError::TooManyPieces` when `magnets + grays` exceeds the cell count.
    pub fn random_with_seed(
        rows: usize,
        cols: usize,
        magnets: usize,
        grays: usize,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard { rows, cols });
        }
        let count = magnets + grays;
        if count > rows * cols {
            return Err(ConfigError::TooManyPieces {
                pieces: count,
                rows,
                cols,
            });
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut cells: Vec<Position> = iproduct!(0..rows, 0..cols).collect();

        cells.shuffle(&mut rng);
        let pieces = cells
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, &position)| {
                let kind = if i >= magnets {
                    PieceKind::Gray
                } else if rng.gen_bool(0.5) {
                    PieceKind::Red
                } else {
                    PieceKind::Purple
                };
                Piece::new(kind, position)
            })
            .collect();

        cells.shuffle(&mut rng);
        let targets = cells.into_iter().take(count).collect();

        Ok(PuzzleConfig::new(rows, cols, pieces, targets))
    }
}

/// The puzzle grid.
///
/// The position-indexed piece map is the only stored layout; every grid cell
/// is computed from it and the target set. Targets never change during a
/// puzzle, so clones share them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    pieces: BTreeMap<Position, PieceKind>,
    targets: Arc<BTreeSet<Position>>,
}

impl Board {
    /// Builds and validates a board from a configuration.
    ///
    /// # Errors
    /// Returns a `ConfigError` if a dimension is zero, a piece or target lies
    /// outside the board, or two pieces share a cell.
    ///
    /// # Examples
    /// ```
    /// use logic_magnets::engine::{Board, Piece, PieceKind, PuzzleConfig};
    /// let config = PuzzleConfig::new(
    ///     1,
    ///     3,
    ///     vec![Piece::new(PieceKind::Red, (0, 0))],
    ///     vec![(0, 2)],
    /// );
    /// let board = Board::new(&config).unwrap();
    /// assert!(board.can_move_to((0, 2)));
    /// assert!(!board.is_goal());
    /// ```
    pub fn new(config: &PuzzleConfig) -> Result<Self, ConfigError> {
        let (rows, cols) = (config.rows, config.cols);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard { rows, cols });
        }

        let mut pieces = BTreeMap::new();
        for piece in &config.pieces {
            let (r, c) = piece.position;
            if r >= rows || c >= cols {
                return Err(ConfigError::PieceOutOfBounds {
                    kind: piece.kind,
                    position: piece.position,
                    rows,
                    cols,
                });
            }
            if pieces.insert(piece.position, piece.kind).is_some() {
                return Err(ConfigError::DuplicatePiece(piece.position));
            }
        }

        let mut targets = BTreeSet::new();
        for &(r, c) in &config.targets {
            if r >= rows || c >= cols {
                return Err(ConfigError::TargetOutOfBounds((r, c)));
            }
            targets.insert((r, c));
        }

        Ok(Board {
            rows,
            cols,
            pieces,
            targets: Arc::new(targets),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn targets(&self) -> &BTreeSet<Position> {
        &self.targets
    }

    pub fn in_bounds(&self, (r, c): Position) -> bool {
        r < self.rows && c < self.cols
    }

    /// Returns the piece at `pos`, if any.
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.pieces.get(&pos).map(|&kind| Piece::new(kind, pos))
    }

    /// Iterates over all pieces in row-major position order.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces
            .iter()
            .map(|(&position, &kind)| Piece::new(kind, position))
    }

    /// Iterates over the Red and Purple pieces in row-major position order.
    pub fn magnets(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(|piece| piece.kind.is_magnet())
    }

    /// Returns the content of the cell at `pos`, or `None` outside the board.
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(match self.pieces.get(&pos) {
            Some(&kind) => Cell::Occupied(kind),
            None if self.targets.contains(&pos) => Cell::Target,
            None => Cell::Empty,
        })
    }

    /// Renders the whole grid, row by row.
    pub fn grid(&self) -> Vec<Vec<Cell>> {
        (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| self.cell((r, c)).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect()
    }

    /// Returns `true` if `pos` is on the board and holds no piece.
    ///
    /// This is both the legality test for a player's move and the test for
    /// whether a chain reaction may shift a piece into `pos`.
    pub fn can_move_to(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.pieces.contains_key(&pos)
    }

    /// Moves the magnet at `from` to `to` and resolves its chain reaction.
    ///
    /// A Red magnet then pulls every piece on its row and column one step
    /// towards its new cell, scanning outward from the nearest offset; a
    /// Purple magnet pushes them one step away, scanning inward from the
    /// farthest offset. Each shift only happens if the cell it moves into is
    /// free. Gray pieces take part in the reaction like any other piece.
    ///
    /// # Errors
    /// * `MoveError::NoPiece` if `from` is empty.
    /// * `MoveError::Immovable` if the piece at `from` is Gray.
    /// * `MoveError::Blocked` if `to` fails [`Board::can_move_to`].
    ///
    /// The board is unchanged when an error is returned.
    pub fn move_magnet(&mut self, from: Position, to: Position) -> Result<Move, MoveError> {
        let kind = *self.pieces.get(&from).ok_or(MoveError::NoPiece(from))?;
        let reaction = kind.reaction().ok_or(MoveError::Immovable(kind))?;
        if !self.can_move_to(to) {
            return Err(MoveError::Blocked(to));
        }

        self.pieces.remove(&from);
        self.pieces.insert(to, kind);
        self.chain_reaction(to, reaction);

        Ok(Move { kind, from, to })
    }

    /// Every destination the piece at `from` may be sent to in one move.
    ///
    /// Magnets may jump to any free cell on the board, not only neighbours.
    /// Gray pieces and empty cells have no moves.
    pub fn generate_moves(&self, from: Position) -> Vec<Position> {
        match self.pieces.get(&from) {
            Some(kind) if kind.is_magnet() => iproduct!(0..self.rows, 0..self.cols)
                .filter(|&pos| self.can_move_to(pos))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` when every piece stands on a target.
    pub fn is_goal(&self) -> bool {
        self.pieces.keys().all(|pos| self.targets.contains(pos))
    }

    /// The canonical key of this layout.
    pub fn key(&self) -> StateKey {
        state_key(self)
    }

    fn chain_reaction(&mut self, origin: Position, reaction: Reaction) {
        let axes = [
            (self.cols, [(0, -1), (0, 1)]),
            (self.rows, [(-1, 0), (1, 0)]),
        ];

        for (len, directions) in axes {
            // pull resolves near pieces first, push far pieces first, so a run
            // of adjacent pieces moves as a block without colliding
            let offsets = match reaction {
                Reaction::Pull => Either::Left(1..len),
                Reaction::Push => Either::Right((1..len).rev()),
            };

            for distance in offsets {
                for (dr, dc) in directions {
                    let Some(pos) = self.offset(origin, (dr, dc), distance) else {
                        continue;
                    };
                    if !self.pieces.contains_key(&pos) {
                        continue;
                    }
                    let shift = match reaction {
                        Reaction::Pull => (-dr, -dc),
                        Reaction::Push => (dr, dc),
                    };
                    self.shift_piece(pos, shift);
                }
            }
        }
    }

    fn shift_piece(&mut self, pos: Position, delta: (isize, isize)) {
        let Some(dest) = self.offset(pos, delta, 1) else {
            return;
        };
        if !self.can_move_to(dest) {
            return;
        }
        if let Some(kind) = self.pieces.remove(&pos) {
            trace!("{} piece shifted from {:?} to {:?}", kind, pos, dest);
            self.pieces.insert(dest, kind);
        }
    }

    fn offset(
        &self,
        (r, c): Position,
        (dr, dc): (isize, isize),
        distance: usize,
    ) -> Option<Position> {
        let distance = isize::try_from(distance).ok()?;
        let r = r.checked_add_signed(dr * distance)?;
        let c = c.checked_add_signed(dc * distance)?;
        self.in_bounds((r, c)).then_some((r, c))
    }

    fn cell_char(&self, pos: Position) -> char {
        match self.cell(pos) {
            Some(Cell::Occupied(kind)) if self.targets.contains(&pos) => {
                kind.to_char().to_ascii_lowercase()
            }
            Some(Cell::Occupied(kind)) => kind.to_char(),
            Some(Cell::Target) => 'T',
            Some(Cell::Empty) | None => '.',
        }
    }

    /// Renders the board for a colour terminal, marking the cell at `pos`.
    ///
    /// Columns are numbered across the top and rows down the left. Each cell
    /// shows the same character as the plain `Display` form on a background in
    /// the colour of its piece, green for a free target. The marked cell (the
    /// magnet that just moved, in the player) is wrapped in `[]`.
    pub fn to_string_with_highlight(&self, pos: Option<Position>) -> String {
        let header = (0..self.cols).map(|c| format!("{:^3}", c)).join("");
        let rows = (0..self.rows).map(|r| {
            let cells = (0..self.cols)
                .map(|c| {
                    let cell = (r, c);
                    let background = match self.cell(cell) {
                        Some(Cell::Occupied(kind)) => kind.to_ansi_color_code(),
                        Some(Cell::Target) => "42",
                        _ => "40",
                    };
                    let (open, close) = if pos == Some(cell) {
                        ('[', ']')
                    } else {
                        (' ', ' ')
                    };
                    format!(
                        "\x1b[{}m{}{}{}\x1b[0m",
                        background,
                        open,
                        self.cell_char(cell),
                        close
                    )
                })
                .join("");
            format!("{:>2} {}", r, cells)
        });

        std::iter::once(format!("   {}", header))
            .chain(rows)
            .join("\n")
    }
}

impl fmt::Display for Board {
    /// Formats the board in the same text form `utils::config_from_str` reads.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = (0..self.rows)
            .map(|r| (0..self.cols).map(|c| self.cell_char((r, c))).collect::<String>())
            .join("\n");
        f.write_str(&text)
    }
}

/// A node of the puzzle's state graph.
///
/// Solvers only use [`PuzzleState::make_move`], which never mutates the
/// receiver. Interactive front-ends use [`PuzzleState::play`] instead, which
/// applies the move in place and records it so it can be undone.
#[derive(Clone, Debug)]
pub struct PuzzleState {
    board: Board,
    history: Vec<(Board, Move)>, // (board before the move, the move) for undo
}

impl PuzzleState {
    pub fn new(board: Board) -> Self {
        PuzzleState {
            board,
            history: Vec::new(),
        }
    }

    /// Builds the initial state of a puzzle.
    pub fn from_config(config: &PuzzleConfig) -> Result<Self, ConfigError> {
        Board::new(config).map(PuzzleState::new)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_goal(&self) -> bool {
        self.board.is_goal()
    }

    pub fn key(&self) -> StateKey {
        self.board.key()
    }

    /// Returns the state reached by moving the magnet at `from` to `to`.
    ///
    /// The new state owns a fresh copy of the board and starts with an empty
    /// history; `self` is not modified.
    pub fn make_move(&self, from: Position, to: Position) -> Result<PuzzleState, MoveError> {
        let mut board = self.board.clone();
        board.move_magnet(from, to)?;
        Ok(PuzzleState::new(board))
    }

    /// Applies a move in place and records it in the history.
    pub fn play(&mut self, from: Position, to: Position) -> Result<Move, MoveError> {
        let mut board = self.board.clone();
        let mv = board.move_magnet(from, to)?;
        let previous = std::mem::replace(&mut self.board, board);
        self.history.push((previous, mv));
        Ok(mv)
    }

    /// Reverts the last move made with [`PuzzleState::play`].
    ///
    /// Returns the undone move, or `None` if there was nothing to undo.
    pub fn undo_last_move(&mut self) -> Option<Move> {
        let (previous, mv) = self.history.pop()?;
        self.board = previous;
        Some(mv)
    }

    /// Returns to the board this state started from and clears the history.
    pub fn reset(&mut self) {
        if let Some((initial, _)) = self.history.drain(..).next() {
            self.board = initial;
        }
    }

    /// The moves played so far, oldest first.
    pub fn moves(&self) -> Vec<Move> {
        self.history.iter().map(|&(_, mv)| mv).collect()
    }

    pub fn steps(&self) -> usize {
        self.history.len()
    }

    /// Replays `moves` from this state's board and returns the final state.
    ///
    /// Stops at the first illegal move.
    pub fn apply_moves(&self, moves: &[Move]) -> Result<PuzzleState, MoveError> {
        let mut state = PuzzleState::new(self.board.clone());
        for mv in moves {
            state = state.make_move(mv.from, mv.to)?;
        }
        Ok(state)
    }
}
