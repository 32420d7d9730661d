//! 3x3 tic-tac-toe, the reference [`Searchable`].
//!
//! Player 1 plays X and always moves first. The heuristic scores each of
//! the eight lines that only one side occupies, plus the center square.

use std::fmt;

use crate::searchable::Searchable;
use crate::types::{Location, Move, MoveList, WINNING_VALUE};
use crate::weights::WeightVector;
use crate::zobrist::{ZobristHash, EMPTY_STATE};

const SIZE: usize = 3;
const CELLS: usize = SIZE * SIZE;
const CENTER: usize = 4;

/// Piece codes, which double as Zobrist states
pub const X: u8 = 1;
pub const O: u8 = 2;

/// Weight indices
pub const TWO_IN_A_ROW: usize = 0;
pub const ONE_IN_A_ROW: usize = 1;
pub const CENTER_WEIGHT: usize = 2;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[inline]
fn piece_for(player1: bool) -> u8 {
    if player1 {
        X
    } else {
        O
    }
}

/// The side that owns a complete line, if any.
fn line_winner(cells: &[u8; CELLS]) -> Option<bool> {
    LINES.iter().find_map(|line| {
        let first = cells[line[0]];
        if first != EMPTY_STATE as u8 && line.iter().all(|&i| cells[i] == first) {
            Some(first == X)
        } else {
            None
        }
    })
}

/// Static evaluation from player 1's perspective.
fn evaluate(cells: &[u8; CELLS], weights: &WeightVector) -> i32 {
    match line_winner(cells) {
        Some(true) => return WINNING_VALUE,
        Some(false) => return -WINNING_VALUE,
        None => {}
    }

    let mut score = 0.0;
    for line in &LINES {
        let xs = line.iter().filter(|&&i| cells[i] == X).count();
        let os = line.iter().filter(|&&i| cells[i] == O).count();
        let (count, sign) = match (xs, os) {
            (n, 0) if n > 0 => (n, 1.0),
            (0, n) if n > 0 => (n, -1.0),
            _ => continue,
        };
        let weight = if count == 2 {
            weights.get(TWO_IN_A_ROW)
        } else {
            weights.get(ONE_IN_A_ROW)
        };
        score += sign * weight;
    }
    match cells[CENTER] {
        X => score += weights.get(CENTER_WEIGHT),
        O => score -= weights.get(CENTER_WEIGHT),
        _ => {}
    }

    let bound = f64::from(WINNING_VALUE - 1);
    score.round().clamp(-bound, bound) as i32
}

/// Tic-tac-toe position with incremental hashing.
#[derive(Clone, Debug)]
pub struct TicTacToe {
    cells: [u8; CELLS],
    hash: ZobristHash,
    num_moves: usize,
    winner: Option<bool>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    #[must_use]
    pub fn new() -> Self {
        TicTacToe {
            cells: [EMPTY_STATE as u8; CELLS],
            hash: ZobristHash::new(CELLS, 3),
            num_moves: 0,
            winner: None,
        }
    }

    /// Build a position from rows like `"XO./.X./..O"`.
    ///
    /// # Panics
    ///
    /// Panics on anything other than three rows of `X`, `O` and `.`.
    #[must_use]
    pub fn from_cells(layout: &str) -> Self {
        let mut game = TicTacToe::new();
        let rows: Vec<&str> = layout.split('/').collect();
        assert_eq!(rows.len(), SIZE, "expected {SIZE} rows in {layout:?}");
        for (row, text) in rows.iter().enumerate() {
            assert_eq!(text.len(), SIZE, "expected {SIZE} cells in row {text:?}");
            for (col, ch) in text.chars().enumerate() {
                let piece = match ch {
                    'X' => X,
                    'O' => O,
                    '.' => continue,
                    other => panic!("unexpected cell {other:?}"),
                };
                let idx = row * SIZE + col;
                game.cells[idx] = piece;
                game.hash.apply_move(idx, piece as usize);
                game.num_moves += 1;
            }
        }
        game
    }

    /// Weights for `[two in a row, one in a row, center]`.
    #[must_use]
    pub fn default_weights() -> WeightVector {
        WeightVector::new(vec![10.0, 2.0, 3.0])
    }

    #[must_use]
    pub fn player1_to_move(&self) -> bool {
        self.num_moves % 2 == 0
    }

    /// Piece at `loc`, `None` if empty.
    #[must_use]
    pub fn piece_at(&self, loc: Location) -> Option<u8> {
        match self.cells[loc.index(SIZE)] {
            0 => None,
            piece => Some(piece),
        }
    }

    /// Recompute the fingerprint from scratch.
    #[must_use]
    pub fn full_hash(&self) -> u64 {
        let states: Vec<usize> = self.cells.iter().map(|&c| c as usize).collect();
        self.hash.compute(&states)
    }

    fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CELLS).filter(|&i| self.cells[i] == EMPTY_STATE as u8)
    }

    fn completes_line(&self, idx: usize, piece: u8) -> bool {
        let mut cells = self.cells;
        cells[idx] = piece;
        line_winner(&cells).is_some()
    }

    fn scored_move(&self, idx: usize, player1: bool, weights: &WeightVector) -> Move {
        let mut mv = Move::new(Location::from_index(idx, SIZE), player1, piece_for(player1), 0);
        mv.set_value(self.worth(&mv, weights));
        mv
    }
}

impl Searchable for TicTacToe {
    fn generate_moves(&self, _last_move: Option<&Move>, weights: &WeightVector) -> MoveList {
        if line_winner(&self.cells).is_some() {
            return MoveList::new();
        }
        let player1 = self.player1_to_move();
        self.empty_cells()
            .map(|idx| self.scored_move(idx, player1, weights))
            .collect()
    }

    /// Squares that win on the spot, or stop the opponent from winning next.
    fn generate_urgent_moves(&self, _last_move: Option<&Move>, weights: &WeightVector) -> MoveList {
        if line_winner(&self.cells).is_some() {
            return MoveList::new();
        }
        let player1 = self.player1_to_move();
        let mine = piece_for(player1);
        let theirs = piece_for(!player1);
        self.empty_cells()
            .filter(|&idx| self.completes_line(idx, mine) || self.completes_line(idx, theirs))
            .map(|idx| self.scored_move(idx, player1, weights))
            .collect()
    }

    fn make_move(&mut self, mv: &Move) {
        let idx = mv.to.index(SIZE);
        assert_eq!(self.cells[idx], EMPTY_STATE as u8, "square {} is occupied", mv.to);
        assert_eq!(mv.player1, self.player1_to_move(), "move out of turn: {mv}");
        self.cells[idx] = mv.piece;
        self.hash.apply_move(idx, mv.piece as usize);
        self.num_moves += 1;
    }

    fn undo_move(&mut self, mv: &Move) {
        let idx = mv.to.index(SIZE);
        assert_eq!(self.cells[idx], mv.piece, "undo of a move not on the board");
        self.cells[idx] = EMPTY_STATE as u8;
        self.hash.apply_move(idx, mv.piece as usize);
        self.num_moves -= 1;
        self.winner = None;
    }

    fn worth(&self, mv: &Move, weights: &WeightVector) -> i32 {
        let mut cells = self.cells;
        cells[mv.to.index(SIZE)] = mv.piece;
        evaluate(&cells, weights)
    }

    fn done(&mut self, _last_move: Option<&Move>, record_result: bool) -> bool {
        let winner = line_winner(&self.cells);
        if record_result {
            self.winner = winner;
        }
        winner.is_some() || self.num_moves == CELLS
    }

    fn winner(&self) -> Option<bool> {
        self.winner
    }

    fn hash_key(&self) -> u64 {
        self.hash.key()
    }

    fn num_moves(&self) -> usize {
        self.num_moves
    }

    fn reset(&mut self) {
        self.cells = [EMPTY_STATE as u8; CELLS];
        self.hash.reset();
        self.num_moves = 0;
        self.winner = None;
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let ch = match self.cells[row * SIZE + col] {
                    X => 'X',
                    O => 'O',
                    _ => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_has_nine_moves() {
        let game = TicTacToe::new();
        let moves = game.generate_moves(None, &TicTacToe::default_weights());
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|m| m.player1 && m.piece == X));
        // Center is worth the most: four lines plus the center bonus
        let best = moves.iter().max_by_key(|m| m.value).expect("moves");
        assert_eq!(best.to, Location::new(1, 1));
    }

    #[test]
    fn make_and_undo_restore_hash() {
        let mut game = TicTacToe::new();
        let weights = TicTacToe::default_weights();
        let moves = game.generate_moves(None, &weights);
        let mv = moves[3];
        game.make_move(&mv);
        assert_ne!(game.hash_key(), 0);
        assert_eq!(game.hash_key(), game.full_hash());
        game.undo_move(&mv);
        assert_eq!(game.hash_key(), 0);
        assert_eq!(game.num_moves(), 0);
    }

    #[test]
    fn detects_wins_and_draws() {
        let mut won = TicTacToe::from_cells("XXX/OO./...");
        assert!(won.done(None, true));
        assert_eq!(won.winner(), Some(true));

        let mut draw = TicTacToe::from_cells("XOX/XOO/OXX");
        assert!(draw.done(None, true));
        assert_eq!(draw.winner(), None);

        let mut open = TicTacToe::from_cells("X../.O./...");
        assert!(!open.done(None, false));
    }

    #[test]
    fn urgent_moves_win_or_block() {
        // X to move: (0,2) wins, (1,2) blocks O
        let game = TicTacToe::from_cells("XX./OO./...");
        let urgent = game.generate_urgent_moves(None, &TicTacToe::default_weights());
        let squares: Vec<Location> = urgent.iter().map(|m| m.to).collect();
        assert_eq!(squares, vec![Location::new(0, 2), Location::new(1, 2)]);
        assert_eq!(urgent[0].value, WINNING_VALUE);
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn occupied_square_panics() {
        let mut game = TicTacToe::from_cells("X../.../...");
        game.make_move(&Move::new(Location::new(0, 0), false, O, 0));
    }

    #[test]
    fn display_shows_rows() {
        let game = TicTacToe::from_cells("XO./.X./..O");
        assert_eq!(game.to_string(), "XO.\n.X.\n..O\n");
    }
}
