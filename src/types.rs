//! Core value types shared by the engine and game adapters.
//!
//! All scores are expressed from player 1's perspective: positive values
//! favor player 1, negative values favor player 2.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Anything at or beyond this magnitude is a forced win (or loss).
pub const WINNING_VALUE: i32 = 1000;

/// Bound used for the initial search window. Strictly larger than any score.
pub const INFINITY: i32 = 10 * WINNING_VALUE;

/// Clamp a static evaluation into `[-WINNING_VALUE, WINNING_VALUE]`.
///
/// A value outside the range indicates a faulty `worth` implementation; it
/// is logged and pinned to the winning value of its sign.
#[must_use]
pub fn clamp_worth(value: i32) -> i32 {
    if value.abs() > WINNING_VALUE {
        log::warn!(
            "evaluation {value} exceeds WINNING_VALUE ({WINNING_VALUE}), clamping"
        );
        value.signum() * WINNING_VALUE
    } else {
        value
    }
}

/// A board coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub row: u8,
    pub col: u8,
}

impl Location {
    #[inline]
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Location { row, col }
    }

    /// Row-major index on a board `width` columns wide.
    #[inline]
    #[must_use]
    pub const fn index(self, width: usize) -> usize {
        self.row as usize * width + self.col as usize
    }

    #[inline]
    #[must_use]
    pub const fn from_index(index: usize, width: usize) -> Self {
        Location {
            row: (index / width) as u8,
            col: (index % width) as u8,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A single ply: one player's transition from one position to the next.
///
/// `value` is the static worth assigned by the game's evaluator when the
/// move was generated. `inherited_value` is what the search backs up from
/// the move's descendants; until the move is searched it equals `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    /// Destination of the move
    pub to: Location,
    /// Origin, for games that relocate pieces rather than place them
    pub from: Option<Location>,
    /// True if player 1 made the move
    pub player1: bool,
    /// Game-defined piece kind
    pub piece: u8,
    /// Static evaluation after the move
    pub value: i32,
    /// Backed-up minimax value
    pub inherited_value: i32,
    /// Generated by the quiescence (jeopardy) extension
    pub urgent: bool,
    /// The player chose to pass
    pub passing: bool,
    /// Sequence number within the game
    pub number: u32,
    /// On the path of the chosen line
    pub selected: bool,
}

impl Move {
    /// Create a placement move at `to`.
    #[must_use]
    pub fn new(to: Location, player1: bool, piece: u8, value: i32) -> Self {
        Move {
            to,
            from: None,
            player1,
            piece,
            value,
            inherited_value: value,
            urgent: false,
            passing: false,
            number: 0,
            selected: false,
        }
    }

    /// Create a passing move.
    #[must_use]
    pub fn pass(player1: bool, value: i32) -> Self {
        Move {
            passing: true,
            ..Move::new(Location::default(), player1, 0, value)
        }
    }

    /// The same move stamped with its position in the game record.
    #[must_use]
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    /// Set the static value and reset the inherited value to match it.
    pub fn set_value(&mut self, value: i32) {
        self.value = value;
        self.inherited_value = value;
    }

    /// True if the static value signals a decided game.
    #[inline]
    #[must_use]
    pub fn is_winning(&self) -> bool {
        self.value.abs() >= WINNING_VALUE
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = if self.player1 { "P1" } else { "P2" };
        if self.passing {
            write!(f, "{who} pass")?;
        } else {
            write!(f, "{who} {}", self.to)?;
        }
        write!(f, " val:{} inhrtd:{}", self.value, self.inherited_value)?;
        if self.urgent {
            write!(f, " urgent!")?;
        }
        Ok(())
    }
}

/// Ordered list of candidate moves for a single ply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<Move>,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList { moves: Vec::new() }
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn truncate(&mut self, len: usize) {
        self.moves.truncate(len);
    }

    /// Stable sort by static value; ties keep generation order.
    pub fn sort_by_value(&mut self, descending: bool) {
        if descending {
            self.moves.sort_by(|a, b| b.value.cmp(&a.value));
        } else {
            self.moves.sort_by(|a, b| a.value.cmp(&b.value));
        }
    }

    /// Mark every move as generated by the quiescence extension.
    pub fn mark_urgent(&mut self) {
        for mv in &mut self.moves {
            mv.urgent = true;
        }
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        MoveList {
            moves: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Move>> for MoveList {
    fn from(moves: Vec<Move>) -> Self {
        MoveList { moves }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_worth_pins_out_of_range_values() {
        assert_eq!(clamp_worth(250), 250);
        assert_eq!(clamp_worth(WINNING_VALUE), WINNING_VALUE);
        assert_eq!(clamp_worth(WINNING_VALUE + 7), WINNING_VALUE);
        assert_eq!(clamp_worth(-5 * WINNING_VALUE), -WINNING_VALUE);
    }

    #[test]
    fn location_index_roundtrip() {
        let loc = Location::new(2, 1);
        assert_eq!(loc.index(3), 7);
        assert_eq!(Location::from_index(7, 3), loc);
    }

    #[test]
    fn sort_by_value_is_stable() {
        let mut list: MoveList = [(0, 5), (1, 3), (2, 5), (3, 1)]
            .iter()
            .map(|&(c, v)| Move::new(Location::new(0, c), true, 1, v))
            .collect();

        list.sort_by_value(true);
        let cols: Vec<u8> = list.iter().map(|m| m.to.col).collect();
        assert_eq!(cols, vec![0, 2, 1, 3]);

        list.sort_by_value(false);
        let cols: Vec<u8> = list.iter().map(|m| m.to.col).collect();
        assert_eq!(cols, vec![3, 1, 0, 2]);
    }

    #[test]
    fn new_move_inherits_static_value() {
        let mut mv = Move::new(Location::new(1, 1), false, 2, -40);
        assert_eq!(mv.inherited_value, -40);
        mv.set_value(12);
        assert_eq!(mv.inherited_value, 12);
        assert!(!mv.is_winning());
        mv.set_value(-WINNING_VALUE);
        assert!(mv.is_winning());
    }
}
