//! The adapter a game implements so the engine can search it.

use crate::types::{Move, MoveList};
use crate::weights::WeightVector;

/// Capability set a two-player, zero-sum, perfect-information game exposes
/// to the search.
///
/// The engine depends only on this trait. Implementations own the live
/// position; the search mutates it exclusively through [`make_move`] and
/// [`undo_move`], always in balanced pairs.
///
/// Scores follow one sign convention everywhere: positive favors player 1.
/// Magnitudes at or beyond [`WINNING_VALUE`](crate::WINNING_VALUE) mean the
/// game is decided.
///
/// [`make_move`]: Searchable::make_move
/// [`undo_move`]: Searchable::undo_move
pub trait Searchable: Send {
    /// Legal moves for the side to move, each scored with [`worth`].
    ///
    /// `last_move` is `None` before the first move of the game. Must not
    /// mutate the position.
    ///
    /// [`worth`]: Searchable::worth
    fn generate_moves(&self, last_move: Option<&Move>, weights: &WeightVector) -> MoveList;

    /// Moves that would immediately win, or block an immediate loss.
    ///
    /// Used near the search horizon to extend the search locally instead of
    /// widening it.
    fn generate_urgent_moves(&self, last_move: Option<&Move>, weights: &WeightVector)
        -> MoveList;

    /// True if the last move left the position volatile enough to warrant
    /// searching past the horizon.
    fn in_jeopardy(&self, last_move: &Move, weights: &WeightVector) -> bool {
        !self.generate_urgent_moves(Some(last_move), weights).is_empty()
    }

    /// Apply a move to the live position, including its hash.
    ///
    /// # Panics
    ///
    /// Implementations panic if the move is illegal. Legality is guaranteed
    /// upstream by [`generate_moves`](Searchable::generate_moves).
    fn make_move(&mut self, mv: &Move);

    /// Revert `mv`, which must be the most recently made move. Restores the
    /// position and hash exactly.
    fn undo_move(&mut self, mv: &Move);

    /// Static evaluation of the position after `mv`.
    fn worth(&self, mv: &Move, weights: &WeightVector) -> i32;

    /// Terminal-state test. When `record_result` is true the winner (if any)
    /// is recorded permanently.
    fn done(&mut self, last_move: Option<&Move>, record_result: bool) -> bool;

    /// The recorded winner: `Some(true)` for player 1, `Some(false)` for
    /// player 2, `None` while undecided or drawn.
    fn winner(&self) -> Option<bool> {
        None
    }

    /// Fingerprint of the current position.
    fn hash_key(&self) -> u64;

    /// Number of moves played so far.
    fn num_moves(&self) -> usize;

    /// Return to the initial position.
    fn reset(&mut self);
}
