//! Move ordering and forward pruning.

use crate::search::options::BestMovesOptions;
use crate::types::MoveList;

/// Ranks a ply's candidate moves and keeps only the most promising ones.
#[derive(Clone, Debug, Default)]
pub struct BestMoveFinder {
    options: BestMovesOptions,
}

impl BestMoveFinder {
    #[must_use]
    pub fn new(options: BestMovesOptions) -> Self {
        BestMoveFinder { options }
    }

    /// Number of moves kept out of `n` generated:
    /// `min(n, max(min_best_moves, ceil(pct * n / 100)))`.
    #[must_use]
    pub fn keep_count(&self, n: usize) -> usize {
        let pct = self.options.percentage_best_moves as usize;
        let by_percentage = (pct * n).div_ceil(100);
        n.min(by_percentage.max(self.options.min_best_moves))
    }

    /// Sort `moves` for the side to move and truncate to the best subset.
    ///
    /// Values are from player 1's perspective, so player 1 wants them
    /// descending and player 2 ascending. Ties keep generation order.
    #[must_use]
    pub fn rank(&self, mut moves: MoveList, player1_to_move: bool) -> MoveList {
        moves.sort_by_value(player1_to_move);
        let keep = self.keep_count(moves.len());
        moves.truncate(keep);
        moves
    }

    /// Sort urgent moves without truncating; every threat gets a look.
    #[must_use]
    pub fn rank_urgent(&self, mut moves: MoveList, player1_to_move: bool) -> MoveList {
        moves.sort_by_value(player1_to_move);
        moves
    }
}
