//! Maps a backed-up score to a win probability.

use crate::types::WINNING_VALUE;

/// Below this many moves played the score says too little; report even odds.
pub const MIN_MOVES_FOR_ESTIMATE: usize = 4;

/// Probability in `[0, 1]` that player 1 wins, given the inherited value of
/// the last move (player 1's perspective).
///
/// Linear in the score: `-WINNING_VALUE` maps to 0, `WINNING_VALUE` to 1.
#[must_use]
pub fn estimate(inherited_value: i32, num_moves_played: usize) -> f64 {
    if num_moves_played < MIN_MOVES_FOR_ESTIMATE {
        return 0.5;
    }
    if inherited_value.abs() > WINNING_VALUE {
        log::warn!(
            "inherited value {inherited_value} exceeds WINNING_VALUE ({WINNING_VALUE}), clamping"
        );
    }
    let w = f64::from(WINNING_VALUE);
    ((f64::from(inherited_value) + w) / (2.0 * w)).clamp(0.0, 1.0)
}

/// Score for a decided game: quicker wins are stronger.
#[must_use]
pub fn strength_of_win(num_moves: usize) -> i32 {
    (50 / num_moves.max(1)) as i32
}
