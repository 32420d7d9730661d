//! Classic minimax: player 1 maximizes, player 2 minimizes.

use super::{last_mover_wins, Frame, SearchContext};
use crate::search::tree::NodeId;
use crate::searchable::Searchable;
use crate::tt::BoundType;
use crate::types::{Move, INFINITY};

/// Value of the position reached by `last`, from player 1's perspective.
///
/// `(alpha, beta)` is also in player 1's terms. Fail-soft: a result outside
/// the window is a bound on the true value.
pub(super) fn minimax<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    last: &Move,
    id: NodeId,
    ply: u32,
    depth: i32,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    let player1 = !last.player1;

    if let Some(entry) = ctx.probe(player1, depth) {
        if let Some(score) = entry.cutoff(alpha, beta) {
            return score;
        }
    }

    let mut moves = match ctx.frame(last, depth) {
        Frame::Leaf(value) => return value,
        Frame::NoMoves => return last_mover_wins(last),
        Frame::Expand(moves) => moves,
    };

    let (alpha0, beta0) = (alpha, beta);
    let mut best = if player1 { -INFINITY } else { INFINITY };
    for i in 0..moves.len() {
        let mv = moves[i];
        let Some(child) = ctx.expand(id, ply + 1, &mv, alpha, beta) else {
            break;
        };
        ctx.searchable.make_move(&mv);
        let value = minimax(ctx, &mv, child, ply + 1, depth - 1, alpha, beta);
        ctx.searchable.undo_move(&mv);
        if ctx.aborted {
            break;
        }

        moves.as_mut_slice()[i].inherited_value = value;
        ctx.evaluated(child, value);

        if player1 {
            best = best.max(value);
            if ctx.options.alpha_beta {
                alpha = alpha.max(value);
            }
        } else {
            best = best.min(value);
            if ctx.options.alpha_beta {
                beta = beta.min(value);
            }
        }
        if ctx.options.alpha_beta && alpha >= beta {
            ctx.pruned(id, &moves.as_slice()[i + 1..]);
            break;
        }
    }

    ctx.store(player1, depth, best, BoundType::classify(best, alpha0, beta0));
    best
}
