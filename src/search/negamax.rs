//! NegaMax and NegaScout.
//!
//! Both return values from the perspective of the side to move, which is
//! the opponent of whoever played `last`. Moves and the transposition table
//! stay in player 1's terms, so values are re-signed on the way in and out.

use super::{last_mover_wins, oriented, Frame, SearchContext};
use crate::search::tree::NodeId;
use crate::searchable::Searchable;
use crate::tt::BoundType;
use crate::types::{Move, MoveList, INFINITY};

#[inline]
fn side_sign(player1_to_move: bool) -> i32 {
    if player1_to_move {
        1
    } else {
        -1
    }
}

/// Shared prologue: table cutoff, terminal and horizon handling.
/// `Err` carries a finished value from the side to move's perspective.
fn prepare<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    last: &Move,
    depth: i32,
    alpha: i32,
    beta: i32,
) -> Result<MoveList, i32> {
    let player1 = !last.player1;
    let sign = side_sign(player1);

    if let Some(entry) = ctx.probe(player1, depth) {
        if let Some(score) = oriented(entry, player1).cutoff(alpha, beta) {
            return Err(score);
        }
    }

    match ctx.frame(last, depth) {
        Frame::Leaf(value) => Err(sign * value),
        Frame::NoMoves => Err(sign * last_mover_wins(last)),
        Frame::Expand(moves) => Ok(moves),
    }
}

/// Cache `best`, searched with `(alpha0, beta0)`, in player 1's terms.
fn store_result<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    player1: bool,
    depth: i32,
    best: i32,
    alpha0: i32,
    beta0: i32,
) {
    let bound = BoundType::classify(best, alpha0, beta0);
    let bound = if player1 { bound } else { bound.flip() };
    ctx.store(player1, depth, side_sign(player1) * best, bound);
}

pub(super) fn negamax<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    last: &Move,
    id: NodeId,
    ply: u32,
    depth: i32,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    let mut moves = match prepare(ctx, last, depth, alpha, beta) {
        Ok(moves) => moves,
        Err(value) => return value,
    };
    let player1 = !last.player1;
    let sign = side_sign(player1);

    let alpha0 = alpha;
    let mut best = -INFINITY;
    for i in 0..moves.len() {
        let mv = moves[i];
        let Some(child) = ctx.expand(id, ply + 1, &mv, alpha, beta) else {
            break;
        };
        ctx.searchable.make_move(&mv);
        let value = -negamax(ctx, &mv, child, ply + 1, depth - 1, -beta, -alpha);
        ctx.searchable.undo_move(&mv);
        if ctx.aborted {
            break;
        }

        moves.as_mut_slice()[i].inherited_value = sign * value;
        ctx.evaluated(child, sign * value);

        best = best.max(value);
        if ctx.options.alpha_beta {
            alpha = alpha.max(value);
            if alpha >= beta {
                ctx.pruned(id, &moves.as_slice()[i + 1..]);
                break;
            }
        }
    }

    store_result(ctx, player1, depth, best, alpha0, beta);
    best
}

/// Principal variation search. The first child gets the full window; the
/// rest are scouted with a null window and re-searched only if the scout
/// lands strictly inside `(alpha, beta)`.
pub(super) fn negascout<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    last: &Move,
    id: NodeId,
    ply: u32,
    depth: i32,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    if !ctx.options.alpha_beta {
        return negamax(ctx, last, id, ply, depth, alpha, beta);
    }
    let mut moves = match prepare(ctx, last, depth, alpha, beta) {
        Ok(moves) => moves,
        Err(value) => return value,
    };
    let player1 = !last.player1;
    let sign = side_sign(player1);

    let alpha0 = alpha;
    let mut best = -INFINITY;
    for i in 0..moves.len() {
        let mv = moves[i];
        let Some(child) = ctx.expand(id, ply + 1, &mv, alpha, beta) else {
            break;
        };
        ctx.searchable.make_move(&mv);
        let value = if i == 0 {
            -negascout(ctx, &mv, child, ply + 1, depth - 1, -beta, -alpha)
        } else {
            let scout = -negascout(ctx, &mv, child, ply + 1, depth - 1, -alpha - 1, -alpha);
            if !ctx.aborted && scout > alpha && scout < beta {
                -negascout(ctx, &mv, child, ply + 1, depth - 1, -beta, -alpha)
            } else {
                scout
            }
        };
        ctx.searchable.undo_move(&mv);
        if ctx.aborted {
            break;
        }

        moves.as_mut_slice()[i].inherited_value = sign * value;
        ctx.evaluated(child, sign * value);

        best = best.max(value);
        alpha = alpha.max(value);
        if alpha >= beta {
            ctx.pruned(id, &moves.as_slice()[i + 1..]);
            break;
        }
    }

    store_result(ctx, player1, depth, best, alpha0, beta);
    best
}
