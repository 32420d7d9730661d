//! Game tree search.
//!
//! Features:
//! - MiniMax, NegaMax and NegaScout (principal variation search)
//! - Alpha-beta pruning with fail-soft bounds
//! - Transposition table cutoffs at exact depth
//! - Quiescence extension over urgent moves past the horizon
//! - Iterative deepening from `min_look_ahead` to `look_ahead`
//! - Monte Carlo UCT with seeded semi-random playouts
//! - Cooperative pause, single-step and cancellation through [`SearchHandle`]

mod minimax;
pub mod move_order;
mod negamax;
pub mod options;
pub mod tree;
mod uct;

use std::fmt;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::searchable::Searchable;
use crate::sync::{SearchHandle, SearchStatus};
use crate::tt::{BoundType, TTEntry, TranspositionTable};
use crate::types::{clamp_worth, Move, MoveList, INFINITY, WINNING_VALUE};
use crate::weights::WeightVector;
use crate::zobrist::PLAYER2_TO_MOVE_KEY;

use move_order::BestMoveFinder;
pub use options::{BestMovesOptions, MonteCarloOptions, SearchOptions};
use tree::{GameTreeSink, NodeId, TreeNode};

/// Tree search algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchMethod {
    /// Alternating max and min frames, values from player 1's side
    MiniMax,
    /// Single maximizing frame, values from the side to move
    #[default]
    NegaMax,
    /// Principal variation search with null-window scouts
    NegaScout,
    /// Upper confidence bounds on trees, driven by random playouts
    Uct,
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMethod::MiniMax => "MiniMax",
            SearchMethod::NegaMax => "NegaMax",
            SearchMethod::NegaScout => "NegaScout",
            SearchMethod::Uct => "UCT",
        };
        f.write_str(name)
    }
}

/// Outcome of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// The move to play, or `None` if the game is over
    pub best_move: Option<Move>,
    /// Backed-up value of `best_move` from player 1's perspective
    pub value: i32,
    /// Nodes expanded by this search
    pub moves_considered: u64,
    /// Stopped early by cancellation or a budget
    pub interrupted: bool,
    /// Deepest fully completed iteration (0 if none completed). For UCT,
    /// the deepest ply the tree grew to.
    pub depth_reached: u32,
}

impl SearchResult {
    fn game_over() -> Self {
        SearchResult {
            best_move: None,
            value: 0,
            moves_considered: 0,
            interrupted: false,
            depth_reached: 0,
        }
    }
}

/// A configured search that can be run against any [`Searchable`].
pub struct SearchStrategy {
    method: SearchMethod,
    options: SearchOptions,
    finder: BestMoveFinder,
    handle: SearchHandle,
}

impl SearchStrategy {
    /// # Panics
    ///
    /// In debug builds, panics if `options` fail [`SearchOptions::validate`].
    #[must_use]
    pub fn new(method: SearchMethod, options: SearchOptions, handle: SearchHandle) -> Self {
        debug_assert!(
            options.validate().is_ok(),
            "invalid search options: {:?}",
            options.validate()
        );
        log::debug!(
            "using {} search (alpha-beta={}, quiescence={}, look-ahead={}..={})",
            method,
            options.alpha_beta,
            options.quiescence,
            options.first_depth(),
            options.look_ahead
        );
        SearchStrategy {
            method,
            finder: BestMoveFinder::new(options.best_moves.clone()),
            options,
            handle,
        }
    }

    #[must_use]
    pub fn method(&self) -> SearchMethod {
        self.method
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Control handle for pausing, stepping or cancelling from another thread.
    #[must_use]
    pub fn handle(&self) -> &SearchHandle {
        &self.handle
    }

    /// Find the best move for the side to move.
    ///
    /// `last_move` is the move that produced the current position, if any.
    /// The position is mutated during the search and restored before
    /// returning. The transposition table is cleared first; UCT leaves it alone.
    pub fn search<S: Searchable + ?Sized>(
        &self,
        searchable: &mut S,
        tt: &mut TranspositionTable,
        weights: &WeightVector,
        last_move: Option<&Move>,
        player1_to_move: bool,
        sink: Option<&mut (dyn GameTreeSink + '_)>,
    ) -> SearchResult {
        self.handle.set_status(SearchStatus::Running);
        self.handle.set_percent_done(0);

        let result = self.run(searchable, tt, weights, last_move, player1_to_move, sink);

        self.handle.set_percent_done(100);
        self.handle.set_status(if result.interrupted {
            SearchStatus::Cancelled
        } else {
            SearchStatus::Completed
        });
        result
    }

    fn run<S: Searchable + ?Sized>(
        &self,
        searchable: &mut S,
        tt: &mut TranspositionTable,
        weights: &WeightVector,
        last_move: Option<&Move>,
        player1_to_move: bool,
        sink: Option<&mut (dyn GameTreeSink + '_)>,
    ) -> SearchResult {
        if searchable.done(last_move, false) {
            return SearchResult::game_over();
        }
        let root_moves = self
            .finder
            .rank(searchable.generate_moves(last_move, weights), player1_to_move);
        if root_moves.is_empty() {
            return SearchResult::game_over();
        }
        if self.options.use_transposition_table && self.method != SearchMethod::Uct {
            tt.clear();
        }

        let mut ctx = SearchContext {
            searchable,
            tt,
            weights,
            options: &self.options,
            finder: &self.finder,
            handle: &self.handle,
            sink,
            start: Instant::now(),
            nodes: 0,
            aborted: false,
        };

        if self.method == SearchMethod::Uct {
            let (best, depth_reached) = uct::search(&mut ctx, &root_moves, last_move);
            return finish(&ctx, &root_moves, best, depth_reached);
        }

        let first = self.options.first_depth();
        let last = self.options.look_ahead.max(first);
        let iterations = (last - first + 1) as usize;

        let mut best: Option<Move> = None;
        let mut depth_reached = 0;
        for (iteration, depth) in (first..=last).enumerate() {
            let pass = RootPass {
                moves: &root_moves,
                last_move,
                player1_to_move,
                depth: depth as i32,
                progress: (iteration, iterations),
            };
            let (pass_best, completed) = self.search_root(&mut ctx, &pass);
            if completed {
                best = pass_best;
                depth_reached = depth;
                log::debug!(
                    "depth {} complete: {} nodes, value {}",
                    depth,
                    ctx.nodes,
                    best.map_or(0, |m| m.inherited_value)
                );
            } else {
                if best.is_none() {
                    best = pass_best;
                }
                break;
            }
        }

        finish(&ctx, &root_moves, best, depth_reached)
    }

    /// One full pass over the root moves. Returns the best fully evaluated
    /// move and whether every root move was searched.
    fn search_root<S: Searchable + ?Sized>(
        &self,
        ctx: &mut SearchContext<'_, '_, S>,
        pass: &RootPass<'_>,
    ) -> (Option<Move>, bool) {
        let sign = if pass.player1_to_move { 1 } else { -1 };
        let mut alpha = -INFINITY;
        let beta = INFINITY;

        ctx.explored(TreeNode {
            id: NodeId::ROOT,
            parent: None,
            ply: 0,
            mv: pass.last_move.copied(),
            alpha,
            beta,
        });

        let total = pass.moves.len();
        let mut best: Option<Move> = None;
        let mut best_score = -INFINITY;
        for (i, &mv) in pass.moves.iter().enumerate() {
            let Some(child) = ctx.expand(NodeId::ROOT, 1, &mv, alpha, beta) else {
                break;
            };
            ctx.searchable.make_move(&mv);
            let score = self.search_child(ctx, &mv, child, pass.depth - 1, alpha, beta, i == 0, sign);
            ctx.searchable.undo_move(&mv);
            if ctx.aborted {
                break;
            }

            let mut searched = mv;
            searched.inherited_value = sign * score;
            ctx.evaluated(child, searched.inherited_value);

            if score > best_score {
                best_score = score;
                best = Some(searched);
            }
            if self.options.alpha_beta {
                alpha = alpha.max(score);
            }

            let (iteration, iterations) = pass.progress;
            let units = iteration * total + i + 1;
            ctx.handle
                .set_percent_done((units * 100 / (iterations * total)) as u8);
        }
        if let Some(mv) = best {
            ctx.evaluated(NodeId::ROOT, mv.inherited_value);
        }
        (best, !ctx.aborted)
    }

    /// Value of a root child from the root mover's perspective.
    #[allow(clippy::too_many_arguments)]
    fn search_child<S: Searchable + ?Sized>(
        &self,
        ctx: &mut SearchContext<'_, '_, S>,
        mv: &Move,
        id: NodeId,
        depth: i32,
        alpha: i32,
        beta: i32,
        first: bool,
        sign: i32,
    ) -> i32 {
        match self.method {
            SearchMethod::MiniMax => {
                // Translate the mover's window into player 1's frame
                let (lo, hi) = if sign > 0 { (alpha, beta) } else { (-beta, -alpha) };
                sign * minimax::minimax(ctx, mv, id, 1, depth, lo, hi)
            }
            SearchMethod::NegaMax => -negamax::negamax(ctx, mv, id, 1, depth, -beta, -alpha),
            SearchMethod::NegaScout => {
                if first || !self.options.alpha_beta {
                    -negamax::negascout(ctx, mv, id, 1, depth, -beta, -alpha)
                } else {
                    let scout = -negamax::negascout(ctx, mv, id, 1, depth, -alpha - 1, -alpha);
                    if !ctx.aborted && scout > alpha && scout < beta {
                        -negamax::negascout(ctx, mv, id, 1, depth, -beta, -alpha)
                    } else {
                        scout
                    }
                }
            }
            SearchMethod::Uct => unreachable!("UCT does not use the minimax root loop"),
        }
    }
}

/// Package the chosen root move. Interrupted before any root move finished:
/// fall back to the first ranked move at its static value.
fn finish<S: Searchable + ?Sized>(
    ctx: &SearchContext<'_, '_, S>,
    root_moves: &MoveList,
    best: Option<Move>,
    depth_reached: u32,
) -> SearchResult {
    let mut chosen = best.unwrap_or_else(|| {
        let mut mv = root_moves[0];
        mv.set_value(clamp_worth(mv.value));
        mv
    });
    chosen.selected = true;

    SearchResult {
        best_move: Some(chosen),
        value: chosen.inherited_value,
        moves_considered: ctx.nodes,
        interrupted: ctx.aborted,
        depth_reached,
    }
}

struct RootPass<'m> {
    moves: &'m MoveList,
    last_move: Option<&'m Move>,
    player1_to_move: bool,
    depth: i32,
    /// (iteration index, iteration count) for percent-done reporting
    progress: (usize, usize),
}

/// What a frame should do after the terminal and horizon checks.
pub(crate) enum Frame {
    /// Static value from player 1's perspective
    Leaf(i32),
    /// Side to move has no legal moves; the last mover wins
    NoMoves,
    Expand(MoveList),
}

/// Mutable state threaded through the recursion of a single search.
pub(crate) struct SearchContext<'a, 'k, S: ?Sized> {
    pub(crate) searchable: &'a mut S,
    tt: &'a mut TranspositionTable,
    weights: &'a WeightVector,
    pub(crate) options: &'a SearchOptions,
    finder: &'a BestMoveFinder,
    handle: &'a SearchHandle,
    sink: Option<&'a mut (dyn GameTreeSink + 'k)>,
    start: Instant,
    nodes: u64,
    pub(crate) aborted: bool,
}

impl<S: Searchable + ?Sized> SearchContext<'_, '_, S> {
    /// The single suspension point: wait out a pause, then check the
    /// cancel flag and budgets. Returns true once the search must unwind.
    fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        self.handle.wait_if_paused();

        let over_nodes = self.options.max_nodes > 0 && self.nodes >= self.options.max_nodes;
        let over_time = self
            .options
            .time_limit
            .is_some_and(|limit| self.start.elapsed() >= limit);
        if self.handle.is_cancelled() || over_nodes || over_time {
            if self.handle.is_cancelled() {
                log::warn!("search cancelled after {} nodes", self.nodes);
            } else {
                log::debug!("search budget exhausted after {} nodes", self.nodes);
            }
            self.aborted = true;
        }
        self.aborted
    }

    /// Account for expanding `mv` under `parent`. Returns `None` if the
    /// search has to stop instead.
    pub(crate) fn expand(
        &mut self,
        parent: NodeId,
        ply: u32,
        mv: &Move,
        alpha: i32,
        beta: i32,
    ) -> Option<NodeId> {
        if self.should_stop() {
            return None;
        }
        Some(self.record(parent, ply, mv, alpha, beta))
    }

    /// Count a node and report it to the sink, without a suspension point.
    fn record(&mut self, parent: NodeId, ply: u32, mv: &Move, alpha: i32, beta: i32) -> NodeId {
        self.nodes += 1;
        self.handle.record_node();
        let id = NodeId(self.nodes);
        if self.sink.is_some() {
            self.explored(TreeNode {
                id,
                parent: Some(parent),
                ply,
                mv: Some(*mv),
                alpha,
                beta,
            });
        }
        id
    }

    fn explored(&mut self, node: TreeNode) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_node_explored(&node);
        }
    }

    pub(crate) fn evaluated(&mut self, id: NodeId, inherited_value: i32) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_node_evaluated(id, inherited_value);
        }
    }

    pub(crate) fn pruned(&mut self, parent: NodeId, rest: &[Move]) {
        if rest.is_empty() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.on_siblings_pruned(parent, rest);
        }
    }

    /// Terminal, horizon and quiescence checks, then move generation.
    pub(crate) fn frame(&mut self, last: &Move, depth: i32) -> Frame {
        let leaf = clamp_worth(last.value);
        if depth <= 0 && !self.options.quiescence {
            return Frame::Leaf(leaf);
        }
        if self.searchable.done(Some(last), false) {
            return Frame::Leaf(leaf);
        }

        let player1 = !last.player1;
        if depth <= 0 {
            let in_range = depth > -(self.options.max_quiescent_depth as i32);
            if !in_range || !self.searchable.in_jeopardy(last, self.weights) {
                return Frame::Leaf(leaf);
            }
            let urgent = self.searchable.generate_urgent_moves(Some(last), self.weights);
            let mut urgent = self.finder.rank_urgent(urgent, player1);
            if urgent.is_empty() {
                return Frame::Leaf(leaf);
            }
            urgent.mark_urgent();
            return Frame::Expand(urgent);
        }

        let moves = self.searchable.generate_moves(Some(last), self.weights);
        let moves = self.finder.rank(moves, player1);
        if moves.is_empty() {
            Frame::NoMoves
        } else {
            Frame::Expand(moves)
        }
    }

    fn table_key(&self, player1_to_move: bool) -> u64 {
        let key = self.searchable.hash_key();
        if player1_to_move {
            key
        } else {
            key ^ PLAYER2_TO_MOVE_KEY
        }
    }

    /// Cached entry for the current position, scores from player 1's side.
    pub(crate) fn probe(&mut self, player1_to_move: bool, depth: i32) -> Option<TTEntry> {
        if !self.options.use_transposition_table || depth <= 0 {
            return None;
        }
        let key = self.table_key(player1_to_move);
        self.tt.probe(key, depth)
    }

    /// Cache a completed result. `score` and `bound` are from player 1's side.
    pub(crate) fn store(&mut self, player1_to_move: bool, depth: i32, score: i32, bound: BoundType) {
        if !self.options.use_transposition_table || depth <= 0 || self.aborted {
            return;
        }
        let key = self.table_key(player1_to_move);
        self.tt.store(key, depth, score, bound);
    }
}

/// Value when the side to move is stuck, from player 1's perspective.
pub(crate) fn last_mover_wins(last: &Move) -> i32 {
    if last.player1 {
        WINNING_VALUE
    } else {
        -WINNING_VALUE
    }
}

/// Re-express a player-1 entry from the side to move's perspective.
pub(crate) fn oriented(entry: TTEntry, player1_to_move: bool) -> TTEntry {
    if player1_to_move {
        entry
    } else {
        TTEntry {
            score: -entry.score,
            bound_type: entry.bound_type.flip(),
            ..entry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::TicTacToe;
    use super::tree::GameTreeRecorder;

    fn run(method: SearchMethod, options: SearchOptions, game: &mut TicTacToe) -> SearchResult {
        let strategy = SearchStrategy::new(method, options, SearchHandle::new());
        let mut tt = TranspositionTable::new(1);
        let weights = TicTacToe::default_weights();
        strategy.search(game, &mut tt, &weights, None, true, None)
    }

    #[test]
    fn empty_board_yields_a_move() {
        let mut game = TicTacToe::new();
        let result = run(SearchMethod::NegaMax, SearchOptions::depth(2), &mut game);
        let mv = result.best_move.expect("a move on an empty board");
        assert!(mv.player1);
        assert!(mv.selected);
        assert!(!result.interrupted);
        assert_eq!(result.depth_reached, 2);
        assert_eq!(game.num_moves(), 0, "search must restore the position");
    }

    #[test]
    fn finished_game_has_no_move() {
        let mut game = TicTacToe::from_cells("XXX/OO./...");
        let result = run(SearchMethod::MiniMax, SearchOptions::depth(3), &mut game);
        assert_eq!(result.best_move, None);
        assert_eq!(result.moves_considered, 0);
    }

    #[test]
    fn takes_the_immediate_win() {
        // X to move can complete the top row
        let mut game = TicTacToe::from_cells("XX./OO./...");
        for method in [SearchMethod::MiniMax, SearchMethod::NegaMax, SearchMethod::NegaScout] {
            let result = run(method, SearchOptions::depth(3), &mut game);
            let mv = result.best_move.expect("winning move");
            assert_eq!((mv.to.row, mv.to.col), (0, 2), "{method}");
            assert!(result.value >= WINNING_VALUE, "{method}: {}", result.value);
        }
    }

    #[test]
    fn node_budget_interrupts() {
        let mut game = TicTacToe::new();
        let result = run(
            SearchMethod::NegaMax,
            SearchOptions::depth(5).with_nodes(3),
            &mut game,
        );
        assert!(result.interrupted);
        assert_eq!(result.moves_considered, 3);
        assert!(result.best_move.is_some());
        assert_eq!(game.num_moves(), 0);
    }

    #[test]
    fn recorder_sees_root_and_children() {
        let mut game = TicTacToe::new();
        let strategy = SearchStrategy::new(
            SearchMethod::NegaMax,
            SearchOptions::depth(1),
            SearchHandle::new(),
        );
        let mut tt = TranspositionTable::new(1);
        let mut recorder = GameTreeRecorder::new();
        let weights = TicTacToe::default_weights();
        let result = strategy.search(&mut game, &mut tt, &weights, None, true, Some(&mut recorder));

        assert_eq!(recorder.len(), 10);
        assert_eq!(recorder.children(NodeId::ROOT).count(), 9);
        let root = recorder.root().expect("root recorded");
        assert_eq!(root.inherited_value, Some(result.value));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid search options")]
    fn invalid_options_are_caught_at_construction() {
        let options = SearchOptions::depth(2).with_best_moves(0, 0);
        let _ = SearchStrategy::new(SearchMethod::NegaMax, options, SearchHandle::new());
    }

    #[test]
    fn oriented_flips_player2_bounds() {
        let entry = TTEntry {
            key: 9,
            depth: 2,
            score: 30,
            bound_type: BoundType::LowerBound,
        };
        let seen = oriented(entry, false);
        assert_eq!(seen.score, -30);
        assert_eq!(seen.bound_type, BoundType::UpperBound);
        assert_eq!(oriented(entry, true), entry);
    }
}
