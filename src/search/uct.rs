//! Monte Carlo tree search with upper confidence bounds (UCT).
//!
//! Each simulation walks down the tree picking the child with the highest
//! UCT value, adds one node, finishes the game with a semi-random playout
//! and credits the result to every node on the path. Playout moves are drawn
//! from the ranked move list with a seeded generator, so a search is
//! reproducible. The suspension point is checked once per simulation, so
//! `step()` releases exactly one simulation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{last_mover_wins, SearchContext};
use crate::search::tree::{NodeId, TreeNode};
use crate::searchable::Searchable;
use crate::types::{clamp_worth, Move, MoveList, INFINITY, WINNING_VALUE};

/// Selection priority of a child that has never been visited. Beats any
/// UCT value, so every child is tried once before any is tried twice.
const UNVISITED_PRIORITY: f64 = 1000.0;

/// Divisor applied to the visit count inside the exploration term.
const EXPLORATION_SCALE: f64 = 5.0;

/// Result for player 1: 1 for a win, 0 for a loss, 0.5 for a draw.
fn player1_share(value: i32) -> f64 {
    match value.signum() {
        1 => 1.0,
        -1 => 0.0,
        _ => 0.5,
    }
}

#[derive(Debug)]
struct UctNode {
    mv: Move,
    /// Assigned when the node is first visited
    id: Option<NodeId>,
    visits: u32,
    /// Results credited to the player who made `mv`
    wins: f64,
    expanded: bool,
    children: Vec<UctNode>,
}

impl UctNode {
    fn new(mv: Move) -> Self {
        UctNode {
            mv,
            id: None,
            visits: 0,
            wins: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / f64::from(self.visits)
        }
    }

    /// Observed win rate plus an exploration bonus that shrinks as the node
    /// is visited more often than its siblings.
    fn uct_value(&self, explore_exploit_ratio: f64, parent_visits: u32) -> f64 {
        if self.visits == 0 {
            return UNVISITED_PRIORITY;
        }
        let exploration = (f64::from(parent_visits).ln()
            / (EXPLORATION_SCALE * f64::from(self.visits)))
        .sqrt();
        self.win_rate() + explore_exploit_ratio * exploration
    }

    fn update(&mut self, player1_result: f64) {
        self.visits += 1;
        self.wins += if self.mv.player1 {
            player1_result
        } else {
            1.0 - player1_result
        };
    }

    /// Win rate mapped onto `[-WINNING_VALUE, WINNING_VALUE]`, player 1's view.
    fn worth(&self) -> i32 {
        let rate = self.win_rate();
        let player1_rate = if self.mv.player1 { rate } else { 1.0 - rate };
        ((2.0 * player1_rate - 1.0) * f64::from(WINNING_VALUE)).round() as i32
    }
}

fn nodes_for(moves: &MoveList) -> Vec<UctNode> {
    moves.iter().copied().map(UctNode::new).collect()
}

/// Child with the highest UCT value; the first one wins ties.
fn select(children: &[UctNode], parent_visits: u32, explore_exploit_ratio: f64) -> Option<usize> {
    let mut selected = None;
    let mut best = f64::NEG_INFINITY;
    for (i, child) in children.iter().enumerate() {
        let value = child.uct_value(explore_exploit_ratio, parent_visits);
        if value > best {
            best = value;
            selected = Some(i);
        }
    }
    selected
}

/// Visited child with the highest win rate for its mover; the first one
/// wins ties.
fn best_child(children: &[UctNode]) -> Option<usize> {
    let mut selected = None;
    let mut best = f64::NEG_INFINITY;
    for (i, child) in children.iter().enumerate() {
        if child.visits > 0 && child.win_rate() > best {
            best = child.win_rate();
            selected = Some(i);
        }
    }
    selected
}

/// State shared by all simulations of one search.
struct Simulator {
    rng: StdRng,
    explore_exploit_ratio: f64,
    random_look_ahead: usize,
    /// Deepest ply at which a node was added
    deepest: u32,
}

impl Simulator {
    /// Visit `node` (whose move is not yet on the board) and return the
    /// result of this simulation for player 1.
    fn descend<S: Searchable + ?Sized>(
        &mut self,
        ctx: &mut SearchContext<'_, '_, S>,
        node: &mut UctNode,
        parent: NodeId,
        ply: u32,
    ) -> f64 {
        let id = match node.id {
            Some(id) => id,
            None => {
                let id = ctx.record(parent, ply, &node.mv, -INFINITY, INFINITY);
                node.id = Some(id);
                self.deepest = self.deepest.max(ply);
                id
            }
        };

        let mv = node.mv;
        ctx.searchable.make_move(&mv);
        let result = if node.visits == 0 {
            self.playout(ctx, &mv)
        } else {
            if !node.expanded {
                node.expanded = true;
                if !ctx.searchable.done(Some(&mv), false) {
                    let moves = ctx.searchable.generate_moves(Some(&mv), ctx.weights);
                    node.children = nodes_for(&ctx.finder.rank(moves, !mv.player1));
                }
            }
            match select(&node.children, node.visits, self.explore_exploit_ratio) {
                Some(i) => self.descend(ctx, &mut node.children[i], id, ply + 1),
                None => Self::terminal_result(ctx, &mv),
            }
        };
        ctx.searchable.undo_move(&mv);

        node.update(result);
        ctx.evaluated(id, node.worth());
        result
    }

    /// Play random moves from the top of the ranked list until the game
    /// ends or the playout is long enough, then score the final position.
    /// The position is restored before returning.
    fn playout<S: Searchable + ?Sized>(
        &mut self,
        ctx: &mut SearchContext<'_, '_, S>,
        start: &Move,
    ) -> f64 {
        let mut played: Vec<Move> = Vec::new();
        let mut last = *start;
        let result = loop {
            if played.len() >= self.random_look_ahead || ctx.searchable.done(Some(&last), false) {
                break player1_share(clamp_worth(last.value));
            }
            let moves = ctx.searchable.generate_moves(Some(&last), ctx.weights);
            let moves = ctx.finder.rank(moves, !last.player1);
            if moves.is_empty() {
                break player1_share(last_mover_wins(&last));
            }
            let mv = moves[self.rng.gen_range(0..moves.len())];
            ctx.searchable.make_move(&mv);
            played.push(mv);
            last = mv;
        };
        for mv in played.iter().rev() {
            ctx.searchable.undo_move(mv);
        }
        result
    }

    /// Result at a node whose children list came out empty.
    fn terminal_result<S: Searchable + ?Sized>(
        ctx: &mut SearchContext<'_, '_, S>,
        last: &Move,
    ) -> f64 {
        if ctx.searchable.done(Some(last), false) {
            player1_share(clamp_worth(last.value))
        } else {
            player1_share(last_mover_wins(last))
        }
    }
}

/// Run the configured number of simulations below the root. Returns the
/// root children and the deepest ply reached.
fn grow<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    root_moves: &MoveList,
    last_move: Option<&Move>,
) -> (Vec<UctNode>, u32) {
    let settings = &ctx.options.monte_carlo;
    let max_simulations = settings.max_simulations;
    let mut sim = Simulator {
        rng: StdRng::seed_from_u64(settings.seed),
        explore_exploit_ratio: settings.explore_exploit_ratio,
        random_look_ahead: settings.random_look_ahead as usize,
        deepest: 0,
    };

    ctx.explored(TreeNode {
        id: NodeId::ROOT,
        parent: None,
        ply: 0,
        mv: last_move.copied(),
        alpha: -INFINITY,
        beta: INFINITY,
    });

    let mut children = nodes_for(root_moves);
    let mut root_visits = 0;
    for simulation in 0..max_simulations {
        if ctx.should_stop() {
            break;
        }
        let Some(i) = select(&children, root_visits, sim.explore_exploit_ratio) else {
            break;
        };
        sim.descend(ctx, &mut children[i], NodeId::ROOT, 1);
        root_visits += 1;

        let done = u64::from(simulation) + 1;
        ctx.handle
            .set_percent_done((done * 100 / u64::from(max_simulations)) as u8);
    }
    log::debug!(
        "{} simulations, {} nodes, deepest ply {}",
        root_visits,
        ctx.nodes,
        sim.deepest
    );
    (children, sim.deepest)
}

/// Pick a move by UCT. The chosen move carries its win rate as an
/// inherited value. `None` if no simulation finished.
pub(super) fn search<S: Searchable + ?Sized>(
    ctx: &mut SearchContext<'_, '_, S>,
    root_moves: &MoveList,
    last_move: Option<&Move>,
) -> (Option<Move>, u32) {
    let (children, deepest) = grow(ctx, root_moves, last_move);
    let best = best_child(&children).map(|i| {
        let mut mv = children[i].mv;
        mv.inherited_value = children[i].worth();
        mv
    });
    if let Some(mv) = best {
        ctx.evaluated(NodeId::ROOT, mv.inherited_value);
    }
    (best, deepest)
}
