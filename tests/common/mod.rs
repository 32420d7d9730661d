//! Shared fixtures for integration tests.

#![allow(dead_code)]

use game_search::zobrist::ZobristHash;
use game_search::{Location, Move, MoveList, Searchable, WeightVector};

/// Synthetic game with a fixed branching factor and pseudo-random static
/// values derived from the position fingerprint.
///
/// Moves are `(ply, choice)` pairs, so every line of play reaches a distinct
/// position. With dead ends enabled, some positions leave the side to move
/// without a legal move.
#[derive(Clone, Debug)]
pub struct RandomTreeGame {
    branching: usize,
    max_plies: usize,
    dead_ends: bool,
    hash: ZobristHash,
    path: Vec<Move>,
}

fn mix(mut x: u64) -> u64 {
    // splitmix64 finalizer
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

impl RandomTreeGame {
    pub fn new(branching: usize, max_plies: usize) -> Self {
        RandomTreeGame {
            branching,
            max_plies,
            dead_ends: false,
            hash: ZobristHash::new(branching * max_plies, 3),
            path: Vec::new(),
        }
    }

    pub fn with_dead_ends(mut self) -> Self {
        self.dead_ends = true;
        self
    }

    pub fn player1_to_move(&self) -> bool {
        self.path.len() % 2 == 0
    }

    /// Recompute the fingerprint from the moves played.
    pub fn full_hash(&self) -> u64 {
        let mut states = vec![0; self.branching * self.max_plies];
        for mv in &self.path {
            states[self.location(mv)] = Self::state(mv.player1);
        }
        self.hash.compute(&states)
    }

    fn location(&self, mv: &Move) -> usize {
        mv.to.row as usize * self.branching + mv.to.col as usize
    }

    fn state(player1: bool) -> usize {
        if player1 {
            1
        } else {
            2
        }
    }

    fn is_dead_end(&self) -> bool {
        self.dead_ends && !self.path.is_empty() && self.hash.key() % 11 == 0
    }
}

impl Searchable for RandomTreeGame {
    fn generate_moves(&self, _last_move: Option<&Move>, weights: &WeightVector) -> MoveList {
        if self.path.len() >= self.max_plies || self.is_dead_end() {
            return MoveList::new();
        }
        let ply = self.path.len() as u8;
        let player1 = self.player1_to_move();
        (0..self.branching)
            .map(|choice| {
                let mut mv = Move::new(Location::new(ply, choice as u8), player1, 1, 0);
                mv.set_value(self.worth(&mv, weights));
                mv
            })
            .collect()
    }

    /// Moves with an extreme static value.
    fn generate_urgent_moves(&self, last_move: Option<&Move>, weights: &WeightVector) -> MoveList {
        self.generate_moves(last_move, weights)
            .into_iter()
            .filter(|m| m.value.abs() > 400)
            .collect()
    }

    fn make_move(&mut self, mv: &Move) {
        assert_eq!(mv.to.row as usize, self.path.len(), "move for the wrong ply");
        let location = self.location(mv);
        self.hash.apply_move(location, Self::state(mv.player1));
        self.path.push(*mv);
    }

    fn undo_move(&mut self, mv: &Move) {
        let last = self.path.pop().expect("undo with an empty path");
        assert_eq!(last.to, mv.to, "undo out of order");
        let location = self.location(mv);
        self.hash.apply_move(location, Self::state(mv.player1));
    }

    fn worth(&self, mv: &Move, _weights: &WeightVector) -> i32 {
        let mut after = self.hash.clone();
        after.apply_move(self.location(mv), Self::state(mv.player1));
        (mix(after.key()) % 1001) as i32 - 500
    }

    fn done(&mut self, _last_move: Option<&Move>, _record_result: bool) -> bool {
        self.path.len() >= self.max_plies
    }

    fn hash_key(&self) -> u64 {
        self.hash.key()
    }

    fn num_moves(&self) -> usize {
        self.path.len()
    }

    fn reset(&mut self) {
        self.path.clear();
        self.hash.reset();
    }
}
