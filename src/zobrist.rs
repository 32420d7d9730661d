//! Zobrist hashing for game positions.
//!
//! Provides an incrementally-updatable 64-bit fingerprint for the
//! transposition table. Each (location, state) pair owns a random key and
//! the fingerprint is the XOR of the keys for the current board.

use rand::prelude::*;

/// Fixed seed so fingerprints are reproducible across runs.
const ZOBRIST_SEED: u64 = 1234567890_u64;

/// State index 0 denotes an empty location and contributes nothing to the
/// fingerprint, so an empty board hashes to zero.
pub const EMPTY_STATE: usize = 0;

/// Key mixed into the fingerprint when player 2 is to move.
pub(crate) const PLAYER2_TO_MOVE_KEY: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Debug)]
pub struct ZobristHash {
    // keys[location * num_states + state]
    keys: Vec<u64>,
    num_states: usize,
    pass_key: u64,
    current: u64,
}

impl ZobristHash {
    /// Create keys for a board with `num_locations` locations, each of which
    /// can be in one of `num_states` states (including empty).
    #[must_use]
    pub fn new(num_locations: usize, num_states: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut keys = vec![0u64; num_locations * num_states];
        for location in 0..num_locations {
            for state in 1..num_states {
                keys[location * num_states + state] = rng.gen();
            }
        }
        let pass_key = rng.gen();

        ZobristHash {
            keys,
            num_states,
            pass_key,
            current: 0,
        }
    }

    #[inline]
    fn key_for(&self, location: usize, state: usize) -> u64 {
        debug_assert!(state < self.num_states, "state {state} out of range");
        self.keys[location * self.num_states + state]
    }

    /// Current fingerprint.
    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        self.current
    }

    /// Toggle `state` at `location`. Applying the same call twice restores
    /// the previous fingerprint.
    #[inline]
    pub fn apply_move(&mut self, location: usize, state: usize) {
        self.current ^= self.key_for(location, state);
    }

    /// XOR out `old_state` and XOR in `new_state` at `location`.
    #[inline]
    pub fn replace(&mut self, location: usize, old_state: usize, new_state: usize) {
        self.current ^= self.key_for(location, old_state) ^ self.key_for(location, new_state);
    }

    /// Toggle the pass key.
    #[inline]
    pub fn apply_passing_move(&mut self) {
        self.current ^= self.pass_key;
    }

    /// Back to the empty-board fingerprint.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Fingerprint of a full board computed from scratch, where `states[i]`
    /// is the state at location `i`.
    #[must_use]
    pub fn compute(&self, states: &[usize]) -> u64 {
        states
            .iter()
            .enumerate()
            .fold(0, |acc, (location, &state)| acc ^ self.key_for(location, state))
    }
}
