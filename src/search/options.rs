//! Search configuration.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Default look-ahead in plies
pub const DEFAULT_LOOK_AHEAD: u32 = 4;

/// Default transposition table size in MB
pub const DEFAULT_TT_MB: usize = 4;

/// Default quiescence extension limit in plies
pub const DEFAULT_MAX_QUIESCENT_DEPTH: u32 = 4;

/// Default number of UCT simulations per search
pub const DEFAULT_MAX_SIMULATIONS: u32 = 1000;

/// Default length cap for a UCT random playout, in plies
pub const DEFAULT_RANDOM_LOOK_AHEAD: u32 = 20;

/// Default playout seed; a fixed seed keeps UCT reproducible.
pub const DEFAULT_PLAYOUT_SEED: u64 = 0x5EED_C0FF_EE00_0001;

/// Controls how many generated moves survive ordering at each ply.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BestMovesOptions {
    /// Percentage (1-100) of the ranked moves to keep
    pub percentage_best_moves: u32,
    /// Never keep fewer than this many moves (unless fewer exist)
    pub min_best_moves: usize,
}

impl Default for BestMovesOptions {
    fn default() -> Self {
        BestMovesOptions {
            percentage_best_moves: 100,
            min_best_moves: 10,
        }
    }
}

/// Monte Carlo (UCT) settings. Ignored by the minimax-family methods.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonteCarloOptions {
    /// Simulations per search
    pub max_simulations: u32,
    /// Weight of the exploration term against the observed win rate
    pub explore_exploit_ratio: f64,
    /// Moves played in a random playout before it is scored statically
    pub random_look_ahead: u32,
    /// Seed for the playout move picker
    pub seed: u64,
}

impl Default for MonteCarloOptions {
    fn default() -> Self {
        MonteCarloOptions {
            max_simulations: DEFAULT_MAX_SIMULATIONS,
            explore_exploit_ratio: 1.0,
            random_look_ahead: DEFAULT_RANDOM_LOOK_AHEAD,
            seed: DEFAULT_PLAYOUT_SEED,
        }
    }
}

/// Configuration for one search. Immutable while the search runs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchOptions {
    /// Maximum depth in plies
    pub look_ahead: u32,
    /// First depth of iterative deepening (equal to `look_ahead` for a
    /// single fixed-depth pass)
    pub min_look_ahead: u32,
    /// Prune provably irrelevant siblings
    pub alpha_beta: bool,
    /// Extend the search past the horizon while the position is in jeopardy
    pub quiescence: bool,
    /// How far past the horizon the extension may go
    pub max_quiescent_depth: u32,
    /// Probe and store the transposition table
    pub use_transposition_table: bool,
    /// Transposition table size in MB
    pub tt_size_mb: usize,
    /// Forward-pruning options
    pub best_moves: BestMovesOptions,
    /// Node budget (0 = unlimited)
    pub max_nodes: u64,
    /// Wall-clock budget
    pub time_limit: Option<Duration>,
    /// UCT settings
    pub monte_carlo: MonteCarloOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            look_ahead: DEFAULT_LOOK_AHEAD,
            min_look_ahead: DEFAULT_LOOK_AHEAD,
            alpha_beta: true,
            quiescence: false,
            max_quiescent_depth: DEFAULT_MAX_QUIESCENT_DEPTH,
            use_transposition_table: true,
            tt_size_mb: DEFAULT_TT_MB,
            best_moves: BestMovesOptions::default(),
            max_nodes: 0,
            time_limit: None,
            monte_carlo: MonteCarloOptions::default(),
        }
    }
}

impl SearchOptions {
    /// Create a fixed-depth search config
    #[must_use]
    pub fn depth(look_ahead: u32) -> Self {
        SearchOptions {
            look_ahead,
            min_look_ahead: look_ahead,
            ..Default::default()
        }
    }

    /// Search depths `min..=max` by iterative deepening
    #[must_use]
    pub fn iterative(mut self, min_look_ahead: u32) -> Self {
        self.min_look_ahead = min_look_ahead;
        self
    }

    #[must_use]
    pub fn with_alpha_beta(mut self, alpha_beta: bool) -> Self {
        self.alpha_beta = alpha_beta;
        self
    }

    #[must_use]
    pub fn with_quiescence(mut self, max_quiescent_depth: u32) -> Self {
        self.quiescence = true;
        self.max_quiescent_depth = max_quiescent_depth;
        self
    }

    #[must_use]
    pub fn with_transposition_table(mut self, enabled: bool) -> Self {
        self.use_transposition_table = enabled;
        self
    }

    #[must_use]
    pub fn with_best_moves(mut self, percentage_best_moves: u32, min_best_moves: usize) -> Self {
        self.best_moves = BestMovesOptions {
            percentage_best_moves,
            min_best_moves,
        };
        self
    }

    /// Set node limit
    #[must_use]
    pub fn with_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// UCT simulation count and explore/exploit balance
    #[must_use]
    pub fn with_simulations(mut self, max_simulations: u32, explore_exploit_ratio: f64) -> Self {
        self.monte_carlo.max_simulations = max_simulations;
        self.monte_carlo.explore_exploit_ratio = explore_exploit_ratio;
        self
    }

    #[must_use]
    pub fn with_playouts(mut self, random_look_ahead: u32, seed: u64) -> Self {
        self.monte_carlo.random_look_ahead = random_look_ahead;
        self.monte_carlo.seed = seed;
        self
    }

    /// Check the options for values the search cannot work with.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.look_ahead == 0 {
            return Err(OptionsError::ZeroLookAhead);
        }
        if self.min_look_ahead > self.look_ahead {
            return Err(OptionsError::MinLookAheadTooLarge {
                min: self.min_look_ahead,
                max: self.look_ahead,
            });
        }
        let pct = self.best_moves.percentage_best_moves;
        if pct == 0 || pct > 100 {
            return Err(OptionsError::PercentageOutOfRange { found: pct });
        }
        if self.best_moves.min_best_moves == 0 {
            return Err(OptionsError::ZeroMinBestMoves);
        }
        if self.monte_carlo.max_simulations == 0 {
            return Err(OptionsError::ZeroSimulations);
        }
        let ratio = self.monte_carlo.explore_exploit_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(OptionsError::ExploreExploitRatioOutOfRange);
        }
        Ok(())
    }

    /// First depth to search; zero is treated as one.
    pub(crate) fn first_depth(&self) -> u32 {
        self.min_look_ahead.clamp(1, self.look_ahead.max(1))
    }
}
