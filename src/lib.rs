//! Generic search engine for two-player, zero-sum, perfect-information games.
//!
//! A game implements [`Searchable`]; the engine picks moves for it with
//! minimax-family search, alpha-beta pruning, transposition detection and
//! an optional quiescence extension. [`SearchController`] runs each search
//! on a worker thread that can be paused, stepped and cancelled.

pub mod engine;
pub mod error;
pub mod search;
pub mod searchable;
pub mod sync;
pub mod tictactoe;
pub mod tt;
pub mod types;
pub mod weights;
pub mod zobrist;

pub use engine::{MoveOutcome, PendingMove, SearchController};
pub use error::{ControllerError, OptionsError};
pub use search::move_order::BestMoveFinder;
pub use search::tree::{GameTreeRecorder, GameTreeSink, NodeId, TreeNode};
pub use search::{BestMovesOptions, SearchMethod, SearchOptions, SearchResult, SearchStrategy};
pub use searchable::Searchable;
pub use sync::{SearchHandle, SearchStatus};
pub use tt::TranspositionTable;
pub use types::{clamp_worth, Location, Move, MoveList, INFINITY, WINNING_VALUE};
pub use weights::{GameWeights, WeightVector};
pub use zobrist::ZobristHash;
