//! Engine layer: move requests on a worker thread and win estimates.
//!
//! The controller owns the game, both players' weights and the search
//! configuration. It hands one search at a time to a background thread and
//! reports the played move through a channel and an optional callback.

mod controller;
pub mod estimator;

pub use controller::{
    CompletionCallback, GameState, MoveOutcome, PendingMove, SearchController, SearchJob,
    SharedTreeSink,
};
pub use estimator::{estimate, MIN_MOVES_FOR_ESTIMATE};
