//! Search controller: runs one computer move at a time on a worker thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::engine::estimator;
use crate::error::ControllerError;
use crate::search::tree::GameTreeSink;
use crate::search::{SearchMethod, SearchOptions, SearchStrategy};
use crate::searchable::Searchable;
use crate::sync::SearchHandle;
use crate::tt::TranspositionTable;
use crate::types::Move;
use crate::weights::GameWeights;

/// Search thread stack size (32 MB)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Called on the worker thread after every computer move.
pub type CompletionCallback = Arc<dyn Fn(&MoveOutcome) + Send + Sync>;

/// Shared tree observer attached to every search.
pub type SharedTreeSink = Arc<Mutex<dyn GameTreeSink>>;

/// Result of one computer move request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    /// The move that was played, `None` if no move was possible
    pub chosen: Option<Move>,
    /// The game is over after this request
    pub game_over: bool,
    /// The search was cut short; `chosen` is the best found so far
    pub interrupted: bool,
    pub moves_considered: u64,
    pub elapsed: Duration,
}

/// Everything the worker needs exclusive access to while it searches.
pub struct GameState<S> {
    pub searchable: S,
    pub history: Vec<Move>,
    pub player1_to_move: bool,
    tt: TranspositionTable,
}

impl<S: Searchable> GameState<S> {
    fn new(searchable: S, tt_size_mb: usize) -> Self {
        GameState {
            searchable,
            history: Vec::new(),
            player1_to_move: true,
            tt: TranspositionTable::new(tt_size_mb),
        }
    }

    fn record(&mut self, mv: Move) -> Move {
        let mv = mv.with_number(self.history.len() as u32 + 1);
        self.searchable.make_move(&mv);
        self.history.push(mv);
        self.player1_to_move = !mv.player1;
        mv
    }
}

/// Active search job
pub struct SearchJob {
    handle: SearchHandle,
    /// Set once the move has been played and reported
    finished: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl SearchJob {
    /// Cancel the search and wait for the worker to finish. The worker still
    /// plays the best move it found.
    pub fn stop_and_wait(self) {
        self.handle.cancel();
        self.handle.resume();
        if self.worker.join().is_err() {
            log::warn!("search worker panicked");
        }
    }

    /// True once the outcome has been delivered, or the worker has died.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire) || self.worker.is_finished()
    }
}

/// A computer move in flight.
pub struct PendingMove {
    handle: SearchHandle,
    receiver: Receiver<MoveOutcome>,
}

impl PendingMove {
    /// Block until the move has been played. Returns `None` only if the
    /// worker died without reporting.
    pub fn wait(self) -> Option<MoveOutcome> {
        self.receiver.recv().ok()
    }

    /// The outcome if the move has already been played.
    pub fn try_outcome(&self) -> Option<MoveOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Pause, step, resume or cancel this search.
    #[must_use]
    pub fn handle(&self) -> &SearchHandle {
        &self.handle
    }
}

/// Owns a game and plays computer moves for either side.
pub struct SearchController<S: Searchable + 'static> {
    state: Arc<Mutex<GameState<S>>>,
    weights: GameWeights,
    options: SearchOptions,
    method: SearchMethod,
    current_job: Option<SearchJob>,
    /// Handle of the most recent search, for progress queries
    last_search: SearchHandle,
    tree_sink: Option<SharedTreeSink>,
    on_complete: Option<CompletionCallback>,
}

impl<S: Searchable + 'static> SearchController<S> {
    #[must_use]
    pub fn new(searchable: S, weights: GameWeights, options: SearchOptions) -> Self {
        let tt_size_mb = options.tt_size_mb;
        SearchController {
            state: Arc::new(Mutex::new(GameState::new(searchable, tt_size_mb))),
            weights,
            options,
            method: SearchMethod::default(),
            current_job: None,
            last_search: SearchHandle::new(),
            tree_sink: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    /// Ask the computer to move for `player1` (player 2 when false).
    ///
    /// With `synchronous` the call returns only after the move has been
    /// played. Otherwise the search runs in the background; the returned
    /// [`PendingMove`] delivers the outcome and controls the search.
    ///
    /// # Panics
    ///
    /// Panics if it is not `player1`'s turn.
    pub fn request_move(
        &mut self,
        player1: bool,
        synchronous: bool,
    ) -> Result<PendingMove, ControllerError> {
        self.reap_finished();
        if self.current_job.is_some() {
            return Err(ControllerError::SearchInProgress);
        }
        self.options.validate()?;
        assert_eq!(
            player1,
            self.state.lock().player1_to_move,
            "computer asked to move out of turn"
        );

        let handle = SearchHandle::new();
        let strategy = SearchStrategy::new(self.method, self.options.clone(), handle.clone());
        let weights = self.weights.for_player(player1).clone();
        let state = Arc::clone(&self.state);
        let sink = self.tree_sink.clone();
        let callback = self.on_complete.clone();
        let finished = Arc::new(AtomicBool::new(false));
        let finished_flag = Arc::clone(&finished);
        let (sender, receiver) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let started = Instant::now();
                let mut sink = sink;
                let mut guard = state.lock();
                let game = &mut *guard;

                let last = game.history.last().copied();
                let result = strategy.search(
                    &mut game.searchable,
                    &mut game.tt,
                    &weights,
                    last.as_ref(),
                    player1,
                    sink.as_mut().map(|s| s as &mut dyn GameTreeSink),
                );

                let (chosen, game_over) = match result.best_move {
                    Some(mv) => {
                        let mv = game.record(mv);
                        let over = game.searchable.done(Some(&mv), true);
                        (Some(mv), over)
                    }
                    None => {
                        game.searchable.done(last.as_ref(), true);
                        (None, true)
                    }
                };
                let (hits, misses) = game.tt.stats();
                let hashfull = game.tt.hashfull_per_mille();
                drop(guard);

                let elapsed = started.elapsed();
                log::info!(
                    "moves considered: {} in {:.3}s ({:.0} moves/s), table: {} hits, {} misses, {}/1000 full{}",
                    result.moves_considered,
                    elapsed.as_secs_f64(),
                    result.moves_considered as f64 / elapsed.as_secs_f64().max(1e-9),
                    hits,
                    misses,
                    hashfull,
                    if result.interrupted { ", interrupted" } else { "" }
                );

                let outcome = MoveOutcome {
                    chosen,
                    game_over,
                    interrupted: result.interrupted,
                    moves_considered: result.moves_considered,
                    elapsed,
                };
                if let Some(callback) = callback {
                    callback(&outcome);
                }
                finished_flag.store(true, Ordering::Release);
                // The receiver may already be gone; the move stands regardless
                let _ = sender.send(outcome);
            })
            .map_err(|err| ControllerError::WorkerSpawn {
                reason: err.to_string(),
            })?;

        self.last_search = handle.clone();
        let job = SearchJob {
            handle: handle.clone(),
            finished,
            worker,
        };
        if synchronous {
            if job.worker.join().is_err() {
                log::warn!("search worker panicked");
            }
        } else {
            self.current_job = Some(job);
        }

        Ok(PendingMove { handle, receiver })
    }

    /// Join the previous worker if it is done, freeing the slot.
    fn reap_finished(&mut self) {
        if self.current_job.as_ref().is_some_and(SearchJob::is_finished) {
            if let Some(job) = self.current_job.take() {
                if job.worker.join().is_err() {
                    log::warn!("search worker panicked");
                }
            }
        }
    }

    /// Cancel any search (its best move so far is still played), then return
    /// the game to its initial position.
    pub fn reset(&mut self) {
        self.stop_search();
        let mut state = self.state.lock();
        state.searchable.reset();
        state.history.clear();
        state.player1_to_move = true;
        state.tt.clear();
    }

    /// Cancel any search and wait for its worker to exit.
    pub fn stop_search(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    /// Play a human move. It is scored with the default weights before it
    /// is applied. Returns true if the move ended the game.
    ///
    /// # Panics
    ///
    /// Panics while a search is processing, or if it is not the mover's turn.
    pub fn manual_move(&mut self, mut mv: Move) -> bool {
        assert!(!self.is_processing(), "manual move while a search is processing");
        let mut state = self.state.lock();
        assert_eq!(mv.player1, state.player1_to_move, "move out of turn");

        let value = state.searchable.worth(&mv, &self.weights.default);
        mv.set_value(value);
        let mv = state.record(mv);
        state.searchable.done(Some(&mv), true)
    }

    /// Take back the most recent move, human or computer.
    ///
    /// # Panics
    ///
    /// Panics if there is no move to undo or a search is processing.
    pub fn undo_last_move(&mut self) -> Move {
        assert!(!self.is_processing(), "undo while a search is processing");
        self.reap_finished();
        let mut state = self.state.lock();
        let Some(mv) = state.history.pop() else {
            panic!("undo_last_move with an empty history");
        };
        state.searchable.undo_move(&mv);
        state.player1_to_move = mv.player1;
        mv
    }

    pub fn set_weights(&mut self, weights: GameWeights) -> Result<(), ControllerError> {
        self.ensure_idle()?;
        self.weights = weights;
        Ok(())
    }

    /// Replace the options. A changed table size reallocates the table.
    pub fn set_options(&mut self, options: SearchOptions) -> Result<(), ControllerError> {
        self.ensure_idle()?;
        options.validate()?;
        if options.tt_size_mb != self.options.tt_size_mb {
            self.state.lock().tt = TranspositionTable::new(options.tt_size_mb);
        }
        self.options = options;
        Ok(())
    }

    pub fn set_method(&mut self, method: SearchMethod) -> Result<(), ControllerError> {
        self.ensure_idle()?;
        self.method = method;
        Ok(())
    }

    /// Observe every search through `sink`.
    pub fn set_tree_sink(&mut self, sink: Option<SharedTreeSink>) {
        self.tree_sink = sink;
    }

    /// Called on the worker thread after each computer move.
    pub fn set_completion_callback<F>(&mut self, callback: F)
    where
        F: Fn(&MoveOutcome) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
    }

    fn ensure_idle(&self) -> Result<(), ControllerError> {
        if self.is_processing() {
            Err(ControllerError::SearchInProgress)
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn weights(&self) -> &GameWeights {
        &self.weights
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    #[must_use]
    pub fn method(&self) -> SearchMethod {
        self.method
    }

    /// True while a background search has not finished.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.current_job.as_ref().is_some_and(|job| !job.is_finished())
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.last_search.is_paused()
    }

    pub fn pause(&self) {
        if self.is_processing() {
            self.last_search.pause();
        }
    }

    pub fn continue_processing(&self) {
        self.last_search.continue_processing();
    }

    /// Let a paused search expand one more node.
    pub fn step(&self) {
        if self.is_processing() {
            self.last_search.step();
        }
    }

    /// Stop the current search early; it still plays its best move so far.
    pub fn cancel(&self) {
        self.last_search.cancel();
    }

    /// Nodes expanded by the current or most recent search.
    #[must_use]
    pub fn moves_considered(&self) -> u64 {
        self.last_search.moves_considered()
    }

    #[must_use]
    pub fn percent_done(&self) -> u8 {
        self.last_search.percent_done()
    }

    /// Blocks while a search is processing.
    #[must_use]
    pub fn is_player1s_turn(&self) -> bool {
        self.state.lock().player1_to_move
    }

    /// Moves played so far. Blocks while a search is processing.
    #[must_use]
    pub fn history(&self) -> Vec<Move> {
        self.state.lock().history.clone()
    }

    /// Blocks while a search is processing.
    #[must_use]
    pub fn is_done(&self) -> bool {
        let mut state = self.state.lock();
        let last = state.history.last().copied();
        state.searchable.done(last.as_ref(), false)
    }

    /// Estimated probability that player 1 wins, from the last move's
    /// backed-up value.
    #[must_use]
    pub fn chance_of_player1_winning(&self) -> f64 {
        let state = self.state.lock();
        state.history.last().map_or(0.5, |mv| {
            estimator::estimate(mv.inherited_value, state.history.len())
        })
    }

    /// 0 while the game is undecided, otherwise larger for quicker wins.
    #[must_use]
    pub fn strength_of_win(&self) -> i32 {
        let state = self.state.lock();
        match state.searchable.winner() {
            Some(_) => estimator::strength_of_win(state.searchable.num_moves()),
            None => 0,
        }
    }

    /// Run `f` against the game. Blocks while a search is processing.
    pub fn with_searchable<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        f(&self.state.lock().searchable)
    }
}

impl<S: Searchable + 'static> Drop for SearchController<S> {
    fn drop(&mut self) {
        self.stop_search();
    }
}
