//! Controller lifecycle: requests, pause and cancel, reset, undo.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use game_search::engine::SharedTreeSink;
use game_search::tictactoe::TicTacToe;
use game_search::{
    ControllerError, GameTreeRecorder, GameWeights, Location, Move, SearchController,
    SearchMethod, SearchOptions,
};
use parking_lot::Mutex;

fn controller(options: SearchOptions) -> SearchController<TicTacToe> {
    SearchController::new(
        TicTacToe::new(),
        GameWeights::new(TicTacToe::default_weights()),
        options,
    )
}

/// Deep enough that a search is still running when the test pauses it.
fn slow_options() -> SearchOptions {
    SearchOptions::depth(9)
        .with_alpha_beta(false)
        .with_transposition_table(false)
}

#[test]
fn test_self_play_ends_in_a_draw() {
    let mut ctl = controller(SearchOptions::depth(9));
    loop {
        let player1 = ctl.is_player1s_turn();
        let outcome = ctl
            .request_move(player1, true)
            .expect("request accepted")
            .wait()
            .expect("worker reported");
        if outcome.game_over {
            break;
        }
    }

    assert_eq!(ctl.history().len(), 9);
    assert_eq!(ctl.strength_of_win(), 0);
    assert!(ctl.with_searchable(|game| game_search::Searchable::winner(game).is_none()));
    assert!(ctl.is_done());
}

#[test]
fn test_asynchronous_request_delivers_outcome() {
    let mut ctl = controller(SearchOptions::depth(3)).with_method(SearchMethod::NegaScout);
    let pending = ctl.request_move(true, false).expect("request accepted");
    let outcome = pending.wait().expect("worker reported");

    assert!(outcome.chosen.is_some());
    assert!(!outcome.interrupted);
    assert!(!ctl.is_processing());
    assert_eq!(ctl.percent_done(), 100);

    // The slot is free again right away
    let outcome = ctl
        .request_move(false, false)
        .expect("second request accepted")
        .wait()
        .expect("worker reported");
    assert!(!outcome.chosen.expect("a move").player1);
    let numbers: Vec<u32> = ctl.history().iter().map(|m| m.number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[test]
fn test_pause_blocks_other_requests_and_cancel_plays_a_move() {
    let mut ctl = controller(slow_options());
    let pending = ctl.request_move(true, false).expect("request accepted");
    pending.handle().pause();
    thread::sleep(Duration::from_millis(20));

    assert!(ctl.is_processing());
    assert!(ctl.is_paused());
    assert_eq!(
        ctl.request_move(true, false).err(),
        Some(ControllerError::SearchInProgress)
    );
    assert_eq!(
        ctl.set_method(SearchMethod::MiniMax),
        Err(ControllerError::SearchInProgress)
    );
    assert_eq!(
        ctl.set_weights(GameWeights::default()),
        Err(ControllerError::SearchInProgress)
    );

    let before = ctl.moves_considered();
    ctl.step();
    thread::sleep(Duration::from_millis(20));
    assert!(ctl.moves_considered() <= before + 1);

    ctl.cancel();
    let outcome = pending.wait().expect("worker reported");
    assert!(outcome.interrupted);
    let mv = outcome.chosen.expect("cancelled search still moves");
    assert!(mv.player1);
    assert_eq!(ctl.history(), vec![mv]);
    assert!(!ctl.is_player1s_turn());
}

#[test]
fn test_reset_cancels_search_in_flight() {
    let mut ctl = controller(slow_options());
    let pending = ctl.request_move(true, false).expect("request accepted");
    pending.handle().pause();

    ctl.reset();
    assert!(!ctl.is_processing());
    assert!(ctl.history().is_empty());
    assert!(ctl.is_player1s_turn());

    // The worker still reported the move it played before the reset
    let outcome = pending.wait().expect("worker reported");
    assert!(outcome.interrupted);
}

#[test]
fn test_request_on_finished_game() {
    let mut ctl = controller(SearchOptions::depth(2));
    let moves = [(0, 0, true), (1, 0, false), (0, 1, true), (1, 1, false)];
    for (row, col, player1) in moves {
        let piece = if player1 { 1 } else { 2 };
        assert!(!ctl.manual_move(Move::new(Location::new(row, col), player1, piece, 0)));
    }
    assert!(ctl.manual_move(Move::new(Location::new(0, 2), true, 1, 0)));

    let outcome = ctl
        .request_move(false, true)
        .expect("request accepted")
        .wait()
        .expect("worker reported");
    assert_eq!(outcome.chosen, None);
    assert!(outcome.game_over);
    assert_eq!(ctl.history().len(), 5);
    assert_eq!(ctl.strength_of_win(), 10);
    assert_eq!(ctl.chance_of_player1_winning(), 1.0);
}

#[test]
fn test_completion_callback_and_tree_sink() {
    let mut ctl = controller(SearchOptions::depth(2));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    ctl.set_completion_callback(move |outcome| {
        assert!(outcome.chosen.is_some());
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let recorder = Arc::new(Mutex::new(GameTreeRecorder::new()));
    let sink: SharedTreeSink = recorder.clone();
    ctl.set_tree_sink(Some(sink));

    let outcome = ctl
        .request_move(true, true)
        .expect("request accepted")
        .wait()
        .expect("worker reported");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let recorded = recorder.lock().len() as u64;
    assert_eq!(recorded, outcome.moves_considered + 1);
}

#[test]
fn test_undo_restores_turn_and_estimate() {
    let mut ctl = controller(SearchOptions::depth(2));
    assert_eq!(ctl.chance_of_player1_winning(), 0.5);

    ctl.request_move(true, true)
        .expect("request accepted")
        .wait()
        .expect("worker reported");
    assert!(!ctl.is_player1s_turn());

    let undone = ctl.undo_last_move();
    assert!(undone.player1);
    assert!(ctl.is_player1s_turn());
    assert!(ctl.history().is_empty());
    assert!(!ctl.is_done());
}

#[test]
#[should_panic(expected = "undo while a search is processing")]
fn test_undo_while_processing_panics() {
    let mut ctl = controller(slow_options());
    let pending = ctl.request_move(true, false).expect("request accepted");
    pending.handle().pause();
    ctl.undo_last_move();
}

#[test]
fn test_invalid_options_surface_on_request() {
    let mut ctl = controller(SearchOptions::depth(3).with_best_moves(0, 5));
    let err = ctl.request_move(true, true).err().expect("rejected");
    assert!(matches!(err, ControllerError::InvalidOptions(_)));
    assert!(ctl.history().is_empty());
}

#[test]
fn test_uct_request_plays_a_move() {
    let mut ctl = controller(SearchOptions::default().with_simulations(200, 1.0))
        .with_method(SearchMethod::Uct);
    let outcome = ctl
        .request_move(true, true)
        .expect("request accepted")
        .wait()
        .expect("worker reported");

    let mv = outcome.chosen.expect("a move");
    assert!(mv.player1);
    assert!(!outcome.interrupted);
    assert!(outcome.moves_considered > 0);
    assert_eq!(ctl.percent_done(), 100);
    assert_eq!(ctl.history(), vec![mv]);
}
