//! Configuration survives a JSON round trip.

#![cfg(feature = "serde")]

use std::time::Duration;

use game_search::tictactoe::TicTacToe;
use game_search::{GameWeights, SearchMethod, SearchOptions};

#[test]
fn test_options_json_round_trip() {
    let options = SearchOptions::depth(6)
        .iterative(2)
        .with_quiescence(3)
        .with_best_moves(40, 3)
        .with_time_limit(Duration::from_millis(250))
        .with_simulations(500, 1.5)
        .with_playouts(12, 42);
    let json = serde_json::to_string(&options).expect("serialize");
    let back: SearchOptions = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, options);
}

#[test]
fn test_weights_and_method_from_json() {
    let mut weights = GameWeights::new(TicTacToe::default_weights());
    weights.player2.set(2, 5.0);
    let json = serde_json::to_string(&weights).expect("serialize");
    let back: GameWeights = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, weights);
    assert_eq!(back.for_player(false).get(2), 5.0);

    let method: SearchMethod = serde_json::from_str("\"NegaScout\"").expect("deserialize");
    assert_eq!(method, SearchMethod::NegaScout);
    let method: SearchMethod = serde_json::from_str("\"Uct\"").expect("deserialize");
    assert_eq!(method, SearchMethod::Uct);
}
