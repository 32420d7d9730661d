//! Tic-tac-toe self-play through the search controller.
//!
//! Usage: `game-search [look-ahead] [minimax|negamax|negascout|uct]`
//!
//! UCT ignores the look-ahead and runs its default simulation count.

use std::env;
use std::process::ExitCode;

use game_search::engine::estimator;
use game_search::tictactoe::TicTacToe;
use game_search::{GameWeights, SearchController, SearchMethod, SearchOptions};

fn parse_method(name: &str) -> Option<SearchMethod> {
    match name.to_ascii_lowercase().as_str() {
        "minimax" => Some(SearchMethod::MiniMax),
        "negamax" => Some(SearchMethod::NegaMax),
        "negascout" => Some(SearchMethod::NegaScout),
        "uct" => Some(SearchMethod::Uct),
        _ => None,
    }
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let look_ahead = match args.next().map(|s| s.parse::<u32>()) {
        None => 9,
        Some(Ok(depth)) => depth,
        Some(Err(err)) => {
            eprintln!("invalid look-ahead: {err}");
            return ExitCode::FAILURE;
        }
    };
    let method = match args.next() {
        None => SearchMethod::default(),
        Some(name) => match parse_method(&name) {
            Some(method) => method,
            None => {
                eprintln!("unknown search method {name:?}");
                return ExitCode::FAILURE;
            }
        },
    };

    let options = SearchOptions::depth(look_ahead);
    if let Err(err) = options.validate() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let weights = GameWeights::new(TicTacToe::default_weights());
    let mut controller =
        SearchController::new(TicTacToe::new(), weights, options).with_method(method);

    println!("{method} self-play, look-ahead {look_ahead}");
    loop {
        let player1 = controller.is_player1s_turn();
        let outcome = match controller.request_move(player1, true) {
            Ok(pending) => pending.wait(),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        };
        let Some(outcome) = outcome else {
            eprintln!("search worker stopped without a result");
            return ExitCode::FAILURE;
        };

        match outcome.chosen {
            Some(mv) => {
                println!(
                    "{}. {} ({} moves considered, {:.1} ms, P(X wins) = {:.2})",
                    mv.number,
                    mv,
                    outcome.moves_considered,
                    outcome.elapsed.as_secs_f64() * 1000.0,
                    controller.chance_of_player1_winning()
                );
                controller.with_searchable(|game| print!("{game}"));
            }
            None => println!("no move available"),
        }
        if outcome.game_over {
            break;
        }
    }

    let history = controller.history();
    match controller.with_searchable(|game| game_search::Searchable::winner(game)) {
        Some(true) => println!("X wins (strength {})", controller.strength_of_win()),
        Some(false) => println!("O wins (strength {})", controller.strength_of_win()),
        None => println!(
            "draw after {} moves (final estimate {:.2})",
            history.len(),
            history
                .last()
                .map_or(0.5, |mv| estimator::estimate(mv.inherited_value, history.len()))
        ),
    }
    ExitCode::SUCCESS
}
