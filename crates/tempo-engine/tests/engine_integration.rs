use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempo_engine::{CollectingProgressHandler, Color, Engine, EngineBuilder};

fn fast_engine(fen: &str, depth: u8) -> Engine {
    EngineBuilder::new()
        .from_fen(fen)
        .with_max_depth(depth)
        .with_time_budget(Duration::from_secs(20))
        .build()
        .unwrap()
}

#[test]
fn finds_a_legal_move_from_the_start() {
    let mut engine = EngineBuilder::new()
        .with_max_depth(2)
        .with_time_budget(Duration::from_secs(10))
        .build()
        .unwrap();

    let mv = engine.find_best_move().unwrap().unwrap();
    assert!(engine.legal_moves().contains(&mv));
    assert!(engine.last_search_stats().nodes > 0);
}

#[test]
fn finds_mate_in_one_through_the_facade() {
    let mut engine = fast_engine("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1", 3);
    assert_eq!(engine.find_best_move().unwrap(), Some("e1e8".to_string()));
}

#[test]
fn reports_progress_per_completed_depth() {
    let handler = Arc::new(Mutex::new(CollectingProgressHandler::new()));
    let mut engine = EngineBuilder::new()
        .with_max_depth(2)
        .with_time_budget(Duration::from_secs(20))
        .with_progress_handler(handler.clone())
        .build()
        .unwrap();

    engine.find_best_move().unwrap();

    let handler = handler.lock().unwrap();
    let summaries = handler.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].depth, 1);
    assert_eq!(summaries[1].depth, 2);
}

#[test]
fn no_legal_moves_returns_none() {
    let mut mated = fast_engine("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", 2);
    assert_eq!(mated.find_best_move().unwrap(), None);

    let mut stalemated = fast_engine("7k/5Q2/5K2/8/8/8/8/8 b - - 0 1", 2);
    assert_eq!(stalemated.find_best_move().unwrap(), None);
}

#[test]
fn play_a_few_plies_of_self_play() {
    let mut engine = EngineBuilder::new()
        .with_max_depth(2)
        .with_time_budget(Duration::from_secs(10))
        .build()
        .unwrap();

    for _ in 0..4 {
        if engine.is_game_over() {
            break;
        }
        let mv = engine.find_best_move().unwrap().unwrap();
        engine.make_move(&mv).unwrap();
    }
    assert_eq!(engine.side_to_move(), Color::White);
}

#[test]
fn evaluation_is_balanced_at_the_start() {
    let mut engine = Engine::new();
    assert_eq!(engine.evaluate(), 0);
}

#[test]
fn missing_book_and_tablebase_paths_degrade_to_disabled() {
    let mut engine = EngineBuilder::new()
        .with_max_depth(2)
        .with_time_budget(Duration::from_secs(10))
        .with_opening_book("/nonexistent/book.bin".into())
        .with_tablebase("/nonexistent/syzygy".into())
        .build()
        .unwrap();

    // The features are disabled; the search still answers.
    assert!(engine.find_best_move().unwrap().is_some());
}
