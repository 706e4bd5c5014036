// Cross-component properties of the search stack: position restoration,
// hash stability, legality of returned moves, mate finding, and the
// deadline and fallback behaviour of the driver.

use std::time::{Duration, Instant};
use tempo_core::{Board, Evaluator, SearchConfig, SearchDriver, SearchEngine, INFINITY_SCORE};

const BACK_RANK_MATE: &str = "6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1";
const STALEMATE_TRAP: &str = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1";
const KQ_VS_K: &str = "8/8/4k3/8/8/4K3/4Q3/8 w - - 0 1";
const ITALIAN_GAME: &str = "r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn driver(max_depth: u8, budget_secs: u64) -> SearchDriver {
    SearchDriver::new(SearchConfig {
        max_depth,
        time_budget: Duration::from_secs(budget_secs),
        ..SearchConfig::default()
    })
}

#[test]
fn position_is_restored_bit_exactly_after_search() {
    let mut board = Board::from_fen(ITALIAN_GAME).unwrap();
    let fen_before = board.fen();
    let hash_before = board.zobrist_hash();

    driver(3, 20).find_best_move(&mut board).unwrap();

    assert_eq!(board.fen(), fen_before);
    assert_eq!(board.zobrist_hash(), hash_before);
}

#[test]
fn transposed_move_orders_reach_equal_hashes() {
    let mut one = Board::new();
    for uci in ["e2e4", "e7e5", "g1f3"] {
        one.push(uci.parse().unwrap()).unwrap();
    }
    let mut two = Board::new();
    for uci in ["g1f3", "e7e5", "e2e4"] {
        two.push(uci.parse().unwrap()).unwrap();
    }

    assert_eq!(one.fen(), two.fen());
    assert_eq!(one.zobrist_hash(), two.zobrist_hash());
}

#[test]
fn returned_moves_are_legal_across_positions() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ITALIAN_GAME,
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ];

    for fen in fens {
        let mut board = Board::from_fen(fen).unwrap();
        let mv = driver(2, 10)
            .find_best_move(&mut board)
            .unwrap()
            .unwrap_or_else(|| panic!("no move for {}", fen));
        assert!(
            board.legal_moves().contains(&mv),
            "{} is illegal in {}",
            mv,
            fen
        );
    }
}

#[test]
fn finds_back_rank_mate_in_one() {
    let mut board = Board::from_fen(BACK_RANK_MATE).unwrap();
    let mv = driver(2, 20).find_best_move(&mut board).unwrap().unwrap();
    assert_eq!(mv.to_string(), "e1e8");
}

#[test]
fn mate_distance_is_preserved_at_deeper_searches() {
    for depth in 2..=4 {
        let mut board = Board::from_fen(BACK_RANK_MATE).unwrap();
        let outcome = driver(depth, 30).search(&mut board).unwrap();
        assert_eq!(
            outcome.best_move.map(|m| m.to_string()),
            Some("e1e8".to_string()),
            "depth {} lost the mate",
            depth
        );
        assert_eq!(outcome.score, Some(INFINITY_SCORE));
    }
}

#[test]
fn avoids_the_stalemate_trap() {
    let mut board = Board::from_fen(STALEMATE_TRAP).unwrap();
    let mv = driver(3, 30).find_best_move(&mut board).unwrap().unwrap();

    board.push(mv).unwrap();
    assert!(
        !board.is_stalemate(),
        "{} stalemates with overwhelming material",
        mv
    );
}

#[test]
fn makes_progress_in_queen_endgame_without_tablebase() {
    let mut board = Board::from_fen(KQ_VS_K).unwrap();
    assert_eq!(board.piece_count(), 3);

    let mv = driver(4, 30).find_best_move(&mut board).unwrap().unwrap();
    board.push(mv).unwrap();
    assert!(!board.is_stalemate());
    assert!(!board.is_insufficient_material());
}

#[test]
fn search_is_deterministic_with_book_disabled() {
    let run = || {
        let mut board = Board::from_fen(ITALIAN_GAME).unwrap();
        driver(2, 30).search(&mut board).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.score, second.score);
}

#[test]
fn depth_zero_equals_static_eval_when_no_profitable_capture() {
    // After 1. e4 e5 the pawns stare at each other; nothing hangs, so the
    // horizon and the static evaluation agree.
    let mut board =
        Board::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2").unwrap();
    let mut engine = SearchEngine::new(SearchConfig::default());
    let static_eval = engine.evaluate_static(&board);

    let deadline = Instant::now() + Duration::from_secs(60);
    let (score, _) = engine.negamax(&mut board, 0, -INFINITY_SCORE, INFINITY_SCORE, 1, deadline, &[]);
    assert_eq!(score, Some(static_eval));
}

#[test]
fn quiescence_diverges_from_static_eval_when_material_hangs() {
    let mut board =
        Board::from_fen("rnb1kbnr/ppp1pppp/8/3q4/4P3/2N5/PPPP1PPP/R1BQKBNR w KQkq - 0 1").unwrap();
    let mut engine = SearchEngine::new(SearchConfig::default());
    let static_eval = engine.evaluate_static(&board);

    let deadline = Instant::now() + Duration::from_secs(60);
    let (score, _) = engine.negamax(&mut board, 0, -INFINITY_SCORE, INFINITY_SCORE, 1, deadline, &[]);
    let score = score.unwrap();
    assert!(
        score > static_eval + 500,
        "quiescence {} vs static {}",
        score,
        static_eval
    );
}

#[test]
fn the_standard_evaluator_agrees_on_terminal_positions() {
    let evaluator = Evaluator::new();
    let stalemate = Board::from_fen("7k/5Q2/5K2/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(evaluator.evaluate(&stalemate), 0);
}
