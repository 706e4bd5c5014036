// Search throughput benchmarks across game stages

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};
use tempo_core::{Board, SearchConfig, SearchEngine, INFINITY_SCORE};

const STARTING_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE_POSITION: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLE_GAME_POSITION: &str =
    "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
const ENDGAME_POSITION: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(3600)
}

fn benchmark_negamax(c: &mut Criterion) {
    let mut group = c.benchmark_group("negamax");

    for (name, fen) in [
        ("start", STARTING_POSITION),
        ("kiwipete", KIWIPETE_POSITION),
        ("middlegame", MIDDLE_GAME_POSITION),
        ("endgame", ENDGAME_POSITION),
    ] {
        group.bench_with_input(BenchmarkId::new("depth_2", name), &fen, |b, fen| {
            b.iter(|| {
                let mut board = Board::from_fen(fen).unwrap();
                let mut engine = SearchEngine::new(SearchConfig::default());
                engine.negamax(
                    &mut board,
                    2,
                    -INFINITY_SCORE,
                    INFINITY_SCORE,
                    board.side_multiplier(),
                    far_deadline(),
                    &[],
                )
            })
        });
    }

    group.finish();
}

fn benchmark_quiescence(c: &mut Criterion) {
    let mut group = c.benchmark_group("quiescence");

    group.bench_function("kiwipete", |b| {
        b.iter(|| {
            let mut board = Board::from_fen(KIWIPETE_POSITION).unwrap();
            let mut engine = SearchEngine::new(SearchConfig::default());
            engine.quiescence(
                &mut board,
                -INFINITY_SCORE,
                INFINITY_SCORE,
                board.side_multiplier(),
                3,
                far_deadline(),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_negamax, benchmark_quiescence);
criterion_main!(benches);
