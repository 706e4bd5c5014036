// Searches a position given as a FEN string (defaults to the starting
// position) and prints the chosen move.
//
//     cargo run --example find_best_move -- "6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1"

use std::time::Duration;
use tempo_engine::{Engine, EngineBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut engine: Engine = match std::env::args().nth(1) {
        Some(fen) => EngineBuilder::new()
            .from_fen(&fen)
            .with_max_depth(6)
            .with_time_budget(Duration::from_secs(5))
            .build()?,
        None => EngineBuilder::new()
            .with_max_depth(6)
            .with_time_budget(Duration::from_secs(5))
            .build()?,
    };

    match engine.find_best_move()? {
        Some(mv) => println!("best move: {}", mv),
        None => println!("no legal moves"),
    }
    let stats = engine.last_search_stats();
    println!(
        "searched {} nodes to depth {} in {:?}",
        stats.nodes, stats.depth, stats.elapsed
    );

    Ok(())
}
