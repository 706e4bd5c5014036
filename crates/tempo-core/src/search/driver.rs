// Iterative deepening on top of the negamax engine, with the opening book
// and tablebase shortcuts in front and the aspiration-window ladder around
// every depth. The driver owns the engine's mutable state (transposition
// table, killer and history tables) between depths.

use crate::board::{Board, Move};
use crate::book::OpeningBook;
use crate::error::Result;
use crate::search::{SearchConfig, SearchEngine, SearchStats, INFINITY_SCORE};
use crate::tablebase::{EndgameTablebase, MAX_TABLEBASE_PIECES};
use rand::seq::SliceRandom;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of one completed iterative-deepening depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSummary {
    pub depth: u8,
    pub best_move: Move,
    pub score: i32,
}

/// Everything a caller can learn from one driver invocation. `best_move` is
/// `None` only when the position has no legal moves; `score` is `None` when
/// the move came from the book, the tablebase, or the random safety net.
/// `principal_variation` is the line reconstructed from the transposition
/// table behind the final score, for reporting only.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub score: Option<i32>,
    pub principal_variation: Vec<Move>,
    pub depth_summaries: Vec<DepthSummary>,
    pub stats: SearchStats,
}

pub struct SearchDriver {
    engine: SearchEngine,
    book: Option<OpeningBook>,
    tablebase: Option<EndgameTablebase>,
    config: SearchConfig,
}

impl SearchDriver {
    /// Builds a driver from configuration. A book or tablebase path that
    /// fails to load is logged once and the feature is disabled; the search
    /// itself is unaffected.
    pub fn new(config: SearchConfig) -> Self {
        let book = config.book_path.as_deref().and_then(|path| {
            match OpeningBook::open(path) {
                Ok(book) => {
                    debug!("opening book loaded: {} entries", book.len());
                    Some(book)
                }
                Err(e) => {
                    warn!("opening book disabled: {}", e);
                    None
                }
            }
        });
        let tablebase = config.tablebase_path.as_deref().and_then(|path| {
            match EndgameTablebase::open(path) {
                Ok(tablebase) => Some(tablebase),
                Err(e) => {
                    warn!("tablebase disabled: {}", e);
                    None
                }
            }
        });

        SearchDriver {
            engine: SearchEngine::new(config.clone()),
            book,
            tablebase,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> SearchStats {
        self.engine.stats()
    }

    /// Static evaluation of `board` through the engine's evaluator,
    /// White-relative.
    pub fn evaluate(&mut self, board: &Board) -> i32 {
        self.engine.evaluate_static(board)
    }

    pub fn find_best_move(&mut self, board: &mut Board) -> Result<Option<Move>> {
        Ok(self.search(board)?.best_move)
    }

    /// Book probe, then tablebase probe, then iterative deepening under the
    /// configured wall-clock budget. The position is restored bit-exactly
    /// before returning.
    pub fn search(&mut self, board: &mut Board) -> Result<SearchOutcome> {
        let start = Instant::now();
        self.engine.stats = SearchStats::default();

        let legal_moves = board.legal_moves();
        if legal_moves.is_empty() {
            return Ok(SearchOutcome {
                best_move: None,
                score: None,
                principal_variation: Vec::new(),
                depth_summaries: Vec::new(),
                stats: self.engine.stats(),
            });
        }

        if let Some(book) = &self.book {
            if let Some(mv) = book.weighted_choice(board) {
                debug!("book move: {}", mv);
                return Ok(self.shortcut_outcome(mv, start));
            }
        }

        if board.piece_count() <= MAX_TABLEBASE_PIECES {
            if let Some(mv) = self.tablebase_move(board) {
                debug!("tablebase move: {}", mv);
                return Ok(self.shortcut_outcome(mv, start));
            }
        }

        let deadline = start + self.config.time_budget;
        let color = board.side_multiplier();
        self.engine.orderer.reset();

        let mut best: Option<(Move, i32)> = None;
        let mut principal_variation: Vec<Move> = Vec::new();
        let mut previous_score = 0;
        let mut depth_summaries = Vec::new();

        'deepening: for depth in 1..=self.config.max_depth {
            if Instant::now() > deadline {
                break;
            }

            let (mut alpha, mut beta) = if depth > 1 {
                (
                    previous_score - self.config.aspiration_initial_delta,
                    previous_score + self.config.aspiration_initial_delta,
                )
            } else {
                (-INFINITY_SCORE, INFINITY_SCORE)
            };

            let mut widenings = self.config.aspiration_widening.iter();
            let (score, best_move) = loop {
                let (score, best_move) = self.engine.negamax(
                    board,
                    depth,
                    alpha,
                    beta,
                    color,
                    deadline,
                    &principal_variation,
                );
                // A deadline overrun aborts this depth; the previous depth's
                // move stands.
                let Some(score) = score else {
                    break 'deepening;
                };

                let full_window = alpha <= -INFINITY_SCORE && beta >= INFINITY_SCORE;
                if !full_window && (score <= alpha || score >= beta) {
                    match widenings.next() {
                        Some(Some(delta)) => {
                            alpha = score - delta;
                            beta = score + delta;
                        }
                        Some(None) | None => {
                            alpha = -INFINITY_SCORE;
                            beta = INFINITY_SCORE;
                        }
                    }
                    continue;
                }
                break (score, best_move);
            };

            let Some(best_move) = best_move else {
                break;
            };
            best = Some((best_move, score));
            previous_score = score;
            principal_variation = vec![best_move];
            self.engine.stats.depth = depth;
            depth_summaries.push(DepthSummary {
                depth,
                best_move,
                score,
            });
            info!(
                "Depth {} completed. Best move: {}, Value: {}",
                depth, best_move, score
            );

            if score.abs() >= INFINITY_SCORE {
                break;
            }
        }

        self.engine.stats.elapsed = start.elapsed();

        let (best_move, score, principal_variation) = match best {
            Some((mv, score)) => {
                let line = self.extract_principal_variation(board, self.engine.stats.depth);
                (Some(mv), Some(score), line)
            }
            None => {
                // Safety net: not a single depth completed inside the budget.
                let mv = legal_moves.choose(&mut rand::thread_rng()).copied();
                (mv, None, Vec::new())
            }
        };

        Ok(SearchOutcome {
            best_move,
            score,
            principal_variation,
            depth_summaries,
            stats: self.engine.stats(),
        })
    }

    /// Walks the transposition table's best-move chain from the root to
    /// reconstruct the expected line. A cycle, a missing entry or a cached
    /// move that is no longer legal ends the walk.
    fn extract_principal_variation(&self, board: &mut Board, max_len: u8) -> Vec<Move> {
        let mut line = Vec::new();
        let mut visited = Vec::new();

        for _ in 0..max_len {
            let key = board.zobrist_hash();
            if visited.contains(&key) {
                break;
            }
            visited.push(key);

            let Some(mv) = self.engine.tt.stored_move(key) else {
                break;
            };
            if board.push(mv).is_err() {
                break;
            }
            line.push(mv);
        }

        for _ in 0..line.len() {
            board.pop().ok();
        }
        line
    }

    fn shortcut_outcome(&mut self, mv: Move, start: Instant) -> SearchOutcome {
        self.engine.stats.elapsed = start.elapsed();
        SearchOutcome {
            best_move: Some(mv),
            score: None,
            principal_variation: Vec::new(),
            depth_summaries: Vec::new(),
            stats: self.engine.stats(),
        }
    }

    /// Root-move selection by child DTZ, zeroing moves probed first. A
    /// negative child DTZ means the opponent is lost; among those the
    /// slowest-to-reset winning conversion is preferred (largest DTZ,
    /// zeroing over non-zeroing). Draws beat losses; among losses the
    /// largest DTZ drags the game out longest.
    fn tablebase_move(&self, board: &mut Board) -> Option<Move> {
        let tablebase = self.tablebase.as_ref()?;

        let mut moves = board.legal_moves();
        moves.sort_by_key(|&mv| !board.is_zeroing(mv));

        let mut winning: Option<(Move, i32, bool)> = None;
        let mut drawing: Option<Move> = None;
        let mut losing: Option<(Move, i32)> = None;

        for mv in moves {
            let zeroing = board.is_zeroing(mv);
            if board.push(mv).is_err() {
                continue;
            }
            let dtz = tablebase.probe_dtz(board);
            board.pop().ok();
            let Some(dtz) = dtz else {
                continue;
            };

            if dtz < 0 {
                let better = match winning {
                    None => true,
                    Some((_, best_dtz, best_zeroing)) => {
                        if zeroing != best_zeroing {
                            zeroing
                        } else {
                            dtz > best_dtz
                        }
                    }
                };
                if better {
                    winning = Some((mv, dtz, zeroing));
                }
            } else if dtz == 0 {
                if drawing.is_none() {
                    drawing = Some(mv);
                }
            } else {
                let better = match losing {
                    None => true,
                    Some((_, best_dtz)) => dtz > best_dtz,
                };
                if better {
                    losing = Some((mv, dtz));
                }
            }
        }

        winning
            .map(|(mv, _, _)| mv)
            .or(drawing)
            .or_else(|| losing.map(|(mv, _)| mv))
    }
}
