// Negamax with alpha-beta pruning plus the standard speedups: transposition
// probing, null-move pruning, futility pruning, late-move reductions with
// null-window re-search, and a capture-and-check quiescence extension at the
// horizon. A score of `None` means the wall-clock deadline passed somewhere
// below; it propagates up the stack, the position is unwound move by move,
// and nothing is stored in the transposition table along the way.

use crate::board::{Board, Move};
use crate::evaluation::{game_phase, AdvancedEvaluator};
use crate::search::ordering::mvv_lva;
use crate::search::{
    Bound, MoveOrderer, SearchConfig, SearchStats, TranspositionTable, TtProbe, INFINITY_SCORE,
};
use std::time::Instant;

/// Null-move pruning is unsound in low-material zugzwang territory; skip it
/// once the phase drops to this point.
const NULL_MOVE_MIN_PHASE: f32 = 0.2;

pub struct SearchEngine {
    pub(crate) evaluator: AdvancedEvaluator,
    pub(crate) tt: TranspositionTable,
    pub(crate) orderer: MoveOrderer,
    pub(crate) stats: SearchStats,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        SearchEngine {
            evaluator: AdvancedEvaluator::new(),
            tt: TranspositionTable::new(config.tt_capacity),
            orderer: MoveOrderer::new(),
            stats: SearchStats::default(),
            config,
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Static evaluation through the engine's cached evaluator,
    /// White-relative.
    pub fn evaluate_static(&mut self, board: &Board) -> i32 {
        self.evaluator.evaluate(board)
    }

    /// Searches `board` to `depth` plies inside the `[alpha, beta]` window.
    /// `color` is +1 when White is to move at this node, -1 otherwise; the
    /// returned score is from the side to move's viewpoint. A `None` score
    /// signals the deadline passed and must be checked before use.
    pub fn negamax(
        &mut self,
        board: &mut Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        color: i32,
        deadline: Instant,
        principal_variation: &[Move],
    ) -> (Option<i32>, Option<Move>) {
        self.stats.nodes += 1;

        if Instant::now() > deadline {
            return (None, None);
        }

        if board.is_checkmate() {
            return (Some(-INFINITY_SCORE), None);
        }
        if board.is_draw() {
            return (Some(0), None);
        }

        let key = board.zobrist_hash();
        let hash_move = match self.tt.probe(key, depth, alpha, beta) {
            TtProbe::Cutoff { score, best_move } => {
                // A colliding entry betrays itself by a move that is not
                // legal here; its score is not trusted either.
                match best_move {
                    Some(mv) if board.resolve(mv).is_none() => None,
                    _ => return (Some(score), best_move),
                }
            }
            TtProbe::Narrowed {
                alpha: narrowed_alpha,
                beta: narrowed_beta,
                best_move,
            } => {
                alpha = narrowed_alpha;
                beta = narrowed_beta;
                best_move
            }
            TtProbe::Miss { best_move } => best_move,
        };

        if depth == 0 {
            let score = self.quiescence(
                board,
                alpha,
                beta,
                color,
                self.config.qs_max_depth,
                deadline,
            );
            return (score, None);
        }

        let in_check = board.is_check();

        // Null-move pruning: hand the opponent a free move at reduced depth;
        // if they still cannot reach beta, this node will not fall below it.
        if let Some(min_depth) = self.config.nmr_min_depth {
            if depth > min_depth
                && !in_check
                && game_phase(board) > NULL_MOVE_MIN_PHASE
                && board.push_null().is_ok()
            {
                let reduced = depth - 1 - self.config.nmr_reduction.min(depth - 1);
                let (null_score, _) = self.negamax(
                    board,
                    reduced,
                    -beta,
                    -beta + 1,
                    -color,
                    deadline,
                    principal_variation,
                );
                board.pop_null().ok();

                match null_score {
                    None => return (None, None),
                    Some(null_score) => {
                        if -null_score >= beta {
                            return (Some(beta), None);
                        }
                    }
                }
            }
        }

        // Futility pruning: near the horizon, a position so far below alpha
        // that no quiet gain can recover is abandoned at alpha.
        if !in_check && (depth as usize) < self.config.futility_margins.len() {
            let static_eval = self.evaluator.evaluate(board) * color;
            if static_eval + self.config.futility_margins[depth as usize] <= alpha {
                return (Some(alpha), None);
            }
        }

        let moves = self
            .orderer
            .order(board, depth, principal_variation, hash_move);
        if moves.is_empty() {
            return (Some(if in_check { -INFINITY_SCORE } else { 0 }), None);
        }

        let original_alpha = alpha;
        let mut best_score = -INFINITY_SCORE;
        let mut best_move = None;
        let mut timed_out = false;

        for (index, &mv) in moves.iter().enumerate() {
            if Instant::now() > deadline {
                timed_out = true;
                break;
            }

            let quiet = !board.is_capture(mv);
            if board.push(mv).is_err() {
                continue;
            }
            let child = self.child_score(
                board,
                index,
                depth,
                alpha,
                beta,
                color,
                deadline,
                principal_variation,
                quiet,
            );
            board.pop().ok();

            let Some(score) = child else {
                timed_out = true;
                break;
            };

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(best_score);
            if alpha >= beta {
                if quiet {
                    self.orderer.record_cutoff(mv, depth);
                }
                break;
            }
        }

        if timed_out {
            return (None, None);
        }

        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(key, depth, best_score, bound, best_move);

        (Some(best_score), best_move)
    }

    /// Scores the child position already pushed onto `board`, from the
    /// parent's viewpoint. Late quiet moves are tried first at reduced depth
    /// in a null window and only re-searched in full when they beat alpha.
    fn child_score(
        &mut self,
        board: &mut Board,
        index: usize,
        depth: u8,
        alpha: i32,
        beta: i32,
        color: i32,
        deadline: Instant,
        principal_variation: &[Move],
        quiet: bool,
    ) -> Option<i32> {
        let apply_lmr = self.config.lmr_enabled
            && index > 0
            && depth >= 3
            && quiet
            && !board.is_check();

        if apply_lmr {
            let reduced_depth = depth.saturating_sub(1 + lmr_reduction(depth, index));
            if reduced_depth > 0 {
                let (reduced, _) = self.negamax(
                    board,
                    reduced_depth,
                    -(alpha + 1),
                    -alpha,
                    -color,
                    deadline,
                    principal_variation,
                );
                let reduced = -(reduced?);
                if reduced <= alpha {
                    return Some(reduced);
                }
            }
        }

        let (full, _) = self.negamax(
            board,
            depth - 1,
            -beta,
            -alpha,
            -color,
            deadline,
            principal_variation,
        );
        Some(-(full?))
    }

    /// Extends the horizon through noisy moves only. Stand-pat gives the
    /// side to move the option of not capturing at all.
    pub fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        beta: i32,
        color: i32,
        qs_depth: u8,
        deadline: Instant,
    ) -> Option<i32> {
        self.stats.nodes += 1;

        if Instant::now() > deadline {
            return None;
        }

        if board.is_checkmate() {
            return Some(-INFINITY_SCORE);
        }
        if board.is_draw() {
            return Some(0);
        }

        if qs_depth == 0 {
            return Some(self.evaluator.evaluate(board) * color);
        }

        let stand_pat = self.evaluator.evaluate(board) * color;
        if stand_pat >= beta {
            return Some(beta);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        let mut best_score = stand_pat;

        let mut noisy: Vec<(Move, i32)> = board
            .legal_moves()
            .into_iter()
            .filter(|&m| board.is_capture(m) || board.gives_check(m))
            .map(|m| (m, mvv_lva(board, m)))
            .collect();
        noisy.sort_by(|a, b| b.1.cmp(&a.1));

        for (mv, _) in noisy {
            if Instant::now() > deadline {
                return None;
            }
            if board.push(mv).is_err() {
                continue;
            }
            let child = self.quiescence(board, -beta, -alpha, -color, qs_depth - 1, deadline);
            board.pop().ok();

            let score = -(child?);
            if score > best_score {
                best_score = score;
            }
            if best_score > alpha {
                alpha = best_score;
            }
            if alpha >= beta {
                break;
            }
        }

        Some(best_score)
    }
}

/// Reduction schedule for late quiet moves; deeper nodes and later indices
/// are reduced harder. The result always leaves at least one ply.
fn lmr_reduction(depth: u8, index: usize) -> u8 {
    let mut reduction = 0;
    if depth >= 3 && index >= 3 {
        reduction = 1;
    }
    if depth >= 4 && index >= 5 {
        reduction = 2;
    }
    if depth >= 6 && index >= 10 {
        reduction = 3;
    }
    if depth >= 8 && index >= 15 {
        reduction = 4;
    }
    reduction
}
