use crate::board::Board;
use crate::evaluation::{game_phase, piece_value, pst_value, terminal_score};
use shakmaty::Role;

/// Fast material-and-placement evaluator. Returns White-relative centipawns;
/// the search multiplies by the side-to-move sign. Used as a cheap baseline
/// and by the futility-style callers that cannot afford the full evaluation.
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Evaluator
    }

    pub fn evaluate(&self, board: &Board) -> i32 {
        if let Some(score) = terminal_score(board) {
            return score;
        }

        let phase = game_phase(board);
        let mut score = 0;

        for (square, piece) in board.pieces() {
            let mut value = pst_value(piece.role, piece.color, square, phase);
            if piece.role != Role::King {
                value += piece_value(piece.role);
            }
            score += if piece.color.is_white() { value } else { -value };
        }

        score
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
