pub mod advanced;
pub mod standard;
pub mod tables;

pub use advanced::AdvancedEvaluator;
pub use standard::Evaluator;
pub use tables::{piece_value, pst_value};

use crate::board::Board;
use shakmaty::{Color, Role};

/// Checkmate sentinel returned by the evaluators, White-relative. Scores
/// outside +/-30000 never arise from normal evaluation terms.
pub const MATE_SCORE: i32 = 9999;

/// Material for a full complement of both sides, kings excluded.
const FULL_MATERIAL: i32 = 16 * 100 + 4 * 320 + 4 * 330 + 4 * 500 + 2 * 900;

/// Game phase from remaining non-king material: 1.0 is the full opening,
/// 0.0 a bare-kings endgame.
pub fn game_phase(board: &Board) -> f32 {
    let mut material = 0;
    for (_, piece) in board.pieces() {
        if piece.role != Role::King {
            material += piece_value(piece.role);
        }
    }
    (material as f32 / FULL_MATERIAL as f32).clamp(0.0, 1.0)
}

/// Linear interpolation between an opening and an endgame weight.
pub fn taper(opening: f32, endgame: f32, phase: f32) -> f32 {
    opening * phase + endgame * (1.0 - phase)
}

/// Game-over shortcut shared by the evaluators, White-relative: checkmate is
/// -MATE_SCORE for the side that is mated; stalemate, insufficient material
/// and the 75-move rule are dead draws.
pub(crate) fn terminal_score(board: &Board) -> Option<i32> {
    if board.is_checkmate() {
        return Some(match board.turn() {
            Color::White => -MATE_SCORE,
            Color::Black => MATE_SCORE,
        });
    }
    if board.is_stalemate() || board.is_insufficient_material() || board.is_seventyfive_moves() {
        return Some(0);
    }
    None
}
