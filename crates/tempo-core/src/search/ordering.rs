use crate::board::{Board, Move};
use crate::evaluation::piece_value;
use crate::search::MAX_SEARCH_DEPTH;

const KILLER_SLOTS: usize = 2;

/// Orders legal moves so the alpha-beta window closes as early as possible:
/// hash move, then the previous iteration's PV move, then captures by
/// MVV-LVA, then the killer moves for this depth, then the remaining quiet
/// moves by history score. Also owns the killer and history tables, which
/// are reset at the start of each root search.
pub struct MoveOrderer {
    killers: [[Option<Move>; KILLER_SLOTS]; MAX_SEARCH_DEPTH],
    history: [[u32; 64]; 64],
}

impl MoveOrderer {
    pub fn new() -> Self {
        MoveOrderer {
            killers: [[None; KILLER_SLOTS]; MAX_SEARCH_DEPTH],
            history: [[0; 64]; 64],
        }
    }

    pub fn reset(&mut self) {
        self.killers = [[None; KILLER_SLOTS]; MAX_SEARCH_DEPTH];
        self.history = [[0; 64]; 64];
    }

    pub fn order(
        &self,
        board: &Board,
        depth: u8,
        principal_variation: &[Move],
        hash_move: Option<Move>,
    ) -> Vec<Move> {
        let mut remaining = board.legal_moves();
        let mut ordered = Vec::with_capacity(remaining.len());

        if let Some(hash_move) = hash_move {
            if let Some(i) = remaining.iter().position(|&m| m == hash_move) {
                ordered.push(remaining.swap_remove(i));
            }
        }

        if let Some(&pv_move) = principal_variation.first() {
            if let Some(i) = remaining.iter().position(|&m| m == pv_move) {
                ordered.push(remaining.swap_remove(i));
            }
        }

        let (captures, mut quiets): (Vec<Move>, Vec<Move>) =
            remaining.into_iter().partition(|&m| board.is_capture(m));

        let mut scored_captures: Vec<(Move, i32)> = captures
            .into_iter()
            .map(|m| (m, mvv_lva(board, m)))
            .collect();
        scored_captures.sort_by(|a, b| b.1.cmp(&a.1));
        ordered.extend(scored_captures.into_iter().map(|(m, _)| m));

        if let Some(killers) = self.killers.get(depth as usize) {
            for killer in killers.iter().flatten() {
                if let Some(i) = quiets.iter().position(|&m| m == *killer) {
                    ordered.push(quiets.swap_remove(i));
                }
            }
        }

        let mut scored_quiets: Vec<(Move, u32)> = quiets
            .into_iter()
            .map(|m| (m, self.quiet_score(m)))
            .collect();
        scored_quiets.sort_by(|a, b| b.1.cmp(&a.1));
        ordered.extend(scored_quiets.into_iter().map(|(m, _)| m));

        ordered
    }

    /// Records a quiet move that produced a beta cutoff: it becomes the
    /// first killer for its depth and its history counter grows with the
    /// square of the remaining depth.
    pub fn record_cutoff(&mut self, mv: Move, depth: u8) {
        if let Some(killers) = self.killers.get_mut(depth as usize) {
            if killers[0] != Some(mv) {
                killers[1] = killers[0];
                killers[0] = Some(mv);
            }
        }
        let entry = &mut self.history[usize::from(mv.from)][usize::from(mv.to)];
        *entry = entry.saturating_add(u32::from(depth) * u32::from(depth));
    }

    pub fn killers_at(&self, depth: u8) -> [Option<Move>; KILLER_SLOTS] {
        self.killers
            .get(depth as usize)
            .copied()
            .unwrap_or([None; KILLER_SLOTS])
    }

    fn quiet_score(&self, mv: Move) -> u32 {
        let mut score = self.history[usize::from(mv.from)][usize::from(mv.to)];
        // Quiet promotions are ordered as if their history already proved
        // the promoted piece's worth.
        if let Some(role) = mv.promotion {
            score = score.saturating_add(piece_value(role) as u32);
        }
        score
    }
}

impl Default for MoveOrderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Most valuable victim, least valuable aggressor.
pub(crate) fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = board.role_at(mv.to).map(piece_value).unwrap_or(100);
    let aggressor = board.role_at(mv.from).map(piece_value).unwrap_or(0);
    100 * victim - aggressor
}
