use crate::board::Move;
use std::collections::HashMap;

/// What a stored score proves about the true value at its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is the minimax value.
    Exact,
    /// A beta cutoff occurred; the true value is >= the score.
    Lower,
    /// No move raised alpha; the true value is <= the score.
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

/// Outcome of a probe at a given depth and window. The stored move is
/// surfaced on every non-empty outcome so the orderer can use it even when
/// the stored depth was insufficient for a cutoff.
#[derive(Debug, Clone, Copy)]
pub enum TtProbe {
    /// Return the score immediately.
    Cutoff { score: i32, best_move: Option<Move> },
    /// The window tightened but the search must continue.
    Narrowed {
        alpha: i32,
        beta: i32,
        best_move: Option<Move>,
    },
    Miss { best_move: Option<Move> },
}

impl TtProbe {
    pub fn best_move(&self) -> Option<Move> {
        match *self {
            TtProbe::Cutoff { best_move, .. }
            | TtProbe::Narrowed { best_move, .. }
            | TtProbe::Miss { best_move } => best_move,
        }
    }
}

/// Bounded cache of searched positions keyed by Zobrist hash. The same key
/// is always overwritten; at capacity an arbitrary entry makes room.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    table: HashMap<u64, TtEntry>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        TranspositionTable {
            table: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn probe(&self, key: u64, depth: u8, alpha: i32, beta: i32) -> TtProbe {
        let Some(entry) = self.table.get(&key) else {
            return TtProbe::Miss { best_move: None };
        };
        let best_move = entry.best_move;

        if entry.depth < depth {
            return TtProbe::Miss { best_move };
        }

        let (alpha, beta) = match entry.bound {
            Bound::Exact => {
                return TtProbe::Cutoff {
                    score: entry.score,
                    best_move,
                }
            }
            Bound::Lower => (alpha.max(entry.score), beta),
            Bound::Upper => (alpha, beta.min(entry.score)),
        };

        if alpha >= beta {
            TtProbe::Cutoff {
                score: entry.score,
                best_move,
            }
        } else {
            TtProbe::Narrowed {
                alpha,
                beta,
                best_move,
            }
        }
    }

    /// The stored move alone, for ordering on shallow entries.
    pub fn stored_move(&self, key: u64) -> Option<Move> {
        self.table.get(&key).and_then(|entry| entry.best_move)
    }

    pub fn store(&mut self, key: u64, depth: u8, score: i32, bound: Bound, best_move: Option<Move>) {
        if self.table.len() >= self.capacity && !self.table.contains_key(&key) {
            if let Some(&evicted) = self.table.keys().next() {
                self.table.remove(&evicted);
            }
        }
        self.table.insert(
            key,
            TtEntry {
                key,
                depth,
                score,
                bound,
                best_move,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}
