// Polyglot opening book reader. Books are flat files of 16-byte big-endian
// records (key, move, weight, learn) sorted by key; probing is a binary
// search plus weight-proportional sampling among the matching entries.

use crate::board::{Board, Move};
use crate::error::{EngineError, Result};
use rand::Rng;
use shakmaty::{File, Rank, Role, Square};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
struct BookEntry {
    key: u64,
    raw_move: u16,
    weight: u16,
}

pub struct OpeningBook {
    entries: Vec<BookEntry>,
}

impl OpeningBook {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|e| EngineError::BookLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            EngineError::BookLoad(msg) => {
                EngineError::BookLoad(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % 16 != 0 {
            return Err(EngineError::BookLoad(format!(
                "{} bytes is not a sequence of 16-byte records",
                bytes.len()
            )));
        }

        let mut entries = Vec::with_capacity(bytes.len() / 16);
        for r in bytes.chunks_exact(16) {
            entries.push(BookEntry {
                key: u64::from_be_bytes([r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7]]),
                raw_move: u16::from_be_bytes([r[8], r[9]]),
                weight: u16::from_be_bytes([r[10], r[11]]),
            });
        }
        entries.sort_by_key(|entry| entry.key);

        Ok(OpeningBook { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Samples a legal book move for the position, weighting entries by
    /// their stored weight. Entries that do not decode to a legal move are
    /// skipped rather than trusted.
    pub fn weighted_choice(&self, board: &Board) -> Option<Move> {
        let key = board.zobrist_hash();
        let start = self.entries.partition_point(|entry| entry.key < key);
        let candidates: Vec<(Move, u32)> = self.entries[start..]
            .iter()
            .take_while(|entry| entry.key == key)
            .filter_map(|entry| {
                decode_move(entry.raw_move, board).map(|mv| (mv, u32::from(entry.weight).max(1)))
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let total: u32 = candidates.iter().map(|(_, weight)| weight).sum();
        let mut pick = rand::thread_rng().gen_range(0..total);
        for (mv, weight) in &candidates {
            if pick < *weight {
                return Some(*mv);
            }
            pick -= weight;
        }
        None
    }
}

/// Polyglot move encoding: three bits each for destination file/rank and
/// source file/rank, then the promotion piece. Castling is stored as the
/// king capturing its own rook and is normalized to the king's travel.
fn decode_move(raw: u16, board: &Board) -> Option<Move> {
    let raw = u32::from(raw);
    let to = Square::from_coords(File::new(raw & 7), Rank::new((raw >> 3) & 7));
    let from = Square::from_coords(File::new((raw >> 6) & 7), Rank::new((raw >> 9) & 7));
    let promotion = match (raw >> 12) & 7 {
        0 => None,
        1 => Some(Role::Knight),
        2 => Some(Role::Bishop),
        3 => Some(Role::Rook),
        4 => Some(Role::Queen),
        _ => return None,
    };

    let mv = Move {
        from,
        to,
        promotion,
    };
    if board.resolve(mv).is_some() {
        return Some(mv);
    }

    let castle = match (from, to) {
        (Square::E1, Square::H1) => Some(Move::new(Square::E1, Square::G1)),
        (Square::E1, Square::A1) => Some(Move::new(Square::E1, Square::C1)),
        (Square::E8, Square::H8) => Some(Move::new(Square::E8, Square::G8)),
        (Square::E8, Square::A8) => Some(Move::new(Square::E8, Square::C8)),
        _ => None,
    };
    castle.filter(|&mv| board.resolve(mv).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: u64, raw_move: u16, weight: u16) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&key.to_be_bytes());
        bytes[8..10].copy_from_slice(&raw_move.to_be_bytes());
        bytes[10..12].copy_from_slice(&weight.to_be_bytes());
        bytes
    }

    fn encode(from_file: u16, from_rank: u16, to_file: u16, to_rank: u16) -> u16 {
        (from_rank << 9) | (from_file << 6) | (to_rank << 3) | to_file
    }

    #[test]
    fn test_rejects_truncated_books() {
        assert!(OpeningBook::from_bytes(&[0u8; 15]).is_err());
        assert!(OpeningBook::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_finds_weighted_move_for_position() {
        let board = Board::new();
        // e2e4 with full weight.
        let bytes = record(board.zobrist_hash(), encode(4, 1, 4, 3), 100);
        let book = OpeningBook::from_bytes(&bytes).unwrap();

        assert_eq!(book.len(), 1);
        let mv = book.weighted_choice(&board).unwrap();
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_misses_unknown_position() {
        let board = Board::new();
        let bytes = record(board.zobrist_hash() ^ 1, encode(4, 1, 4, 3), 100);
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        assert!(book.weighted_choice(&board).is_none());
    }

    #[test]
    fn test_illegal_entries_are_skipped() {
        let board = Board::new();
        // e2e5 is never legal from the starting position.
        let bytes = record(board.zobrist_hash(), encode(4, 1, 4, 4), 100);
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        assert!(book.weighted_choice(&board).is_none());
    }

    #[test]
    fn test_zero_weight_entries_still_selectable() {
        let board = Board::new();
        let bytes = record(board.zobrist_hash(), encode(4, 1, 4, 3), 0);
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        assert_eq!(book.weighted_choice(&board).map(|m| m.to_string()), Some("e2e4".into()));
    }

    #[test]
    fn test_castling_normalized_from_king_takes_rook() {
        let board = Board::from_fen(
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 5",
        )
        .unwrap();
        // e1h1 in Polyglot encoding.
        let bytes = record(board.zobrist_hash(), encode(4, 0, 7, 0), 1);
        let book = OpeningBook::from_bytes(&bytes).unwrap();
        assert_eq!(
            book.weighted_choice(&board).map(|m| m.to_string()),
            Some("e1g1".into())
        );
    }

    #[test]
    fn test_sampling_only_returns_listed_moves() {
        let board = Board::new();
        let key = board.zobrist_hash();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&record(key, encode(4, 1, 4, 3), 10)); // e2e4
        bytes.extend_from_slice(&record(key, encode(3, 1, 3, 3), 5)); // d2d4
        let book = OpeningBook::from_bytes(&bytes).unwrap();

        for _ in 0..32 {
            let mv = book.weighted_choice(&board).unwrap().to_string();
            assert!(mv == "e2e4" || mv == "d2d4");
        }
    }
}
