use crate::board::Move;
use crate::error::{EngineError, Result};
use shakmaty::attacks;
use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move as RuleMove, Piece, Position, Role,
    Square,
};

/// The position service for the search layer: a full chess position with a
/// LIFO make/unmake stack, built on the shakmaty rules library.
///
/// `push` and `pop` are exact inverses; after any balanced sequence the
/// observable state (placement, side to move, castling rights, en passant,
/// clocks) equals the state before it. Prior position hashes are retained so
/// claimable threefold repetition is visible to the search.
#[derive(Clone)]
pub struct Board {
    chess: Chess,
    undo_stack: Vec<Chess>,
    hash_history: Vec<u64>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            chess: Chess::default(),
            undo_stack: Vec::new(),
            hash_history: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let setup: Fen = fen
            .parse()
            .map_err(|e| EngineError::InvalidFen(format!("{}: {}", fen, e)))?;
        let chess: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| EngineError::InvalidFen(format!("{}: {}", fen, e)))?;
        Ok(Board {
            chess,
            undo_stack: Vec::new(),
            hash_history: Vec::new(),
        })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.chess.clone(), EnPassantMode::Legal).to_string()
    }

    pub(crate) fn as_rules(&self) -> &Chess {
        &self.chess
    }

    pub fn turn(&self) -> Color {
        self.chess.turn()
    }

    /// +1 when White is to move, -1 when Black is to move.
    pub fn side_multiplier(&self) -> i32 {
        match self.chess.turn() {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.chess.halfmoves()
    }

    pub fn fullmove_number(&self) -> u32 {
        self.chess.fullmoves().get()
    }

    // --- Move generation and resolution ---

    pub fn legal_moves(&self) -> Vec<Move> {
        self.chess
            .legal_moves()
            .iter()
            .filter_map(Move::from_rule_move)
            .collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        !self.chess.legal_moves().is_empty()
    }

    /// Moves that obey piece movement and occupancy but ignore whether the
    /// own king is left in check. Castling is omitted.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let board = self.chess.board();
        let us = self.chess.turn();
        let own = board.by_color(us);
        let enemy = board.by_color(!us);
        let occupied = board.occupied();
        let ep_square = self.chess.ep_square(EnPassantMode::Legal);

        let mut moves = Vec::new();
        for from in own {
            let Some(piece) = board.piece_at(from) else {
                continue;
            };
            if piece.role == Role::Pawn {
                let mut targets = attacks::pawn_attacks(us, from) & enemy;
                if let Some(ep) = ep_square {
                    if attacks::pawn_attacks(us, from).contains(ep) {
                        targets |= Bitboard::from(ep);
                    }
                }
                let forward = match us {
                    Color::White => from.offset(8),
                    Color::Black => from.offset(-8),
                };
                if let Some(step) = forward.filter(|&sq| !occupied.contains(sq)) {
                    targets |= Bitboard::from(step);
                    let start_rank = match us {
                        Color::White => 1,
                        Color::Black => 6,
                    };
                    if u32::from(from.rank()) == start_rank {
                        let double = match us {
                            Color::White => from.offset(16),
                            Color::Black => from.offset(-16),
                        };
                        if let Some(jump) = double.filter(|&sq| !occupied.contains(sq)) {
                            targets |= Bitboard::from(jump);
                        }
                    }
                }
                for to in targets {
                    let back_rank = match us {
                        Color::White => 7,
                        Color::Black => 0,
                    };
                    if u32::from(to.rank()) == back_rank {
                        for role in [Role::Queen, Role::Rook, Role::Bishop, Role::Knight] {
                            moves.push(Move::promoting(from, to, role));
                        }
                    } else {
                        moves.push(Move::new(from, to));
                    }
                }
            } else {
                for to in board.attacks_from(from) & !own {
                    moves.push(Move::new(from, to));
                }
            }
        }
        moves
    }

    /// Maps a coordinate move onto the legal move set. `None` means the move
    /// is not legal here; callers holding moves from caches treat that as a
    /// signal to discard, never as an error.
    pub fn resolve(&self, mv: Move) -> Option<RuleMove> {
        self.chess
            .legal_moves()
            .into_iter()
            .find(|rm| Move::from_rule_move(rm) == Some(mv))
    }

    // --- Make / unmake ---

    pub fn push(&mut self, mv: Move) -> Result<()> {
        let rule_move = self.resolve(mv).ok_or_else(|| {
            EngineError::IllegalMove(format!("{} is not legal in {}", mv, self.fen()))
        })?;
        self.hash_history.push(self.zobrist_hash());
        self.undo_stack.push(self.chess.clone());
        self.chess.play_unchecked(&rule_move);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<()> {
        let previous = self
            .undo_stack
            .pop()
            .ok_or_else(|| EngineError::IllegalMove("no move to undo".to_string()))?;
        self.hash_history.pop();
        self.chess = previous;
        Ok(())
    }

    /// Passes the turn to the opponent, clearing the en-passant square. Only
    /// legal when the side to move is not in check.
    pub fn push_null(&mut self) -> Result<()> {
        if self.is_check() {
            return Err(EngineError::IllegalMove(
                "null move while in check".to_string(),
            ));
        }
        let next = self
            .chess
            .clone()
            .swap_turn()
            .map_err(|e| EngineError::IllegalMove(format!("null move rejected: {}", e)))?;
        self.hash_history.push(self.zobrist_hash());
        self.undo_stack.push(self.chess.clone());
        self.chess = next;
        Ok(())
    }

    pub fn pop_null(&mut self) -> Result<()> {
        self.pop()
    }

    // --- Move properties ---

    pub fn is_capture(&self, mv: Move) -> bool {
        self.resolve(mv).map(|rm| rm.is_capture()).unwrap_or(false)
    }

    /// A capture or a pawn move; these reset the halfmove clock.
    pub fn is_zeroing(&self, mv: Move) -> bool {
        self.resolve(mv).map(|rm| rm.is_zeroing()).unwrap_or(false)
    }

    pub fn gives_check(&self, mv: Move) -> bool {
        match self.resolve(mv) {
            Some(rule_move) => {
                let mut next = self.chess.clone();
                next.play_unchecked(&rule_move);
                next.is_check()
            }
            None => false,
        }
    }

    // --- Board queries ---

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.chess.board().piece_at(square)
    }

    pub fn role_at(&self, square: Square) -> Option<Role> {
        self.chess.board().role_at(square)
    }

    pub fn pieces(&self) -> Vec<(Square, Piece)> {
        let board = self.chess.board();
        board
            .occupied()
            .into_iter()
            .filter_map(|sq| board.piece_at(sq).map(|piece| (sq, piece)))
            .collect()
    }

    pub fn by_piece(&self, color: Color, role: Role) -> Bitboard {
        self.chess.board().by_piece(Piece { color, role })
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        self.chess.board().king_of(color)
    }

    pub fn occupied(&self) -> Bitboard {
        self.chess.board().occupied()
    }

    pub fn piece_count(&self) -> usize {
        self.chess.board().occupied().count()
    }

    /// Squares attacked by the piece standing on `square`.
    pub fn attacks(&self, square: Square) -> Bitboard {
        self.chess.board().attacks_from(square)
    }

    /// Pieces of `color` attacking `square`.
    pub fn attackers(&self, color: Color, square: Square) -> Bitboard {
        let board = self.chess.board();
        board.attacks_to(square, color, board.occupied())
    }

    /// Absolute pin: moving the piece on `square` would expose its own king
    /// to an enemy slider.
    pub fn is_pinned(&self, color: Color, square: Square) -> bool {
        let board = self.chess.board();
        let Some(king) = board.king_of(color) else {
            return false;
        };
        if king == square || !board.by_color(color).contains(square) {
            return false;
        }

        let occupied = board.occupied();
        let without = occupied ^ Bitboard::from(square);
        let enemy = board.by_color(!color);
        let rook_like = (board.by_role(Role::Rook) | board.by_role(Role::Queen)) & enemy;
        let bishop_like = (board.by_role(Role::Bishop) | board.by_role(Role::Queen)) & enemy;

        let newly_rook = attacks::rook_attacks(king, without) & rook_like
            & !(attacks::rook_attacks(king, occupied) & rook_like);
        if newly_rook.any() {
            return true;
        }
        let newly_bishop = attacks::bishop_attacks(king, without) & bishop_like
            & !(attacks::bishop_attacks(king, occupied) & bishop_like);
        newly_bishop.any()
    }

    // --- Game state ---

    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.chess.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.chess.is_insufficient_material()
    }

    pub fn is_fifty_moves(&self) -> bool {
        self.chess.halfmoves() >= 100
    }

    pub fn is_seventyfive_moves(&self) -> bool {
        self.chess.halfmoves() >= 150
    }

    /// Claimable threefold repetition: the current position occurred at least
    /// twice before on this board's make/unmake history.
    pub fn is_threefold_repetition(&self) -> bool {
        let current = self.zobrist_hash();
        self.hash_history.iter().filter(|&&h| h == current).count() >= 2
    }

    /// Any drawn outcome the side to move could claim or is forced into.
    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_fifty_moves()
            || self.is_threefold_repetition()
    }

    /// 64-bit Polyglot-compatible hash of placement, side to move, castling
    /// rights, and the en-passant file when a legal capture exists.
    pub fn zobrist_hash(&self) -> u64 {
        self.chess
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .0
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
