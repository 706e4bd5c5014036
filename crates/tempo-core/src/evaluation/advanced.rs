// Full positional evaluation: material, placement, pawn structure, mobility,
// centre control, space, outposts, king safety, coordination and threats,
// interpolated between opening and endgame weights by the game phase.

use crate::board::Board;
use crate::evaluation::{game_phase, piece_value, pst_value, taper, terminal_score};
use shakmaty::{Bitboard, Color, Piece, Role, Square};
use std::collections::HashMap;

pub const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

pub const FORK_BONUS: i32 = 40;
pub const FORK_CHECK_BONUS: i32 = 80;
pub const PIN_ABSOLUTE_BONUS: i32 = 80;

/// Below this phase the endgame adjustments (king activity, runner bonuses,
/// far-advanced passer bonuses) kick in.
const ENDGAME_PHASE: f32 = 0.2;

const FILE_A_MASK: u64 = 0x0101_0101_0101_0101;

fn file_bitboard(file: u32) -> Bitboard {
    Bitboard(FILE_A_MASK << file)
}

/// Derived quantities for the position currently being evaluated, keyed by
/// its Zobrist hash and rebuilt whenever the hash changes. Attack and
/// attacker sets are queried several times per evaluation (mobility, centre,
/// space, threats), so they are worth remembering within a position.
struct DerivedCache {
    key: u64,
    attacks: HashMap<Square, Bitboard>,
    attackers: HashMap<(Square, Color), Bitboard>,
    pins: HashMap<(Color, Square), bool>,
}

impl DerivedCache {
    fn new() -> Self {
        DerivedCache {
            key: 0,
            attacks: HashMap::new(),
            attackers: HashMap::new(),
            pins: HashMap::new(),
        }
    }

    fn rekey(&mut self, key: u64) {
        if self.key != key {
            self.key = key;
            self.attacks.clear();
            self.attackers.clear();
            self.pins.clear();
        }
    }
}

/// The normative evaluator. Returns White-relative centipawns; the search
/// multiplies by the side-to-move sign. Pure with respect to the board.
pub struct AdvancedEvaluator {
    score_cache: HashMap<u64, i32>,
    score_cache_capacity: usize,
    derived: DerivedCache,
    cache_hits: u64,
    cache_misses: u64,
}

impl AdvancedEvaluator {
    pub fn new() -> Self {
        AdvancedEvaluator {
            score_cache: HashMap::with_capacity(1024 * 64),
            score_cache_capacity: 1024 * 64,
            derived: DerivedCache::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    pub fn evaluate(&mut self, board: &Board) -> i32 {
        if let Some(score) = terminal_score(board) {
            return score;
        }

        let key = board.zobrist_hash();
        if let Some(&score) = self.score_cache.get(&key) {
            self.cache_hits += 1;
            return score;
        }
        self.cache_misses += 1;
        self.derived.rekey(key);

        let score = self.compute(board);

        if self.score_cache.len() >= self.score_cache_capacity {
            self.score_cache.clear();
        }
        self.score_cache.insert(key, score);
        score
    }

    pub fn cache_stats(&self) -> (u64, u64, f64) {
        let total = self.cache_hits + self.cache_misses;
        let hit_rate = if total > 0 {
            self.cache_hits as f64 / total as f64
        } else {
            0.0
        };
        (self.cache_hits, self.cache_misses, hit_rate)
    }

    pub fn clear_caches(&mut self) {
        self.score_cache.clear();
        self.derived = DerivedCache::new();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    fn compute(&mut self, board: &Board) -> i32 {
        let phase = game_phase(board);
        let pieces = board.pieces();
        let white_pawns = board.by_piece(Color::White, Role::Pawn);
        let black_pawns = board.by_piece(Color::Black, Role::Pawn);

        let mut total = 0;

        total += material_balance(&pieces);
        total += placement(&pieces, phase);
        total += pawn_structure(white_pawns, black_pawns, phase);

        let (mobility, white_attacked, black_attacked) = self.mobility_and_coverage(board, phase);
        total += mobility;
        total += centre_control(board, white_attacked, black_attacked);
        total += space(white_attacked, black_attacked);

        total += outposts(&pieces, white_pawns, black_pawns);
        total += self.king_safety(board, white_pawns, black_pawns);
        total += coordination(board, white_pawns, black_pawns);
        total += rooks_on_seventh(board);
        total += self.threats(board, &pieces, phase);

        if phase < ENDGAME_PHASE {
            total += self.endgame_adjustments(board, white_pawns, black_pawns);
        }

        total
    }

    // --- Memoised board queries ---

    fn attacks(&mut self, board: &Board, square: Square) -> Bitboard {
        if let Some(&bb) = self.derived.attacks.get(&square) {
            return bb;
        }
        let bb = board.attacks(square);
        self.derived.attacks.insert(square, bb);
        bb
    }

    fn attackers(&mut self, board: &Board, color: Color, square: Square) -> Bitboard {
        if let Some(&bb) = self.derived.attackers.get(&(square, color)) {
            return bb;
        }
        let bb = board.attackers(color, square);
        self.derived.attackers.insert((square, color), bb);
        bb
    }

    fn is_pinned(&mut self, board: &Board, color: Color, square: Square) -> bool {
        if let Some(&pinned) = self.derived.pins.get(&(color, square)) {
            return pinned;
        }
        let pinned = board.is_pinned(color, square);
        self.derived.pins.insert((color, square), pinned);
        pinned
    }

    // --- Terms that need the caches ---

    /// Mobility of knights, bishops, rooks and queens, weighted 4 (opening)
    /// down to 2 (endgame). Also returns each side's attack coverage for the
    /// centre and space terms.
    fn mobility_and_coverage(&mut self, board: &Board, phase: f32) -> (i32, Bitboard, Bitboard) {
        let mut white_mobility = 0;
        let mut black_mobility = 0;
        let mut white_attacked = Bitboard::EMPTY;
        let mut black_attacked = Bitboard::EMPTY;

        for role in [Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
            for square in board.by_piece(Color::White, role) {
                let attacked = self.attacks(board, square);
                white_mobility += attacked.count() as i32;
                white_attacked |= attacked;
            }
            for square in board.by_piece(Color::Black, role) {
                let attacked = self.attacks(board, square);
                black_mobility += attacked.count() as i32;
                black_attacked |= attacked;
            }
        }

        let weight = taper(4.0, 2.0, phase);
        let score = ((white_mobility - black_mobility) as f32 * weight) as i32;
        (score, white_attacked, black_attacked)
    }

    /// Pawn shield around the king and exposure on a file that is semi-open
    /// for the opponent.
    fn king_safety(&mut self, board: &Board, white_pawns: Bitboard, black_pawns: Bitboard) -> i32 {
        let mut score = 0;

        for color in [Color::White, Color::Black] {
            let Some(king) = board.king(color) else {
                continue;
            };
            let zone = self.attacks(board, king) | Bitboard::from(king);
            let own_pawns = if color.is_white() {
                white_pawns
            } else {
                black_pawns
            };
            let shield = (own_pawns & zone).count() as i32;

            let king_file = file_bitboard(u32::from(king.file()));
            let enemy_pawns = if color.is_white() {
                black_pawns
            } else {
                white_pawns
            };
            // Semi-open for the opponent: their pawns on the file, none of ours.
            let exposed = (own_pawns & king_file).is_empty() && (enemy_pawns & king_file).any();

            let safety = shield * 10 - if exposed { 20 } else { 0 };
            score += if color.is_white() { safety } else { -safety };
        }

        score
    }

    /// Hanging pieces (more attackers than defenders), absolute pins, and
    /// knight or queen forks, weighted 0.9 (opening) down to 0.5 (endgame).
    fn threats(&mut self, board: &Board, pieces: &[(Square, Piece)], phase: f32) -> i32 {
        let mut white_threats = 0;
        let mut black_threats = 0;

        for &(square, piece) in pieces {
            let enemy = !piece.color;
            let attackers = self.attackers(board, enemy, square);
            if attackers.any() {
                let defenders = self.attackers(board, piece.color, square);
                if attackers.count() > defenders.count() {
                    let value = match piece.role {
                        Role::Pawn => 6,
                        Role::Knight | Role::Bishop => 12,
                        Role::Rook => 20,
                        Role::Queen => 30,
                        Role::King => 0,
                    };
                    if piece.color.is_white() {
                        black_threats += value;
                    } else {
                        white_threats += value;
                    }
                }
            }

            if piece.role != Role::King && self.is_pinned(board, piece.color, square) {
                if piece.color.is_white() {
                    black_threats += PIN_ABSOLUTE_BONUS;
                } else {
                    white_threats += PIN_ABSOLUTE_BONUS;
                }
            }
        }

        for color in [Color::White, Color::Black] {
            let enemy = !color;
            let enemy_targets = board.by_piece(enemy, Role::Knight)
                | board.by_piece(enemy, Role::Bishop)
                | board.by_piece(enemy, Role::Rook)
                | board.by_piece(enemy, Role::Queen);
            let enemy_king = board.king(enemy);

            for role in [Role::Knight, Role::Queen] {
                for square in board.by_piece(color, role) {
                    let attacked = self.attacks(board, square);
                    let mut targets = (attacked & enemy_targets).count();
                    let checks_king = enemy_king.map(|k| attacked.contains(k)).unwrap_or(false);
                    if checks_king {
                        targets += 1;
                    }
                    if targets >= 2 {
                        let bonus = if checks_king {
                            FORK_CHECK_BONUS
                        } else {
                            FORK_BONUS
                        };
                        if color.is_white() {
                            white_threats += bonus;
                        } else {
                            black_threats += bonus;
                        }
                    }
                }
            }
        }

        let weight = taper(0.9, 0.5, phase);
        ((white_threats - black_threats) as f32 * weight) as i32
    }

    /// Deep-endgame extras: an active king and pawns about to run home.
    fn endgame_adjustments(
        &mut self,
        board: &Board,
        white_pawns: Bitboard,
        black_pawns: Bitboard,
    ) -> i32 {
        let mut score = 0;

        let white_activity = board
            .king(Color::White)
            .map(|k| self.attacks(board, k).count() as i32)
            .unwrap_or(0);
        let black_activity = board
            .king(Color::Black)
            .map(|k| self.attacks(board, k).count() as i32)
            .unwrap_or(0);
        score += (white_activity - black_activity) * 8;

        for square in white_pawns {
            if u32::from(square.rank()) >= 6 {
                score += 100;
            }
        }
        for square in black_pawns {
            if u32::from(square.rank()) <= 1 {
                score -= 100;
            }
        }

        score
    }
}

impl Default for AdvancedEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

// --- Stateless terms ---

fn material_balance(pieces: &[(Square, Piece)]) -> i32 {
    let mut score = 0;
    for &(_, piece) in pieces {
        if piece.role == Role::King {
            continue;
        }
        let value = piece_value(piece.role);
        score += if piece.color.is_white() { value } else { -value };
    }
    score
}

fn placement(pieces: &[(Square, Piece)], phase: f32) -> i32 {
    let mut score = 0;
    for &(square, piece) in pieces {
        let value = pst_value(piece.role, piece.color, square, phase);
        score += if piece.color.is_white() { value } else { -value };
    }
    score
}

fn pawn_structure(white_pawns: Bitboard, black_pawns: Bitboard, phase: f32) -> i32 {
    let mut score = 0;

    // Passed pawns: nothing of the enemy on this or an adjacent file ahead.
    for pawn in white_pawns {
        let (file, rank) = (u32::from(pawn.file()), u32::from(pawn.rank()));
        let blocked = black_pawns.into_iter().any(|p| {
            u32::from(p.file()).abs_diff(file) <= 1 && u32::from(p.rank()) > rank
        });
        if !blocked {
            let mut bonus = 40 + 15 * rank as i32;
            if phase < ENDGAME_PHASE && rank >= 5 {
                bonus += 100;
            }
            score += bonus;
        }
    }
    for pawn in black_pawns {
        let (file, rank) = (u32::from(pawn.file()), u32::from(pawn.rank()));
        let blocked = white_pawns.into_iter().any(|p| {
            u32::from(p.file()).abs_diff(file) <= 1 && u32::from(p.rank()) < rank
        });
        if !blocked {
            let mut bonus = 40 + 15 * (7 - rank) as i32;
            if phase < ENDGAME_PHASE && rank <= 2 {
                bonus += 100;
            }
            score -= bonus;
        }
    }

    // Doubled pawns: each extra pawn on a file costs its owner 15.
    for file in 0..8 {
        let mask = file_bitboard(file);
        let white_on_file = (white_pawns & mask).count() as i32;
        let black_on_file = (black_pawns & mask).count() as i32;
        if white_on_file > 1 {
            score -= 15 * (white_on_file - 1);
        }
        if black_on_file > 1 {
            score += 15 * (black_on_file - 1);
        }
    }

    score
}

fn centre_control(board: &Board, white_attacked: Bitboard, black_attacked: Bitboard) -> i32 {
    let mut score = 0;
    for square in CENTER_SQUARES {
        if let Some(piece) = board.piece_at(square) {
            if piece.role == Role::Pawn {
                score += if piece.color.is_white() { 30 } else { -30 };
            }
        }
        if white_attacked.contains(square) {
            score += 10;
        }
        if black_attacked.contains(square) {
            score -= 10;
        }
    }
    score
}

/// Squares controlled by exactly one side in the half of the board that side
/// is pressing into.
fn space(white_attacked: Bitboard, black_attacked: Bitboard) -> i32 {
    let mut score = 0;
    for square in white_attacked & !black_attacked {
        if u32::from(square.rank()) >= 3 {
            score += 6;
        }
    }
    for square in black_attacked & !white_attacked {
        if u32::from(square.rank()) <= 4 {
            score -= 6;
        }
    }
    score
}

/// A minor piece in enemy territory, supported by a friendly pawn, with no
/// enemy pawn able to evict it.
fn outposts(pieces: &[(Square, Piece)], white_pawns: Bitboard, black_pawns: Bitboard) -> i32 {
    let mut score = 0;

    for &(square, piece) in pieces {
        if piece.role != Role::Knight && piece.role != Role::Bishop {
            continue;
        }
        let (file, rank) = (u32::from(square.file()), u32::from(square.rank()));

        let outpost = match piece.color {
            Color::White if (3..=5).contains(&rank) => {
                let supported = white_pawns.into_iter().any(|p| {
                    u32::from(p.file()).abs_diff(file) == 1 && u32::from(p.rank()) + 1 == rank
                });
                let evictable = black_pawns.into_iter().any(|p| {
                    u32::from(p.file()).abs_diff(file) <= 1 && u32::from(p.rank()) > rank
                });
                supported && !evictable
            }
            Color::Black if (2..=4).contains(&rank) => {
                let supported = black_pawns.into_iter().any(|p| {
                    u32::from(p.file()).abs_diff(file) == 1 && u32::from(p.rank()) == rank + 1
                });
                let evictable = white_pawns.into_iter().any(|p| {
                    u32::from(p.file()).abs_diff(file) <= 1 && u32::from(p.rank()) < rank
                });
                supported && !evictable
            }
            _ => false,
        };

        if outpost {
            score += if piece.color.is_white() { 20 } else { -20 };
        }
    }

    score
}

/// Bishop pair and a rook-plus-queen battery on an open file.
fn coordination(board: &Board, white_pawns: Bitboard, black_pawns: Bitboard) -> i32 {
    let mut score = 0;

    if board.by_piece(Color::White, Role::Bishop).count() == 2 {
        score += 30;
    }
    if board.by_piece(Color::Black, Role::Bishop).count() == 2 {
        score -= 30;
    }

    let all_pawns = white_pawns | black_pawns;
    for file in 0..8 {
        let mask = file_bitboard(file);
        if (all_pawns & mask).any() {
            continue;
        }
        if (board.by_piece(Color::White, Role::Rook) & mask).any()
            && (board.by_piece(Color::White, Role::Queen) & mask).any()
        {
            score += 20;
        }
        if (board.by_piece(Color::Black, Role::Rook) & mask).any()
            && (board.by_piece(Color::Black, Role::Queen) & mask).any()
        {
            score -= 20;
        }
    }

    score
}

fn rooks_on_seventh(board: &Board) -> i32 {
    let white_on_seventh = board
        .by_piece(Color::White, Role::Rook)
        .into_iter()
        .filter(|r| u32::from(r.rank()) == 6)
        .count() as i32;
    let black_on_second = board
        .by_piece(Color::Black, Role::Rook)
        .into_iter()
        .filter(|r| u32::from(r.rank()) == 1)
        .count() as i32;
    (white_on_seventh - black_on_second) * 30
}
