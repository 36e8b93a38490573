//! The central position type: piece placement, make/undo, draw detection
//! and check queries. Move generation lives in [`movegen`]; FEN parsing and
//! formatting live in [`fen`].

mod fen;
pub mod movegen;

use crate::attacks;
use crate::types::{Bitboard, CastlingRights, Color, Move, Piece, SpecialKind, Square};
use crate::zobrist;

pub use fen::START_FEN;

/// One entry of the per-ply undo stack. Everything needed to invert
/// `make_move` without recomputation is captured here.
#[derive(Clone, Copy)]
struct HistoryRecord {
    mv: Move,
    captured: Piece,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    own_pieces: Bitboard,
    occupied: Bitboard,
    hash: u64,
}

#[derive(Clone)]
pub struct Position {
    /// `pieces[color.index()][piece.slot()]`: squares occupied by that
    /// color/kind.
    pieces: [[Bitboard; 6]; 2],
    /// Union of `pieces[color]` across kinds, one bitboard per color.
    occupied_color: [Bitboard; 2],
    occupied: Bitboard,
    mailbox: [Option<(Color, Piece)>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
    history: Vec<HistoryRecord>,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_fen(START_FEN).expect("embedded startpos FEN must parse")
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.mailbox[sq.as_usize()]
    }

    #[inline]
    pub fn pieces_of(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.slot()]
    }

    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied_color[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub fn own_pieces(&self) -> Bitboard {
        self.occupied_color[self.side_to_move.index()]
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.pieces_of(color, Piece::King)
            .lsb()
            .expect("both kings must be present")
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        let king = self.king_square(self.side_to_move);
        self.is_square_attacked(king, self.side_to_move.opposite())
    }

    fn place(&mut self, color: Color, piece: Piece, sq: Square) {
        self.pieces[color.index()][piece.slot()].set(sq);
        self.occupied_color[color.index()].set(sq);
        self.occupied.set(sq);
        self.mailbox[sq.as_usize()] = Some((color, piece));
        self.hash ^= zobrist::piece_key(color, piece, sq);
    }

    fn remove(&mut self, color: Color, piece: Piece, sq: Square) {
        self.pieces[color.index()][piece.slot()].clear(sq);
        self.occupied_color[color.index()].clear(sq);
        self.occupied.clear(sq);
        self.mailbox[sq.as_usize()] = None;
        self.hash ^= zobrist::piece_key(color, piece, sq);
    }

    /// True if `sq` is attacked by any piece of `attacker`, holding the
    /// board fixed (used both for "is this king in check" and for
    /// speculative king-safety checks during move generation).
    pub fn is_square_attacked(&self, sq: Square, attacker: Color) -> bool {
        self.is_square_attacked_with_occupancy(sq, attacker, self.occupied)
    }

    fn is_square_attacked_with_occupancy(
        &self,
        sq: Square,
        attacker: Color,
        occ: Bitboard,
    ) -> bool {
        let pawns = self.pieces[attacker.index()][Piece::Pawn.slot()];
        if attacks::pawn_attacks(sq, attacker.opposite()) & pawns != Bitboard::EMPTY {
            return true;
        }
        let knights = self.pieces[attacker.index()][Piece::Knight.slot()];
        if attacks::knight_attacks(sq) & knights != Bitboard::EMPTY {
            return true;
        }
        let king = self.pieces[attacker.index()][Piece::King.slot()];
        if attacks::king_attacks(sq) & king != Bitboard::EMPTY {
            return true;
        }
        let rooks_queens = self.pieces[attacker.index()][Piece::Rook.slot()]
            | self.pieces[attacker.index()][Piece::Queen.slot()];
        if attacks::slider_attacks(sq, occ, false) & rooks_queens != Bitboard::EMPTY {
            return true;
        }
        let bishops_queens = self.pieces[attacker.index()][Piece::Bishop.slot()]
            | self.pieces[attacker.index()][Piece::Queen.slot()];
        if attacks::slider_attacks(sq, occ, true) & bishops_queens != Bitboard::EMPTY {
            return true;
        }
        false
    }

    /// Would a king of the side to move standing on `sq` be attacked,
    /// holding every other piece fixed? The moving side's own king is
    /// excluded from the blocking occupancy so it can't shield itself.
    pub fn would_king_be_in_check(&self, sq: Square) -> bool {
        let own_king = self.pieces_of(self.side_to_move, Piece::King);
        let occ = self.occupied & !own_king;
        self.is_square_attacked_with_occupancy(sq, self.side_to_move.opposite(), occ)
    }

    #[inline]
    pub fn is_capture(&self, m: Move) -> bool {
        m.special() == SpecialKind::EnPassant || self.mailbox[m.to().as_usize()].is_some()
    }

    /// Applies `m`, assumed pseudo-legal-or-better (the move generator only
    /// ever emits fully legal moves, but `make_move` itself does not
    /// re-verify legality).
    pub fn make_move(&mut self, m: Move) {
        let mover = self.side_to_move;
        let (from, to) = (m.from(), m.to());
        let (_, moved_piece) = self.mailbox[from.as_usize()].expect("from-square must hold a piece");

        let captured = match m.special() {
            SpecialKind::EnPassant => Piece::Pawn,
            _ => self.mailbox[to.as_usize()].map(|(_, p)| p).unwrap_or(Piece::None),
        };

        let record = HistoryRecord {
            mv: m,
            captured,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            own_pieces: self.occupied_color[mover.index()],
            occupied: self.occupied,
            hash: self.hash,
        };

        self.hash ^= zobrist::en_passant_key(self.en_passant.map(|s| s.file_index()));
        self.hash ^= zobrist::castling_key(self.castling_rights.bits());

        if captured != Piece::None {
            let victim_sq = match m.special() {
                SpecialKind::EnPassant => {
                    let dir = if mover == Color::White {
                        crate::attacks::Direction::S
                    } else {
                        crate::attacks::Direction::N
                    };
                    step_one(to, dir)
                }
                _ => to,
            };
            self.remove(mover.opposite(), captured, victim_sq);
        }

        self.remove(mover, moved_piece, from);
        let placed_piece = m.promotion_piece().unwrap_or(moved_piece);
        self.place(mover, placed_piece, to);

        if m.special() == SpecialKind::Castle {
            let rank = from.rank_from_top();
            let (rook_from_file, rook_to_file) = if m.is_castle_kingside() {
                (7u8, 5u8)
            } else {
                (0u8, 3u8)
            };
            let rook_from = Square::from_file_rank(rook_from_file, 7 - rank);
            let rook_to = Square::from_file_rank(rook_to_file, 7 - rank);
            self.remove(mover, Piece::Rook, rook_from);
            self.place(mover, Piece::Rook, rook_to);
        }

        self.en_passant = None;
        if moved_piece == Piece::Pawn {
            let from_rank = from.rank_from_top() as i8;
            let to_rank = to.rank_from_top() as i8;
            if (from_rank - to_rank).abs() == 2 {
                let dir = if mover == Color::White {
                    crate::attacks::Direction::S
                } else {
                    crate::attacks::Direction::N
                };
                let ep_sq = step_one(from, dir);
                let enemy_pawns = self.pieces[mover.opposite().index()][Piece::Pawn.slot()];
                if attacks::pawn_attacks(ep_sq, mover) & enemy_pawns != Bitboard::EMPTY {
                    self.en_passant = Some(ep_sq);
                }
            }
        }

        if moved_piece == Piece::King {
            self.castling_rights.remove(CastlingRights::both(mover));
        }
        for (sq, mask) in [
            (Square::from_file_rank(0, if mover == Color::White { 0 } else { 7 }), CastlingRights::queen_side(mover)),
            (Square::from_file_rank(7, if mover == Color::White { 0 } else { 7 }), CastlingRights::king_side(mover)),
        ] {
            if from == sq || to == sq {
                self.castling_rights.remove(mask);
            }
        }
        let opp = mover.opposite();
        for (sq, mask) in [
            (Square::from_file_rank(0, if opp == Color::White { 0 } else { 7 }), CastlingRights::queen_side(opp)),
            (Square::from_file_rank(7, if opp == Color::White { 0 } else { 7 }), CastlingRights::king_side(opp)),
        ] {
            if from == sq || to == sq {
                self.castling_rights.remove(mask);
            }
        }

        self.halfmove_clock = if moved_piece == Piece::Pawn || captured != Piece::None {
            0
        } else {
            self.halfmove_clock + 1
        };

        if mover == Color::Black {
            self.fullmove_number += 1;
        }

        self.hash ^= zobrist::en_passant_key(self.en_passant.map(|s| s.file_index()));
        self.hash ^= zobrist::castling_key(self.castling_rights.bits());
        self.hash ^= zobrist::side_to_move_key();

        self.side_to_move = opp;
        self.history.push(record);
    }

    pub fn undo(&mut self) {
        let record = self.history.pop().expect("undo called with empty history");
        let mover = self.side_to_move.opposite();
        let m = record.mv;
        let (from, to) = (m.from(), m.to());

        let placed_piece = self.mailbox[to.as_usize()].map(|(_, p)| p).expect("to-square must hold the moved piece");
        let moved_piece = if m.special() == SpecialKind::Promotion {
            Piece::Pawn
        } else {
            placed_piece
        };

        self.remove(mover, placed_piece, to);
        self.place(mover, moved_piece, from);

        if m.special() == SpecialKind::Castle {
            let rank = from.rank_from_top();
            let (rook_from_file, rook_to_file) = if m.is_castle_kingside() {
                (7u8, 5u8)
            } else {
                (0u8, 3u8)
            };
            let rook_from = Square::from_file_rank(rook_from_file, 7 - rank);
            let rook_to = Square::from_file_rank(rook_to_file, 7 - rank);
            self.remove(mover, Piece::Rook, rook_to);
            self.place(mover, Piece::Rook, rook_from);
        }

        if record.captured != Piece::None {
            let victim_sq = match m.special() {
                SpecialKind::EnPassant => {
                    let dir = if mover == Color::White {
                        crate::attacks::Direction::S
                    } else {
                        crate::attacks::Direction::N
                    };
                    step_one(to, dir)
                }
                _ => to,
            };
            self.place(mover.opposite(), record.captured, victim_sq);
        }

        self.occupied_color[mover.index()] = record.own_pieces;
        self.occupied = record.occupied;
        self.castling_rights = record.castling_rights;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;
        self.hash = record.hash;
        self.side_to_move = mover;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
    }

    /// `distance_to_root` is the ply index of the current node measured
    /// from the root of the active search (0 = root). Ancestors at or
    /// below that depth within `history` count as the "in search path"
    /// side of the deliberately asymmetric repetition rule in §4.2.
    pub fn is_position_draw(&self, distance_to_root: usize) -> bool {
        if self.halfmove_clock >= 100 {
            return true;
        }
        if self.is_insufficient_material() {
            return true;
        }

        let len = self.history.len();
        let lookback = (self.halfmove_clock as usize).min(len);
        let mut prior_repetitions = 0u32;
        let mut idx = len;
        let mut steps_back = 0usize;
        while steps_back < lookback {
            idx -= 1;
            steps_back += 1;
            if steps_back % 2 != 0 {
                continue;
            }
            if self.history[idx].hash != self.hash {
                continue;
            }
            if steps_back <= distance_to_root {
                // Ancestor lies within the current search path: a single
                // repetition is treated as an immediate draw.
                return true;
            }
            // Ancestor predates the search root: fall back to a real
            // 3-fold count (2 earlier matches plus the current position).
            prior_repetitions += 1;
            if prior_repetitions >= 2 {
                return true;
            }
        }
        false
    }

    fn is_insufficient_material(&self) -> bool {
        let has_major_or_pawn = self.pieces[0][Piece::Pawn.slot()].popcount()
            + self.pieces[1][Piece::Pawn.slot()].popcount()
            + self.pieces[0][Piece::Rook.slot()].popcount()
            + self.pieces[1][Piece::Rook.slot()].popcount()
            + self.pieces[0][Piece::Queen.slot()].popcount()
            + self.pieces[1][Piece::Queen.slot()].popcount()
            > 0;
        if has_major_or_pawn {
            return false;
        }
        let minors = |c: Color| {
            self.pieces[c.index()][Piece::Knight.slot()].popcount()
                + self.pieces[c.index()][Piece::Bishop.slot()].popcount()
        };
        let total_minors = minors(Color::White) + minors(Color::Black);
        if total_minors <= 1 {
            return true;
        }
        let white_bishops = self.pieces[Color::White.index()][Piece::Bishop.slot()];
        let black_bishops = self.pieces[Color::Black.index()][Piece::Bishop.slot()];
        if white_bishops.popcount() == 1
            && black_bishops.popcount() == 1
            && minors(Color::White) == 1
            && minors(Color::Black) == 1
        {
            let wb = white_bishops.lsb().unwrap();
            let bb = black_bishops.lsb().unwrap();
            return square_color(wb) == square_color(bb);
        }
        false
    }
}

fn square_color(sq: Square) -> bool {
    (sq.file_index() + sq.rank_from_top()) % 2 == 0
}

fn step_one(sq: Square, dir: crate::attacks::Direction) -> Square {
    let delta: i16 = match dir {
        crate::attacks::Direction::N => -8,
        crate::attacks::Direction::S => 8,
        _ => unreachable!("step_one only used for vertical en-passant offsets"),
    };
    Square::new((sq.index() as i16 + delta) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::movegen::generate_legal_moves;

    #[test]
    fn make_undo_round_trip_preserves_hash() {
        let mut pos = Position::startpos();
        let original_hash = pos.hash();
        let moves = generate_legal_moves(&pos);
        for m in moves.iter() {
            pos.make_move(*m);
            pos.undo();
            assert_eq!(pos.hash(), original_hash);
            assert_eq!(pos.side_to_move(), Color::White);
        }
    }

    #[test]
    fn halfmove_clock_resets_on_pawn_push() {
        let mut pos = Position::startpos();
        let moves = generate_legal_moves(&pos);
        let pawn_move = moves
            .iter()
            .find(|m| pos.piece_at(m.from()).unwrap().1 == Piece::Pawn)
            .copied()
            .unwrap();
        pos.make_move(pawn_move);
        assert_eq!(pos.halfmove_clock(), 0);
    }

    #[test]
    fn insufficient_material_k_vs_kb() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/3b4/4K3 w - - 0 1").unwrap();
        assert!(pos.is_position_draw(0));
    }
}
