use super::{EvalParams, Score};
use crate::position::Position;
use crate::types::{Bitboard, Color, Piece, Square};

fn file_mask(file: u8) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for rank_from_top in 0..8u8 {
        bb.set(Square::from_file_rank(file, 7 - rank_from_top));
    }
    bb
}

/// Every square strictly ahead of `sq` (toward the promotion rank of
/// `color`) on `file`.
fn file_ahead_mask(file: u8, sq: Square, color: Color) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for rank_from_top in 0..8u8 {
        let candidate = Square::from_file_rank(file, 7 - rank_from_top);
        let ahead = match color {
            Color::White => candidate.rank_from_top() < sq.rank_from_top(),
            Color::Black => candidate.rank_from_top() > sq.rank_from_top(),
        };
        if ahead {
            bb.set(candidate);
        }
    }
    bb
}

pub fn evaluate(pos: &Position, params: &EvalParams, color: Color, score: &mut Score) {
    let own_pawns = pos.pieces_of(color, Piece::Pawn);
    let enemy_pawns = pos.pieces_of(color.opposite(), Piece::Pawn);

    for file in 0..8u8 {
        let count = (own_pawns & file_mask(file)).popcount() as i32;
        if count > 1 {
            score.mg += params.doubled_pawn_mg * (count - 1);
            score.eg += params.doubled_pawn_eg * (count - 1);
        }
    }

    for sq in own_pawns.iter() {
        let file = sq.file_index();
        let adjacent_files = [file.checked_sub(1), Some(file + 1).filter(|f| *f < 8)];
        let has_support = adjacent_files
            .into_iter()
            .flatten()
            .any(|f| (own_pawns & file_mask(f)) != Bitboard::EMPTY);
        if !has_support {
            score.mg += params.isolated_pawn_mg;
            score.eg += params.isolated_pawn_eg;
        }

        let mut blockers = file_ahead_mask(file, sq, color);
        for f in adjacent_files.into_iter().flatten() {
            blockers |= file_ahead_mask(f, sq, color);
        }
        if (enemy_pawns & blockers) == Bitboard::EMPTY {
            let rank_index = match color {
                Color::White => sq.rank().0 as usize,
                Color::Black => 7 - sq.rank().0 as usize,
            };
            score.mg += params.passed_pawn_mg[rank_index];
            score.eg += params.passed_pawn_eg[rank_index];
        }
    }

    for sq in pos.pieces_of(color, Piece::Bishop).iter() {
        let same_color_squares = if Bitboard::LIGHT_SQUARES.contains(sq) {
            Bitboard::LIGHT_SQUARES
        } else {
            Bitboard::DARK_SQUARES
        };
        let blocked_pawns = (own_pawns & same_color_squares).popcount() as i32;
        if blocked_pawns >= 3 {
            score.mg += params.bad_bishop_mg * (blocked_pawns - 2);
            score.eg += params.bad_bishop_eg * (blocked_pawns - 2);
        }
    }
}
