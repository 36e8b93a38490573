//! Tapered middlegame/endgame static evaluation.

mod params;
mod pawn_structure;
mod pieces;

pub use params::EvalParams;

use crate::attacks;
use crate::position::Position;
use crate::types::{Bitboard, Color, Piece, Square};

/// A (middlegame, endgame) score pair, accumulated in centipawns from
/// White's perspective and interpolated by game phase at the end.
#[derive(Clone, Copy, Default)]
struct Score {
    mg: i32,
    eg: i32,
}

impl std::ops::AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        self.mg += rhs.mg;
        self.eg += rhs.eg;
    }
}

impl std::ops::SubAssign for Score {
    fn sub_assign(&mut self, rhs: Self) {
        self.mg -= rhs.mg;
        self.eg -= rhs.eg;
    }
}

fn game_phase(pos: &Position) -> i32 {
    let count = |color: Color, piece: Piece| pos.pieces_of(color, piece).popcount() as i32;
    let minors = count(Color::White, Piece::Knight)
        + count(Color::White, Piece::Bishop)
        + count(Color::Black, Piece::Knight)
        + count(Color::Black, Piece::Bishop);
    let rooks = count(Color::White, Piece::Rook) + count(Color::Black, Piece::Rook);
    let queens = count(Color::White, Piece::Queen) + count(Color::Black, Piece::Queen);
    (minors + 2 * rooks + 4 * queens).min(24)
}

fn mirror_for_black(sq: Square, color: Color) -> Square {
    match color {
        Color::White => sq,
        Color::Black => sq.flip(),
    }
}

fn material_and_pst(pos: &Position, params: &EvalParams, color: Color, score: &mut Score) {
    for piece in Piece::KINDS {
        let bb = pos.pieces_of(color, piece);
        let count = bb.popcount() as i32;
        score.mg += count * params.material_mg[piece.slot()];
        score.eg += count * params.material_eg[piece.slot()];
        for sq in bb.iter() {
            let pst_sq = mirror_for_black(sq, color);
            score.mg += params.pst_mg[piece.slot()][pst_sq.as_usize()];
            score.eg += params.pst_eg[piece.slot()][pst_sq.as_usize()];
        }
    }
    if pos.pieces_of(color, Piece::Bishop).popcount() >= 2 {
        score.mg += params.bishop_pair_mg;
        score.eg += params.bishop_pair_eg;
    }
}

fn mobility(pos: &Position, params: &EvalParams, color: Color, score: &mut Score) {
    let enemy_pawns = pos.pieces_of(color.opposite(), Piece::Pawn);
    let mut enemy_pawn_attacks = Bitboard::EMPTY;
    for sq in enemy_pawns.iter() {
        enemy_pawn_attacks |= attacks::pawn_attacks(sq, color.opposite());
    }
    let own = pos.occupied_by(color);
    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        for sq in pos.pieces_of(color, piece).iter() {
            let destinations = match piece {
                Piece::Knight => attacks::knight_attacks(sq),
                Piece::Bishop => attacks::slider_attacks(sq, pos.occupied(), true),
                Piece::Rook => attacks::slider_attacks(sq, pos.occupied(), false),
                Piece::Queen => {
                    attacks::slider_attacks(sq, pos.occupied(), true)
                        | attacks::slider_attacks(sq, pos.occupied(), false)
                }
                _ => unreachable!(),
            };
            let safe = destinations & !own & !enemy_pawn_attacks;
            let count = safe.popcount() as usize;
            let curve = &params.mobility[piece.slot()];
            let idx = count.min(curve.0.len() - 1);
            score.mg += curve.0[idx];
            score.eg += curve.1[idx];
        }
    }
}

/// Returns a signed centipawn score from the perspective of the side to
/// move.
pub fn evaluate(pos: &Position) -> i32 {
    evaluate_with_params(pos, &EvalParams::default())
}

pub fn evaluate_with_params(pos: &Position, params: &EvalParams) -> i32 {
    let phase = game_phase(pos);
    let mut score = Score::default();

    let mut white = Score::default();
    material_and_pst(pos, params, Color::White, &mut white);
    mobility(pos, params, Color::White, &mut white);
    pawn_structure::evaluate(pos, params, Color::White, &mut white);
    pieces::rook_files_and_outposts(pos, params, Color::White, &mut white);
    pieces::king_safety(pos, params, Color::White, &mut white);

    let mut black = Score::default();
    material_and_pst(pos, params, Color::Black, &mut black);
    mobility(pos, params, Color::Black, &mut black);
    pawn_structure::evaluate(pos, params, Color::Black, &mut black);
    pieces::rook_files_and_outposts(pos, params, Color::Black, &mut black);
    pieces::king_safety(pos, params, Color::Black, &mut black);

    score += white;
    score -= black;

    let tapered = (score.mg * phase + score.eg * (24 - phase)) / 24;

    match pos.side_to_move() {
        Color::White => tapered,
        Color::Black => -tapered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_roughly_balanced() {
        let pos = Position::startpos();
        assert!(evaluate(&pos).abs() < 50);
    }

    #[test]
    fn extra_queen_is_winning() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 500);
    }
}
