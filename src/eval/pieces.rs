use super::{EvalParams, Score};
use crate::attacks;
use crate::position::Position;
use crate::types::{Bitboard, Color, Piece, Square};

fn file_mask(file: u8) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for rank_from_top in 0..8u8 {
        bb.set(Square::from_file_rank(file, 7 - rank_from_top));
    }
    bb
}

pub fn rook_files_and_outposts(pos: &Position, params: &EvalParams, color: Color, score: &mut Score) {
    let own_pawns = pos.pieces_of(color, Piece::Pawn);
    let enemy_pawns = pos.pieces_of(color.opposite(), Piece::Pawn);

    for sq in pos.pieces_of(color, Piece::Rook).iter() {
        let file = sq.file_index();
        let mask = file_mask(file);
        let own_on_file = own_pawns & mask;
        let enemy_on_file = enemy_pawns & mask;
        if own_on_file == Bitboard::EMPTY && enemy_on_file == Bitboard::EMPTY {
            score.mg += params.rook_open_file_mg;
            score.eg += params.rook_open_file_eg;
        } else if own_on_file == Bitboard::EMPTY {
            score.mg += params.rook_half_open_file_mg;
            score.eg += params.rook_half_open_file_eg;
        }
    }

    let mut enemy_pawn_attacks = Bitboard::EMPTY;
    for sq in enemy_pawns.iter() {
        enemy_pawn_attacks |= attacks::pawn_attacks(sq, color.opposite());
    }
    let mut own_pawn_attacks = Bitboard::EMPTY;
    for sq in own_pawns.iter() {
        own_pawn_attacks |= attacks::pawn_attacks(sq, color);
    }

    for piece in [Piece::Knight, Piece::Bishop] {
        for sq in pos.pieces_of(color, piece).iter() {
            let is_outpost =
                own_pawn_attacks.contains(sq) && !enemy_pawn_attacks.contains(sq);
            if is_outpost {
                score.mg += params.outpost_mg;
                score.eg += params.outpost_eg;
            }
        }
    }
}

/// King-ring pressure: enemy pieces attacking the king ring add their
/// attacker weight, friendly pieces defending it subtract their defender
/// weight, and each of the 8 rays out of the king contributes a danger
/// value graduated by how many empty squares lie before the nearest
/// blocker. The total is added in the middlegame and scaled down for the
/// endgame.
pub fn king_safety(pos: &Position, params: &EvalParams, color: Color, score: &mut Score) {
    let enemy = color.opposite();
    let king_sq = pos.king_square(color);
    let king_ring = attacks::king_attacks(king_sq) | Bitboard::bit(king_sq);

    let mut danger = 0i32;
    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        for sq in pos.pieces_of(enemy, piece).iter() {
            let attacked = match piece {
                Piece::Knight => attacks::knight_attacks(sq),
                Piece::Bishop => attacks::slider_attacks(sq, pos.occupied(), true),
                Piece::Rook => attacks::slider_attacks(sq, pos.occupied(), false),
                Piece::Queen => {
                    attacks::slider_attacks(sq, pos.occupied(), true)
                        | attacks::slider_attacks(sq, pos.occupied(), false)
                }
                _ => unreachable!(),
            };
            if (attacked & king_ring) != Bitboard::EMPTY {
                danger += params.king_attacker_weight[piece.slot()];
            }
        }
    }

    for piece in [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        for sq in pos.pieces_of(color, piece).iter() {
            let defended = match piece {
                Piece::Pawn => attacks::pawn_attacks(sq, color),
                Piece::Knight => attacks::knight_attacks(sq),
                Piece::Bishop => attacks::slider_attacks(sq, pos.occupied(), true),
                Piece::Rook => attacks::slider_attacks(sq, pos.occupied(), false),
                Piece::Queen => {
                    attacks::slider_attacks(sq, pos.occupied(), true)
                        | attacks::slider_attacks(sq, pos.occupied(), false)
                }
                _ => unreachable!(),
            };
            if (defended & king_ring) != Bitboard::EMPTY {
                danger -= params.king_defender_weight[piece.slot()];
            }
        }
    }

    let friendly = pos.occupied_by(color);
    for dir in attacks::DIRECTIONS {
        let empty_run = attacks::blocked_ray(dir, king_sq, friendly, false).popcount() as usize;
        let idx = empty_run.min(params.king_open_line_weight.len() - 1);
        danger += params.king_open_line_weight[idx];
    }

    score.mg -= danger;
    score.eg -= danger * params.king_danger_scale_eg_percent / 100;
}
