//! Zobrist hashing constants. Keys are generated once from a fixed seed so
//! that a transposition table key is stable across process runs.

use crate::types::{Color, Piece, Square};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5EED_C0FF_EE15_B17E;

struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

fn build_keys() -> ZobristKeys {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut pieces = [[[0u64; 64]; 6]; 2];
    for color in &mut pieces {
        for kind in color.iter_mut() {
            for square in kind.iter_mut() {
                *square = rng.gen();
            }
        }
    }
    let mut castling = [0u64; 16];
    for key in castling.iter_mut() {
        *key = rng.gen();
    }
    let mut en_passant_file = [0u64; 8];
    for key in en_passant_file.iter_mut() {
        *key = rng.gen();
    }
    ZobristKeys {
        pieces,
        castling,
        en_passant_file,
        side_to_move: rng.gen(),
    }
}

static KEYS: Lazy<ZobristKeys> = Lazy::new(build_keys);

#[inline]
pub fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    debug_assert!(piece != Piece::None);
    KEYS.pieces[color.index()][piece.slot()][sq.as_usize()]
}

#[inline]
pub fn castling_key(rights_bits: u8) -> u64 {
    KEYS.castling[(rights_bits & 0b1111) as usize]
}

#[inline]
pub fn en_passant_key(file: Option<u8>) -> u64 {
    match file {
        Some(f) => KEYS.en_passant_file[f as usize],
        None => 0,
    }
}

#[inline]
pub fn side_to_move_key() -> u64 {
    KEYS.side_to_move
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_across_calls() {
        let a = piece_key(Color::White, Piece::Pawn, Square::new(8));
        let b = piece_key(Color::White, Piece::Pawn, Square::new(8));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_squares_get_distinct_keys() {
        let a = piece_key(Color::White, Piece::Knight, Square::new(1));
        let b = piece_key(Color::White, Piece::Knight, Square::new(2));
        assert_ne!(a, b);
    }
}
