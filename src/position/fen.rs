use super::Position;
use crate::error::FenError;
use crate::types::{Bitboard, CastlingRights, Color, Piece, Square};
use crate::zobrist;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount {
                found: fields.len(),
            });
        }

        let mut pieces = [[Bitboard::EMPTY; 6]; 2];
        let mut occupied_color = [Bitboard::EMPTY; 2];
        let mut occupied = Bitboard::EMPTY;
        let mut mailbox = [None; 64];

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadPiecePlacement(fields[0].to_string()));
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                    if file > 8 {
                        return Err(FenError::BadPiecePlacement(fields[0].to_string()));
                    }
                    continue;
                }
                if file >= 8 {
                    return Err(FenError::BadPiecePlacement(fields[0].to_string()));
                }
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let piece = Piece::from_char(c)
                    .ok_or_else(|| FenError::BadPiecePlacement(fields[0].to_string()))?;
                let sq = Square::new(rank_from_top as u8 * 8 + file);
                pieces[color.index()][piece.slot()].set(sq);
                occupied_color[color.index()].set(sq);
                occupied.set(sq);
                mailbox[sq.as_usize()] = Some((color, piece));
                file += 1;
            }
            if file != 8 {
                return Err(FenError::BadPiecePlacement(fields[0].to_string()));
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        if fields[2] != "-" && !fields[2].chars().all(|c| "KQkq".contains(c)) {
            return Err(FenError::BadCastlingRights(fields[2].to_string()));
        }
        let castling_rights = CastlingRights::from_fen(fields[2]);

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(
                Square::try_from_algebraic(fields[3])
                    .ok_or_else(|| FenError::BadEnPassantSquare(fields[3].to_string()))?,
            )
        };

        let halfmove_clock: u32 = fields[4]
            .parse()
            .map_err(|_| FenError::BadHalfmoveClock(fields[4].to_string()))?;
        let fullmove_number: u32 = fields[5]
            .parse()
            .map_err(|_| FenError::BadFullmoveNumber(fields[5].to_string()))?;

        let mut hash = 0u64;
        for color in [Color::White, Color::Black] {
            for piece in Piece::KINDS {
                for sq in pieces[color.index()][piece.slot()].iter() {
                    hash ^= zobrist::piece_key(color, piece, sq);
                }
            }
        }
        hash ^= zobrist::castling_key(castling_rights.bits());
        hash ^= zobrist::en_passant_key(en_passant.map(|s| s.file_index()));
        if side_to_move == Color::Black {
            hash ^= zobrist::side_to_move_key();
        }

        Ok(Position {
            pieces,
            occupied_color,
            occupied,
            mailbox,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash,
            history: Vec::with_capacity(256),
        })
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank_from_top in 0..8u8 {
            let mut empty_run = 0u8;
            for file in 0..8u8 {
                let sq = Square::new(rank_from_top * 8 + file);
                match self.mailbox[sq.as_usize()] {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        placement.push(piece.to_char(color));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                placement.push('/');
            }
        }

        let stm = if self.side_to_move == Color::White {
            "w"
        } else {
            "b"
        };
        let ep = self
            .en_passant
            .map(|s| s.to_algebraic())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            placement,
            stm,
            self.castling_rights.to_fen(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}
