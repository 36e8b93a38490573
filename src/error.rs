//! Typed errors at the core's external boundaries. Illegal moves are not
//! represented here: per the controller's error-handling design they are
//! logged and dropped at the UCI boundary rather than propagated as a
//! `Result::Err`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    WrongFieldCount { found: usize },
    BadPiecePlacement(String),
    BadSideToMove(String),
    BadCastlingRights(String),
    BadEnPassantSquare(String),
    BadHalfmoveClock(String),
    BadFullmoveNumber(String),
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::WrongFieldCount { found } => {
                write!(f, "FEN must have 6 space-separated fields, found {found}")
            }
            FenError::BadPiecePlacement(s) => write!(f, "invalid piece placement: {s}"),
            FenError::BadSideToMove(s) => write!(f, "invalid side to move: {s}"),
            FenError::BadCastlingRights(s) => write!(f, "invalid castling rights: {s}"),
            FenError::BadEnPassantSquare(s) => write!(f, "invalid en-passant square: {s}"),
            FenError::BadHalfmoveClock(s) => write!(f, "invalid halfmove clock: {s}"),
            FenError::BadFullmoveNumber(s) => write!(f, "invalid fullmove number: {s}"),
        }
    }
}

impl std::error::Error for FenError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveParseError {
    pub text: String,
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a move in [a-h][1-8][a-h][1-8][nbrq]? form",
            self.text
        )
    }
}

impl std::error::Error for MoveParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceExhaustedError {
    pub requested_mib: usize,
}

impl fmt::Display for ResourceExhaustedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate transposition table of {} MiB",
            self.requested_mib
        )
    }
}

impl std::error::Error for ResourceExhaustedError {}
