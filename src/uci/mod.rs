//! Universal Chess Interface command loop: parses stdin, drives the
//! [`EngineController`], and renders its events back to stdout.

pub mod command;
pub mod options;
pub mod report;

use std::fmt;
use std::io::{self, BufRead};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{EngineController, EngineEvent, TimeControl};
use crate::error::FenError;
use crate::eval::EvalParams;
use crate::position::{movegen, Position, START_FEN};
use crate::search::Limits;
use crate::tt::TranspositionTable;
use crate::types::{Move, Square};

use command::{parse_go_params, parse_uci_command, GoParams, UciCommand};
use options::{parse_setoption, UciOptionAction, UciOptions};

#[derive(Debug)]
pub enum UciError {
    InvalidFen(FenError),
    InvalidMoveFormat(String),
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            UciError::InvalidMoveFormat(s) => write!(f, "invalid move format: {s}"),
            UciError::MissingParts => write!(f, "missing parts in command"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

/// Parses `e2e4`/`e7e8q` against `legal` (the current position's legal
/// moves), rejecting malformed strings up front per the
/// `[a-h][1-8][a-h][1-8][nbrq]?` wire grammar.
#[must_use]
pub fn parse_uci_move_from_list(legal: &[Move], text: &str) -> Result<Option<Move>, UciError> {
    if text.len() < 4 || text.len() > 5 {
        return Err(UciError::InvalidMoveFormat(text.to_string()));
    }
    let from = Square::try_from_algebraic(&text[0..2])
        .ok_or_else(|| UciError::InvalidMoveFormat(text.to_string()))?;
    let to = Square::try_from_algebraic(&text[2..4])
        .ok_or_else(|| UciError::InvalidMoveFormat(text.to_string()))?;
    let promotion = match text.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(crate::types::Piece::Queen),
        Some(b'r') => Some(crate::types::Piece::Rook),
        Some(b'b') => Some(crate::types::Piece::Bishop),
        Some(b'n') => Some(crate::types::Piece::Knight),
        _ => return Err(UciError::InvalidMoveFormat(text.to_string())),
    };

    Ok(legal
        .iter()
        .copied()
        .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion))
}

/// Applies `position [startpos | fen <FEN>] [moves <move>*]`. Illegal
/// moves (syntactically valid but not in the legal-move set) are logged
/// to stderr and the rest of the move list is dropped.
pub fn apply_position_command(pos: &mut Position, parts: &[&str]) -> Result<(), UciError> {
    let mut i = 1;
    if i >= parts.len() {
        return Err(UciError::MissingParts);
    }

    if parts[i] == "startpos" {
        *pos = Position::from_fen(START_FEN)?;
        i += 1;
    } else if parts[i] == "fen" {
        if i + 6 >= parts.len() {
            return Err(UciError::MissingParts);
        }
        let fen = parts[i + 1..i + 7].join(" ");
        *pos = Position::from_fen(&fen)?;
        i += 7;
    } else {
        return Err(UciError::MissingParts);
    }

    if i < parts.len() && parts[i] == "moves" {
        i += 1;
        while i < parts.len() {
            let legal = movegen::generate_legal_moves(pos);
            match parse_uci_move_from_list(legal.as_slice(), parts[i]) {
                Ok(Some(mv)) => pos.make_move(mv),
                Ok(None) => {
                    eprintln!("info string illegal move dropped: {}", parts[i]);
                    #[cfg(feature = "logging")]
                    log::debug!("illegal move dropped: {}", parts[i]);
                    break;
                }
                Err(e) => {
                    eprintln!("info string {e}");
                    #[cfg(feature = "logging")]
                    log::debug!("{e}");
                    break;
                }
            }
            i += 1;
        }
    }

    Ok(())
}

fn time_control_for(pos: &Position, params: &GoParams) -> TimeControl {
    use crate::types::Color;
    let (clock_ms, increment_ms) = match pos.side_to_move() {
        Color::White => (params.wtime, params.winc.unwrap_or(0)),
        Color::Black => (params.btime, params.binc.unwrap_or(0)),
    };
    TimeControl {
        clock_ms,
        increment_ms,
        moves_to_go: params.movestogo,
        move_time_ms: params.movetime,
    }
}

fn limits_for(pos: &Position, params: &GoParams) -> Limits {
    let mut search_moves = Vec::new();
    if !params.search_moves.is_empty() {
        let legal = movegen::generate_legal_moves(pos);
        for text in &params.search_moves {
            if let Ok(Some(mv)) = parse_uci_move_from_list(legal.as_slice(), text) {
                search_moves.push(mv);
            }
        }
    }

    Limits {
        max_depth: params.depth.unwrap_or(64),
        node_limit: params.nodes.unwrap_or(u64::MAX),
        time_limit_ms: 0,
        search_moves,
        infinite: params.infinite,
    }
}

/// Owns the current position, transposition table, and search controller
/// for the lifetime of the command loop.
pub struct UciSession {
    pos: Position,
    tt: Arc<Mutex<TranspositionTable>>,
    params: Arc<EvalParams>,
    options: UciOptions,
    controller: EngineController,
    last_go_params: Option<GoParams>,
}

impl UciSession {
    pub fn new() -> Self {
        let options = UciOptions::new();
        UciSession {
            pos: Position::from_fen(START_FEN).expect("startpos FEN is well-formed"),
            tt: Arc::new(Mutex::new(TranspositionTable::new(options.hash_mb))),
            params: Arc::new(EvalParams::default()),
            options,
            controller: EngineController::new(),
            last_go_params: None,
        }
    }

    /// Reads commands from stdin until `quit` or EOF. Returns once the
    /// process should exit.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if !self.dispatch(&line) {
                break;
            }
        }
    }

    /// Handles one input line. Returns `false` to stop the loop (`quit`).
    pub fn dispatch(&mut self, line: &str) -> bool {
        let Some(cmd) = parse_uci_command(line) else {
            return true;
        };

        match cmd {
            UciCommand::Uci => self.options.print_handshake(),
            UciCommand::IsReady => {
                self.ensure_tt_sized();
                report::print_ready();
            }
            UciCommand::UciNewGame => {
                self.controller.stop_calculation();
            }
            UciCommand::Position(parts) => {
                self.controller.stop_calculation();
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                if let Err(e) = apply_position_command(&mut self.pos, &refs) {
                    eprintln!("info string {e}");
                }
            }
            UciCommand::Go(parts) => self.handle_go(&parts),
            UciCommand::SetOption(parts) => self.handle_setoption(&parts),
            UciCommand::Stop => self.controller.stop_calculation(),
            UciCommand::PonderHit => {
                let tc = self
                    .last_go_params
                    .as_ref()
                    .map(|p| time_control_for(&self.pos, p))
                    .unwrap_or_default();
                self.controller.ponder_hit(tc);
            }
            UciCommand::Quit => {
                self.controller.stop_calculation();
                return false;
            }
            UciCommand::Unknown(_) => {}
        }
        true
    }

    fn ensure_tt_sized(&mut self) {
        self.tt.lock().set_size(self.options.hash_mb);
    }

    fn handle_setoption(&mut self, parts: &[String]) {
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        let Some((name, value)) = parse_setoption(&refs) else {
            return;
        };
        if let Some(UciOptionAction::ReinitHash(mb)) =
            self.options.apply_setoption(&name, value.as_deref())
        {
            self.tt.lock().set_size(mb);
        }
    }

    fn handle_go(&mut self, parts: &[String]) {
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        let go_params = parse_go_params(&refs);

        let limits = limits_for(&self.pos, &go_params);
        let time_control = time_control_for(&self.pos, &go_params);
        let ponder = go_params.ponder;
        self.last_go_params = Some(go_params);

        self.controller.start_analyzing(
            self.pos.clone(),
            Arc::clone(&self.tt),
            Arc::clone(&self.params),
            limits,
            time_control,
            ponder,
            Box::new(|event| match event {
                EngineEvent::Info(info) => report::print_info(&info),
                EngineEvent::CurrMove { mv, move_number } => {
                    report::print_currmove(mv, move_number)
                }
                EngineEvent::BestMove { best, ponder } => report::print_bestmove(best, ponder),
            }),
        );
    }
}

impl Default for UciSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_startpos_with_moves() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let parts: Vec<&str> = "position startpos moves e2e4 e7e5"
            .split_whitespace()
            .collect();
        apply_position_command(&mut pos, &parts).unwrap();
        assert_eq!(pos.side_to_move(), crate::types::Color::White);
    }

    #[test]
    fn illegal_move_truncates_remaining_moves() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let parts: Vec<&str> = "position startpos moves e2e4 e2e4 g8f6"
            .split_whitespace()
            .collect();
        apply_position_command(&mut pos, &parts).unwrap();
        // Only e2e4 lands; the repeated e2e4 is illegal and truncates the rest.
        assert_eq!(pos.side_to_move(), crate::types::Color::Black);
    }

    #[test]
    fn malformed_fen_is_reported_not_panicking() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let parts: Vec<&str> = "position fen not a fen at all here".split_whitespace().collect();
        assert!(apply_position_command(&mut pos, &parts).is_err());
    }

    #[test]
    fn dispatch_quit_stops_the_loop() {
        let mut session = UciSession::new();
        assert!(session.dispatch("uci"));
        assert!(!session.dispatch("quit"));
    }
}
