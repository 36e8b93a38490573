//! Renders engine events as UCI output records.

use crate::search::{ReportedScore, SearchInfo};
use crate::types::Move;

pub fn print_ready() {
    println!("readyok");
}

pub fn print_info(info: &SearchInfo) {
    let score = match info.score {
        ReportedScore::Centipawns(cp) => format!("cp {cp}"),
        ReportedScore::Mate(n) => format!("mate {n}"),
    };
    let nps = info
        .nps
        .map(|n| format!(" nps {n}"))
        .unwrap_or_default();
    let pv = info
        .pv
        .iter()
        .map(|m| m.to_uci())
        .collect::<Vec<_>>()
        .join(" ");

    println!(
        "info depth {} score {} nodes {} time {}{} pv {}",
        info.depth, score, info.nodes, info.time_ms, nps, pv
    );
}

pub fn print_currmove(mv: Move, move_number: u32) {
    println!("info currmove {} currmovenumber {}", mv.to_uci(), move_number);
}

pub fn print_bestmove(best: Move, ponder: Option<Move>) {
    if best.is_null() {
        println!("bestmove 0000");
        return;
    }
    match ponder {
        Some(p) => println!("bestmove {} ponder {}", best.to_uci(), p.to_uci()),
        None => println!("bestmove {}", best.to_uci()),
    }
}
