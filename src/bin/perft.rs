//! `perft <depth> <useCache:0|1> <FEN fields...>` — runs a perft from the
//! given FEN and prints the total plus a per-root-move divide.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::time::Instant;

use mantis_core::position::{movegen, Position};

fn cached_perft(pos: &mut Position, depth: u32, cache: &mut HashMap<(u64, u32), u64>) -> u64 {
    if depth == 0 {
        return 1;
    }
    let key = (pos.hash(), depth);
    if let Some(&count) = cache.get(&key) {
        return count;
    }
    let moves = movegen::generate_legal_moves(pos);
    let mut total = 0u64;
    for m in moves.iter().copied() {
        pos.make_move(m);
        total += cached_perft(pos, depth - 1, cache);
        pos.undo();
    }
    cache.insert(key, total);
    total
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 8 {
        eprintln!("usage: perft <depth> <useCache:0|1> <FEN fields...>");
        return ExitCode::FAILURE;
    }

    let Ok(depth) = args[1].parse::<u32>() else {
        eprintln!("invalid depth: {}", args[1]);
        return ExitCode::FAILURE;
    };
    let use_cache = args[2] == "1";
    let fen = args[3..9].join(" ");

    let mut pos = match Position::from_fen(&fen) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("invalid FEN: {e}");
            return ExitCode::FAILURE;
        }
    };

    if depth == 0 {
        println!("Total: 1 in {:?}", Instant::now().elapsed());
        return ExitCode::SUCCESS;
    }

    let root_moves = movegen::generate_legal_moves(&pos);
    let mut cache = HashMap::new();
    let start = Instant::now();
    let mut total = 0u64;

    for m in root_moves.iter().copied() {
        pos.make_move(m);
        let count = if use_cache {
            cached_perft(&mut pos, depth - 1, &mut cache)
        } else {
            movegen::perft(&mut pos, depth - 1)
        };
        pos.undo();
        println!("{}: {}", m.to_uci(), count);
        total += count;
    }

    let elapsed = start.elapsed();
    println!("Total: {total} in {elapsed:?}");
    ExitCode::SUCCESS
}
