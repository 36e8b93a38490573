//! Transposition table behaviour exercised end to end: aging across
//! searches, resizing, and bound-aware storage of bestmove.

use mantis_core::tt::{Bound, TranspositionTable};
use mantis_core::types::{Move, Square};

fn mv(from: u8, to: u8) -> Move {
    Move::quiet(Square::new(from), Square::new(to))
}

#[test]
fn upper_bound_entries_store_no_best_move() {
    let mut tt = TranspositionTable::new(1);
    tt.store(0x42, 5, Bound::UpperBound, -10, mv(8, 16));
    let entry = tt.probe(0x42).unwrap();
    assert!(entry.best_move().is_null());
}

#[test]
fn exact_and_lower_bound_entries_keep_their_best_move() {
    let mut tt = TranspositionTable::new(1);
    tt.store(0x43, 5, Bound::Exact, 10, mv(8, 16));
    tt.store(0x44, 5, Bound::LowerBound, 10, mv(9, 17));
    assert_eq!(tt.probe(0x43).unwrap().best_move(), mv(8, 16));
    assert_eq!(tt.probe(0x44).unwrap().best_move(), mv(9, 17));
}

#[test]
fn entries_survive_new_search_until_evicted() {
    let mut tt = TranspositionTable::new(1);
    tt.store(0x2001, 6, Bound::Exact, 42, mv(0, 1));
    for _ in 0..5 {
        tt.new_search();
    }
    let entry = tt.probe(0x2001).unwrap();
    assert_eq!(entry.score(), 42);
    assert_eq!(entry.bound(), Bound::Exact);
}

#[test]
fn hashfull_reflects_stored_entries() {
    let mut tt = TranspositionTable::new(1);
    assert_eq!(tt.hashfull_per_mille(), 0);
    for i in 0..64u64 {
        tt.store(i, 1, Bound::UpperBound, 0, Move::NULL);
    }
    assert!(tt.hashfull_per_mille() > 0);
}

#[test]
fn clear_drops_every_entry_and_resets_generation() {
    let mut tt = TranspositionTable::new(1);
    tt.store(0x99, 3, Bound::Exact, 7, mv(2, 3));
    tt.new_search();
    tt.new_search();
    tt.clear();
    assert!(tt.probe(0x99).is_none());
    assert_eq!(tt.hashfull_per_mille(), 0);
}

#[test]
fn set_size_to_a_different_capacity_clears_existing_entries() {
    let mut tt = TranspositionTable::new(1);
    tt.store(0x100, 4, Bound::Exact, 1, mv(4, 5));
    assert!(tt.probe(0x100).is_some());

    tt.set_size(4);
    assert!(tt.probe(0x100).is_none());
}

#[test]
fn set_size_to_the_same_capacity_is_a_no_op() {
    let mut tt = TranspositionTable::new(1);
    tt.store(0x101, 4, Bound::Exact, 1, mv(4, 5));
    tt.set_size(1);
    assert!(tt.probe(0x101).is_some());
}

#[test]
fn deeper_search_overwrites_shallower_entry_for_the_same_position() {
    use mantis_core::position::Position;
    use std::sync::atomic::AtomicBool;

    let mut pos = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    let mut tt = TranspositionTable::new(1);
    let params = mantis_core::eval::EvalParams::default();
    let stop = AtomicBool::new(false);
    let hash = pos.hash();

    let mut shallow = mantis_core::search::SearchWorker::new(
        &mut pos,
        &mut tt,
        &params,
        &stop,
        u64::MAX,
        vec![],
    );
    shallow.search(
        -mantis_core::search::MATE_VALUE - 1,
        mantis_core::search::MATE_VALUE + 1,
        1,
        0,
        true,
    );
    let shallow_depth = tt.probe(hash).unwrap().depth();

    let mut deep = mantis_core::search::SearchWorker::new(
        &mut pos,
        &mut tt,
        &params,
        &stop,
        u64::MAX,
        vec![],
    );
    deep.search(
        -mantis_core::search::MATE_VALUE - 1,
        mantis_core::search::MATE_VALUE + 1,
        4,
        0,
        true,
    );
    let deep_entry = tt.probe(hash).unwrap();

    assert!(deep_entry.depth() >= shallow_depth);
}
