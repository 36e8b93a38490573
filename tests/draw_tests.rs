//! Draw-detection scenarios: insufficient material, repetition, and the
//! fifty-move rule.

use mantis_core::position::Position;

#[test]
fn lone_king_vs_king_and_bishop_is_insufficient_material() {
    let pos = Position::from_fen("8/8/8/4k3/8/8/4B3/4K3 w - - 0 1").unwrap();
    assert!(pos.is_position_draw(0));
}

#[test]
fn king_and_rook_vs_king_is_not_a_draw() {
    let pos = Position::from_fen("8/8/8/4k3/8/8/4R3/4K3 w - - 0 1").unwrap();
    assert!(!pos.is_position_draw(0));
}

#[test]
fn hundred_halfmoves_without_progress_is_a_draw() {
    let pos = Position::from_fen("8/8/8/4k3/8/8/4R3/4K3 w - - 100 60").unwrap();
    assert!(pos.is_position_draw(0));
}

#[test]
fn threefold_repetition_outside_the_search_path_is_a_draw() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
    let shuttle = [
        mantis_core::types::Move::quiet(
            mantis_core::types::Square::try_from_algebraic("h1").unwrap(),
            mantis_core::types::Square::try_from_algebraic("h2").unwrap(),
        ),
        mantis_core::types::Move::quiet(
            mantis_core::types::Square::try_from_algebraic("e8").unwrap(),
            mantis_core::types::Square::try_from_algebraic("e7").unwrap(),
        ),
        mantis_core::types::Move::quiet(
            mantis_core::types::Square::try_from_algebraic("h2").unwrap(),
            mantis_core::types::Square::try_from_algebraic("h1").unwrap(),
        ),
        mantis_core::types::Move::quiet(
            mantis_core::types::Square::try_from_algebraic("e7").unwrap(),
            mantis_core::types::Square::try_from_algebraic("e8").unwrap(),
        ),
    ];

    for _ in 0..2 {
        for &mv in &shuttle {
            pos.make_move(mv);
        }
    }
    // Back to the starting arrangement for the third time; treated as an
    // ancestor predating any in-flight search, so distance_to_root is 0.
    assert!(pos.is_position_draw(0));
}
