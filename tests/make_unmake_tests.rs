//! Make/undo round-trip and from-scratch hash agreement over random legal
//! move sequences.

use mantis_core::position::{movegen, Position};
use proptest::prelude::*;

fn apply_move_indices(indices: &[usize]) -> Position {
    let mut pos = Position::startpos();
    for &idx in indices {
        let moves = movegen::generate_legal_moves(&pos);
        if moves.is_empty() {
            break;
        }
        let mv = moves.as_slice()[idx % moves.len()];
        pos.make_move(mv);
    }
    pos
}

proptest! {
    #[test]
    fn undo_restores_exact_state(indices in prop::collection::vec(0usize..64, 1..40)) {
        let mut pos = Position::startpos();
        let mut snapshots = Vec::new();

        for &idx in &indices {
            let moves = movegen::generate_legal_moves(&pos);
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[idx % moves.len()];
            snapshots.push(pos.to_fen());
            pos.make_move(mv);
        }

        while let Some(expected_fen) = snapshots.pop() {
            pos.undo();
            prop_assert_eq!(pos.to_fen(), expected_fen);
        }
    }

    #[test]
    fn hash_matches_from_scratch_recomputation(indices in prop::collection::vec(0usize..64, 0..40)) {
        let pos = apply_move_indices(&indices);
        let rebuilt = Position::from_fen(&pos.to_fen()).unwrap();
        prop_assert_eq!(pos.hash(), rebuilt.hash());
    }
}
