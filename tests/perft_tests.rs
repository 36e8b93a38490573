//! Canonical perft reference counts for the move generator.

use mantis_core::position::{movegen, Position};

struct Case {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

const CASES: &[Case] = &[
    Case {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197281), (5, 4865609)],
    },
    Case {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (3, 97862), (4, 4085603)],
    },
    Case {
        name: "position3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(5, 674624)],
    },
];

#[test]
fn perft_matches_canonical_counts() {
    for case in CASES {
        let mut pos = Position::from_fen(case.fen).unwrap();
        for &(depth, expected) in case.depths {
            let nodes = movegen::perft(&mut pos, depth);
            assert_eq!(nodes, expected, "{} at depth {depth}", case.name);
        }
    }
}
