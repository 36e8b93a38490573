//! Capture-only extension search run at the leaves of the main search to
//! avoid the horizon effect.

use super::ordering;
use super::{SearchWorker, MATE_VALUE};
use crate::position::movegen;

const DELTA_MARGIN: i32 = 200;

impl SearchWorker<'_> {
    pub(super) fn qsearch(&mut self, mut alpha: i32, beta: i32, distance_to_root: usize) -> i32 {
        self.nodes += 1;
        if self.should_abort() {
            self.aborted = true;
            return 0;
        }

        let in_check = self.pos.in_check();
        let stand_pat = crate::eval::evaluate_with_params(self.pos, self.params);

        let moves = movegen::generate_legal_moves(self.pos);
        if moves.is_empty() {
            return if in_check {
                -(MATE_VALUE - (distance_to_root as i32 + 1) / 2)
            } else {
                0
            };
        }

        let mut best_score = if in_check { -MATE_VALUE } else { stand_pat };
        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
        }

        let mut buf = crate::types::MoveList::new();
        for m in moves.iter().copied() {
            if in_check || self.pos.is_capture(m) || m.promotion_piece().is_some() {
                buf.push(m);
            }
        }
        ordering::order_captures(self.pos, buf.as_mut_slice());

        for m in buf.as_slice().iter().copied() {
            if !in_check && self.pos.is_capture(m) {
                let victim = self
                    .pos
                    .piece_at(m.to())
                    .map(|(_, p)| ordering::piece_value(p))
                    .unwrap_or(100);
                if stand_pat + victim + DELTA_MARGIN <= alpha {
                    continue;
                }
            }

            self.pos.make_move(m);
            let score = -self.qsearch(-beta, -alpha, distance_to_root + 1);
            self.pos.undo();

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        best_score
    }
}
