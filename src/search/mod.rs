//! Iterative-deepening principal-variation alpha-beta search with
//! quiescence, built on top of the transposition table and evaluator.

mod killers;
mod ordering;
mod quiescence;

pub use killers::MAX_PLY;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::eval::EvalParams;
use crate::position::{movegen, Position};
use crate::tt::{Bound, TranspositionTable};
use crate::types::Move;
use killers::KillerTable;

/// Score magnitude a mate is reported at; the exact distance is encoded by
/// how far below this a returned value sits.
pub const MATE_VALUE: i32 = 32767;

/// Scores close enough to [`MATE_VALUE`] to be treated as forced mates
/// rather than centipawn evaluations.
pub const MATE_THRESHOLD: i32 = MATE_VALUE - 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedScore {
    Centipawns(i32),
    /// Positive: this side mates in N moves. Negative: gets mated in N.
    Mate(i32),
}

pub fn classify_score(raw: i32) -> ReportedScore {
    if raw.abs() >= MATE_THRESHOLD {
        let mate_in = MATE_VALUE - raw.abs();
        ReportedScore::Mate(if raw > 0 { mate_in.max(1) } else { -mate_in.max(1) })
    } else {
        ReportedScore::Centipawns(raw)
    }
}

/// Caller-configurable search bounds; time/node budgeting is the
/// controller's job, this struct is just the handoff.
#[derive(Clone)]
pub struct Limits {
    pub max_depth: u32,
    pub node_limit: u64,
    pub time_limit_ms: u64,
    pub search_moves: Vec<Move>,
    pub infinite: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: 64,
            node_limit: u64::MAX,
            time_limit_ms: 0,
            search_moves: Vec::new(),
            infinite: false,
        }
    }
}

#[derive(Clone)]
pub struct SearchInfo {
    pub depth: u32,
    pub score: ReportedScore,
    pub nodes: u64,
    pub time_ms: u64,
    pub nps: Option<u64>,
    pub pv: Vec<Move>,
}

/// Owns everything the search worker touches for the lifetime of one
/// `go` command: the position, the transposition table, killer slots and
/// node/time bookkeeping. Nothing here is shared with the command loop
/// except the stop flag it was constructed with.
pub struct SearchWorker<'a> {
    pos: &'a mut Position,
    tt: &'a mut TranspositionTable,
    params: &'a EvalParams,
    stop: &'a AtomicBool,
    killers: KillerTable,
    nodes: u64,
    node_limit: u64,
    aborted: bool,
    root_search_moves: Vec<Move>,
    root_start: Instant,
    on_currmove: Option<&'a mut dyn FnMut(Move, u32)>,
}

impl<'a> SearchWorker<'a> {
    pub fn new(
        pos: &'a mut Position,
        tt: &'a mut TranspositionTable,
        params: &'a EvalParams,
        stop: &'a AtomicBool,
        node_limit: u64,
        root_search_moves: Vec<Move>,
    ) -> Self {
        SearchWorker {
            pos,
            tt,
            params,
            stop,
            killers: KillerTable::new(),
            nodes: 0,
            node_limit,
            aborted: false,
            root_search_moves,
            root_start: Instant::now(),
            on_currmove: None,
        }
    }

    /// Arms the `info currmove` callback, fired at the root once per move
    /// after the search has run for at least one second.
    pub fn with_currmove_sink(mut self, sink: &'a mut dyn FnMut(Move, u32)) -> Self {
        self.on_currmove = Some(sink);
        self
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn should_abort(&self) -> bool {
        self.nodes > self.node_limit || self.stop.load(Ordering::Acquire)
    }

    /// Fail-soft alpha-beta. Returns a score in centipawns from the
    /// perspective of the side to move at `pos`.
    pub fn search(
        &mut self,
        mut alpha: i32,
        beta: i32,
        depth: u32,
        distance_to_root: usize,
        pv_node: bool,
    ) -> i32 {
        if depth == 0 {
            return self.qsearch(alpha, beta, distance_to_root);
        }

        self.nodes += 1;
        if self.should_abort() {
            self.aborted = true;
            return 0;
        }

        let mut moves = movegen::generate_legal_moves(self.pos);
        if moves.is_empty() {
            return if self.pos.in_check() {
                -(MATE_VALUE - (distance_to_root as i32 + 1) / 2)
            } else {
                0
            };
        }

        let mut beta = beta;
        if !pv_node {
            let mate_in_one = MATE_VALUE - (distance_to_root as i32 + 2) / 2;
            if mate_in_one < beta {
                beta = mate_in_one;
                if alpha >= beta {
                    return beta;
                }
            }
            let mated_in_two = -MATE_VALUE + (distance_to_root as i32 + 3) / 2;
            if mated_in_two > alpha {
                alpha = mated_in_two;
                if alpha >= beta {
                    return alpha;
                }
            }
        }

        if self.pos.is_position_draw(distance_to_root) {
            return 0;
        }

        if distance_to_root == 0 && !self.root_search_moves.is_empty() {
            let mut restricted = crate::types::MoveList::new();
            for m in moves.iter().copied() {
                if self.root_search_moves.contains(&m) {
                    restricted.push(m);
                }
            }
            moves = restricted;
        }

        let hash = self.pos.hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            let stored_move = entry.best_move();
            if !stored_move.is_null() {
                tt_move = Some(stored_move);
            }
            if entry.depth() as u32 == depth {
                match entry.bound() {
                    Bound::Exact => return entry.score() as i32,
                    Bound::LowerBound if entry.score() as i32 >= beta => {
                        return entry.score() as i32
                    }
                    Bound::UpperBound if (entry.score() as i32) <= alpha => {
                        return entry.score() as i32
                    }
                    _ => {}
                }
            }
        }

        let killers = self.killers.get(distance_to_root);
        ordering::order_moves(self.pos, moves.as_mut_slice(), tt_move, killers);

        let initial_alpha = alpha;
        let mut best_move = moves.as_slice()[0];
        let move_count = moves.len();

        for i in 0..move_count {
            let m = moves.as_slice()[i];
            if distance_to_root == 0 && self.root_start.elapsed().as_millis() >= 1000 {
                if let Some(sink) = self.on_currmove.as_deref_mut() {
                    sink(m, i as u32 + 1);
                }
            }
            self.pos.make_move(m);
            let gives_check = self.pos.in_check();
            let ext = if gives_check { 1 } else { 0 };
            let child_depth = depth - 1 + ext;

            let score = if pv_node && i == 0 {
                -self.search(-beta, -alpha, child_depth, distance_to_root + 1, true)
            } else {
                let null_window = -self.search(
                    -alpha - 1,
                    -alpha,
                    child_depth,
                    distance_to_root + 1,
                    false,
                );
                if null_window > alpha && null_window < beta && pv_node {
                    -self.search(-beta, -alpha, child_depth, distance_to_root + 1, true)
                } else {
                    null_window
                }
            };

            self.pos.undo();

            if self.aborted {
                return 0;
            }

            if score > alpha {
                alpha = score;
                best_move = m;
                if alpha >= beta {
                    self.killers.store(distance_to_root, m);
                    self.tt
                        .store(hash, depth as u16, Bound::LowerBound, clamp_i16(alpha), m);
                    return alpha;
                }
            }
        }

        let bound = if alpha > initial_alpha {
            Bound::Exact
        } else {
            Bound::UpperBound
        };
        self.tt
            .store(hash, depth as u16, bound, clamp_i16(alpha), best_move);
        alpha
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Walks EXACT transposition-table entries from `pos` to reconstruct the
/// principal variation, restoring `pos` to its original state before
/// returning. May be shorter than `max_len` if entries were evicted.
fn extract_pv(pos: &mut Position, tt: &TranspositionTable, max_len: usize) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut seen = std::collections::HashSet::new();

    while pv.len() < max_len {
        let hash = pos.hash();
        if !seen.insert(hash) {
            break;
        }
        let Some(entry) = tt.probe(hash) else { break };
        if entry.bound() != Bound::Exact {
            break;
        }
        let mv = entry.best_move();
        if mv.is_null() {
            break;
        }
        let legal = movegen::generate_legal_moves(pos);
        if !legal.contains(mv) {
            break;
        }
        pos.make_move(mv);
        pv.push(mv);
    }

    for _ in 0..pv.len() {
        pos.undo();
    }
    pv
}

/// Runs iterative deepening to `limits`, invoking `on_info` after every
/// completed depth. Returns `(bestmove, ponder_move)`.
pub fn iterative_deepening(
    pos: &mut Position,
    tt: &mut TranspositionTable,
    params: &EvalParams,
    stop: &AtomicBool,
    limits: &Limits,
    mut on_info: impl FnMut(&SearchInfo),
    mut on_currmove: impl FnMut(Move, u32),
) -> (Move, Option<Move>) {
    let root_moves = movegen::generate_legal_moves(pos);
    if root_moves.is_empty() {
        return (Move::NULL, None);
    }
    if root_moves.len() == 1 {
        return (root_moves.as_slice()[0], None);
    }

    let start = Instant::now();
    tt.new_search();

    let mut best_move = root_moves.as_slice()[0];

    for depth in 1..=limits.max_depth {
        if stop.load(Ordering::Acquire) {
            break;
        }

        let depth_start = Instant::now();
        let mut worker = SearchWorker::new(
            pos,
            tt,
            params,
            stop,
            limits.node_limit,
            limits.search_moves.clone(),
        )
        .with_currmove_sink(&mut on_currmove);
        let score = worker.search(-MATE_VALUE - 1, MATE_VALUE + 1, depth, 0, true);
        let nodes = worker.nodes();
        let aborted = worker.aborted;

        if aborted && depth == 1 {
            break;
        }
        if aborted {
            break;
        }

        if let Some(entry) = tt.probe(pos.hash()) {
            let mv = entry.best_move();
            if !mv.is_null() && root_moves.contains(mv) {
                best_move = mv;
            }
        }

        let pv = extract_pv(pos, tt, depth as usize);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let nps = if elapsed_ms > 0 {
            Some(nodes * 1000 / elapsed_ms)
        } else {
            None
        };

        on_info(&SearchInfo {
            depth,
            score: classify_score(score),
            nodes,
            time_ms: elapsed_ms,
            nps,
            pv,
        });

        if let ReportedScore::Mate(_) = classify_score(score) {
            break;
        }

        let this_depth_time_ms = depth_start.elapsed().as_millis() as u64;
        if limits.time_limit_ms > 0 {
            let estimated_next = this_depth_time_ms.saturating_mul(3) / 2;
            if elapsed_ms + estimated_next >= limits.time_limit_ms {
                break;
            }
        }
    }

    while limits.infinite && !stop.load(Ordering::Acquire) {
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let ponder = extract_pv(pos, tt, 2).get(1).copied();
    (best_move, ponder)
}
