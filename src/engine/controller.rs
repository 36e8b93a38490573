//! Owns the search worker thread and the wall-clock timer thread, and
//! coordinates them with an atomic stop flag.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::time::{self, TimeControl};
use crate::eval::EvalParams;
use crate::position::Position;
use crate::search::{self, Limits, SearchInfo};
use crate::tt::TranspositionTable;
use crate::types::Move;

const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;
const TIMER_POLL_MS: u64 = 2;
const PONDER_POLL_MS: u64 = 5;

pub enum EngineEvent {
    Info(SearchInfo),
    CurrMove { mv: Move, move_number: u32 },
    BestMove { best: Move, ponder: Option<Move> },
}

pub type EventSink = Box<dyn FnMut(EngineEvent) + Send>;

/// Start/stop worker + timer threads for one `go` command. State machine:
/// IDLE -> RUNNING -> (STOPPING ->) IDLE.
pub struct EngineController {
    stop: Arc<AtomicBool>,
    pondering: Arc<AtomicBool>,
    timer_cancel: Option<Arc<AtomicBool>>,
    timer: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
}

impl EngineController {
    pub fn new() -> Self {
        EngineController {
            stop: Arc::new(AtomicBool::new(false)),
            pondering: Arc::new(AtomicBool::new(false)),
            timer_cancel: None,
            timer: None,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Idempotent: stops any in-flight search first, then spawns a fresh
    /// worker (and timer, if the budget is finite).
    pub fn start_analyzing(
        &mut self,
        mut pos: Position,
        tt: Arc<Mutex<TranspositionTable>>,
        params: Arc<EvalParams>,
        mut limits: Limits,
        time_control: TimeControl,
        ponder: bool,
        mut on_event: EventSink,
    ) {
        self.stop_calculation();

        #[cfg(feature = "logging")]
        log::info!("search starting (ponder={ponder})");

        self.stop.store(false, Ordering::Release);
        self.pondering.store(ponder, Ordering::Release);

        let budget = if ponder {
            0
        } else {
            time::budget_ms(&time_control)
        };
        limits.time_limit_ms = budget;
        limits.infinite = limits.infinite || ponder;

        self.spawn_timer(budget);

        let stop_for_worker = Arc::clone(&self.stop);
        let pondering_for_worker = Arc::clone(&self.pondering);

        let worker = thread::Builder::new()
            .name("search".to_string())
            .stack_size(WORKER_STACK_SIZE)
            .spawn(move || {
                let on_event = RefCell::new(on_event);
                let (best, ponder_move) = {
                    let mut tt_guard = tt.lock();
                    search::iterative_deepening(
                        &mut pos,
                        &mut tt_guard,
                        &params,
                        &stop_for_worker,
                        &limits,
                        |info| (*on_event.borrow_mut())(EngineEvent::Info(info.clone())),
                        |mv, num| {
                            (*on_event.borrow_mut())(EngineEvent::CurrMove {
                                mv,
                                move_number: num,
                            })
                        },
                    )
                };

                while pondering_for_worker.load(Ordering::Acquire)
                    && !stop_for_worker.load(Ordering::Acquire)
                {
                    thread::sleep(Duration::from_millis(PONDER_POLL_MS));
                }

                (*on_event.borrow_mut())(EngineEvent::BestMove {
                    best,
                    ponder: ponder_move,
                });
            })
            .unwrap_or_else(|e| {
                #[cfg(feature = "logging")]
                log::error!("failed to spawn search worker thread: {e}");
                panic!("failed to spawn search worker thread: {e}");
            });

        self.worker = Some(worker);
    }

    fn spawn_timer(&mut self, budget_ms: u64) {
        if budget_ms == 0 {
            self.timer_cancel = None;
            self.timer = None;
            return;
        }
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_for_thread = Arc::clone(&cancel);
        let stop = Arc::clone(&self.stop);
        let handle = thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_millis(budget_ms);
            loop {
                if cancel_for_thread.load(Ordering::Acquire) {
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::sleep((deadline - now).min(Duration::from_millis(TIMER_POLL_MS)));
            }
            stop.store(true, Ordering::Release);
        });
        self.timer_cancel = Some(cancel);
        self.timer = Some(handle);
    }

    /// Transitions from pondering (no time limit) to a timed search once
    /// the real clock numbers are known.
    pub fn ponder_hit(&mut self, time_control: TimeControl) {
        if self.pondering.swap(false, Ordering::AcqRel) {
            #[cfg(feature = "logging")]
            log::debug!("ponderhit: switching to a timed search");
            let budget = time::budget_ms(&time_control);
            if let Some(cancel) = self.timer_cancel.take() {
                cancel.store(true, Ordering::Release);
            }
            if let Some(t) = self.timer.take() {
                let _ = t.join();
            }
            self.spawn_timer(budget);
        }
    }

    /// Signals the timer to wake and exit, sets the stop flag, and joins
    /// the worker. Safe to call when nothing is running.
    pub fn stop_calculation(&mut self) {
        if let Some(cancel) = self.timer_cancel.take() {
            cancel.store(true, Ordering::Release);
        }
        self.stop.store(true, Ordering::Release);
        if let Some(t) = self.timer.take() {
            let _ = t.join();
        }
        if let Some(w) = self.worker.take() {
            if w.join().is_err() {
                #[cfg(feature = "logging")]
                log::error!("search worker thread panicked");
            }
        }
        #[cfg(feature = "logging")]
        log::info!("search stopped");
        self.pondering.store(false, Ordering::Release);
    }
}

impl Default for EngineController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EngineController {
    fn drop(&mut self) {
        self.stop_calculation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tt::TranspositionTable;
    use std::sync::mpsc;

    #[test]
    fn stop_within_fifty_ms_produces_a_best_move() {
        let pos = Position::startpos();
        let tt = Arc::new(Mutex::new(TranspositionTable::new(1)));
        let params = Arc::new(EvalParams::default());
        let (tx, rx) = mpsc::channel();

        let mut controller = EngineController::new();
        let limits = Limits {
            infinite: true,
            ..Default::default()
        };
        controller.start_analyzing(
            pos,
            tt,
            params,
            limits,
            TimeControl::default(),
            false,
            Box::new(move |event| {
                if let EngineEvent::BestMove { best, .. } = event {
                    let _ = tx.send(best);
                }
            }),
        );

        thread::sleep(Duration::from_millis(50));
        let start = Instant::now();
        controller.stop_calculation();
        assert!(start.elapsed() < Duration::from_millis(200));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_ok());
    }
}
