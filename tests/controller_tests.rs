//! End-to-end engine controller behaviour: ponder transitions, node-limited
//! searches, and move-time budgets, all through the public worker/timer API.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mantis_core::engine::{EngineController, EngineEvent, TimeControl};
use mantis_core::eval::EvalParams;
use mantis_core::position::Position;
use mantis_core::search::Limits;
use mantis_core::tt::TranspositionTable;
use parking_lot::Mutex;

#[test]
fn move_time_budget_stops_the_search_on_its_own() {
    let pos = Position::startpos();
    let tt = Arc::new(Mutex::new(TranspositionTable::new(1)));
    let params = Arc::new(EvalParams::default());
    let (tx, rx) = mpsc::channel();

    let mut controller = EngineController::new();
    let time_control = TimeControl {
        move_time_ms: Some(80),
        ..Default::default()
    };
    let start = Instant::now();
    controller.start_analyzing(
        pos,
        tt,
        params,
        Limits::default(),
        time_control,
        false,
        Box::new(move |event| {
            if let EngineEvent::BestMove { best, .. } = event {
                let _ = tx.send(best);
            }
        }),
    );

    let best = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!best.is_null());
    assert!(start.elapsed() < Duration::from_secs(5));
    controller.stop_calculation();
}

#[test]
fn ponder_hit_switches_an_unlimited_search_onto_the_clock() {
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
        true,
        Box::new(move |event| {
            if let EngineEvent::BestMove { best, .. } = event {
                let _ = tx.send(best);
            }
        }),
    );

    // While pondering, no move-time budget applies; nothing should arrive
    // this quickly on its own.
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    controller.ponder_hit(TimeControl {
        move_time_ms: Some(80),
        ..Default::default()
    });

    let best = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!best.is_null());
    controller.stop_calculation();
}

#[test]
fn node_limited_search_stays_within_a_small_node_budget() {
    let mut pos = Position::from_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    )
    .unwrap();
    let mut tt = TranspositionTable::new(1);
    let params = EvalParams::default();
    let stop = AtomicBool::new(false);
    let limits = Limits {
        node_limit: 50,
        ..Default::default()
    };

    let (best, _) = mantis_core::search::iterative_deepening(
        &mut pos,
        &mut tt,
        &params,
        &stop,
        &limits,
        |_| {},
        |_, _| {},
    );

    assert!(!best.is_null());
}

#[test]
fn stop_calculation_joins_cleanly_when_nothing_was_started() {
    let mut controller = EngineController::new();
    controller.stop_calculation();
    assert!(!controller.is_running());
}

#[test]
fn start_analyzing_while_already_running_stops_the_previous_search() {
    let tt = Arc::new(Mutex::new(TranspositionTable::new(1)));
    let params = Arc::new(EvalParams::default());
    let (tx, rx) = mpsc::channel();

    let mut controller = EngineController::new();
    let limits = Limits {
        infinite: true,
        ..Default::default()
    };
    controller.start_analyzing(
        Position::startpos(),
        Arc::clone(&tt),
        Arc::clone(&params),
        limits.clone(),
        TimeControl::default(),
        false,
        Box::new(|_| {}),
    );

    thread::sleep(Duration::from_millis(20));

    controller.start_analyzing(
        Position::startpos(),
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

    thread::sleep(Duration::from_millis(20));
    controller.stop_calculation();
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_ok());
}
