//! Wall-clock time budgeting for a single `go` command.

/// Fixed communication/lag buffer subtracted from every computed budget.
const LAG_BUFFER_MS: u64 = 50;

/// Assumed moves remaining when the protocol doesn't say.
const DEFAULT_MOVES_TO_GO: u64 = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeControl {
    pub clock_ms: Option<u64>,
    pub increment_ms: u64,
    pub moves_to_go: Option<u64>,
    pub move_time_ms: Option<u64>,
}

/// Derives the search time budget in milliseconds.
///
/// `(clock / max(movesToGo, 50)) * 1.5 + increment`, clamped to the clock
/// and reduced by a fixed lag buffer, floored at that buffer. The floor is
/// unconditional whenever a clock was given at all, so a real but tiny
/// clock (e.g. `wtime 1`) still gets a bounded, nonzero budget rather than
/// being mistaken for the "no clock" (untimed/ponder) case, which is the
/// only situation `0` is allowed to mean.
pub fn budget_ms(tc: &TimeControl) -> u64 {
    if let Some(mt) = tc.move_time_ms {
        return mt;
    }
    let Some(clock) = tc.clock_ms else {
        return 0;
    };
    let moves_to_go = tc.moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
    let per_move = (clock as f64 / moves_to_go as f64 * 1.5) as u64 + tc.increment_ms;
    let clamped = per_move.min(clock);
    let budget = clamped.saturating_sub(LAG_BUFFER_MS);
    if budget <= LAG_BUFFER_MS {
        LAG_BUFFER_MS
    } else {
        budget
    }
}
