//! Worker/timer orchestration sitting between the UCI command loop and
//! the search core.

mod controller;
mod time;

pub use controller::{EngineController, EngineEvent, EventSink};
pub use time::{budget_ms, TimeControl};
