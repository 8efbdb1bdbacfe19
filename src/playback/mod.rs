//! Playback module - Timed frame advancement over a loaded run.
//!
//! [`PlaybackController`] is a pure state machine: it never sleeps or spawns
//! timers itself. It exposes at most one [`PendingTick`]; the host waits out
//! its delay and hands the token back through [`PlaybackController::tick`].
//! Any transition that invalidates timing replaces or clears the pending tick,
//! so a token from an older schedule is rejected as stale.

mod controller;
mod driver;

pub use controller::{
    PendingTick, PlaybackController, PlaybackError, PlaybackPhase, PlaybackState, TickOutcome,
    TickToken,
};
pub use driver::{Driver, Sleeper, ThreadSleeper};
