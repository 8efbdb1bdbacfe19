//! Runs a controller against a clock.

use std::time::Duration;

use log::{debug, warn};

use super::{PlaybackController, TickOutcome};

/// Waits out the delay before a scheduled tick.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Drives playback on the calling thread until no tick is pending.
///
/// Usage:
/// ```ignore
/// controller.toggle_play_pause();
/// Driver::new(ThreadSleeper).run(&mut controller, |c| draw(c))?;
/// ```
pub struct Driver<S> {
    sleeper: S,
}

impl<S: Sleeper> Driver<S> {
    pub fn new(sleeper: S) -> Self {
        Self { sleeper }
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Emit the current frame, then one frame per delivered tick.
    ///
    /// Returns the number of frames emitted. If `on_frame` fails, the pending
    /// tick is cancelled and playback paused before the error is returned.
    pub fn run<E, F>(
        &mut self,
        controller: &mut PlaybackController,
        mut on_frame: F,
    ) -> Result<usize, E>
    where
        F: FnMut(&PlaybackController) -> Result<(), E>,
    {
        let mut emitted = 0;
        if controller.current_frame().is_some() {
            if let Err(e) = on_frame(controller) {
                controller.pause();
                return Err(e);
            }
            emitted += 1;
        }

        while let Some(pending) = controller.pending_tick() {
            self.sleeper.sleep(pending.delay);
            match controller.tick(pending.token) {
                TickOutcome::Stale => {
                    warn!("Tick {} went stale while sleeping", pending.token.id());
                    continue;
                }
                TickOutcome::Advanced { index } | TickOutcome::Finished { index } => {
                    debug!("Frame {index}");
                }
            }
            if let Err(e) = on_frame(controller) {
                controller.pause();
                return Err(e);
            }
            emitted += 1;
        }

        Ok(emitted)
    }
}
