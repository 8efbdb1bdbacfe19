//! Playback state machine with a single cancellable scheduled tick.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::render::RenderRequest;
use crate::schema::{Bounds, Frame, ReplayConfig, RevealPolicy, SolutionPath};
use crate::store::LoadedRun;

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// No frames loaded.
    Idle,
    /// Frames loaded, not advancing.
    Paused,
    /// Advancing on a timer.
    Playing,
    /// At the last frame after playing or jumping there.
    Finished,
}

/// Externally visible playback values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    /// Frames per second.
    pub speed: f64,
    /// Cell edge in pixels.
    pub cell_size: f64,
}

/// Identifies one scheduled tick. Tokens are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TickToken(u64);

impl TickToken {
    pub fn id(self) -> u64 {
        self.0
    }

    pub fn from_id(id: u64) -> Self {
        Self(id)
    }
}

/// The single live scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingTick {
    pub token: TickToken,
    /// Delay from the moment the tick was scheduled.
    pub delay: Duration,
}

/// Result of delivering a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Advanced to `index`, another tick is scheduled.
    Advanced { index: usize },
    /// Advanced onto the last frame, playback stopped.
    Finished { index: usize },
    /// Token did not match the live tick; nothing changed.
    Stale,
}

/// Errors from playback operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("No frames loaded")]
    EmptySequence,
    #[error("Invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: f64 },
}

/// Timed state machine over a loaded run.
///
/// Usage:
/// ```ignore
/// let mut controller = PlaybackController::new(&ReplayConfig::default());
/// controller.load(store.load("dijkstra")?);
/// controller.toggle_play_pause();
/// while let Some(pending) = controller.pending_tick() {
///     sleep(pending.delay);
///     controller.tick(pending.token);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackController {
    run: Option<Arc<LoadedRun>>,
    state: PlaybackState,
    phase: PlaybackPhase,
    pending: Option<PendingTick>,
    next_token: u64,
    speed_bounds: Bounds,
    cell_size_bounds: Bounds,
    reveal: RevealPolicy,
    revealed: bool,
}

static NO_SOLUTION: SolutionPath = SolutionPath::empty();

impl PlaybackController {
    /// Create an idle controller.
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            run: None,
            state: PlaybackState {
                current_index: 0,
                is_playing: false,
                speed: config.speed_bounds.clamp(config.speed),
                cell_size: config.cell_size_bounds.clamp(config.cell_size),
            },
            phase: PlaybackPhase::Idle,
            pending: None,
            next_token: 0,
            speed_bounds: config.speed_bounds,
            cell_size_bounds: config.cell_size_bounds,
            reveal: config.reveal,
            revealed: false,
        }
    }

    /// Commit a run, replacing any previous one.
    ///
    /// Resets the cursor to 0 and stops playback. Empty runs leave the
    /// controller `Idle`.
    pub fn load(&mut self, run: Arc<LoadedRun>) {
        self.cancel_pending();
        self.state.current_index = 0;
        self.state.is_playing = false;
        self.revealed = false;
        self.phase = if run.frames.is_empty() {
            PlaybackPhase::Idle
        } else {
            PlaybackPhase::Paused
        };
        info!(
            "Loaded run {:?} with {} frames ({:?})",
            run.run_id,
            run.frames.len(),
            self.phase
        );
        self.run = Some(run);
    }

    /// Start or pause playback. No-op when idle or finished.
    pub fn toggle_play_pause(&mut self) {
        match self.phase {
            PlaybackPhase::Paused if self.state.current_index < self.last_index() => {
                self.phase = PlaybackPhase::Playing;
                self.state.is_playing = true;
                self.schedule();
            }
            PlaybackPhase::Playing => {
                self.cancel_pending();
                self.phase = PlaybackPhase::Paused;
                self.state.is_playing = false;
            }
            _ => {}
        }
        debug!("Play/pause -> {:?}", self.phase);
    }

    /// Stop advancing. No-op unless playing.
    pub fn pause(&mut self) {
        if self.phase == PlaybackPhase::Playing {
            self.toggle_play_pause();
        }
    }

    /// Deliver a scheduled tick.
    ///
    /// Only the live token advances the cursor; anything else is stale.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        match self.pending {
            Some(pending) if pending.token == token && self.phase == PlaybackPhase::Playing => {}
            _ => {
                debug!("Dropped stale tick {}", token.id());
                return TickOutcome::Stale;
            }
        }
        self.pending = None;
        self.state.current_index += 1;
        let index = self.state.current_index;

        if index >= self.last_index() {
            self.finish();
            TickOutcome::Finished { index }
        } else {
            self.schedule();
            TickOutcome::Advanced { index }
        }
    }

    /// Set the playback rate, clamped to the configured bounds.
    ///
    /// The pending tick keeps its delay; the new rate applies from the next
    /// scheduled tick.
    pub fn set_speed(&mut self, speed: f64) -> Result<f64, PlaybackError> {
        let speed = clamp_finite("speed", speed, self.speed_bounds)?;
        self.state.speed = speed;
        Ok(speed)
    }

    /// Set the cell size in pixels, clamped to the configured bounds.
    pub fn set_cell_size(&mut self, cell_size: f64) -> Result<f64, PlaybackError> {
        let cell_size = clamp_finite("cell_size", cell_size, self.cell_size_bounds)?;
        self.state.cell_size = cell_size;
        Ok(cell_size)
    }

    /// Jump to the last frame and stop.
    pub fn jump_to_final(&mut self) -> Result<usize, PlaybackError> {
        if self.phase == PlaybackPhase::Idle {
            return Err(PlaybackError::EmptySequence);
        }
        self.cancel_pending();
        self.state.current_index = self.last_index();
        self.finish();
        Ok(self.state.current_index)
    }

    /// Move the cursor to `index` (clamped to the last frame).
    ///
    /// Playback continues from the new position if it was running.
    pub fn seek(&mut self, index: usize) -> Result<usize, PlaybackError> {
        if self.phase == PlaybackPhase::Idle {
            return Err(PlaybackError::EmptySequence);
        }
        let was_playing = self.state.is_playing;
        self.cancel_pending();

        let last = self.last_index();
        self.state.current_index = index.min(last);
        if self.state.current_index == last {
            self.finish();
        } else if was_playing {
            self.schedule();
        } else {
            self.phase = PlaybackPhase::Paused;
        }
        Ok(self.state.current_index)
    }

    /// Drop the scheduled tick, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Cancelled tick {}", pending.token.id());
        }
    }

    pub fn pending_tick(&self) -> Option<PendingTick> {
        self.pending
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn run(&self) -> Option<&LoadedRun> {
        self.run.as_deref()
    }

    pub fn frame_count(&self) -> usize {
        self.run.as_ref().map_or(0, |r| r.frames.len())
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.run
            .as_ref()
            .and_then(|r| r.frames.get(self.state.current_index))
    }

    /// True when a non-empty run sits on its last frame.
    pub fn is_last_frame(&self) -> bool {
        self.phase != PlaybackPhase::Idle && self.state.current_index == self.last_index()
    }

    /// Whether the solution overlay and annotation should be shown.
    pub fn solution_visible(&self) -> bool {
        self.reveal.shows(self.revealed)
    }

    /// Solution path to overlay, empty while hidden.
    pub fn visible_solution(&self) -> &SolutionPath {
        match &self.run {
            Some(run) if self.solution_visible() => &run.solution,
            _ => &NO_SOLUTION,
        }
    }

    /// Annotation text to overlay, `None` while hidden.
    pub fn visible_annotation(&self) -> Option<&str> {
        self.run
            .as_ref()
            .filter(|_| self.solution_visible())
            .and_then(|r| r.annotation.as_deref())
    }

    /// Renderer input for the current frame.
    pub fn render_request(&self) -> Option<RenderRequest<'_>> {
        self.current_frame().map(|frame| RenderRequest {
            frame,
            is_last_frame: self.is_last_frame(),
            solution: self.visible_solution(),
            annotation: self.visible_annotation(),
            cell_size: self.state.cell_size as f32,
        })
    }

    fn last_index(&self) -> usize {
        self.run
            .as_ref()
            .and_then(|r| r.frames.last_index())
            .unwrap_or(0)
    }

    fn finish(&mut self) {
        self.pending = None;
        self.state.is_playing = false;
        self.phase = PlaybackPhase::Finished;
        if !self.revealed {
            self.revealed = true;
            debug!("Solution revealed at frame {}", self.state.current_index);
        }
    }

    /// Replace the pending tick with a fresh one using the current speed.
    fn schedule(&mut self) {
        let token = TickToken(self.next_token);
        self.next_token += 1;
        let delay = Duration::from_nanos((1e9 / self.state.speed).round() as u64);
        self.pending = Some(PendingTick { token, delay });
    }
}

fn clamp_finite(name: &'static str, value: f64, bounds: Bounds) -> Result<f64, PlaybackError> {
    if !value.is_finite() {
        return Err(PlaybackError::InvalidValue { name, value });
    }
    Ok(bounds.clamp(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cell, Coord, Frame, FrameSequence};
    use proptest::prelude::*;

    fn run(len: usize) -> Arc<LoadedRun> {
        let frames = (0..len)
            .map(|i| {
                let visited = if i % 2 == 0 { Cell::VisitedPath } else { Cell::Empty };
                Frame::from_rows(vec![vec![Cell::Start, visited]]).unwrap()
            })
            .collect();
        Arc::new(LoadedRun {
            run_id: "test".to_string(),
            frames: FrameSequence::new(frames).unwrap(),
            solution: SolutionPath::new(vec![Coord::new(0, 0), Coord::new(0, 1)]),
            annotation: Some("Path length: 1".to_string()),
        })
    }

    fn loaded(len: usize) -> PlaybackController {
        let mut controller = PlaybackController::new(&ReplayConfig::default());
        controller.load(run(len));
        controller
    }

    fn fire(controller: &mut PlaybackController) -> TickOutcome {
        let pending = controller.pending_tick().expect("tick scheduled");
        controller.tick(pending.token)
    }

    #[test]
    fn test_new_controller_is_idle() {
        let mut controller = PlaybackController::new(&ReplayConfig::default());
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert!(controller.current_frame().is_none());
        assert!(controller.render_request().is_none());
        assert!(!controller.is_last_frame());

        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert!(controller.pending_tick().is_none());
        assert_eq!(controller.jump_to_final(), Err(PlaybackError::EmptySequence));
        assert_eq!(controller.seek(3), Err(PlaybackError::EmptySequence));
    }

    #[test]
    fn test_load_resets() {
        let mut controller = loaded(5);
        controller.toggle_play_pause();
        fire(&mut controller);
        assert_eq!(controller.state().current_index, 1);

        controller.load(run(3));
        let state = controller.state();
        assert_eq!(state.current_index, 0);
        assert!(!state.is_playing);
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        assert!(controller.pending_tick().is_none());
    }

    #[test]
    fn test_load_empty_is_idle() {
        let mut controller = loaded(3);
        controller.load(Arc::new(LoadedRun::empty("none")));
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert_eq!(controller.frame_count(), 0);
        assert!(controller.render_request().is_none());
    }

    #[test]
    fn test_toggle_twice_returns_to_paused() {
        let mut controller = loaded(4);
        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlaybackPhase::Playing);
        assert!(controller.state().is_playing);
        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        assert_eq!(controller.state().current_index, 0);
        assert!(controller.pending_tick().is_none());
    }

    #[test]
    fn test_single_frame_cannot_play() {
        let mut controller = loaded(1);
        assert!(controller.is_last_frame());
        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_two_frame_scenario() {
        let mut controller = loaded(2);
        assert!(!controller.render_request().unwrap().is_last_frame);

        controller.toggle_play_pause();
        assert_eq!(fire(&mut controller), TickOutcome::Finished { index: 1 });
        assert!(controller.render_request().unwrap().is_last_frame);
        assert!(!controller.state().is_playing);
        assert_eq!(controller.phase(), PlaybackPhase::Finished);
        assert!(controller.pending_tick().is_none());

        // Finished ignores play/pause.
        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlaybackPhase::Finished);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut controller = loaded(5);
        controller.toggle_play_pause();
        let old = controller.pending_tick().unwrap();
        controller.toggle_play_pause();
        controller.toggle_play_pause();
        let new = controller.pending_tick().unwrap();
        assert_ne!(old.token, new.token);

        assert_eq!(controller.tick(old.token), TickOutcome::Stale);
        assert_eq!(controller.state().current_index, 0);
        assert_eq!(controller.tick(new.token), TickOutcome::Advanced { index: 1 });
        // A token fires once.
        assert_eq!(controller.tick(new.token), TickOutcome::Stale);
    }

    #[test]
    fn test_speed_change_applies_to_next_tick() {
        let mut controller = loaded(5);
        controller.set_speed(10.0).unwrap();
        controller.toggle_play_pause();
        let pending = controller.pending_tick().unwrap();
        assert_eq!(pending.delay, Duration::from_millis(100));

        controller.set_speed(50.0).unwrap();
        assert_eq!(controller.pending_tick(), Some(pending));

        controller.tick(pending.token);
        let next = controller.pending_tick().unwrap();
        assert_eq!(next.delay, Duration::from_millis(20));
    }

    #[test]
    fn test_setters_clamp() {
        let mut controller = loaded(3);
        assert_eq!(controller.set_speed(60000.0), Ok(60.0));
        assert_eq!(controller.set_speed(0.0), Ok(1.0));
        assert_eq!(controller.set_cell_size(8.5), Ok(8.5));
        assert_eq!(controller.set_cell_size(500.0), Ok(100.0));
        assert!(matches!(
            controller.set_speed(f64::NAN),
            Err(PlaybackError::InvalidValue { name: "speed", .. })
        ));
        assert_eq!(controller.state().speed, 1.0);
    }

    #[test]
    fn test_jump_to_final() {
        let mut controller = loaded(6);
        controller.toggle_play_pause();
        assert_eq!(controller.jump_to_final(), Ok(5));
        assert_eq!(controller.phase(), PlaybackPhase::Finished);
        assert!(!controller.state().is_playing);
        assert!(controller.pending_tick().is_none());
        assert!(controller.is_last_frame());
    }

    #[test]
    fn test_seek() {
        let mut controller = loaded(6);
        controller.toggle_play_pause();
        let before = controller.pending_tick().unwrap();
        assert_eq!(controller.seek(3), Ok(3));
        let after = controller.pending_tick().unwrap();
        assert_ne!(before.token, after.token);
        assert_eq!(controller.phase(), PlaybackPhase::Playing);

        assert_eq!(controller.seek(99), Ok(5));
        assert_eq!(controller.phase(), PlaybackPhase::Finished);

        assert_eq!(controller.seek(0), Ok(0));
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        assert!(controller.pending_tick().is_none());
    }

    #[test]
    fn test_reveal_on_finish() {
        let config = ReplayConfig {
            reveal: RevealPolicy::OnFinish,
            ..Default::default()
        };
        let mut controller = PlaybackController::new(&config);
        controller.load(run(3));
        assert!(controller.visible_solution().is_empty());
        assert!(controller.visible_annotation().is_none());

        controller.jump_to_final().unwrap();
        assert_eq!(controller.visible_solution().len(), 2);
        assert_eq!(controller.visible_annotation(), Some("Path length: 1"));

        // Seeking back keeps the solution revealed; a new load hides it.
        controller.seek(0).unwrap();
        assert_eq!(controller.visible_solution().len(), 2);
        controller.load(run(3));
        assert!(controller.visible_solution().is_empty());
    }

    #[test]
    fn test_reveal_always() {
        let controller = loaded(3);
        assert_eq!(controller.visible_solution().len(), 2);
        assert_eq!(controller.visible_annotation(), Some("Path length: 1"));
    }

    proptest! {
        #[test]
        fn prop_load_resets_cursor(len in 1usize..40, start in 0usize..40) {
            let mut controller = loaded(len);
            controller.seek(start).unwrap();
            controller.load(run(len));
            prop_assert_eq!(controller.state().current_index, 0);
            prop_assert!(!controller.state().is_playing);
        }

        #[test]
        fn prop_ticks_advance_by_one_and_converge(len in 1usize..60, start in 0usize..60) {
            let mut controller = loaded(len);
            controller.seek(start).unwrap();
            controller.toggle_play_pause();

            let mut previous = controller.state().current_index;
            while let Some(pending) = controller.pending_tick() {
                controller.tick(pending.token);
                let index = controller.state().current_index;
                prop_assert_eq!(index, previous + 1);
                prop_assert!(index < len);
                previous = index;
            }

            prop_assert_eq!(controller.state().current_index, len - 1);
            prop_assert!(!controller.state().is_playing);
        }
    }
}
