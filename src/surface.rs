//! Control surface - the UI-facing entry points of a replay.
//!
//! [`ReplaySession`] pairs a [`FrameStore`] with a [`PlaybackController`] and
//! exposes the handful of actions a control panel needs. Displays read a
//! [`SurfaceView`] snapshot and never touch playback state directly.

use log::{info, warn};
use serde::Serialize;

use crate::playback::{PlaybackController, PlaybackError, PlaybackPhase};
use crate::render::{DrawCommand, render};
use crate::schema::{ConfigError, ReplayConfig};
use crate::store::{FrameStore, LoadError, RunSource};

/// Read-only display values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceView {
    pub run_id: Option<String>,
    pub phase: PlaybackPhase,
    pub is_playing: bool,
    pub is_last_slide: bool,
    pub current_index: usize,
    pub frame_count: usize,
    pub speed: f64,
    pub cell_size: f64,
    /// Annotation text, empty when there is none or it is hidden.
    pub solution_text: String,
}

/// One replay session driven by a control panel.
pub struct ReplaySession<S> {
    store: FrameStore<S>,
    controller: PlaybackController,
}

impl<S: RunSource> ReplaySession<S> {
    pub fn new(source: S, config: &ReplayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: FrameStore::new(source, config.vocabulary.clone()),
            controller: PlaybackController::new(config),
        })
    }

    pub fn on_play_pause(&mut self) {
        self.controller.toggle_play_pause();
    }

    /// Returns the speed actually applied after clamping.
    pub fn on_speed_change(&mut self, speed: f64) -> Result<f64, PlaybackError> {
        self.controller.set_speed(speed)
    }

    /// Returns the cell size actually applied after clamping.
    pub fn on_cell_size_change(&mut self, cell_size: f64) -> Result<f64, PlaybackError> {
        self.controller.set_cell_size(cell_size)
    }

    /// Load and commit a run.
    ///
    /// On failure the previously committed run stays active.
    pub fn on_run_select(&mut self, run_id: &str) -> Result<(), LoadError> {
        match self.store.load(run_id) {
            Ok(run) => {
                self.controller.load(run);
                Ok(())
            }
            Err(e) => {
                warn!("Keeping previous run, failed to load {run_id:?}: {e}");
                Err(e)
            }
        }
    }

    pub fn on_show_final_path(&mut self) -> Result<usize, PlaybackError> {
        let index = self.controller.jump_to_final()?;
        info!("Showing final path at frame {index}");
        Ok(index)
    }

    pub fn view(&self) -> SurfaceView {
        let state = self.controller.state();
        SurfaceView {
            run_id: self.controller.run().map(|r| r.run_id.clone()),
            phase: self.controller.phase(),
            is_playing: state.is_playing,
            is_last_slide: self.controller.is_last_frame(),
            current_index: state.current_index,
            frame_count: self.controller.frame_count(),
            speed: state.speed,
            cell_size: state.cell_size,
            solution_text: self
                .controller
                .visible_annotation()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Draw commands for the current frame; empty when nothing is loaded.
    pub fn draw(&self) -> Vec<DrawCommand> {
        self.controller
            .render_request()
            .map(|req| render(&req))
            .unwrap_or_default()
    }

    /// Completion notice shown alongside the last slide.
    pub fn completion_message(&self) -> Option<String> {
        if !self.controller.is_last_frame() {
            return None;
        }
        let run_id = &self.controller.run()?.run_id;
        Some(match run_id.as_str() {
            "dijkstra" => "Dijkstra's algorithm completed.".to_string(),
            "aStar" => "A* Algorithm completed.".to_string(),
            other => format!("{other} completed."),
        })
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn store(&self) -> &FrameStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FrameStore<S> {
        &mut self.store
    }
}
