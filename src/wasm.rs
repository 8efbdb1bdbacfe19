//! WebAssembly bindings for search replays.
//!
//! The page owns fetching and the timer: it registers artifacts with
//! `addRun`, asks `pendingTick()` for the next delay, arms one `setTimeout`,
//! and hands the token back to `tick`. Stale tokens are ignored, so clearing
//! the old timeout after a state change is enough to keep one clock alive.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    playback::{TickOutcome, TickToken},
    schema::ReplayConfig,
    store::{FrameFormat, MemorySource, RunArtifacts},
    surface::ReplaySession,
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// Serializable pending tick.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TickSnapshot {
    token: u64,
    delay_ms: f64,
}

/// WebAssembly wrapper for a replay session.
#[wasm_bindgen]
pub struct WasmReplay {
    session: ReplaySession<MemorySource>,
}

#[wasm_bindgen]
impl WasmReplay {
    /// Create a session from an optional JSON `ReplayConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmReplay, JsValue> {
        let config: ReplayConfig = match config_json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?,
            None => ReplayConfig::default(),
        };
        let session = ReplaySession::new(MemorySource::new(), &config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmReplay { session })
    }

    /// Register fetched artifacts for a run (`frames_json` is the JSON array
    /// of frame strings). Replaces earlier artifacts with the same id.
    #[wasm_bindgen(js_name = addRun)]
    pub fn add_run(
        &mut self,
        run_id: &str,
        frames_json: &str,
        solution_json: Option<String>,
        annotation: Option<String>,
    ) {
        let mut artifacts = RunArtifacts::frames(frames_json, FrameFormat::Json);
        artifacts.solution = solution_json;
        artifacts.annotation = annotation;

        let store = self.session.store_mut();
        store.source_mut().insert(run_id, artifacts);
        store.invalidate(run_id);
    }

    /// Commit a registered run. Keeps the previous run on failure.
    #[wasm_bindgen(js_name = selectRun)]
    pub fn select_run(&mut self, run_id: &str) -> Result<(), JsValue> {
        self.session
            .on_run_select(run_id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = playPause)]
    pub fn play_pause(&mut self) {
        self.session.on_play_pause();
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: f64) -> Result<f64, JsValue> {
        self.session
            .on_speed_change(speed)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = setCellSize)]
    pub fn set_cell_size(&mut self, cell_size: f64) -> Result<f64, JsValue> {
        self.session
            .on_cell_size_change(cell_size)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = showFinalPath)]
    pub fn show_final_path(&mut self) -> Result<usize, JsValue> {
        self.session
            .on_show_final_path()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Next tick as `{ token, delayMs }`, or `null` when nothing is scheduled.
    #[wasm_bindgen(js_name = pendingTick)]
    pub fn pending_tick(&self) -> Result<JsValue, JsValue> {
        let snapshot = self
            .session
            .controller()
            .pending_tick()
            .map(|p| TickSnapshot {
                token: p.token.id(),
                delay_ms: p.delay.as_secs_f64() * 1000.0,
            });
        serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Deliver a tick. Returns false for stale tokens.
    #[wasm_bindgen]
    pub fn tick(&mut self, token: u64) -> bool {
        !matches!(
            self.session.controller_mut().tick(TickToken::from_id(token)),
            TickOutcome::Stale
        )
    }

    /// Current display values.
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.view())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Draw commands for the current frame.
    #[wasm_bindgen(js_name = drawCommands)]
    pub fn draw_commands(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.draw())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Sidebar completion notice, or `undefined`.
    #[wasm_bindgen(js_name = completionMessage)]
    pub fn completion_message(&self) -> Option<String> {
        self.session.completion_message()
    }
}
