//! Search Replay - Frame playback and rendering for precomputed search traces.
//!
//! This crate replays the grid snapshots recorded while a path-finding
//! algorithm (Dijkstra, A*, ...) ran, one frame at a time, and overlays the
//! final solution path once the trace completes.
//!
//! # Architecture
//!
//! - `schema`: Grid data model (`Cell`, `Frame`, `FrameSequence`,
//!   `SolutionPath`) and `ReplayConfig`
//! - `store`: Parsing trace artifacts and loading runs from a `RunSource`
//! - `playback`: The timed playback state machine and its driver
//! - `render`: Pure frame-to-draw-command rendering plus a tiny-skia backend
//! - `surface`: Control-panel entry points and read-only display values
//!
//! # Example
//!
//! ```rust,no_run
//! use search_replay::{
//!     playback::{Driver, ThreadSleeper},
//!     schema::ReplayConfig,
//!     store::DirectorySource,
//!     surface::ReplaySession,
//! };
//!
//! let config = ReplayConfig::default();
//! let mut session = ReplaySession::new(DirectorySource::new("data"), &config)?;
//! session.on_run_select("dijkstra")?;
//! session.on_play_pause();
//!
//! Driver::new(ThreadSleeper).run(session.controller_mut(), |controller| {
//!     println!("frame {}", controller.state().current_index);
//!     Ok::<_, std::io::Error>(())
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod playback;
pub mod render;
pub mod schema;
pub mod store;
pub mod surface;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use playback::{PlaybackController, PlaybackPhase, PlaybackState};
pub use render::{DrawCommand, RenderRequest, render};
pub use schema::{Cell, Frame, FrameSequence, ReplayConfig, SolutionPath};
pub use store::{FrameStore, LoadError, LoadedRun};
pub use surface::{ReplaySession, SurfaceView};
