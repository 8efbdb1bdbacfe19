//! Render module - Grid frames to drawing operations.
//!
//! [`render`] is pure: it maps a frame plus overlays to an ordered list of
//! [`DrawCommand`]s. A [`RasterBackend`] consumes that list; the bundled
//! [`PixmapRaster`] rasterizes it on the CPU with tiny-skia.

mod commands;
#[cfg(not(target_arch = "wasm32"))]
mod export;
mod raster;
mod scene;

pub use commands::{Color, DrawCommand, Point, Rect, TextAlign};
#[cfg(not(target_arch = "wasm32"))]
pub use export::{ExportOptions, export_frames};
pub use raster::{PixmapRaster, RasterBackend, RasterError};
pub use scene::{
    ANNOTATION_INSET, BACKGROUND, BANNER, BANNER_HEIGHT, COMPLETION_TEXT, GRID_LINE,
    RenderRequest, SOLUTION_LINE, cell_center, cell_color, render,
};
