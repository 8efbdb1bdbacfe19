//! Rasterizing draw commands onto a pixmap.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use log::debug;
use tiny_skia::{Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, Transform};

use super::commands::{Color, DrawCommand, Point, Rect, TextAlign};

/// Raster backend errors.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Failed to create {width}x{height} pixmap")]
    PixmapCreation { width: u32, height: u32 },

    #[error("Draw command issued before the surface was sized")]
    NoSurface,

    #[error("Font data could not be parsed")]
    InvalidFont,

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumer of draw commands.
pub trait RasterBackend {
    type Error;

    /// Execute commands in order.
    fn execute(&mut self, commands: &[DrawCommand]) -> Result<(), Self::Error>;
}

/// CPU raster backend built on tiny-skia.
///
/// Text needs a font; without one, text commands are skipped.
#[derive(Default)]
pub struct PixmapRaster {
    pixmap: Option<Pixmap>,
    font: Option<Arc<FontVec>>,
    skipped_text: usize,
}

impl PixmapRaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that draws text with the given TrueType/OpenType font.
    pub fn with_font_data(data: Vec<u8>) -> Result<Self, RasterError> {
        let font = FontVec::try_from_vec(data).map_err(|_| RasterError::InvalidFont)?;
        Ok(Self::with_font(Arc::new(font)))
    }

    pub fn with_font(font: Arc<FontVec>) -> Self {
        Self {
            font: Some(font),
            ..Self::default()
        }
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Number of text commands dropped for lack of a font.
    pub fn skipped_text(&self) -> usize {
        self.skipped_text
    }

    /// Straight-alpha color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some(Color::rgba(c.red(), c.green(), c.blue(), c.alpha()))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.surface()?
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }

    fn surface(&self) -> Result<&Pixmap, RasterError> {
        self.pixmap.as_ref().ok_or(RasterError::NoSurface)
    }

    fn surface_mut(&mut self) -> Result<&mut Pixmap, RasterError> {
        self.pixmap.as_mut().ok_or(RasterError::NoSurface)
    }

    fn resize(&mut self, width: f32, height: f32) -> Result<(), RasterError> {
        let (w, h) = (width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32);
        let pixmap = Pixmap::new(w, h).ok_or(RasterError::PixmapCreation {
            width: w,
            height: h,
        })?;
        self.pixmap = Some(pixmap);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        size: f32,
        align: TextAlign,
        color: Color,
    ) -> Result<(), RasterError> {
        let Some(font) = self.font.clone() else {
            self.skipped_text += 1;
            debug!("No font loaded, skipping text {text:?}");
            return Ok(());
        };
        let pixmap = self.surface_mut()?;

        let scaled = font.as_scaled(PxScale::from(size));
        let mut caret = 0.0;
        let mut previous = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push((id, caret));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        let origin_x = match align {
            TextAlign::Left => position.x,
            TextAlign::Center => position.x - caret / 2.0,
        };

        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let pixels = pixmap.pixels_mut();

        for (id, offset) in glyphs {
            let glyph = id.with_scale_and_position(
                scaled.scale(),
                point(origin_x + offset, position.y),
            );
            let Some(outline) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                let idx = (y * width + x) as usize;
                if let Some(blended) = blend(pixels[idx], color, coverage) {
                    pixels[idx] = blended;
                }
            });
        }

        Ok(())
    }
}

/// Source-over blend of a straight-alpha color with partial coverage.
fn blend(dst: PremultipliedColorU8, color: Color, coverage: f32) -> Option<PremultipliedColorU8> {
    let a = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    let inv = 1.0 - a;
    let alpha = (255.0 * a + dst.alpha() as f32 * inv).round() as u8;
    let channel = |s: u8, d: u8| ((s as f32 * a + d as f32 * inv).round() as u8).min(alpha);
    PremultipliedColorU8::from_rgba(
        channel(color.r, dst.red()),
        channel(color.g, dst.green()),
        channel(color.b, dst.blue()),
        alpha,
    )
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

impl RasterBackend for PixmapRaster {
    type Error = RasterError;

    fn execute(&mut self, commands: &[DrawCommand]) -> Result<(), RasterError> {
        for command in commands {
            match command {
                DrawCommand::Resize { width, height } => self.resize(*width, *height)?,
                DrawCommand::FillRect { rect, color } => {
                    let pixmap = self.surface_mut()?;
                    if let Some(r) = skia_rect(*rect) {
                        pixmap.fill_rect(r, &paint(*color), Transform::identity(), None);
                    }
                }
                DrawCommand::StrokeRect { rect, color, width } => {
                    let pixmap = self.surface_mut()?;
                    if let Some(r) = skia_rect(*rect) {
                        let path = PathBuilder::from_rect(r);
                        let stroke = Stroke {
                            width: *width,
                            ..Stroke::default()
                        };
                        pixmap.stroke_path(
                            &path,
                            &paint(*color),
                            &stroke,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                DrawCommand::Polyline {
                    points,
                    color,
                    width,
                } => {
                    let pixmap = self.surface_mut()?;
                    let mut pb = PathBuilder::new();
                    for (i, p) in points.iter().enumerate() {
                        if i == 0 {
                            pb.move_to(p.x, p.y);
                        } else {
                            pb.line_to(p.x, p.y);
                        }
                    }
                    // A single point yields no path.
                    if let Some(path) = pb.finish() {
                        let stroke = Stroke {
                            width: *width,
                            ..Stroke::default()
                        };
                        pixmap.stroke_path(
                            &path,
                            &paint(*color),
                            &stroke,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                DrawCommand::Text {
                    text,
                    position,
                    size,
                    align,
                    color,
                } => self.draw_text(text, *position, *size, *align, *color)?,
            }
        }
        Ok(())
    }
}
