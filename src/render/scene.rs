//! Frame to draw-command translation.

use super::commands::{Color, DrawCommand, Point, Rect, TextAlign};
use crate::schema::{Cell, Coord, Frame, SolutionPath};

/// Height of the completion banner in pixels.
pub const BANNER_HEIGHT: f32 = 50.0;

/// Banner caption on the last frame.
pub const COMPLETION_TEXT: &str = "Path Found!";

/// Inset of the annotation from the bottom-left corner.
pub const ANNOTATION_INSET: f32 = 10.0;

pub const BACKGROUND: Color = Color::hex(0xf0f4f8);
pub const GRID_LINE: Color = Color::BLACK;
pub const BANNER: Color = Color::rgba(33, 150, 243, 204);
pub const SOLUTION_LINE: Color = Color::hex(0xff0000);

/// Fill color for a cell tag.
pub const fn cell_color(cell: Cell) -> Color {
    match cell {
        Cell::Start => Color::hex(0x4caf50),
        Cell::Wall => Color::hex(0x37474f),
        Cell::End => Color::hex(0xff5722),
        Cell::VisitedPath => Color::hex(0x2196f3),
        Cell::Empty | Cell::Unknown => Color::WHITE,
    }
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub frame: &'a Frame,
    /// Draw the completion banner.
    pub is_last_frame: bool,
    pub solution: &'a SolutionPath,
    pub annotation: Option<&'a str>,
    pub cell_size: f32,
}

/// Center of a grid cell. Rows map to `y`, columns to `x`.
#[inline]
pub fn cell_center(coord: Coord, cell_size: f32) -> Point {
    Point::new(
        coord.col as f32 * cell_size + cell_size / 2.0,
        coord.row as f32 * cell_size + cell_size / 2.0,
    )
}

/// Translate a frame and its overlays into draw commands.
///
/// Empty frames and non-positive cell sizes produce no commands.
pub fn render(req: &RenderRequest<'_>) -> Vec<DrawCommand> {
    let frame = req.frame;
    if frame.is_empty() || req.cell_size.is_nan() || req.cell_size <= 0.0 {
        return Vec::new();
    }

    let cell = req.cell_size;
    let width = frame.cols() as f32 * cell;
    let height = frame.rows() as f32 * cell;
    let canvas = Rect::new(0.0, 0.0, width, height);

    let mut commands = Vec::with_capacity(frame.rows() * frame.cols() * 2 + 8);
    commands.push(DrawCommand::Resize { width, height });
    commands.push(DrawCommand::FillRect {
        rect: canvas,
        color: BACKGROUND,
    });

    for (row, cells) in frame.iter_rows().enumerate() {
        for (col, &tag) in cells.iter().enumerate() {
            let rect = Rect::new(col as f32 * cell, row as f32 * cell, cell, cell);
            commands.push(DrawCommand::FillRect {
                rect,
                color: cell_color(tag),
            });
            commands.push(DrawCommand::StrokeRect {
                rect,
                color: GRID_LINE,
                width: 1.0,
            });
        }
    }

    commands.push(DrawCommand::StrokeRect {
        rect: canvas,
        color: GRID_LINE,
        width: 2.0,
    });

    if req.is_last_frame {
        commands.push(DrawCommand::FillRect {
            rect: Rect::new(0.0, height - BANNER_HEIGHT, width, BANNER_HEIGHT),
            color: BANNER,
        });
        commands.push(DrawCommand::Text {
            text: COMPLETION_TEXT.to_string(),
            position: Point::new(width / 2.0, height - BANNER_HEIGHT / 2.0 + cell / 4.0),
            size: cell,
            align: TextAlign::Center,
            color: Color::WHITE,
        });
    }

    if !req.solution.is_empty() {
        commands.push(DrawCommand::Polyline {
            points: req
                .solution
                .points()
                .iter()
                .map(|&c| cell_center(c, cell))
                .collect(),
            color: SOLUTION_LINE,
            width: 2.0,
        });
    }

    if let Some(text) = req.annotation.filter(|t| !t.is_empty()) {
        commands.push(DrawCommand::Text {
            text: text.to_string(),
            position: Point::new(ANNOTATION_INSET, height - ANNOTATION_INSET),
            size: cell,
            align: TextAlign::Left,
            color: Color::BLACK,
        });
    }

    commands
}
