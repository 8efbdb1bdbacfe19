//! Grid snapshots, frame sequences and solution paths.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Cell;

/// Shape errors raised while assembling frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Row {row} has {found} columns, expected {expected}")]
    JaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error(
        "Frame {frame} is {}x{}, expected {}x{}",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    InconsistentDimensions {
        frame: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// One rectangular grid snapshot, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl Frame {
    /// Build a frame from rows of cells.
    ///
    /// Every row must have the same length as the first one.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, FrameError> {
        let cols = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * cols);

        for (row, cells_in_row) in rows.into_iter().enumerate() {
            if cells_in_row.len() != cols {
                return Err(FrameError::JaggedRow {
                    row,
                    expected: cols,
                    found: cells_in_row.len(),
                });
            }
            cells.extend(cells_in_row);
        }

        // A frame of empty rows has no extent at all.
        let rows = if cols == 0 { 0 } else { row_count };

        Ok(Self { cells, rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True when the frame has no drawable area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Iterate rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks(0) panics, so an empty frame yields nothing.
        self.cells.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Number of cells carrying the given tag.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}

/// Ordered, immutable sequence of frames for one algorithm run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Arc<[Frame]>,
}

impl FrameSequence {
    /// Build a sequence. All frames must share the dimensions of frame 0.
    pub fn new(frames: Vec<Frame>) -> Result<Self, FrameError> {
        if let Some(first) = frames.first() {
            let expected = first.dimensions();
            for (frame, f) in frames.iter().enumerate().skip(1) {
                if f.dimensions() != expected {
                    return Err(FrameError::InconsistentDimensions {
                        frame,
                        expected,
                        found: f.dimensions(),
                    });
                }
            }
        }
        Ok(Self {
            frames: frames.into(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Index of the terminal frame, `None` when empty.
    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    /// Grid dimensions shared by every frame, `(0, 0)` when empty.
    pub fn dimensions(&self) -> (usize, usize) {
        self.frames.first().map_or((0, 0), Frame::dimensions)
    }
}

/// Grid coordinate in `(row, col)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<[usize; 2]> for Coord {
    fn from([row, col]: [usize; 2]) -> Self {
        Self { row, col }
    }
}

/// Traced route through the grid, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionPath {
    points: Vec<Coord>,
}

impl SolutionPath {
    pub fn new(points: Vec<Coord>) -> Self {
        Self { points }
    }

    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points that fall outside a `rows x cols` grid.
    pub fn out_of_bounds(&self, rows: usize, cols: usize) -> impl Iterator<Item = &Coord> {
        self.points
            .iter()
            .filter(move |c| c.row >= rows || c.col >= cols)
    }
}

impl FromIterator<Coord> for SolutionPath {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[Cell]) -> Vec<Cell> {
        cells.to_vec()
    }

    #[test]
    fn test_frame_from_rows() {
        let frame = Frame::from_rows(vec![
            row(&[Cell::Start, Cell::Empty, Cell::Wall]),
            row(&[Cell::Empty, Cell::VisitedPath, Cell::End]),
        ])
        .unwrap();

        assert_eq!(frame.dimensions(), (2, 3));
        assert_eq!(frame.get(0, 0), Some(Cell::Start));
        assert_eq!(frame.get(1, 2), Some(Cell::End));
        assert_eq!(frame.get(2, 0), None);
        assert_eq!(frame.get(0, 3), None);
        assert_eq!(frame.count(Cell::Empty), 2);
        assert_eq!(frame.iter_rows().count(), 2);
    }

    #[test]
    fn test_jagged_rows_rejected() {
        let err = Frame::from_rows(vec![
            row(&[Cell::Start, Cell::Empty, Cell::Empty]),
            row(&[Cell::Wall, Cell::Empty]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            FrameError::JaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::from_rows(vec![]).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.iter_rows().count(), 0);

        let frame = Frame::from_rows(vec![vec![], vec![]]).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.dimensions(), (0, 0));
    }

    #[test]
    fn test_sequence_dimensions_must_match() {
        let a = Frame::from_rows(vec![row(&[Cell::Start, Cell::Empty])]).unwrap();
        let b = Frame::from_rows(vec![row(&[Cell::Start])]).unwrap();

        let err = FrameSequence::new(vec![a.clone(), b]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InconsistentDimensions { frame: 1, .. }
        ));

        let seq = FrameSequence::new(vec![a.clone(), a]).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.last_index(), Some(1));
        assert_eq!(seq.dimensions(), (1, 2));
    }

    #[test]
    fn test_empty_sequence() {
        let seq = FrameSequence::empty();
        assert!(seq.is_empty());
        assert_eq!(seq.last_index(), None);
        assert!(seq.get(0).is_none());
    }

    #[test]
    fn test_solution_out_of_bounds() {
        let path: SolutionPath = [[0, 0], [1, 4], [3, 1]]
            .into_iter()
            .map(Coord::from)
            .collect();
        let outside: Vec<_> = path.out_of_bounds(2, 2).copied().collect();
        assert_eq!(outside, vec![Coord::new(1, 4), Coord::new(3, 1)]);
    }
}
