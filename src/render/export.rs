//! Batch export of a run to PNG files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::FontVec;
use log::{debug, info};
use rayon::prelude::*;

use super::raster::{PixmapRaster, RasterBackend, RasterError};
use super::scene::{RenderRequest, render};
use crate::schema::{ReplayConfig, RevealPolicy, SolutionPath};
use crate::store::LoadedRun;

/// Options for [`export_frames`].
#[derive(Clone)]
pub struct ExportOptions {
    pub cell_size: f32,
    pub reveal: RevealPolicy,
    pub font: Option<Arc<FontVec>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        let config = ReplayConfig::default();
        Self {
            cell_size: config.cell_size as f32,
            reveal: config.reveal,
            font: None,
        }
    }
}

/// Render every frame of `run` to `<out_dir>/<run_id>_<index>.png`.
///
/// Frames are rasterized in parallel. Frames that render to nothing (no rows
/// or columns) are skipped. Returns the written paths in frame order.
pub fn export_frames(
    run: &LoadedRun,
    options: &ExportOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, RasterError> {
    fs::create_dir_all(out_dir)?;
    let last = run.frames.last_index();
    let hidden = SolutionPath::empty();

    let paths = run
        .frames
        .as_slice()
        .par_iter()
        .enumerate()
        .map(|(index, frame)| -> Result<Option<PathBuf>, RasterError> {
            let is_last_frame = Some(index) == last;
            let show_solution = options.reveal.shows(is_last_frame);
            let commands = render(&RenderRequest {
                frame,
                is_last_frame,
                solution: if show_solution { &run.solution } else { &hidden },
                annotation: run.annotation.as_deref().filter(|_| show_solution),
                cell_size: options.cell_size,
            });
            if commands.is_empty() {
                debug!("Frame {index} of {:?} has nothing to draw, skipped", run.run_id);
                return Ok(None);
            }

            let mut raster = match &options.font {
                Some(font) => PixmapRaster::with_font(Arc::clone(font)),
                None => PixmapRaster::new(),
            };
            raster.execute(&commands)?;

            let path = out_dir.join(format!("{}_{index:05}.png", run.run_id));
            raster.save_png(&path)?;
            Ok(Some(path))
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    info!(
        "Exported {} frames of {:?} to {}",
        paths.len(),
        run.run_id,
        out_dir.display()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cell, CellVocabulary, Coord, Frame, FrameSequence};
    use crate::store::{FrameFormat, parse_frames};
    use tempfile::tempdir;

    #[test]
    fn test_export_writes_every_frame() {
        let frame = Frame::from_rows(vec![vec![Cell::Start, Cell::End]]).unwrap();
        let run = LoadedRun {
            run_id: "aStar".to_string(),
            frames: FrameSequence::new(vec![frame.clone(), frame.clone(), frame]).unwrap(),
            solution: SolutionPath::new(vec![Coord::new(0, 0), Coord::new(0, 1)]),
            annotation: None,
        };
        let dir = tempdir().unwrap();
        let options = ExportOptions {
            cell_size: 12.0,
            ..Default::default()
        };

        let paths = export_frames(&run, &options, dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2].file_name().unwrap(), "aStar_00002.png");
        for path in &paths {
            let bytes = fs::read(path).unwrap();
            assert_eq!(&bytes[..4], b"\x89PNG");
        }
    }

    #[test]
    fn test_export_empty_run() {
        let dir = tempdir().unwrap();
        let paths = export_frames(
            &LoadedRun::empty("none"),
            &ExportOptions::default(),
            dir.path(),
        )
        .unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_export_skips_frames_without_cells() {
        let vocab = CellVocabulary::default();
        let run = LoadedRun {
            run_id: "blank".to_string(),
            frames: parse_frames(r#"[""]"#, FrameFormat::Json, &vocab).unwrap(),
            solution: SolutionPath::empty(),
            annotation: None,
        };
        let dir = tempdir().unwrap();

        let paths = export_frames(&run, &ExportOptions::default(), dir.path()).unwrap();
        assert!(paths.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_default_options_export() {
        let vocab = CellVocabulary::default();
        let run = LoadedRun {
            run_id: "dijkstra".to_string(),
            frames: parse_frames(r#"["P ."]"#, FrameFormat::Json, &vocab).unwrap(),
            solution: SolutionPath::empty(),
            annotation: None,
        };
        let dir = tempdir().unwrap();
        let options = ExportOptions::default();
        assert_eq!(options.cell_size, 10.0);

        let paths = export_frames(&run, &options, dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].file_name().unwrap(), "dijkstra_00000.png");
    }
}
