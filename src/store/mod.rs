//! Frame store - loading precomputed search traces.
//!
//! A [`RunSource`] supplies raw artifacts; [`FrameStore::load`] parses them
//! into a [`LoadedRun`]. Loading never touches playback state: the caller
//! commits a run by handing it to the controller, so a failed load leaves
//! whatever was playing before untouched.

mod format;
mod source;

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use log::{debug, warn};

pub use format::{FrameFormat, parse_annotation, parse_frame, parse_frames, parse_solution};
pub use source::{DirectorySource, MemorySource, RunArtifacts, RunSource};

use crate::schema::{CellVocabulary, FrameError, FrameSequence, SolutionPath};

/// Errors raised while loading a run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Frame {frame}: row {row} has {found} columns, expected {expected}")]
    MalformedFrame {
        frame: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error(
        "Frame {frame} is {}x{}, expected {}x{} like frame 0",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    InconsistentFrame {
        frame: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Invalid {artifact} JSON: {source}")]
    InvalidJson {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("No frames available for run {run_id:?}: {source}")]
    Source {
        run_id: String,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Attach a frame index to a shape error.
    pub(crate) fn from_frame_error(frame: usize, error: FrameError) -> Self {
        match error {
            FrameError::JaggedRow {
                row,
                expected,
                found,
            } => LoadError::MalformedFrame {
                frame,
                row,
                expected,
                found,
            },
            FrameError::InconsistentDimensions {
                frame,
                expected,
                found,
            } => LoadError::InconsistentFrame {
                frame,
                expected,
                found,
            },
        }
    }

    /// True for row/column inconsistencies in the frame data.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            LoadError::MalformedFrame { .. } | LoadError::InconsistentFrame { .. }
        )
    }
}

/// A fully parsed run, ready to be committed to a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRun {
    pub run_id: String,
    pub frames: FrameSequence,
    pub solution: SolutionPath,
    pub annotation: Option<String>,
}

impl LoadedRun {
    /// Parse raw artifacts. Nothing is returned unless every artifact parses.
    pub fn from_artifacts(
        run_id: impl Into<String>,
        artifacts: &RunArtifacts,
        vocabulary: &CellVocabulary,
    ) -> Result<Self, LoadError> {
        let run_id = run_id.into();
        let frames = parse_frames(&artifacts.frames, artifacts.format, vocabulary)?;
        let solution = match &artifacts.solution {
            Some(raw) => parse_solution(raw)?,
            None => SolutionPath::empty(),
        };
        let annotation = artifacts.annotation.as_deref().and_then(parse_annotation);

        let (rows, cols) = frames.dimensions();
        if !frames.is_empty() {
            let outside = solution.out_of_bounds(rows, cols).count();
            if outside > 0 {
                warn!("Run {run_id:?}: {outside} solution points fall outside the {rows}x{cols} grid");
            }
        }

        Ok(Self {
            run_id,
            frames,
            solution,
            annotation,
        })
    }

    /// A run with no frames.
    pub fn empty(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            frames: FrameSequence::empty(),
            solution: SolutionPath::empty(),
            annotation: None,
        }
    }
}

/// Loads and caches runs from a [`RunSource`].
///
/// Usage:
/// ```ignore
/// let mut store = FrameStore::new(DirectorySource::new("data"), CellVocabulary::default());
/// let run = store.load("dijkstra")?;
/// println!("{} frames", run.frames.len());
/// ```
pub struct FrameStore<S> {
    source: S,
    vocabulary: CellVocabulary,
    cache: HashMap<String, Arc<LoadedRun>>,
}

impl<S: RunSource> FrameStore<S> {
    pub fn new(source: S, vocabulary: CellVocabulary) -> Self {
        Self {
            source,
            vocabulary,
            cache: HashMap::new(),
        }
    }

    /// Load a run by id.
    ///
    /// Successful loads are cached, so repeated calls return the same data.
    /// Failures are not cached.
    pub fn load(&mut self, run_id: &str) -> Result<Arc<LoadedRun>, LoadError> {
        if let Some(run) = self.cache.get(run_id) {
            debug!("Run {run_id:?} served from cache");
            return Ok(Arc::clone(run));
        }

        let artifacts = self.source.fetch(run_id).map_err(|source| LoadError::Source {
            run_id: run_id.to_string(),
            source,
        })?;
        let run = Arc::new(LoadedRun::from_artifacts(run_id, &artifacts, &self.vocabulary)?);

        debug!(
            "Loaded run {run_id:?}: {} frames of {:?}, {} solution points",
            run.frames.len(),
            run.frames.dimensions(),
            run.solution.len()
        );
        self.cache.insert(run_id.to_string(), Arc::clone(&run));
        Ok(run)
    }

    /// Drop a cached run so the next load re-reads the source.
    pub fn invalidate(&mut self, run_id: &str) -> bool {
        self.cache.remove(run_id).is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn vocabulary(&self) -> &CellVocabulary {
        &self.vocabulary
    }
}
