//! Sources of raw run artifacts.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::format::FrameFormat;

/// Raw, unparsed artifacts for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    /// Frame container text.
    pub frames: String,
    /// Container format of `frames`.
    pub format: FrameFormat,
    /// Solution path JSON, if the run has one.
    pub solution: Option<String>,
    /// Annotation text, if the run has one.
    pub annotation: Option<String>,
}

impl RunArtifacts {
    /// Artifacts holding only frames.
    pub fn frames(frames: impl Into<String>, format: FrameFormat) -> Self {
        Self {
            frames: frames.into(),
            format,
            solution: None,
            annotation: None,
        }
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = Some(solution.into());
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }
}

/// Fetches raw artifacts for a run.
///
/// A fetch either returns a complete set of artifacts or fails; it never
/// hands back a partial frame artifact.
pub trait RunSource {
    fn fetch(&self, run_id: &str) -> io::Result<RunArtifacts>;
}

impl<T: RunSource + ?Sized> RunSource for &T {
    fn fetch(&self, run_id: &str) -> io::Result<RunArtifacts> {
        (**self).fetch(run_id)
    }
}

/// Reads artifacts from a data directory laid out as
/// `<run>.json|txt`, `<run>Solution.json`, `<run>SolutionText.txt`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

const SOLUTION_SUFFIX: &str = "Solution.json";
const ANNOTATION_SUFFIX: &str = "SolutionText.txt";

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run ids available in the directory, sorted.
    pub fn runs(&self) -> io::Result<Vec<String>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.ends_with(SOLUTION_SUFFIX) || name.ends_with(ANNOTATION_SUFFIX) {
                continue;
            }
            let stem = [FrameFormat::Json, FrameFormat::Text]
                .iter()
                .find_map(|f| name.strip_suffix(&format!(".{}", f.extension())));
            if let Some(stem) = stem {
                runs.push(stem.to_string());
            }
        }
        runs.sort();
        runs.dedup();
        Ok(runs)
    }

    fn read_optional(&self, file: String) -> io::Result<Option<String>> {
        match fs::read_to_string(self.root.join(file)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Run ids name files, so they may not escape the data directory.
fn check_run_id(run_id: &str) -> io::Result<()> {
    if run_id.is_empty() || run_id.contains(['/', '\\']) || run_id.contains("..") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid run id: {run_id:?}"),
        ));
    }
    Ok(())
}

impl RunSource for DirectorySource {
    fn fetch(&self, run_id: &str) -> io::Result<RunArtifacts> {
        check_run_id(run_id)?;

        let mut found = None;
        for format in [FrameFormat::Json, FrameFormat::Text] {
            if let Some(frames) = self.read_optional(format!("{run_id}.{}", format.extension()))? {
                found = Some((frames, format));
                break;
            }
        }
        let Some((frames, format)) = found else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No frames for run {run_id:?} in {}", self.root.display()),
            ));
        };

        Ok(RunArtifacts {
            frames,
            format,
            solution: self.read_optional(format!("{run_id}{SOLUTION_SUFFIX}"))?,
            annotation: self.read_optional(format!("{run_id}{ANNOTATION_SUFFIX}"))?,
        })
    }
}

/// In-memory artifacts keyed by run id.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    runs: HashMap<String, RunArtifacts>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run(mut self, run_id: impl Into<String>, artifacts: RunArtifacts) -> Self {
        self.insert(run_id, artifacts);
        self
    }

    pub fn insert(&mut self, run_id: impl Into<String>, artifacts: RunArtifacts) {
        self.runs.insert(run_id.into(), artifacts);
    }
}

impl RunSource for MemorySource {
    fn fetch(&self, run_id: &str) -> io::Result<RunArtifacts> {
        self.runs.get(run_id).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("Unknown run {run_id:?}"))
        })
    }
}
