//! Text and JSON formats for trace artifacts.
//!
//! A run is made of three artifacts:
//!
//! ```text
//! <run>.json              ["P . #\n. S E", "P S #\n. S E", ...]   (or <run>.txt)
//! <run>Solution.json      [[0, 0], [1, 1], [1, 2]]
//! <run>SolutionText.txt   free-form annotation
//! ```
//!
//! The text frame container separates frames with one or more blank lines.

use serde::{Deserialize, Serialize};

use super::LoadError;
use crate::schema::{CellVocabulary, Coord, Frame, FrameError, FrameSequence, SolutionPath};

/// Container format of a frame artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    /// JSON array of strings, one frame per string.
    #[default]
    Json,
    /// Frames as plain text blocks separated by blank lines.
    Text,
}

impl FrameFormat {
    /// File extension used by this format.
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Json => "json",
            FrameFormat::Text => "txt",
        }
    }
}

/// Parse one frame block. Blank lines are ignored.
pub fn parse_frame(block: &str, vocabulary: &CellVocabulary) -> Result<Frame, FrameError> {
    let rows = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|token| vocabulary.resolve(token))
                .collect()
        })
        .collect();
    Frame::from_rows(rows)
}

/// Parse a whole frame artifact into a sequence.
pub fn parse_frames(
    raw: &str,
    format: FrameFormat,
    vocabulary: &CellVocabulary,
) -> Result<FrameSequence, LoadError> {
    let blocks: Vec<String> = match format {
        FrameFormat::Json => {
            serde_json::from_str(raw).map_err(|source| LoadError::InvalidJson {
                artifact: "frames",
                source,
            })?
        }
        FrameFormat::Text => split_text_blocks(raw),
    };

    let frames = blocks
        .iter()
        .enumerate()
        .map(|(frame, block)| {
            parse_frame(block, vocabulary).map_err(|e| LoadError::from_frame_error(frame, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    FrameSequence::new(frames).map_err(|e| LoadError::from_frame_error(0, e))
}

/// Split text into blocks separated by blank lines.
fn split_text_blocks(raw: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Parse a solution artifact: JSON array of `[row, col]` pairs.
pub fn parse_solution(raw: &str) -> Result<SolutionPath, LoadError> {
    if raw.trim().is_empty() {
        return Ok(SolutionPath::empty());
    }
    let pairs: Vec<[usize; 2]> =
        serde_json::from_str(raw).map_err(|source| LoadError::InvalidJson {
            artifact: "solution",
            source,
        })?;
    Ok(pairs.into_iter().map(Coord::from).collect())
}

/// Normalize an annotation artifact. Whitespace-only text means no annotation.
pub fn parse_annotation(raw: &str) -> Option<String> {
    let text = raw.trim();
    (!text.is_empty()).then(|| text.to_string())
}
