//! Cell tags and the token vocabulary that produces them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Semantic role of one grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Open, unexplored position.
    #[default]
    Empty,
    /// Impassable position.
    Wall,
    /// Search origin.
    Start,
    /// Search goal.
    End,
    /// Position already expanded by the search.
    VisitedPath,
    /// Explicitly unknown position. Renders like `Empty`.
    Unknown,
}

/// Mapping from raw snapshot tokens to cell tags.
///
/// Trace files from different runs use different marker sets, so the mapping
/// is data rather than a hardcoded table. Tokens missing from the map resolve
/// to [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellVocabulary {
    tokens: HashMap<String, Cell>,
}

impl Default for CellVocabulary {
    fn default() -> Self {
        Self::from_pairs([
            ("P", Cell::Start),
            ("#", Cell::Wall),
            ("E", Cell::End),
            ("S", Cell::VisitedPath),
        ])
    }
}

impl CellVocabulary {
    /// Vocabulary that maps every token to `Empty`.
    pub fn empty() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    /// Build a vocabulary from `(token, cell)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Cell)>,
    {
        Self {
            tokens: pairs
                .into_iter()
                .map(|(token, cell)| (token.to_string(), cell))
                .collect(),
        }
    }

    /// Add or replace a token mapping.
    pub fn with_token(mut self, token: impl Into<String>, cell: Cell) -> Self {
        self.tokens.insert(token.into(), cell);
        self
    }

    /// Resolve a token. Unrecognized tokens fall back to `Empty`.
    #[inline]
    pub fn resolve(&self, token: &str) -> Cell {
        self.tokens.get(token).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
