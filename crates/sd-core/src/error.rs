//! Error types shared by every backend.

use crate::id::{LayerId, SlideId};
use thiserror::Error;

/// Failure to produce geometry for a render attempt.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// The text metrics provider could not be constructed. Callers must not
    /// attempt to render with a missing provider.
    #[error("text metrics unavailable: {0}")]
    MetricsUnavailable(String),
}

/// Deck-level operation failures, reported to callers as data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeckError {
    #[error("slide not found: {0}")]
    SlideNotFound(SlideId),

    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}
