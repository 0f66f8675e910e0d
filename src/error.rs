use std::fmt;

use thiserror::Error;

use crate::pipeline::{DebugInfo, Stage};

/// Image axis a bounding-box search ran along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Failures raised by the segmentation components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentationError {
    /// No pixel at or below the black threshold spans the region along `axis`
    #[error("no content found along the {axis} axis")]
    NoContent { axis: Axis },

    #[error("no vertical separator found in band {band}")]
    MissingSeparator { band: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// A segmentation failure together with everything collected before it
#[derive(Debug, Error)]
#[error("flashcard extraction failed during {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: SegmentationError,
    pub debug_info: Box<DebugInfo>,
}

impl PipelineError {
    pub fn new(stage: Stage, source: SegmentationError, debug_info: DebugInfo) -> Self {
        Self {
            stage,
            source,
            debug_info: Box::new(debug_info),
        }
    }
}
