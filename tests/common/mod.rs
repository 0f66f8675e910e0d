#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from remember for tests
pub use remember::{
    Axis, CardPair, Config, DebugInfo, Flashcard, PipelineError, RasterImage, Rectangle,
    SegmentationError, Stage,
};
