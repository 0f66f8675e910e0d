pub mod config;
pub mod debug;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod raster;

pub use config::{Config, PagePreset};
pub use error::{Axis, PipelineError, SegmentationError};
pub use models::{Flashcard, Rectangle};
pub use pipeline::{
    CardPair, DebugInfo, NoProgress, Pipeline, ProgressReporter, Stage, extract_card_boundaries,
    extract_card_boxes, extract_card_images, extract_flashcards,
};
pub use raster::RasterImage;
