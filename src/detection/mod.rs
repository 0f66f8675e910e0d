//! Geometry primitives used by the segmentation pipeline
pub mod bounding_box;
pub mod separators;
pub mod units;

pub use bounding_box::{determine_bb, determine_bb_for_box};
pub use separators::{extract, extract_from_box};
pub use units::{mm_to_inches, mm_to_pixels, pixels_to_mm};
