use crate::config::Config;
use crate::raster::RasterImage;

/// Convert a physical length to pixels.
///
/// The configured page width is taken to span the full image width.
pub fn mm_to_pixels(config: &Config, image: &RasterImage, value_mm: f64) -> i64 {
    (value_mm / config.page_width * image.width() as f64).ceil() as i64
}

/// Inverse of [`mm_to_pixels`], without rounding
pub fn pixels_to_mm(config: &Config, image: &RasterImage, pixels: f64) -> f64 {
    pixels / image.width() as f64 * config.page_width
}

pub fn mm_to_inches(value_mm: f64) -> f64 {
    value_mm / 25.4
}
