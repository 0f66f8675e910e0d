use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::SegmentationError;
use crate::models::Rectangle;

/// Perceptual luma of an RGBA pixel, premultiplied by its normalized alpha
pub fn luma_of(pixel: [u8; 4]) -> f32 {
    let [r, g, b, a] = pixel.map(f32::from);
    (0.299 * r + 0.587 * g + 0.114 * b) * (a / 255.0)
}

/// Owned RGBA raster with a precomputed luma grid.
///
/// Both grids are row-major and read-only after construction. Crops copy
/// their region, so a crop never shares storage with its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    rgba: Vec<[u8; 4]>,
    luma: Vec<f32>,
}

impl RasterImage {
    /// Build from raw row-major RGBA bytes
    pub fn from_rgba(width: usize, height: usize, data: &[u8]) -> Result<Self, SegmentationError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                SegmentationError::InvalidParameter(format!("image size {width}x{height} overflows"))
            })?;
        if data.len() != expected {
            return Err(SegmentationError::InvalidParameter(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                data.len()
            )));
        }

        let rgba: Vec<[u8; 4]> = data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();
        Ok(Self::from_pixels(width, height, rgba))
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let rgba = img.pixels().map(|p| p.0).collect();
        Self::from_pixels(width as usize, height as usize, rgba)
    }

    /// Convert any decoded image; non-RGBA formats are expanded first
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::from_rgba_image(&img.to_rgba8())
    }

    fn from_pixels(width: usize, height: usize, rgba: Vec<[u8; 4]>) -> Self {
        let luma = rgba.iter().copied().map(luma_of).collect();
        Self {
            width,
            height,
            rgba,
            luma,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Full image as a rectangle anchored at the origin
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0, self.width as i64, 0, self.height as i64)
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.rgba[y * self.width + x]
    }

    pub fn luma(&self, x: usize, y: usize) -> f32 {
        self.luma[y * self.width + x]
    }

    pub fn luma_row(&self, y: usize) -> &[f32] {
        &self.luma[y * self.width..(y + 1) * self.width]
    }

    /// Copy out the region `[x1, x2) x [y1, y2)`.
    ///
    /// The box must be well formed and lie inside the image.
    pub fn crop(&self, region: &Rectangle) -> Result<RasterImage, SegmentationError> {
        if !region.is_well_formed() || !self.bounds().contains(region) {
            return Err(SegmentationError::InvalidParameter(format!(
                "crop region {region:?} does not fit inside {}x{} image",
                self.width, self.height
            )));
        }

        let (x1, x2) = (region.x1 as usize, region.x2 as usize);
        let (y1, y2) = (region.y1 as usize, region.y2 as usize);
        let width = x2 - x1;
        let height = y2 - y1;

        let mut rgba = Vec::with_capacity(width * height);
        let mut luma = Vec::with_capacity(width * height);
        for y in y1..y2 {
            let row = y * self.width;
            rgba.extend_from_slice(&self.rgba[row + x1..row + x2]);
            luma.extend_from_slice(&self.luma[row + x1..row + x2]);
        }

        Ok(Self {
            width,
            height,
            rgba,
            luma,
        })
    }

    /// Encode-ready copy of the pixel data
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgba(self.pixel(x as usize, y as usize))
        })
    }
}
