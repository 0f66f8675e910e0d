use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use log::{debug, warn};
use serde::Serialize;

use crate::config::Config;
use crate::detection::units::{mm_to_inches, pixels_to_mm};
use crate::error::SegmentationError;
use crate::models::Rectangle;
use crate::pipeline::DebugInfo;
use crate::raster::RasterImage;

const RED: [u8; 3] = [0xFF, 0x00, 0x00];
const GREEN: [u8; 3] = [0x00, 0xFF, 0x00];
const BLUE: [u8; 3] = [0x00, 0x00, 0xFF];

/// How a rectangle is drawn onto the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Filled rectangle
    Box,
    /// Segment from `(x1, y1)` to `(x2, y2)`
    Line,
}

impl FromStr for DrawMode {
    type Err = SegmentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(DrawMode::Box),
            "line" => Ok(DrawMode::Line),
            other => Err(SegmentationError::InvalidParameter(format!(
                "invalid draw mode '{other}'"
            ))),
        }
    }
}

fn with_alpha(color: [u8; 3], alpha: f32) -> Rgba<u8> {
    let a = (alpha * 255.0).ceil().clamp(0.0, 255.0) as u8;
    Rgba([color[0], color[1], color[2], a])
}

/// Draw one rectangle in the given mode; empty boxes are skipped
pub fn draw(canvas: &mut Blend<RgbaImage>, rect: &Rectangle, color: [u8; 3], alpha: f32, mode: DrawMode) {
    let color = with_alpha(color, alpha);
    let (width, height) = canvas.0.dimensions();
    let (width, height) = (width as i64, height as i64);
    match mode {
        DrawMode::Box => {
            let rect = rect.clamp_to(&Rectangle::new(0, width, 0, height));
            if rect.width() <= 0 || rect.height() <= 0 {
                return;
            }
            let area = Rect::at(rect.x1 as i32, rect.y1 as i32)
                .of_size(rect.width() as u32, rect.height() as u32);
            draw_filled_rect_mut(canvas, area, color);
        }
        DrawMode::Line => {
            // Endpoints clamped to the canvas; lines here are axis-aligned
            let x = |v: i64| v.clamp(-1, width) as f32;
            let y = |v: i64| v.clamp(-1, height) as f32;
            draw_line_segment_mut(canvas, (x(rect.x1), y(rect.y1)), (x(rect.x2), y(rect.y2)), color);
        }
    }
}

/// Paint the collected segmentation geometry over a copy of `image`.
///
/// Works on partial debug info as well; missing parts are simply not drawn.
pub fn render_overlay(image: &RasterImage, info: &DebugInfo) -> Result<RgbaImage, SegmentationError> {
    info.check_consistency()?;

    let mut canvas = Blend(image.to_rgba_image());

    if let Some(search_box) = &info.horizontal_separator_box {
        draw(&mut canvas, search_box, RED, 0.2, DrawMode::Box);
        for &y in &info.horizontal_separators {
            let line = Rectangle::new(search_box.x1, search_box.x2, y, y);
            draw(&mut canvas, &line, RED, 1.0, DrawMode::Line);
        }
    }

    for (search_box, candidates) in info
        .vertical_separator_boxes
        .iter()
        .zip(&info.vertical_separator_candidates)
    {
        draw(&mut canvas, search_box, GREEN, 0.2, DrawMode::Box);
        for &x in candidates {
            let line = Rectangle::new(x, x, search_box.y1, search_box.y2);
            draw(&mut canvas, &line, GREEN, 1.0, DrawMode::Line);
        }
    }

    for (left, right) in info.card_boxes.iter().chain(&info.card_boundaries) {
        draw(&mut canvas, left, BLUE, 0.2, DrawMode::Box);
        draw(&mut canvas, right, BLUE, 0.2, DrawMode::Box);
    }

    Ok(canvas.0)
}

/// Physical size of the scanned sheet, as implied by the configured page width
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_px: usize,
    pub height_px: usize,
    pub width_mm: f64,
    pub height_mm: f64,
    pub width_in: f64,
    pub height_in: f64,
}

impl PageGeometry {
    pub fn new(config: &Config, image: &RasterImage) -> Self {
        let width_mm = pixels_to_mm(config, image, image.width() as f64);
        let height_mm = pixels_to_mm(config, image, image.height() as f64);
        Self {
            width_px: image.width(),
            height_px: image.height(),
            width_mm,
            height_mm,
            width_in: mm_to_inches(width_mm),
            height_in: mm_to_inches(height_mm),
        }
    }
}

#[derive(Serialize)]
struct DebugReport<'a> {
    page: PageGeometry,
    #[serde(flatten)]
    info: &'a DebugInfo,
}

/// Directory that receives debug artifacts for one run
#[derive(Clone, Debug)]
pub struct DebugOutput {
    output_dir: PathBuf,
}

impl DebugOutput {
    /// Use `output_dir` for debug output.
    /// The directory must be empty or non-existent.
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn step_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.output_dir.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn save_png(&self, image: &RgbaImage, step: &str, filename: &str) -> Result<()> {
        let path = self.step_dir(step)?.join(filename);
        image
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        debug!("Debug: saved {}/{}", step, filename);
        Ok(())
    }

    /// Like [`DebugOutput::save`], but a write failure is only logged.
    ///
    /// Used after a failed run, where the segmentation error matters more.
    /// Returns whether everything was written.
    pub fn save_partial(&self, config: &Config, image: &RasterImage, info: &DebugInfo) -> bool {
        warn!("Saving partial debug output to {}", self.output_dir.display());
        match self.save(config, image, info) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save partial debug output: {:#}", e);
                false
            }
        }
    }

    /// Write the input, the overlay, every card image and the geometry as JSON.
    ///
    /// Does nothing unless `config.debug` is set.
    pub fn save(&self, config: &Config, image: &RasterImage, info: &DebugInfo) -> Result<()> {
        if !config.debug {
            debug!("Debug output disabled, skipping {}", self.output_dir.display());
            return Ok(());
        }

        self.save_png(&image.to_rgba_image(), "00_input", "01.png")?;

        let overlay = render_overlay(image, info).context("Failed to render debug overlay")?;
        self.save_png(&overlay, "01_card_boxes", "overlay.png")?;

        for (idx, (left, right)) in info.card_images.iter().enumerate() {
            self.save_png(&left.to_rgba_image(), "02_card_images", &format!("{:02}-left.png", idx + 1))?;
            self.save_png(&right.to_rgba_image(), "02_card_images", &format!("{:02}-right.png", idx + 1))?;
        }

        let json_path = self.output_dir.join("debug_info.json");
        let report = DebugReport {
            page: PageGeometry::new(config, image),
            info,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        debug!("Debug: saved debug_info.json");

        Ok(())
    }
}
