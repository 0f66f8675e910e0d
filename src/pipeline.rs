use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::config::Config;
use crate::detection::{bounding_box, separators, units::mm_to_pixels};
use crate::error::{PipelineError, SegmentationError};
use crate::models::{Flashcard, Rectangle};
use crate::raster::RasterImage;

/// Left and right half of one band
pub type CardPair<T> = (T, T);

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Init,
    CardBoxes,
    CardBoundaries,
    CardImages,
    Flashcards,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Init,
        Stage::CardBoxes,
        Stage::CardBoundaries,
        Stage::CardImages,
        Stage::Flashcards,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::CardBoxes => "extract-card-boxes",
            Stage::CardBoundaries => "extract-card-boundaries",
            Stage::CardImages => "extract-card-images",
            Stage::Flashcards => "make-flashcards",
        }
    }

    /// Fraction of the pipeline finished once this stage starts
    pub fn progress(&self) -> f32 {
        let index = Stage::ALL.iter().position(|s| s == self).unwrap_or(0);
        index as f32 / (Stage::ALL.len() - 1) as f32
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer notified whenever the pipeline enters a new stage
pub trait ProgressReporter {
    fn step(&mut self, stage: Stage);
}

impl<F: FnMut(Stage)> ProgressReporter for F {
    fn step(&mut self, stage: Stage) {
        self(stage)
    }
}

/// Reporter that ignores all progress
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn step(&mut self, _stage: Stage) {}
}

/// Geometry collected while segmenting a sheet.
///
/// Filled stage by stage and band by band. On failure it holds everything up
/// to the failing point, so overlays can be drawn without rerunning.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugInfo {
    pub horizontal_separator_box: Option<Rectangle>,
    pub horizontal_separators: Vec<i64>,
    pub vertical_separator_boxes: Vec<Rectangle>,
    pub vertical_separator_candidates: Vec<Vec<i64>>,
    pub vertical_separators: Vec<i64>,
    pub card_boxes: Vec<CardPair<Rectangle>>,
    pub card_boundaries: Vec<CardPair<Rectangle>>,
    #[serde(skip)]
    pub card_images: Vec<CardPair<RasterImage>>,
}

impl DebugInfo {
    /// Check that the per-band lists line up
    pub fn check_consistency(&self) -> Result<(), SegmentationError> {
        let boxes = self.vertical_separator_boxes.len();
        let candidates = self.vertical_separator_candidates.len();
        if boxes != candidates {
            return Err(SegmentationError::InvalidParameter(format!(
                "inconsistent debug info: {boxes} vertical separator boxes but {candidates} candidate lists"
            )));
        }
        if self.vertical_separators.len() > boxes {
            return Err(SegmentationError::InvalidParameter(format!(
                "inconsistent debug info: {} vertical separators for {boxes} bands",
                self.vertical_separators.len()
            )));
        }
        Ok(())
    }
}

/// Pixel measurements derived from a config for one image
#[derive(Debug, Clone, Copy)]
struct PixelLayout {
    separator_clearance: i64,
    vertical_separator_height: i64,
    horizontal_separator_width: i64,
    margin_top: i64,
    margin_right: i64,
    margin_bottom: i64,
    margin_left: i64,
}

impl PixelLayout {
    fn new(config: &Config, image: &RasterImage) -> Self {
        let px = |mm| mm_to_pixels(config, image, mm);
        Self {
            separator_clearance: px(config.separator_clearance),
            vertical_separator_height: px(config.vertical_separator_height),
            horizontal_separator_width: px(config.horizontal_separator_width),
            margin_top: px(config.margin_top),
            margin_right: px(config.margin_right),
            margin_bottom: px(config.margin_bottom),
            margin_left: px(config.margin_left),
        }
    }
}

/// Split the sheet into bands and each band into a rough left/right card box.
///
/// Search regions, separators and boxes are appended to `debug` as they are
/// found, so a failing band still leaves its search box and candidates behind.
/// Box arithmetic saturates; oversized measurements end up as a crop error.
pub fn extract_card_boxes(
    config: &Config,
    image: &RasterImage,
    debug: &mut DebugInfo,
) -> Result<Vec<CardPair<Rectangle>>, SegmentationError> {
    let layout = PixelLayout::new(config, image);
    let width = image.width() as i64;
    let height = image.height() as i64;

    let horizontal_separator_box = Rectangle::new(
        layout.margin_left,
        layout
            .margin_left
            .saturating_add(layout.horizontal_separator_width)
            .min(width),
        0,
        height,
    );
    debug.horizontal_separator_box = Some(horizontal_separator_box);

    let mut horizontal_separators = Vec::new();
    if !config.require_top_horizontal_separator {
        horizontal_separators.push(layout.margin_top);
    }
    horizontal_separators.extend(
        separators::extract_from_box(config, image, &horizontal_separator_box, false)?
            .into_iter()
            .map(|y| y + horizontal_separator_box.y1),
    );
    if !config.require_bottom_horizontal_separator {
        horizontal_separators.push(height.saturating_sub(layout.margin_bottom));
    }
    debug!("Horizontal separators: {:?}", horizontal_separators);
    debug.horizontal_separators = horizontal_separators.clone();

    let mut boxes = Vec::new();
    for (band, pair) in horizontal_separators.windows(2).enumerate() {
        let (y, y_next) = (pair[0], pair[1]);

        let vertical_separator_box = Rectangle::new(
            0,
            width,
            y.clamp(0, height),
            y.saturating_add(layout.vertical_separator_height).clamp(0, height),
        );
        debug.vertical_separator_boxes.push(vertical_separator_box);

        let candidates: Vec<i64> =
            separators::extract_from_box(config, image, &vertical_separator_box, true)?
                .into_iter()
                .map(|x| x + vertical_separator_box.x1)
                .collect();
        debug!("Band {}: vertical separator candidates {:?}", band, candidates);
        debug.vertical_separator_candidates.push(candidates.clone());

        let vertical_separator = *candidates
            .first()
            .ok_or(SegmentationError::MissingSeparator { band })?;
        debug.vertical_separators.push(vertical_separator);

        let top = y.saturating_add(layout.separator_clearance);
        let bottom = y_next.saturating_sub(layout.separator_clearance);
        let left = Rectangle::new(
            layout.margin_left.saturating_add(layout.horizontal_separator_width),
            vertical_separator.saturating_sub(layout.separator_clearance),
            top,
            bottom,
        );
        let right = Rectangle::new(
            vertical_separator.saturating_add(layout.separator_clearance),
            width.saturating_sub(layout.margin_right),
            top,
            bottom,
        );
        boxes.push((left, right));
    }

    Ok(boxes)
}

/// Tighten every rough box to the content it contains
pub fn extract_card_boundaries(
    config: &Config,
    image: &RasterImage,
    card_boxes: &[CardPair<Rectangle>],
) -> Result<Vec<CardPair<Rectangle>>, SegmentationError> {
    let card_clearance = mm_to_pixels(config, image, config.card_clearance);

    card_boxes
        .iter()
        .map(|(box_left, box_right)| {
            let left = bounding_box::determine_bb_for_box(config, image, box_left, card_clearance)?;
            let right = bounding_box::determine_bb_for_box(config, image, box_right, card_clearance)?;
            Ok::<_, SegmentationError>((left, right))
        })
        .collect()
}

/// Crop each boundary pair out of the sheet
pub fn extract_card_images(
    image: &RasterImage,
    card_boundaries: &[CardPair<Rectangle>],
) -> Result<Vec<CardPair<RasterImage>>, SegmentationError> {
    card_boundaries
        .iter()
        .map(|(left, right)| Ok::<_, SegmentationError>((image.crop(left)?, image.crop(right)?)))
        .collect()
}

/// Run the full segmentation on one sheet.
///
/// Any failure is returned together with the stage it happened in and the
/// debug info gathered so far.
pub fn extract_flashcards(
    config: &Config,
    image: &RasterImage,
    progress: &mut dyn ProgressReporter,
) -> Result<(Vec<Flashcard>, DebugInfo), PipelineError> {
    let mut debug_info = DebugInfo::default();

    let mut enter = |stage: Stage| {
        debug!("Entering stage {} ({:.0}%)", stage, stage.progress() * 100.0);
        progress.step(stage);
        stage
    };

    let stage = enter(Stage::Init);
    if let Err(e) = config.validate() {
        return Err(PipelineError::new(stage, e, debug_info));
    }

    let stage = enter(Stage::CardBoxes);
    let card_boxes = match extract_card_boxes(config, image, &mut debug_info) {
        Ok(boxes) => boxes,
        Err(e) => return Err(PipelineError::new(stage, e, debug_info)),
    };
    debug_info.card_boxes = card_boxes.clone();

    let stage = enter(Stage::CardBoundaries);
    let card_boundaries = match extract_card_boundaries(config, image, &card_boxes) {
        Ok(boundaries) => boundaries,
        Err(e) => return Err(PipelineError::new(stage, e, debug_info)),
    };
    debug_info.card_boundaries = card_boundaries.clone();

    let stage = enter(Stage::CardImages);
    let card_images = match extract_card_images(image, &card_boundaries) {
        Ok(images) => images,
        Err(e) => return Err(PipelineError::new(stage, e, debug_info)),
    };
    debug_info.card_images = card_images.clone();

    enter(Stage::Flashcards);
    let flashcards: Vec<Flashcard> = card_images
        .into_iter()
        .map(|(left, right)| {
            let card = Flashcard::new(left, right);
            if config.switch_front_back {
                card.switch()
            } else {
                card
            }
        })
        .collect();

    info!(
        "Extracted {} flashcards from {}x{} image",
        flashcards.len(),
        image.width(),
        image.height()
    );

    Ok((flashcards, debug_info))
}

/// Reusable segmentation setup: a config plus an optional progress observer
pub struct Pipeline<'a> {
    config: Config,
    progress: Option<Box<dyn ProgressReporter + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: impl ProgressReporter + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&mut self, image: &RasterImage) -> Result<(Vec<Flashcard>, DebugInfo), PipelineError> {
        match self.progress.as_mut() {
            Some(progress) => extract_flashcards(&self.config, image, &mut **progress),
            None => extract_flashcards(&self.config, image, &mut NoProgress),
        }
    }
}
