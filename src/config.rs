use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SegmentationError;

/// Width of one box on the reMarkable "Dots S" template, in millimetres
pub const RM_BOX_MM: f64 = 4.80798;

/// Width of the reMarkable toolbar, in millimetres
pub const RM_TOOLBAR_MM: f64 = 11.72093;

/// Known page sizes, used to derive the physical page width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PagePreset {
    #[default]
    RmPortrait,
    RmLandscape,
    A4Portrait,
    A4Landscape,
    LetterPortrait,
    LetterLandscape,
}

impl PagePreset {
    /// Page `(width, height)` in millimetres
    pub fn dimensions(self) -> (f64, f64) {
        let rm = (156.986, 209.550);
        let a4 = (210.0, 297.0);
        let letter = (215.9, 279.4);
        let swap = |(w, h): (f64, f64)| (h, w);
        match self {
            PagePreset::RmPortrait => rm,
            PagePreset::RmLandscape => swap(rm),
            PagePreset::A4Portrait => a4,
            PagePreset::A4Landscape => swap(a4),
            PagePreset::LetterPortrait => letter,
            PagePreset::LetterLandscape => swap(letter),
        }
    }

    pub fn page_width(self) -> f64 {
        self.dimensions().0
    }
}

/// Segmentation parameters.
///
/// Measurements are physical millimetres and are converted to pixels against
/// the image width on every run. `black_threshold` is in luma units (`0..=255`),
/// `separator_threshold` is the fraction of a row that must be dark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page_width: f64,
    pub separator_clearance: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub vertical_separator_height: f64,
    pub horizontal_separator_width: f64,
    pub card_clearance: f64,
    pub black_threshold: f32,
    pub separator_threshold: f32,
    pub require_top_horizontal_separator: bool,
    pub require_bottom_horizontal_separator: bool,
    pub switch_front_back: bool,

    // Deck metadata, carried for callers that package the cards
    pub deck_id: Option<i64>,
    pub deck_name: String,
    pub package_name: String,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_width: PagePreset::RmPortrait.page_width(),
            separator_clearance: RM_BOX_MM / 2.0,
            margin_top: 3.0 * RM_BOX_MM,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: RM_TOOLBAR_MM,
            vertical_separator_height: RM_BOX_MM,
            horizontal_separator_width: RM_BOX_MM,
            card_clearance: RM_BOX_MM / 2.0,
            black_threshold: 191.0,
            separator_threshold: 0.2,
            require_top_horizontal_separator: true,
            require_bottom_horizontal_separator: true,
            switch_front_back: true,
            deck_id: None,
            deck_name: "reMember".to_string(),
            package_name: "reMember.apkg".to_string(),
            debug: false,
        }
    }
}

impl Config {
    /// Default config with the page width of `preset`
    pub fn for_page(preset: PagePreset) -> Self {
        Self {
            page_width: preset.page_width(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), SegmentationError> {
        if !(self.page_width > 0.0 && self.page_width.is_finite()) {
            return Err(SegmentationError::InvalidParameter(format!(
                "page width must be positive and finite, got {}",
                self.page_width
            )));
        }

        let measurements = [
            ("separator_clearance", self.separator_clearance),
            ("margin_top", self.margin_top),
            ("margin_right", self.margin_right),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("vertical_separator_height", self.vertical_separator_height),
            ("horizontal_separator_width", self.horizontal_separator_width),
            ("card_clearance", self.card_clearance),
        ];
        for (name, value) in measurements {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(SegmentationError::InvalidParameter(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }

        if !(0.0..=255.0).contains(&self.black_threshold) {
            return Err(SegmentationError::InvalidParameter(format!(
                "black threshold must be within 0..=255, got {}",
                self.black_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.separator_threshold) {
            return Err(SegmentationError::InvalidParameter(format!(
                "separator threshold must be within 0..=1, got {}",
                self.separator_threshold
            )));
        }

        Ok(())
    }
}
