use anyhow::Context;
use clap::Parser;
use image::ImageReader;
use log::info;
use std::path::PathBuf;

use remember::debug::DebugOutput;
use remember::{Config, PagePreset, Pipeline, RasterImage, Stage};

#[derive(Parser)]
#[command(name = "remember")]
#[command(about = "Split a sheet of hand-drawn flashcards into front/back card images")]
struct Cli {
    /// Path to the scanned sheet
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Directory the card images are written to
    #[arg(short, long, value_name = "DIR", default_value = "cards")]
    out: PathBuf,

    /// Load the configuration from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page standard the physical page width is taken from
    #[arg(short, long, value_enum)]
    page: Option<PagePreset>,

    /// Page width in millimetres, overrides --page
    #[arg(long, value_name = "MM")]
    page_width: Option<f64>,

    /// Clearance kept to the separators in millimetres
    #[arg(short = 'c', long, value_name = "MM")]
    separator_clearance: Option<f64>,

    /// Clearance around cards in millimetres; defaults to the separator clearance
    #[arg(long, value_name = "MM")]
    card_clearance: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_top: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_right: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_bottom: Option<f64>,

    #[arg(long, value_name = "MM")]
    margin_left: Option<f64>,

    /// Height of the vertical separator search area in millimetres
    #[arg(long, value_name = "MM")]
    vertical_separator_height: Option<f64>,

    /// Width of the horizontal separator search area in millimetres
    #[arg(long, value_name = "MM")]
    horizontal_separator_width: Option<f64>,

    /// Luma value at or below which a pixel counts as ink
    #[arg(long, value_name = "LUMA")]
    black_threshold: Option<f32>,

    /// Fraction of a row/column that must be ink to form a separator
    #[arg(long, value_name = "RATIO")]
    separator_threshold: Option<f32>,

    /// Use the top margin instead of requiring a drawn top separator
    #[arg(long)]
    no_require_top: bool,

    /// Use the bottom margin instead of requiring a drawn bottom separator
    #[arg(long)]
    no_require_bottom: bool,

    /// Keep the left card as the front
    #[arg(long)]
    no_switch: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn build_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(page) = self.page {
            config.page_width = page.page_width();
        }
        if let Some(width) = self.page_width {
            config.page_width = width;
        }
        if let Some(clearance) = self.separator_clearance {
            config.separator_clearance = clearance;
            if self.card_clearance.is_none() {
                config.card_clearance = clearance;
            }
        }

        let overrides = [
            (self.card_clearance, &mut config.card_clearance),
            (self.margin_top, &mut config.margin_top),
            (self.margin_right, &mut config.margin_right),
            (self.margin_bottom, &mut config.margin_bottom),
            (self.margin_left, &mut config.margin_left),
            (self.vertical_separator_height, &mut config.vertical_separator_height),
            (self.horizontal_separator_width, &mut config.horizontal_separator_width),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(threshold) = self.black_threshold {
            config.black_threshold = threshold;
        }
        if let Some(threshold) = self.separator_threshold {
            config.separator_threshold = threshold;
        }
        if self.no_require_top {
            config.require_top_horizontal_separator = false;
        }
        if self.no_require_bottom {
            config.require_bottom_horizontal_separator = false;
        }
        if self.no_switch {
            config.switch_front_back = false;
        }
        config.debug = self.debug_out.is_some();

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = args.build_config()?;

    // Checked before writing anything so a bad directory fails fast
    let debug_output = args.debug_out.clone().map(DebugOutput::new).transpose()?;

    info!("Loading image: {:?}", args.image_path);
    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    info!("Image loaded: {}x{}", img.width(), img.height());

    let sheet = RasterImage::from_dynamic(&img);
    let mut pipeline = Pipeline::new(config)
        .with_progress(|stage: Stage| info!("[{:>3.0}%] {}", stage.progress() * 100.0, stage));

    let (flashcards, debug_info) = match pipeline.run(&sheet) {
        Ok(result) => result,
        Err(error) => {
            if let Some(output) = &debug_output {
                output.save_partial(pipeline.config(), &sheet, &error.debug_info);
            }
            return Err(error.into());
        }
    };

    if let Some(output) = &debug_output {
        output.save(pipeline.config(), &sheet, &debug_info)?;
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;
    for card in &flashcards {
        for (side, name) in [(&card.front, card.front_file_name()), (&card.back, card.back_file_name())] {
            let path = args.out.join(&name);
            side.to_rgba_image()
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
        }
    }

    println!("\n=== Flashcard Extraction Results ===");
    println!("Total flashcards: {}", flashcards.len());
    println!("Written to: {}", args.out.display());

    Ok(())
}
