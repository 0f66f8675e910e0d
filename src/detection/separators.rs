use crate::config::Config;
use crate::error::SegmentationError;
use crate::models::Rectangle;
use crate::raster::RasterImage;

/// Whether a line of luma values is dark enough to count as a separator
fn is_separator_line(config: &Config, line: impl ExactSizeIterator<Item = f32>) -> bool {
    let len = line.len();
    if len == 0 {
        return false;
    }
    let dark = line.filter(|&luma| luma <= config.black_threshold).count();
    dark as f32 / len as f32 > config.separator_threshold
}

/// Find separator lines in `image`.
///
/// Scans rows, or columns when `transpose` is set. Runs of consecutive separator
/// lines collapse to one position: the mean of the run, rounded half up.
pub fn extract(config: &Config, image: &RasterImage, transpose: bool) -> Vec<i64> {
    let line_count = if transpose { image.width() } else { image.height() };

    let mut positions = Vec::new();
    let mut run: Option<(usize, usize)> = None;

    // One extra iteration flushes a run that touches the last line
    for index in 0..=line_count {
        let is_separator = index < line_count
            && if transpose {
                is_separator_line(config, (0..image.height()).map(|y| image.luma(index, y)))
            } else {
                is_separator_line(config, image.luma_row(index).iter().copied())
            };

        if is_separator {
            run = Some(match run {
                Some((first, _)) => (first, index),
                None => (index, index),
            });
        } else if let Some((first, last)) = run.take() {
            positions.push(((first + last + 1) / 2) as i64);
        }
    }

    positions
}

/// [`extract`] restricted to `region`; positions are relative to the region
pub fn extract_from_box(
    config: &Config,
    image: &RasterImage,
    region: &Rectangle,
    transpose: bool,
) -> Result<Vec<i64>, SegmentationError> {
    let cropped = image.crop(region)?;
    Ok(extract(config, &cropped, transpose))
}
