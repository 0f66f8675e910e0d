use crate::config::Config;
use crate::error::{Axis, SegmentationError};
use crate::models::Rectangle;
use crate::raster::RasterImage;

/// First and last index for which `has_content` holds.
///
/// The last index is only set by a second content line, so a single line of
/// content yields `(Some(first), None)`.
fn content_span(len: usize, has_content: impl Fn(usize) -> bool) -> (Option<usize>, Option<usize>) {
    let mut first = None;
    let mut last = None;
    for index in (0..len).filter(|&i| has_content(i)) {
        if first.is_none() {
            first = Some(index);
        } else {
            last = Some(index);
        }
    }
    (first, last)
}

/// Tightest rectangle around all pixels at or below the black threshold
pub fn determine_bb(config: &Config, image: &RasterImage) -> Result<Rectangle, SegmentationError> {
    let is_content = |x: usize, y: usize| image.luma(x, y) <= config.black_threshold;

    let (x1, x2) = content_span(image.width(), |x| (0..image.height()).any(|y| is_content(x, y)));
    let (y1, y2) = content_span(image.height(), |y| (0..image.width()).any(|x| is_content(x, y)));

    match (x1, x2, y1, y2) {
        (Some(x1), Some(x2), Some(y1), Some(y2)) => {
            Ok(Rectangle::new(x1 as i64, x2 as i64, y1 as i64, y2 as i64))
        }
        (None, _, _, _) | (_, None, _, _) => Err(SegmentationError::NoContent { axis: Axis::X }),
        _ => Err(SegmentationError::NoContent { axis: Axis::Y }),
    }
}

/// Content rectangle inside `region`, grown by `clearance` and clamped to `region`.
///
/// The result is in the coordinate space of `image` and never leaves `region`.
pub fn determine_bb_for_box(
    config: &Config,
    image: &RasterImage,
    region: &Rectangle,
    clearance: i64,
) -> Result<Rectangle, SegmentationError> {
    let content = determine_bb(config, &image.crop(region)?)?;
    Ok(content
        .translate(region.x1, region.y1)
        .expand(clearance)
        .clamp_to(region))
}
