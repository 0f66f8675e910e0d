use image::{Rgba, RgbaImage};
use remember::{Config, RasterImage};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Creates an all-white sheet of the given size
pub fn blank_sheet(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, WHITE)
}

/// Paints `[x1, x2) x [y1, y2)` black
pub fn fill_rect(img: &mut RgbaImage, x1: u32, x2: u32, y1: u32, y2: u32) {
    for y in y1..y2 {
        for x in x1..x2 {
            img.put_pixel(x, y, INK);
        }
    }
}

/// Config where one millimetre equals one pixel on an image `width` pixels wide.
/// Margins are zero and both drawn separators are required.
pub fn unit_config(width: u32) -> Config {
    Config {
        page_width: width as f64,
        separator_clearance: 2.0,
        margin_top: 0.0,
        margin_right: 0.0,
        margin_bottom: 0.0,
        margin_left: 0.0,
        vertical_separator_height: 10.0,
        horizontal_separator_width: 10.0,
        card_clearance: 1.0,
        black_threshold: 128.0,
        separator_threshold: 0.5,
        require_top_horizontal_separator: true,
        require_bottom_horizontal_separator: true,
        switch_front_back: false,
        ..Config::default()
    }
}

/// 100x200 sheet with bars at rows 10 and 190 and a divider at column 50
pub fn scenario_a_sheet() -> RgbaImage {
    let mut img = blank_sheet(100, 200);
    fill_rect(&mut img, 0, 100, 10, 11);
    fill_rect(&mut img, 0, 100, 190, 191);
    fill_rect(&mut img, 50, 51, 10, 191);
    img
}

/// [`scenario_a_sheet`] with something written on both cards
pub fn scenario_a_with_content() -> RasterImage {
    let mut img = scenario_a_sheet();
    fill_rect(&mut img, 20, 31, 50, 81);
    fill_rect(&mut img, 60, 81, 100, 151);
    RasterImage::from_rgba_image(&img)
}

/// Pixel-exact bytes of an image, for equality checks
pub fn raw_bytes(image: &RasterImage) -> Vec<u8> {
    image.to_rgba_image().into_raw()
}
