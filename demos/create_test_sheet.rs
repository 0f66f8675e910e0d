use image::{Rgba, RgbaImage};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([20, 20, 20, 255]);

fn fill(img: &mut RgbaImage, x1: u32, x2: u32, y1: u32, y2: u32) {
    for y in y1..y2 {
        for x in x1..x2 {
            img.put_pixel(x, y, INK);
        }
    }
}

fn main() {
    // Roughly an rM portrait page at 10 px/mm
    let (width, height) = (1570, 2096);
    let mut img = RgbaImage::from_pixel(width, height, WHITE);

    let rows = [300, 900, 1500, 2000];
    for &y in &rows {
        fill(&mut img, 0, width, y, y + 4);
    }
    for pair in rows.windows(2) {
        fill(&mut img, 780, 784, pair[0], pair[1]);
        // Something to write on either side
        fill(&mut img, 300, 600, pair[0] + 150, pair[0] + 350);
        fill(&mut img, 1000, 1400, pair[0] + 100, pair[0] + 250);
    }

    img.save("test_sheet.png").unwrap();
    println!("Created test_sheet.png ({}x{}, {} card rows)", width, height, rows.len() - 1);
}
