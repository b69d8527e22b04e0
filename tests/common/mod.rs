#![allow(dead_code)]

use ui_vision::{Pixel, PixelBuffer};

pub const SLATE: Pixel = Pixel::rgb(30, 41, 59);
pub const BLUE: Pixel = Pixel::rgb(59, 130, 246);

/// Paints `rects` (x, y, width, height) in `fill` over a `background` canvas.
pub fn scene(
    width: u32,
    height: u32,
    background: Pixel,
    fill: Pixel,
    rects: &[(u32, u32, u32, u32)],
) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let inside = rects
            .iter()
            .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
        if inside { fill } else { background }
    })
}

/// Four 200x150 white cards in a 2x2 grid on a dark 1200x800 canvas.
pub fn card_grid() -> PixelBuffer {
    scene(
        1200,
        800,
        SLATE,
        Pixel::WHITE,
        &[(100, 100, 200, 150), (400, 100, 200, 150), (100, 350, 200, 150), (400, 350, 200, 150)],
    )
}

/// Five 100x30 blue items at y = 20 on a white 800x200 strip.
pub fn navigation_strip() -> PixelBuffer {
    let items: Vec<(u32, u32, u32, u32)> = (0..5).map(|i| (20 + i * 120, 20, 100, 30)).collect();
    scene(800, 200, Pixel::WHITE, BLUE, &items)
}
