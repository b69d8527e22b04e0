// THEORY:
// `PixelBuffer` is the engine's view of a decoded image: an immutable, row-major
// grid of RGBA samples (4 bytes per pixel, exactly like a canvas `ImageData`).
// It is the only input every analyzer shares, and it is only ever borrowed.
//
// Key principles:
// 1.  **Validated once**: the byte length is checked at construction, so every
//     accessor can index without re-checking the layout.
// 2.  **No decoding**: turning files or encoded bytes into pixels belongs to the
//     `image` crate at the pipeline boundary; this type only wraps the result.
// 3.  **Run-owned**: a buffer belongs to one analysis run. Concurrent runs each
//     own their own buffer, so no locking is ever needed.

use crate::core_modules::geometry::BoundingBox;
use crate::core_modules::pixel::pixel::{Intensity, Pixel};
use crate::error::{Result, VisionError};
use image::{DynamicImage, RgbaImage};

const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps a flat RGBA byte vector of `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS));
        if expected != Some(data.len()) {
            return Err(VisionError::InvalidBuffer {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a buffer by evaluating `paint` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut paint: impl FnMut(u32, u32) -> Pixel) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&paint(x, y).to_rgba());
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// A buffer filled with one colour.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Self::from_fn(width, height, |_, _| pixel)
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from(image.to_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// The pixel at (`x`, `y`). Coordinates must be inside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let i = self.offset(x, y);
        Pixel::from_rgba([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    /// Channel mean (R+G+B)/3 at (`x`, `y`).
    #[inline]
    pub fn gray(&self, x: u32, y: u32) -> Intensity {
        self.pixel(x, y).gray()
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.data[i..i + CHANNELS].copy_from_slice(&pixel.to_rgba());
        }
    }

    /// Pixels on a `step`-strided lattice inside `bbox` (clamped to the image),
    /// starting at its top-left corner.
    pub fn samples(&self, bbox: &BoundingBox, step: u32) -> impl Iterator<Item = Pixel> + '_ {
        let area = bbox.clamp_to(self.width, self.height);
        let step = step.max(1) as usize;
        (area.y..area.bottom())
            .step_by(step)
            .flat_map(move |y| {
                (area.x..area.right())
                    .step_by(step)
                    .map(move |x| self.pixel(x, y))
            })
    }

    /// Copies the sub-region under `bbox` (clamped to the image) into a new buffer.
    pub fn crop(&self, bbox: &BoundingBox) -> PixelBuffer {
        let area = bbox.clamp_to(self.width, self.height);
        let mut data = Vec::with_capacity(area.area() as usize * CHANNELS);
        for y in area.y..area.bottom() {
            let start = self.offset(area.x, y);
            let end = start + area.width as usize * CHANNELS;
            data.extend_from_slice(&self.data[start..end]);
        }
        PixelBuffer {
            width: area.width,
            height: area.height,
            data,
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        // Length is validated at construction.
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}
