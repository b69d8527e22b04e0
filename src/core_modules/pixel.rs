// THEORY (single-pixel colorimetry):
// The `Pixel` module is the most fundamental unit of the engine. It is a "dumb"
// data container for one RGBA sample plus the handful of single-pixel metrics the
// analyzers need. Nothing in here looks at neighbours: gradients live in the edge
// detector, colour similarity between a seed and a candidate lives in the region
// segmenter, and contrast between two colours lives in the accessibility layer.
//
// Metric families:
// - Intensity: `gray` is the plain channel mean (R+G+B)/3. The edge detector's
//   gradient operator reads it through `PixelBuffer::gray`. It is not perceptual.
// - Relative luminance: the WCAG 2.x definition. Channels are normalised to
//   0..1, gamma-decoded with the WCAG breakpoint (0.03928) and weighted
//   0.2126/0.7152/0.0722. Decoding goes through a 256-entry `OnceLock` LUT.
// - Hex: `#rrggbb` (alpha dropped) is the colour currency of the component
//   model and the JSON output.

pub mod pixel {
    use std::sync::OnceLock;

    pub type Channel = u8;
    pub type Intensity = f64;
    pub type Luminance = f64;

    const CHANNELS: usize = 4;

    // sRGB byte (0..255) -> linear light (0..1), WCAG transfer function.
    static SRGB_TO_LINEAR_LUT: OnceLock<[f64; 256]> = OnceLock::new();

    /// A single RGBA sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);
        pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Opaque pixel from RGB channels.
        pub const fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel::new(red, green, blue, 255)
        }

        pub const fn from_rgba(bytes: [Channel; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }

        pub const fn to_rgba(self) -> [Channel; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }

        /// Unweighted channel mean on the 0..255 scale.
        pub fn gray(&self) -> Intensity {
            (self.red as f64 + self.green as f64 + self.blue as f64) / 3.0
        }

        /// WCAG relative luminance in [0, 1].
        pub fn relative_luminance(&self) -> Luminance {
            0.2126 * Self::linearize(self.red)
                + 0.7152 * Self::linearize(self.green)
                + 0.0722 * Self::linearize(self.blue)
        }

        #[inline]
        fn linearize(value: Channel) -> f64 {
            let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
                let mut table = [0.0f64; 256];
                for (i, slot) in table.iter_mut().enumerate() {
                    let normalized = i as f64 / 255.0;
                    *slot = if normalized <= 0.03928 {
                        normalized / 12.92
                    } else {
                        ((normalized + 0.055) / 1.055).powf(2.4)
                    };
                }
                table
            });
            table[value as usize]
        }

        /// True when every RGB channel is within `tolerance` of `other`'s (inclusive).
        pub fn within_tolerance(&self, other: &Pixel, tolerance: u8) -> bool {
            self.red.abs_diff(other.red) <= tolerance
                && self.green.abs_diff(other.green) <= tolerance
                && self.blue.abs_diff(other.blue) <= tolerance
        }

        /// Lower-case `#rrggbb`.
        pub fn hex(&self) -> String {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }

        /// Parses `#rgb` or `#rrggbb` (leading `#` optional) into an opaque pixel.
        pub fn from_hex(hex: &str) -> Option<Pixel> {
            let digits = hex.trim().trim_start_matches('#');
            let expanded: String = match digits.len() {
                3 => digits.chars().flat_map(|c| [c, c]).collect(),
                6 => digits.to_string(),
                _ => return None,
            };
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(expanded.get(range)?, 16).ok()
            };
            Some(Pixel::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
        }

        /// Channel-wise mean of a set of pixels; `None` when the set is empty.
        pub fn mean<'a>(pixels: impl IntoIterator<Item = &'a Pixel>) -> Option<Pixel> {
            let (mut r, mut g, mut b, mut a, mut n) = (0u64, 0u64, 0u64, 0u64, 0u64);
            for pixel in pixels {
                r += pixel.red as u64;
                g += pixel.green as u64;
                b += pixel.blue as u64;
                a += pixel.alpha as u64;
                n += 1;
            }
            if n == 0 {
                return None;
            }
            Some(Pixel::new(
                (r / n) as u8,
                (g / n) as u8,
                (b / n) as u8,
                (a / n) as u8,
            ))
        }
    }

    impl From<[Channel; CHANNELS]> for Pixel {
        fn from(bytes: [Channel; CHANNELS]) -> Self {
            Pixel::from_rgba(bytes)
        }
    }
}
