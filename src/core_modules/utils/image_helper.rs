pub mod image_helper {
    use crate::core_modules::component::ComponentType;
    use crate::core_modules::geometry::BoundingBox;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use crate::error::{Result, VisionError};
    use crate::pipeline::AnalysisResult;
    use image::ImageEncoder;
    use std::io::BufWriter;
    use std::path::{Path, PathBuf};
    use tracing::debug;

    const PATTERN_COLOR: Pixel = Pixel::rgb(236, 72, 153);
    const OUTLINE: u32 = 2;

    /// Writes `pixels` to `path` as an RGBA PNG.
    pub fn save_rgba(path: &Path, pixels: &PixelBuffer) -> Result<()> {
        let output = BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder
            .write_image(
                pixels.as_bytes(),
                pixels.width(),
                pixels.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(VisionError::Encode)?;

        debug!(path = %path.display(), "png written");
        Ok(())
    }

    /// Outline colour used for a component type in overlays.
    pub fn overlay_color(component_type: ComponentType) -> Pixel {
        match component_type {
            ComponentType::Button => Pixel::rgb(59, 130, 246),
            ComponentType::Input => Pixel::rgb(16, 185, 129),
            ComponentType::Card => Pixel::rgb(245, 158, 11),
            ComponentType::Header => Pixel::rgb(139, 92, 246),
            ComponentType::Sidebar => Pixel::rgb(20, 184, 166),
            _ => Pixel::rgb(239, 68, 68),
        }
    }

    fn outline(canvas: &mut PixelBuffer, bbox: &BoundingBox, color: Pixel, thickness: u32) {
        let area = bbox.clamp_to(canvas.width(), canvas.height());
        if area.width == 0 || area.height == 0 {
            return;
        }
        for t in 0..thickness.min(area.width).min(area.height) {
            let (top, bottom) = (area.y + t, area.bottom() - 1 - t);
            let (left, right) = (area.x + t, area.right() - 1 - t);
            for x in area.x..area.right() {
                canvas.set(x, top, color);
                canvas.set(x, bottom, color);
            }
            for y in area.y..area.bottom() {
                canvas.set(left, y, color);
                canvas.set(right, y, color);
            }
        }
    }

    /// A copy of `pixels` with every component outlined in its type colour and
    /// every pattern outlined around its elements.
    pub fn render_overlay(pixels: &PixelBuffer, result: &AnalysisResult) -> PixelBuffer {
        let mut canvas = pixels.clone();
        for component in &result.components {
            outline(
                &mut canvas,
                &component.bounding_box,
                overlay_color(component.component_type),
                OUTLINE,
            );
        }
        for pattern in &result.patterns {
            if let Some(area) = BoundingBox::union(&pattern.elements) {
                outline(&mut canvas, &area, PATTERN_COLOR, 1);
            }
        }
        canvas
    }

    /// Writes one PNG slice per component into `dir` (`{index:03}-{type}.png`),
    /// returning the written paths in component order.
    pub fn save_component_crops(
        dir: &Path,
        pixels: &PixelBuffer,
        result: &AnalysisResult,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(result.components.len());
        for (index, component) in result.components.iter().enumerate() {
            let crop = pixels.crop(&component.bounding_box);
            if crop.is_empty() {
                continue;
            }
            let path = dir.join(format!("{index:03}-{}.png", component.component_type));
            save_rgba(&path, &crop)?;
            written.push(path);
        }
        Ok(written)
    }
}
