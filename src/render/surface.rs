//! Grayscale drawing surface.
//!
//! A thin wrapper over [`image::GrayImage`] with the handful of primitives
//! the label renderers need. All coordinates are signed and clipped, so
//! callers can draw partially off-surface without checks.

use image::{GrayImage, ImageEncoder, Luma};

use super::font::{ADVANCE_RATIO, glyph};
use crate::error::CardLabelError;
use crate::geometry::PreviewScale;

pub const WHITE: u8 = 255;
pub const BLACK: u8 = 0;
/// Ink for hidden fields in the editor preview.
pub const DIMMED: u8 = 190;
/// Ink for guide outlines.
pub const GUIDE: u8 = 150;

/// A mutable 8-bit grayscale canvas plus the scale it was created for.
#[derive(Debug, Clone)]
pub struct LabelSurface {
    image: GrayImage,
    scale: PreviewScale,
}

impl LabelSurface {
    /// A white surface sized for the full 2" × 1" label at `scale`.
    pub fn new(scale: PreviewScale) -> Self {
        let (width, height) = scale.label_size();
        Self::with_size(width, height, scale)
    }

    /// A white surface of explicit size.
    pub fn with_size(width: u32, height: u32, scale: PreviewScale) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([WHITE])),
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scale(&self) -> PreviewScale {
        self.scale
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Luma at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, luma: u8) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(p) = self.image.get_pixel_mut_checked(x as u32, y as u32) {
            *p = Luma([luma]);
        }
    }

    pub fn clear(&mut self, luma: u8) {
        for p in self.image.pixels_mut() {
            *p = Luma([luma]);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, luma: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width).min(self.width() as i32);
        let y1 = (y + height).min(self.height() as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px as u32, py as u32, Luma([luma]));
            }
        }
    }

    /// Outline drawn inward from the rectangle's edge.
    pub fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        thickness: i32,
        luma: u8,
    ) {
        let t = thickness.max(1);
        self.fill_rect(x, y, width, t, luma);
        self.fill_rect(x, y + height - t, width, t, luma);
        self.fill_rect(x, y, t, height, luma);
        self.fill_rect(x + width - t, y, t, height, luma);
    }

    /// One-pixel dashed outline.
    pub fn dashed_rect(&mut self, x: i32, y: i32, width: i32, height: i32, dash: i32, luma: u8) {
        let dash = dash.max(1);
        for i in 0..width.max(0) {
            if (i / dash) % 2 == 0 {
                self.set_pixel(x + i, y, luma);
                self.set_pixel(x + i, y + height - 1, luma);
            }
        }
        for i in 0..height.max(0) {
            if (i / dash) % 2 == 0 {
                self.set_pixel(x, y + i, luma);
                self.set_pixel(x + width - 1, y + i, luma);
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y), `px` pixels tall.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, px: f32, luma: u8) {
        let advance = px * ADVANCE_RATIO;
        let top = y.round() as i32;
        for (i, ch) in text.chars().enumerate() {
            let g = glyph(ch, px);
            let left = (x + i as f32 * advance).round() as i32;
            for gy in 0..g.height {
                for gx in 0..g.width {
                    if g.data[gy * g.width + gx] {
                        self.set_pixel(left + gx as i32, top + gy as i32, luma);
                    }
                }
            }
        }
    }

    /// True if any pixel in the rectangle is darker than `threshold`.
    pub fn has_ink(&self, x: u32, y: u32, width: u32, height: u32, threshold: u8) -> bool {
        let x1 = (x + width).min(self.width());
        let y1 = (y + height).min(self.height());
        (y..y1).any(|py| (x..x1).any(|px| self.image.get_pixel(px, py).0[0] < threshold))
    }

    /// Encode as 8-bit grayscale PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, CardLabelError> {
        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                self.image.as_raw(),
                self.width(),
                self.height(),
                image::ExtendedColorType::L8,
            )
            .map_err(|e: image::ImageError| CardLabelError::Transcode(e.to_string()))?;
        Ok(png_bytes)
    }
}
