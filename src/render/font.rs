//! Bitmap text for the raster renderer.
//!
//! Uses the Spleen bitmap font family, scaled nearest-neighbor to any pixel
//! height. Spleen glyphs are exactly half as wide as they are tall, so text
//! width is a pure function of character count and height, which keeps
//! shrink-to-fit deterministic at every output resolution.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

/// Glyph advance as a fraction of the pixel height.
pub const ADVANCE_RATIO: f32 = 0.5;

/// Rendered width of `text` at `px` pixels tall.
pub fn measure_text(text: &str, px: f32) -> f32 {
    text.chars().count() as f32 * px * ADVANCE_RATIO
}

/// A rasterized glyph: `data[y * width + x]` is true for ink.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

/// Pick the Spleen face closest to (and not smaller than) the target size.
fn source_face(px: f32) -> (&'static [u8], usize, usize) {
    if px <= 13.0 {
        (FONT_6X12, 6, 12)
    } else if px <= 18.0 {
        (FONT_8X16, 8, 16)
    } else {
        (FONT_12X24, 12, 24)
    }
}

/// Rasterize `ch` at `px` pixels tall.
///
/// Characters missing from the font render as a box outline.
pub fn glyph(ch: char, px: f32) -> Glyph {
    let height = (px.round() as usize).max(1);
    let width = ((px * ADVANCE_RATIO).round() as usize).max(1);
    let (face, src_w, src_h) = source_face(px);

    let mut src = vec![false; src_w * src_h];
    let mut found = false;
    if let Ok(mut font) = PSF2Font::new(face) {
        let utf8 = ch.to_string();
        if let Some(rows) = font.glyph_for_utf8(utf8.as_bytes()) {
            found = true;
            for (row_y, row) in rows.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < src_h && col_x < src_w {
                        src[row_y * src_w + col_x] = on;
                    }
                }
            }
        }
    }

    let mut data = vec![false; width * height];
    if found {
        for dy in 0..height {
            for dx in 0..width {
                let sx = dx * src_w / width;
                let sy = dy * src_h / height;
                data[dy * width + dx] = src[sy * src_w + sx];
            }
        }
    } else if !ch.is_whitespace() {
        draw_box(&mut data, width, height);
    }

    Glyph {
        width,
        height,
        data,
    }
}

fn draw_box(data: &mut [bool], width: usize, height: usize) {
    for x in 0..width {
        data[x] = true;
        data[(height - 1) * width + x] = true;
    }
    for y in 0..height {
        data[y * width] = true;
        data[y * width + width - 1] = true;
    }
}
