//! Barcode and QR drawing for the raster renderers.
//!
//! Code 128 goes through the barcoders crate. QR output has two modes, see
//! [`QrRendering`]; the placeholder is the default and is **not scannable**.

use barcoders::sym::code128::Code128;
use serde::{Deserialize, Serialize};

use super::surface::{BLACK, LabelSurface};

/// How the raster renderers draw the QR region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrRendering {
    /// Deterministic checkerboard-like pattern keyed off the data length.
    /// Looks like a QR code on screen and on paper; no scanner will read it.
    #[default]
    Placeholder,
    /// Real QR symbol (error level M) from the qrcode crate.
    Encoded,
}

/// Pixel rectangle a symbol is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Encode data as Code 128 modules (character set B).
/// Returns a Vec<bool> where true = bar (black), false = space (white).
/// Returns `None` when the data cannot be encoded.
pub fn encode_code128(data: &str) -> Option<Vec<bool>> {
    // Ɓ selects character set B: upper/lower case, digits and punctuation.
    let prefixed_data = format!("\u{0181}{}", data);
    let barcode = Code128::new(&prefixed_data).ok()?;
    let modules: Vec<bool> = barcode.encode().into_iter().map(|m| m == 1).collect();
    if modules.is_empty() {
        None
    } else {
        Some(modules)
    }
}

/// Draw a Code 128 symbol horizontally centered in `area`, bars filling its
/// height. Returns false (and draws nothing) if the data cannot be encoded
/// or does not fit at one pixel per module.
pub fn draw_code128(surface: &mut LabelSurface, data: &str, area: Area) -> bool {
    let Some(modules) = encode_code128(data) else {
        return false;
    };
    let module_px = (area.width / modules.len() as f32).floor() as i32;
    if module_px < 1 {
        return false;
    }
    let total = module_px * modules.len() as i32;
    let left = (area.x + (area.width - total as f32) / 2.0).round() as i32;
    let top = area.y.round() as i32;
    let height = area.height.round() as i32;

    for (i, &bar) in modules.iter().enumerate() {
        if bar {
            surface.fill_rect(left + i as i32 * module_px, top, module_px, height, BLACK);
        }
    }
    true
}

/// Placeholder module grid for `data`: `grid[row][col]`, true = dark.
///
/// The grid is 21 modules wide plus 4 per 20 characters of data (capped at
/// 37). Three 7×7 finder squares sit in the corners; every other module is
/// dark when `(row + col + len) % 3 == 0`.
pub fn placeholder_modules(data: &str) -> Vec<Vec<bool>> {
    let len = data.chars().count();
    let n = 21 + 4 * (len / 20).min(4);
    let mut grid = vec![vec![false; n]; n];

    for (row, cells) in grid.iter_mut().enumerate() {
        for (col, cell) in cells.iter_mut().enumerate() {
            *cell = (row + col + len) % 3 == 0;
        }
    }

    for (r0, c0) in [(0, 0), (0, n - 7), (n - 7, 0)] {
        for r in 0..7 {
            for c in 0..7 {
                let edge = r == 0 || r == 6 || c == 0 || c == 6;
                let core = (2..=4).contains(&r) && (2..=4).contains(&c);
                grid[r0 + r][c0 + c] = edge || core;
            }
        }
    }

    grid
}

/// Real QR modules at error level M, or `None` if the data does not fit.
pub fn encoded_modules(data: &str) -> Option<Vec<Vec<bool>>> {
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(data, EcLevel::M).ok()?;
    let n = code.width();
    Some(
        (0..n)
            .map(|y| (0..n).map(|x| code[(x, y)] == Color::Dark).collect())
            .collect(),
    )
}

/// Draw a square module grid centered in `area`, as large as fits.
/// Returns false if `area` is too small for one pixel per module.
pub fn draw_modules(surface: &mut LabelSurface, grid: &[Vec<bool>], area: Area) -> bool {
    let n = grid.len();
    if n == 0 {
        return false;
    }
    let side = area.width.min(area.height);
    let cell = (side / n as f32).floor() as i32;
    if cell < 1 {
        return false;
    }
    let total = cell * n as i32;
    let left = (area.x + (area.width - total as f32) / 2.0).round() as i32;
    let top = (area.y + (area.height - total as f32) / 2.0).round() as i32;

    for (row, cells) in grid.iter().enumerate() {
        for (col, &dark) in cells.iter().enumerate() {
            if dark {
                surface.fill_rect(
                    left + col as i32 * cell,
                    top + row as i32 * cell,
                    cell,
                    cell,
                    BLACK,
                );
            }
        }
    }
    true
}

/// Draw the QR region in the chosen mode.
pub fn draw_qr(surface: &mut LabelSurface, data: &str, area: Area, mode: QrRendering) -> bool {
    let grid = match mode {
        QrRendering::Placeholder => Some(placeholder_modules(data)),
        QrRendering::Encoded => encoded_modules(data),
    };
    match grid {
        Some(grid) => draw_modules(surface, &grid, area),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PreviewScale;

    #[test]
    fn test_code128_encoding() {
        let bars = encode_code128("PKM-001").unwrap();
        assert!(bars.iter().any(|&b| b));
        assert!(bars[0], "Code 128 starts with a bar");
    }

    #[test]
    fn test_code128_rejects_unencodable() {
        assert!(encode_code128("ポケモン").is_none());
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        assert_eq!(placeholder_modules("abc"), placeholder_modules("xyz"));
        assert_ne!(placeholder_modules("abc"), placeholder_modules("abcd"));
        assert_eq!(placeholder_modules("abc").len(), 21);
        assert_eq!(placeholder_modules(&"a".repeat(45)).len(), 29);
        assert_eq!(placeholder_modules(&"a".repeat(500)).len(), 37);
    }

    #[test]
    fn test_placeholder_differs_from_real_symbol() {
        let real = encoded_modules("PKM-001").unwrap();
        assert_ne!(real, placeholder_modules("PKM-001"));
    }

    #[test]
    fn test_draw_code128_too_narrow() {
        let mut s = LabelSurface::with_size(20, 20, PreviewScale::DOTS);
        let area = Area { x: 0.0, y: 0.0, width: 20.0, height: 20.0 };
        assert!(!draw_code128(&mut s, "PKM-001", area));
        assert!(!s.has_ink(0, 0, 20, 20, 255));
    }
}
