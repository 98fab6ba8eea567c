//! # Label Geometry
//!
//! Fixed conversions between inches, printer dots and on-screen pixels.
//!
//! ```text
//! ┌──────────────── 2.0 in = 406 dots ────────────────┐
//! │ (0,0)                                             │ 1.0 in
//! │                                                   │ = 203 dots
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! Layout coordinates live on a 386 × 203 dot grid (the printable area the
//! field editor exposes); the raster renderer draws the full 406 × 203 label.

/// Printer resolution in dots per inch.
pub const PRINTER_DPI: f32 = 203.0;

/// CSS reference resolution used by on-screen previews.
pub const SCREEN_DPI: f32 = 96.0;

/// Label width in inches.
pub const LABEL_WIDTH_IN: f32 = 2.0;

/// Label height in inches.
pub const LABEL_HEIGHT_IN: f32 = 1.0;

/// Width of the layout coordinate grid in dots.
pub const LAYOUT_WIDTH_DOTS: i32 = 386;

/// Height of the layout coordinate grid in dots.
pub const LAYOUT_HEIGHT_DOTS: i32 = 203;

/// Width of the raster label surface at base resolution.
pub const RASTER_WIDTH_PX: u32 = 406;

/// Height of the raster label surface at base resolution.
pub const RASTER_HEIGHT_PX: u32 = 203;

/// Convert inches to printer dots (203 DPI), rounding to the nearest dot.
///
/// ```
/// use cardlabel::geometry::dots;
///
/// assert_eq!(dots(2.0), 406);
/// assert_eq!(dots(1.0), 203);
/// assert_eq!(dots(0.5), 102);
/// ```
pub fn dots(inches: f32) -> i32 {
    (inches * PRINTER_DPI).round() as i32
}

/// Smallest scale factor a [`PreviewScale`] can hold.
pub const MIN_ZOOM: f32 = 0.1;
/// Largest scale factor a [`PreviewScale`] can hold (a 1624 DPI bitmap).
pub const MAX_ZOOM: f32 = 8.0;

/// A uniform scale factor applied to width, height and font size together.
///
/// There is deliberately no way to scale axes independently: previews
/// must never distort the label's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewScale(f32);

impl PreviewScale {
    /// Identity scale: one output pixel per printer dot.
    pub const DOTS: PreviewScale = PreviewScale(1.0);

    /// Explicit zoom factor, clamped to `MIN_ZOOM..=MAX_ZOOM`. Non-finite or
    /// non-positive values fall back to 1.
    pub fn zoom(factor: f32) -> Self {
        if factor.is_finite() && factor > 0.0 {
            Self(factor.clamp(MIN_ZOOM, MAX_ZOOM))
        } else {
            Self(1.0)
        }
    }

    /// Scale for a screen preview at `preview_dpi` (relative to 96 DPI).
    pub fn for_screen_dpi(preview_dpi: f32) -> Self {
        Self::zoom(preview_dpi / SCREEN_DPI)
    }

    /// Scale that turns the 203 DPI base label into a bitmap at `dpi`.
    pub fn for_output_dpi(dpi: f32) -> Self {
        Self::zoom(dpi / PRINTER_DPI)
    }

    pub fn factor(self) -> f32 {
        self.0
    }

    /// Scale a length (position, width, height or font size).
    pub fn apply(self, value: f32) -> f32 {
        value * self.0
    }

    /// Scale a length and round to whole pixels.
    pub fn px(self, value: f32) -> i32 {
        (value * self.0).round() as i32
    }

    /// Scaled (width, height) of the full raster label.
    pub fn label_size(self) -> (u32, u32) {
        (
            ((RASTER_WIDTH_PX as f32) * self.0).round().max(1.0) as u32,
            ((RASTER_HEIGHT_PX as f32) * self.0).round().max(1.0) as u32,
        )
    }
}

impl Default for PreviewScale {
    fn default() -> Self {
        Self::DOTS
    }
}
