//! The print-ready label: fixed box layout at 2" × 1".
//!
//! ## Layout (base resolution, 406 × 203)
//!
//! ```text
//! 0      6               126 132                         400  406
//! ┌──────────────────────────────────────────────────────────┐ 0
//! │                                                  lot ──┐ │ 3
//! │ ┌──────────────┐ ┌───────────────────────────────────┐ │ 6
//! │ │  CONDITION   │ │              PRICE                │ │
//! │ └──────────────┘ └───────────────────────────────────┘ │ 66
//! │ SKU                                                    │ 70
//! │ Title line one                                         │ 84
//! │ Title line two                                         │
//! │ ┌────────────────────────────────────────────────────┐ │ 128
//! │ │                 barcode / QR band                  │ │
//! │ └────────────────────────────────────────────────────┘ │ 197
//! └──────────────────────────────────────────────────────────┘ 203
//! ```
//!
//! Every length above is multiplied by the surface scale, together with all
//! font sizes, so output at any DPI is the same picture.

use serde::{Deserialize, Serialize};

use super::barcode::{self, Area, QrRendering};
use super::fit::{shrink_to_fit, wrap_words};
use super::font::measure_text;
use super::surface::{BLACK, GUIDE, LabelSurface, WHITE};
use crate::error::CardLabelError;
use crate::geometry::{RASTER_HEIGHT_PX, RASTER_WIDTH_PX};
use crate::layout::{BarcodeMode, FieldLayout, LabelData, LabelLayout};

const W: f32 = RASTER_WIDTH_PX as f32;
const H: f32 = RASTER_HEIGHT_PX as f32;
const PAD: f32 = 6.0;
const BORDER: f32 = 2.0;

const TOP_ROW_Y: f32 = 6.0;
const TOP_ROW_H: f32 = 60.0;
const CONDITION_W: f32 = 120.0;
const BOX_GAP: f32 = 6.0;

const SMALL_TEXT: f32 = 10.0;
const LOT_Y: f32 = 3.0;
const SKU_Y: f32 = 70.0;

const TITLE_Y: f32 = 84.0;
const TITLE_LINE_H: f32 = 20.0;
const TITLE_MAX_LINES: usize = 2;

const BAND_Y: f32 = 128.0;
const BAND_H: f32 = H - PAD - BAND_Y;
/// Space under linear bars for the human-readable line.
const HRI_H: f32 = 12.0;

/// Whether a field is drawn, and what precedes its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldToggle {
    pub visible: bool,
    #[serde(default)]
    pub prefix: String,
}

impl FieldToggle {
    pub fn shown(prefix: &str) -> Self {
        Self {
            visible: true,
            prefix: prefix.to_string(),
        }
    }

    fn text(&self, value: &str) -> Option<String> {
        if self.visible && !value.trim().is_empty() {
            Some(format!("{}{}", self.prefix, value))
        } else {
            None
        }
    }
}

impl From<&FieldLayout> for FieldToggle {
    fn from(field: &FieldLayout) -> Self {
        Self {
            visible: field.visible,
            prefix: field.prefix.clone(),
        }
    }
}

/// Which fields the print-ready renderer draws.
///
/// Positions are fixed by this renderer; only visibility, prefixes and the
/// symbol mode come from the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub title: FieldToggle,
    pub sku: FieldToggle,
    pub price: FieldToggle,
    pub lot: FieldToggle,
    pub condition: FieldToggle,
    pub barcode_mode: BarcodeMode,
    #[serde(default)]
    pub qr: QrRendering,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::from(&LabelLayout::default())
    }
}

impl From<&LabelLayout> for FieldConfig {
    fn from(layout: &LabelLayout) -> Self {
        Self {
            title: FieldToggle::from(&layout.title),
            sku: FieldToggle::from(&layout.sku),
            price: FieldToggle::from(&layout.price),
            lot: FieldToggle::from(&layout.lot),
            condition: FieldToggle::from(&layout.condition),
            barcode_mode: layout.barcode.mode,
            qr: QrRendering::default(),
        }
    }
}

/// Draw the print-ready label onto `surface`.
///
/// The surface must be exactly the full label size for its scale
/// (406 × 203 at scale 1). Hidden fields are omitted entirely. Guides are
/// dashed outlines of the layout boxes, for on-screen use only.
pub fn render_label_to_canvas(
    surface: &mut LabelSurface,
    config: &FieldConfig,
    data: &LabelData,
    show_guides: bool,
) -> Result<(), CardLabelError> {
    let scale = surface.scale();
    let expected = scale.label_size();
    if (surface.width(), surface.height()) != expected {
        return Err(CardLabelError::Render(format!(
            "surface is {}x{}, expected {}x{} at scale {}",
            surface.width(),
            surface.height(),
            expected.0,
            expected.1,
            scale.factor()
        )));
    }

    let s = |v: f32| scale.apply(v);
    let si = |v: f32| scale.px(v);

    surface.clear(WHITE);
    surface.stroke_rect(0, 0, si(W), si(H), si(BORDER).max(1), BLACK);

    let price_x = PAD + CONDITION_W + BOX_GAP;
    let price_w = W - price_x - PAD;
    let inner_w = W - 2.0 * PAD;

    if let Some(text) = config.condition.text(&data.condition) {
        draw_centered_fit(surface, &text, PAD, TOP_ROW_Y, CONDITION_W, TOP_ROW_H);
    }

    if let Some(text) = config.price.text(&data.price) {
        draw_centered_fit(surface, &text, price_x, TOP_ROW_Y, price_w, TOP_ROW_H);
    }

    if let Some(text) = config.sku.text(&data.sku) {
        surface.draw_text(&text, s(PAD), s(SKU_Y), s(SMALL_TEXT), BLACK);
    }

    if let Some(text) = config.lot.text(&data.lot) {
        let width = measure_text(&text, SMALL_TEXT);
        surface.draw_text(&text, s(W - PAD - width), s(LOT_Y), s(SMALL_TEXT), BLACK);
    }

    if let Some(text) = config.title.text(&data.title) {
        let px = shrink_to_fit(&text, inner_w * TITLE_MAX_LINES as f32, TITLE_LINE_H);
        let line_h = (px * 1.1).min(TITLE_LINE_H * 1.1);
        for (i, line) in wrap_words(&text, px, inner_w, TITLE_MAX_LINES).iter().enumerate() {
            surface.draw_text(line, s(PAD), s(TITLE_Y + i as f32 * line_h), s(px), BLACK);
        }
    }

    let band = Area {
        x: s(PAD),
        y: s(BAND_Y),
        width: s(inner_w),
        height: s(BAND_H),
    };
    draw_symbol(surface, config, data.barcode_data(), band);

    if show_guides {
        let guide = |surface: &mut LabelSurface, x: f32, y: f32, w: f32, h: f32| {
            surface.dashed_rect(si(x), si(y), si(w), si(h), si(4.0).max(1), GUIDE);
        };
        guide(surface, PAD, TOP_ROW_Y, CONDITION_W, TOP_ROW_H);
        guide(surface, price_x, TOP_ROW_Y, price_w, TOP_ROW_H);
        guide(surface, PAD, TITLE_Y, inner_w, TITLE_LINE_H * TITLE_MAX_LINES as f32);
        guide(surface, PAD, BAND_Y, inner_w, BAND_H);
    }

    Ok(())
}

/// Shrink-to-fit `text` into a box (base units) and draw it centered.
fn draw_centered_fit(surface: &mut LabelSurface, text: &str, x: f32, y: f32, w: f32, h: f32) {
    let scale = surface.scale();
    let px = shrink_to_fit(text, w, h);
    let width = measure_text(text, px);
    let left = x + (w - width) / 2.0;
    let top = y + (h - px) / 2.0;
    surface.draw_text(text, scale.apply(left), scale.apply(top), scale.apply(px), BLACK);
}

/// Draw the symbol band. Encoding failures fall back to the raw data text.
fn draw_symbol(surface: &mut LabelSurface, config: &FieldConfig, data: &str, band: Area) {
    if data.trim().is_empty() {
        return;
    }
    let scale = surface.scale();
    let drawn = match config.barcode_mode {
        BarcodeMode::None => return,
        BarcodeMode::Qr => barcode::draw_qr(surface, data, band, config.qr),
        BarcodeMode::Barcode => {
            let hri = scale.apply(HRI_H);
            let bars = Area {
                height: band.height - hri,
                ..band
            };
            let ok = barcode::draw_code128(surface, data, bars);
            if ok {
                draw_centered_line(
                    surface,
                    data,
                    band.x,
                    bars.y + bars.height + scale.apply(1.0),
                    band.width,
                    scale.apply(SMALL_TEXT),
                );
            }
            ok
        }
    };

    if !drawn {
        log::debug!("symbol encoding failed for {:?}, drawing text", data);
        let px = scale.apply(SMALL_TEXT * 1.4);
        let y = band.y + (band.height - px) / 2.0;
        draw_centered_line(surface, data, band.x, y, band.width, px);
    }
}

/// Draw one line horizontally centered in `[x, x + width)`, in pixels.
fn draw_centered_line(surface: &mut LabelSurface, text: &str, x: f32, y: f32, width: f32, px: f32) {
    let left = x + (width - measure_text(text, px)) / 2.0;
    surface.draw_text(text, left, y, px, BLACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PreviewScale;

    fn data() -> LabelData {
        LabelData {
            title: "Charizard Holo Base Set Unlimited".into(),
            sku: "PKM-004".into(),
            price: "349.99".into(),
            lot: "L12".into(),
            condition: "NM".into(),
            barcode: String::new(),
        }
    }

    fn price_box_has_ink(surface: &LabelSurface) -> bool {
        surface.has_ink(133, 7, 266, 58, 128)
    }

    #[test]
    fn test_full_render_draws_all_regions() {
        let mut surface = LabelSurface::new(PreviewScale::DOTS);
        render_label_to_canvas(&mut surface, &FieldConfig::default(), &data(), false).unwrap();
        assert!(surface.has_ink(7, 7, 118, 58, 128), "condition");
        assert!(price_box_has_ink(&surface), "price");
        assert!(surface.has_ink(6, 70, 80, 10, 128), "sku");
        assert!(surface.has_ink(6, 84, 394, 40, 128), "title");
        assert!(surface.has_ink(6, 128, 394, 69, 128), "symbol");
        // border
        assert_eq!(surface.pixel(0, 100), Some(BLACK));
        assert_eq!(surface.pixel(405, 100), Some(BLACK));
    }

    #[test]
    fn test_hidden_price_is_omitted() {
        let mut layout = LabelLayout::default();
        layout.price.visible = false;
        let mut surface = LabelSurface::new(PreviewScale::DOTS);
        render_label_to_canvas(&mut surface, &FieldConfig::from(&layout), &data(), false).unwrap();
        assert!(!surface.has_ink(133, 14, 266, 52, 255));
    }

    #[test]
    fn test_wrong_surface_size_is_render_error() {
        let mut surface = LabelSurface::with_size(100, 50, PreviewScale::DOTS);
        let err = render_label_to_canvas(&mut surface, &FieldConfig::default(), &data(), false)
            .unwrap_err();
        assert!(matches!(err, CardLabelError::Render(_)));
    }

    #[test]
    fn test_guides_only_when_requested() {
        let mut data = data();
        data.condition.clear();
        let mut plain = LabelSurface::new(PreviewScale::DOTS);
        render_label_to_canvas(&mut plain, &FieldConfig::default(), &data, false).unwrap();
        let mut guided = LabelSurface::new(PreviewScale::DOTS);
        render_label_to_canvas(&mut guided, &FieldConfig::default(), &data, true).unwrap();
        assert_eq!(plain.pixel(6, 6), Some(WHITE));
        assert_eq!(guided.pixel(6, 6), Some(GUIDE));
    }

    #[test]
    fn test_unencodable_barcode_falls_back_to_text() {
        let mut config = FieldConfig::default();
        config.barcode_mode = BarcodeMode::Barcode;
        let mut data = data();
        data.barcode = "ピカチュウ".into();
        let mut surface = LabelSurface::new(PreviewScale::DOTS);
        render_label_to_canvas(&mut surface, &config, &data, false).unwrap();
        assert!(surface.has_ink(6, 128, 394, 69, 255));
    }

    #[test]
    fn test_scaled_render() {
        let scale = PreviewScale::for_output_dpi(406.0);
        let mut surface = LabelSurface::new(scale);
        render_label_to_canvas(&mut surface, &FieldConfig::default(), &data(), false).unwrap();
        assert_eq!((surface.width(), surface.height()), (812, 406));
        assert_eq!(surface.pixel(811, 200), Some(BLACK));
        assert!(surface.has_ink(266, 14, 532, 116, 128));
    }
}
