//! Field-editor preview: the layout as the user is positioning it.
//!
//! Unlike [`super::render_label_to_canvas`], this draws every field at its
//! own layout position and size, and hidden fields stay on screen in a
//! dimmed ink so they can still be grabbed and re-enabled. Empty values show
//! the field name in braces.

use super::barcode::{self, Area, QrRendering};
use super::surface::{BLACK, DIMMED, GUIDE, LabelSurface, WHITE};
use crate::geometry::{LAYOUT_HEIGHT_DOTS, LAYOUT_WIDTH_DOTS, PreviewScale};
use crate::layout::{BarcodeMode, LabelData, LabelLayout};

/// Render the layout grid (386 × 203 dots) at `scale`.
pub fn render_layout_preview(
    layout: &LabelLayout,
    data: &LabelData,
    scale: PreviewScale,
) -> LabelSurface {
    let width = scale.px(LAYOUT_WIDTH_DOTS as f32).max(1) as u32;
    let height = scale.px(LAYOUT_HEIGHT_DOTS as f32).max(1) as u32;
    let mut surface = LabelSurface::with_size(width, height, scale);
    surface.clear(WHITE);
    surface.stroke_rect(0, 0, width as i32, height as i32, 1, GUIDE);

    for (name, field) in layout.fields() {
        let value = data.value(name);
        let text = if value.trim().is_empty() {
            format!("{{{}}}", name)
        } else {
            field.display_text(value)
        };
        let ink = if field.visible { BLACK } else { DIMMED };
        surface.draw_text(
            &text,
            scale.apply(field.x as f32),
            scale.apply(field.y as f32),
            scale.apply(field.font_size),
            ink,
        );
    }

    let region = &layout.barcode;
    if region.mode != BarcodeMode::None {
        let area = Area {
            x: scale.apply(region.x as f32),
            y: scale.apply(region.y as f32),
            width: scale.apply(region.width as f32),
            height: scale.apply(region.height as f32),
        };
        surface.dashed_rect(
            area.x.round() as i32,
            area.y.round() as i32,
            area.width.round() as i32,
            area.height.round() as i32,
            scale.px(4.0).max(1),
            GUIDE,
        );
        let symbol = data.barcode_data();
        if !symbol.trim().is_empty() {
            match region.mode {
                BarcodeMode::Qr => {
                    barcode::draw_qr(&mut surface, symbol, area, QrRendering::Placeholder);
                }
                BarcodeMode::Barcode => {
                    barcode::draw_code128(&mut surface, symbol, area);
                }
                BarcodeMode::None => {}
            }
        }
    }

    surface
}
