//! LabelLayout → TsplOptions.

use super::{Barcode, FontSize, PrintSettings, QrCode, TextLine, TsplOptions};
use crate::layout::{BarcodeMode, LabelData, LabelLayout};

/// Build command-renderer input straight from layout positions.
///
/// Hidden fields and fields with an empty value are skipped. Text heights are
/// bucketed with [`FontSize::from_points`]. The barcode region becomes a
/// `QRCODE` or a Code 128 `BARCODE` depending on its mode; nothing is drawn
/// for `none` or when there is no symbol data.
pub fn layout_to_tspl(
    layout: &LabelLayout,
    data: &LabelData,
    settings: PrintSettings,
) -> TsplOptions {
    let mut options = TsplOptions::with_settings(settings);

    for (name, field) in layout.fields() {
        let value = data.value(name);
        if !field.visible || value.trim().is_empty() {
            continue;
        }
        options = options.text(
            TextLine::new(field.display_text(value))
                .at(field.x, field.y)
                .font(FontSize::from_points(field.font_size)),
        );
    }

    let symbol = data.barcode_data();
    if symbol.trim().is_empty() {
        return options;
    }

    let region = &layout.barcode;
    match region.mode {
        BarcodeMode::Qr => {
            options = options.qrcode(
                QrCode::new(symbol)
                    .at(region.x, region.y)
                    .size(region.size),
            );
        }
        BarcodeMode::Barcode => {
            options = options.barcode(Barcode {
                data: symbol.to_string(),
                x: region.x,
                y: region.y,
                height: region.height,
                size: region.size,
            });
        }
        BarcodeMode::None => {}
    }

    options
}
