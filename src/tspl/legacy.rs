//! Fixed card-label layout predating [`LabelLayout`](crate::layout::LabelLayout).
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ TITLE                    COND     $PRICE   │
//! │ SKU: ...                                   │
//! │ Lot: ...                                   │
//! │ ────────────────────────────────────────── │
//! │ ▓▓▓▓                                       │
//! │ ▓QR▓                                       │
//! └────────────────────────────────────────────┘
//! ```
//!
//! Kept so stored print jobs keep producing identical output. New callers
//! should use [`layout_to_tspl`](super::layout_to_tspl).

use super::{Bar, FontSize, PrintSettings, QrCode, TextLine, TsplOptions};
use crate::layout::{CodeSize, LabelData};

/// Map label data onto the fixed legacy layout.
pub fn label_data_to_tspl(data: &LabelData, settings: PrintSettings) -> TsplOptions {
    let mut options = TsplOptions::with_settings(settings);

    if !data.title.trim().is_empty() {
        options = options.text(
            TextLine::new(data.title.as_str())
                .at(10, 10)
                .font(FontSize::Two),
        );
    }
    if !data.sku.trim().is_empty() {
        options = options.text(TextLine::new(format!("SKU: {}", data.sku)).at(10, 40));
    }
    if !data.lot.trim().is_empty() {
        options = options.text(TextLine::new(format!("Lot: {}", data.lot)).at(10, 60));
    }
    if !data.condition.trim().is_empty() {
        options = options.text(
            TextLine::new(data.condition.as_str())
                .at(210, 14)
                .font(FontSize::Two),
        );
    }
    if !data.price.trim().is_empty() {
        options = options.text(
            TextLine::new(format!("${}", data.price))
                .at(290, 10)
                .font(FontSize::Four),
        );
    }

    options = options.bar(Bar {
        x: 10,
        y: 84,
        width: 366,
        height: 2,
    });

    let symbol = data.barcode_data();
    if !symbol.trim().is_empty() {
        options = options.qrcode(QrCode::new(symbol).at(10, 92).size(CodeSize::M));
    }

    options
}
