//! # Label Layout Model
//!
//! The canonical, serializable description of a printable 2" × 1" label:
//! five named text fields plus one barcode/QR region.
//!
//! ## Coordinates
//!
//! `x`/`y` are printer dots on the 386 × 203 layout grid, origin top-left.
//! Interactive edits go through [`LabelLayout::move_field`] and
//! [`LabelLayout::move_barcode`], which clamp. Programmatic construction is
//! not clamped; call [`LabelLayout::validate`] before persisting or rendering.
//!
//! ## JSON shape
//!
//! ```json
//! {
//!   "title": { "visible": true, "x": 10, "y": 8, "fontSize": 18, "prefix": "" },
//!   "sku":   { ... }, "price": { ... }, "lot": { ... }, "condition": { ... },
//!   "barcode": { "mode": "qr", "x": 10, "y": 100, "width": 90, "height": 90, "size": "M" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::CardLabelError;
use crate::geometry::{LAYOUT_HEIGHT_DOTS, LAYOUT_WIDTH_DOTS};

/// The five text fields every label carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Title,
    Sku,
    Price,
    Lot,
    Condition,
}

impl FieldName {
    /// All fields in their canonical draw order.
    pub const ALL: [FieldName; 5] = [
        FieldName::Title,
        FieldName::Sku,
        FieldName::Price,
        FieldName::Lot,
        FieldName::Condition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Sku => "sku",
            FieldName::Price => "price",
            FieldName::Lot => "lot",
            FieldName::Condition => "condition",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position, visibility and size of one text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayout {
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    /// Nominal text height in dots. Mapped to a TSPL font bucket by the
    /// command renderer and used directly by the editor preview.
    pub font_size: f32,
    #[serde(default)]
    pub prefix: String,
}

impl FieldLayout {
    pub fn new(x: i32, y: i32, font_size: f32) -> Self {
        Self {
            visible: true,
            x,
            y,
            font_size,
            prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Prefix plus value, as printed.
    pub fn display_text(&self, value: &str) -> String {
        format!("{}{}", self.prefix, value)
    }
}

/// What the barcode region draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarcodeMode {
    #[default]
    Qr,
    Barcode,
    None,
}

/// Symbol size preset for the barcode region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodeSize {
    S,
    #[default]
    M,
    L,
}

impl CodeSize {
    /// QR cell width in dots for the TSPL `QRCODE` command.
    pub fn qr_cell_width(self) -> u8 {
        match self {
            CodeSize::S => 3,
            CodeSize::M => 4,
            CodeSize::L => 6,
        }
    }

    /// Narrow bar width in dots for the TSPL `BARCODE` command.
    pub fn narrow_bar(self) -> u8 {
        match self {
            CodeSize::S => 1,
            CodeSize::M => 2,
            CodeSize::L => 3,
        }
    }

    /// Parse the single-letter form used by forms and query strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "S" => Some(CodeSize::S),
            "M" => Some(CodeSize::M),
            "L" => Some(CodeSize::L),
            _ => None,
        }
    }
}

/// The single barcode / QR region of a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeRegion {
    pub mode: BarcodeMode,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub size: CodeSize,
}

/// Canonical printable-label description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLayout {
    pub title: FieldLayout,
    pub sku: FieldLayout,
    pub price: FieldLayout,
    pub lot: FieldLayout,
    pub condition: FieldLayout,
    pub barcode: BarcodeRegion,
    /// Printer preferences stored alongside the layout. Passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer: Option<serde_json::Value>,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            title: FieldLayout::new(10, 8, 18.0),
            sku: FieldLayout::new(10, 40, 12.0).with_prefix("SKU: "),
            price: FieldLayout::new(270, 8, 32.0).with_prefix("$"),
            lot: FieldLayout::new(10, 62, 12.0).with_prefix("Lot: "),
            condition: FieldLayout::new(270, 56, 24.0),
            barcode: BarcodeRegion {
                mode: BarcodeMode::Qr,
                x: 10,
                y: 100,
                width: 90,
                height: 90,
                size: CodeSize::M,
            },
            printer: None,
        }
    }
}

impl LabelLayout {
    pub fn field(&self, name: FieldName) -> &FieldLayout {
        match name {
            FieldName::Title => &self.title,
            FieldName::Sku => &self.sku,
            FieldName::Price => &self.price,
            FieldName::Lot => &self.lot,
            FieldName::Condition => &self.condition,
        }
    }

    pub fn field_mut(&mut self, name: FieldName) -> &mut FieldLayout {
        match name {
            FieldName::Title => &mut self.title,
            FieldName::Sku => &mut self.sku,
            FieldName::Price => &mut self.price,
            FieldName::Lot => &mut self.lot,
            FieldName::Condition => &mut self.condition,
        }
    }

    /// Iterate fields in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldName, &FieldLayout)> {
        FieldName::ALL.into_iter().map(move |name| (name, self.field(name)))
    }

    /// Interactive move: clamps into the layout grid.
    pub fn move_field(&mut self, name: FieldName, x: i32, y: i32) {
        let field = self.field_mut(name);
        field.x = clamp_x(x);
        field.y = clamp_y(y);
    }

    /// Interactive move of the barcode region: clamps its origin into the grid.
    pub fn move_barcode(&mut self, x: i32, y: i32) {
        self.barcode.x = clamp_x(x);
        self.barcode.y = clamp_y(y);
    }

    pub fn set_visible(&mut self, name: FieldName, visible: bool) {
        self.field_mut(name).visible = visible;
    }

    /// Check every coordinate lies inside `[0, 386) × [0, 203)`.
    pub fn validate(&self) -> Result<(), CardLabelError> {
        for (name, field) in self.fields() {
            check_point(name.as_str(), field.x, field.y)?;
            if !(field.font_size.is_finite() && field.font_size > 0.0) {
                return Err(CardLabelError::Validation(format!(
                    "{} has invalid font size {}",
                    name, field.font_size
                )));
            }
        }
        check_point("barcode", self.barcode.x, self.barcode.y)?;
        if self.barcode.width <= 0 || self.barcode.height <= 0 {
            return Err(CardLabelError::Validation(format!(
                "barcode region must have a positive size, got {}x{}",
                self.barcode.width, self.barcode.height
            )));
        }
        Ok(())
    }

    /// Parse and validate a layout from JSON.
    pub fn from_json(json: &str) -> Result<Self, CardLabelError> {
        let layout: LabelLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }
}

fn clamp_x(x: i32) -> i32 {
    x.clamp(0, LAYOUT_WIDTH_DOTS - 1)
}

fn clamp_y(y: i32) -> i32 {
    y.clamp(0, LAYOUT_HEIGHT_DOTS - 1)
}

fn check_point(what: &str, x: i32, y: i32) -> Result<(), CardLabelError> {
    if !(0..LAYOUT_WIDTH_DOTS).contains(&x) || !(0..LAYOUT_HEIGHT_DOTS).contains(&y) {
        return Err(CardLabelError::Validation(format!(
            "{} at ({}, {}) is outside the {}x{} label",
            what, x, y, LAYOUT_WIDTH_DOTS, LAYOUT_HEIGHT_DOTS
        )));
    }
    Ok(())
}

/// The variable values poured into a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelData {
    pub title: String,
    pub sku: String,
    pub price: String,
    pub lot: String,
    pub condition: String,
    /// String encoded by the barcode/QR symbol. Usually the SKU.
    pub barcode: String,
}

impl LabelData {
    pub fn value(&self, name: FieldName) -> &str {
        match name {
            FieldName::Title => &self.title,
            FieldName::Sku => &self.sku,
            FieldName::Price => &self.price,
            FieldName::Lot => &self.lot,
            FieldName::Condition => &self.condition,
        }
    }

    /// Symbol payload, falling back to the SKU when no explicit value is set.
    pub fn barcode_data(&self) -> &str {
        if self.barcode.trim().is_empty() {
            &self.sku
        } else {
            &self.barcode
        }
    }

    /// Values keyed by token name, for raw template interpolation.
    pub fn to_values(&self) -> HashMap<String, String> {
        let mut values: HashMap<String, String> = FieldName::ALL
            .into_iter()
            .map(|name| (name.as_str().to_string(), self.value(name).to_string()))
            .collect();
        values.insert("barcode".to_string(), self.barcode_data().to_string());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        assert!(LabelLayout::default().validate().is_ok());
    }

    #[test]
    fn test_move_field_clamps() {
        let mut layout = LabelLayout::default();
        layout.move_field(FieldName::Price, 500, -20);
        assert_eq!(layout.price.x, 385);
        assert_eq!(layout.price.y, 0);

        layout.move_barcode(-1, 999);
        assert_eq!((layout.barcode.x, layout.barcode.y), (0, 202));
    }

    #[test]
    fn test_programmatic_construction_is_not_clamped() {
        let mut layout = LabelLayout::default();
        layout.title.x = 386;
        assert_eq!(layout.title.x, 386);
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, CardLabelError::Validation(_)));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_zero_sized_barcode_rejected() {
        let mut layout = LabelLayout::default();
        layout.barcode.width = 0;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let layout = LabelLayout::default();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["title"]["fontSize"], 18.0);
        assert_eq!(json["barcode"]["mode"], "qr");
        assert_eq!(json["barcode"]["size"], "M");
        assert!(json.get("printer").is_none());
    }

    #[test]
    fn test_printer_passthrough_preserved() {
        let mut json = serde_json::to_value(LabelLayout::default()).unwrap();
        json["printer"] = serde_json::json!({ "id": 73518, "copies": 2 });
        let layout: LabelLayout = serde_json::from_value(json).unwrap();
        assert_eq!(layout.printer.unwrap()["id"], 73518);
    }

    #[test]
    fn test_barcode_data_falls_back_to_sku() {
        let data = LabelData {
            sku: "PKM-001".into(),
            ..Default::default()
        };
        assert_eq!(data.barcode_data(), "PKM-001");
        assert_eq!(data.to_values()["barcode"], "PKM-001");
    }

    #[test]
    fn test_code_size_parse() {
        assert_eq!(CodeSize::parse("l"), Some(CodeSize::L));
        assert_eq!(CodeSize::parse("xl"), None);
    }
}
