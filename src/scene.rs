//! # Scene Graph → TSPL
//!
//! The freeform label editor stores a canvas scene: text boxes, rectangles,
//! lines and images placed anywhere, each with its own transform. This module
//! maps that scene onto the small instruction set of [`crate::tspl`]. The
//! mapping is one-way and lossy; TSPL output is never turned back into shapes.
//!
//! | Scene object | Becomes |
//! |--------------|---------|
//! | `textbox`, `text`, `i-text` | `TEXT` (font and rotation bucketed) |
//! | `rect`, `line` | `BAR` sized by base size × scale |
//! | `image` with `meta.type = "qrcode"` | `QRCODE` (first one only) |
//! | `image` with `meta.type = "barcode"` | `TEXT` of the data under the image |
//! | anything else | nothing |
//!
//! ## Barcode degradation
//!
//! This path has no linear-barcode primitive: a barcode-tagged image prints
//! its data as readable text just below the image's bounding box. Use
//! [`crate::tspl::layout_to_tspl`] when a scannable Code 128 is required.
//!
//! Objects with `excludeFromExport` set, or named [`BORDER_OBJECT_NAME`], are
//! editor furniture and are always skipped.

use serde::{Deserialize, Serialize};

use crate::tspl::{
    Bar, FontSize, PrintSettings, QrCode, Rotation, TextLine, TsplOptions, build_tspl,
};

/// Name of the editor's label outline object.
pub const BORDER_OBJECT_NAME: &str = "label-border";

/// Gap between a barcode image and its text substitute, in dots.
const BARCODE_TEXT_GAP: i32 = 2;

fn one() -> f32 {
    1.0
}

fn default_font_size() -> f32 {
    16.0
}

/// A serialized editor canvas (`canvas.toJSON()` shape).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

/// Placement shared by every scene object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBase {
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "one")]
    pub scale_x: f32,
    #[serde(default = "one")]
    pub scale_y: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exclude_from_export: bool,
}

impl ObjectBase {
    fn skipped(&self) -> bool {
        self.exclude_from_export || self.name.as_deref() == Some(BORDER_OBJECT_NAME)
    }

    fn scaled_width(&self) -> f32 {
        self.width * self.scale_x
    }

    fn scaled_height(&self) -> f32 {
        self.height * self.scale_y
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default = "one")]
    pub stroke_width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub meta: Option<ImageMeta>,
}

/// Tag the editor attaches to generated symbol images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(rename = "type")]
    pub kind: SymbolKind,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Barcode,
    Qrcode,
    #[serde(other)]
    Unknown,
}

/// One drawable object, dispatched on its `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Textbox(TextObject),
    #[serde(alias = "i-text")]
    Text(TextObject),
    Rect(ShapeObject),
    Line(ShapeObject),
    Image(ImageObject),
    #[serde(other)]
    Other,
}

/// Translate a scene into renderer input.
pub fn scene_to_options(scene: &Scene, settings: PrintSettings) -> TsplOptions {
    let mut options = TsplOptions::with_settings(settings);
    let mut qr_taken = false;

    for object in &scene.objects {
        match object {
            SceneObject::Textbox(text) | SceneObject::Text(text) => {
                if text.base.skipped() {
                    continue;
                }
                options = options.text(
                    TextLine::new(text.text.as_str())
                        .at(text.base.left.round() as i32, text.base.top.round() as i32)
                        .font(FontSize::from_points(text.font_size * text.base.scale_y))
                        .rotated(Rotation::from_degrees(text.base.angle)),
                );
            }
            SceneObject::Rect(shape) => {
                if shape.base.skipped() {
                    continue;
                }
                options = options.bar(bar_for(&shape.base, 0.0));
            }
            SceneObject::Line(shape) => {
                if shape.base.skipped() {
                    continue;
                }
                // Axis-aligned lines have a zero-sized axis; stroke gives it ink.
                options = options.bar(bar_for(&shape.base, shape.stroke_width));
            }
            SceneObject::Image(image) => {
                if image.base.skipped() {
                    continue;
                }
                let Some(meta) = &image.meta else {
                    continue;
                };
                match meta.kind {
                    SymbolKind::Qrcode if qr_taken => {
                        log::debug!("dropping extra QR-tagged image ({})", meta.data);
                    }
                    SymbolKind::Qrcode => {
                        qr_taken = true;
                        options = options.qrcode(QrCode::new(meta.data.as_str()).at(
                            image.base.left.round() as i32,
                            image.base.top.round() as i32,
                        ));
                    }
                    SymbolKind::Barcode => {
                        let below = image.base.top + image.base.scaled_height();
                        log::debug!("barcode image printed as text: {}", meta.data);
                        options = options.text(TextLine::new(meta.data.as_str()).at(
                            image.base.left.round() as i32,
                            below.round() as i32 + BARCODE_TEXT_GAP,
                        ));
                    }
                    SymbolKind::Unknown => {}
                }
            }
            SceneObject::Other => {}
        }
    }

    options
}

fn bar_for(base: &ObjectBase, min_thickness: f32) -> Bar {
    Bar {
        x: base.left.round() as i32,
        y: base.top.round() as i32,
        width: base.scaled_width().max(min_thickness).round() as i32,
        height: base.scaled_height().max(min_thickness).round() as i32,
    }
}

/// Translate a scene straight to a TSPL program with default print settings.
pub fn fabric_to_tspl(scene: &Scene) -> String {
    build_tspl(&scene_to_options(scene, PrintSettings::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene(objects: serde_json::Value) -> Scene {
        serde_json::from_value(json!({ "version": "5.3.0", "objects": objects })).unwrap()
    }

    #[test]
    fn test_textbox_mapping() {
        let s = scene(json!([
            { "type": "textbox", "left": 10.4, "top": 19.6, "text": "Mew", "fontSize": 20, "angle": 92 }
        ]));
        let options = scene_to_options(&s, PrintSettings::default());
        let line = &options.text_lines[0];
        assert_eq!((line.x, line.y), (10, 20));
        assert_eq!(line.font_size, FontSize::Three);
        assert_eq!(line.rotation, Rotation::R90);
    }

    #[test]
    fn test_text_scale_affects_font_bucket() {
        let s = scene(json!([
            { "type": "i-text", "text": "Big", "fontSize": 12, "scaleY": 3.0 }
        ]));
        let options = scene_to_options(&s, PrintSettings::default());
        assert_eq!(options.text_lines[0].font_size, FontSize::Five);
    }

    #[test]
    fn test_rect_non_uniform_scale() {
        let s = scene(json!([
            { "type": "rect", "left": 5, "top": 6, "width": 100, "height": 10, "scaleX": 1.5, "scaleY": 0.25 }
        ]));
        let options = scene_to_options(&s, PrintSettings::default());
        assert_eq!(
            options.lines[0],
            Bar { x: 5, y: 6, width: 150, height: 3 }
        );
    }

    #[test]
    fn test_horizontal_line_uses_stroke() {
        let s = scene(json!([
            { "type": "line", "left": 0, "top": 100, "width": 380, "height": 0, "strokeWidth": 2 }
        ]));
        let options = scene_to_options(&s, PrintSettings::default());
        assert_eq!(options.lines[0].height, 2);
        assert_eq!(options.lines[0].width, 380);
    }

    #[test]
    fn test_border_and_excluded_skipped() {
        let s = scene(json!([
            { "type": "rect", "name": "label-border", "width": 386, "height": 203 },
            { "type": "textbox", "text": "guide", "excludeFromExport": true },
            { "type": "circle", "radius": 4 },
            { "type": "image", "left": 1, "top": 1 }
        ]));
        let program = fabric_to_tspl(&s);
        assert!(!program.contains("BAR"));
        assert!(!program.contains("TEXT"));
        assert!(!program.contains("QRCODE"));
    }

    #[test]
    fn test_first_qr_wins() {
        let s = scene(json!([
            { "type": "image", "left": 10, "top": 90, "meta": { "type": "qrcode", "data": "first" } },
            { "type": "image", "left": 200, "top": 90, "meta": { "type": "qrcode", "data": "second" } }
        ]));
        let program = fabric_to_tspl(&s);
        let qr: Vec<&str> = program.lines().filter(|l| l.starts_with("QRCODE")).collect();
        assert_eq!(qr, vec!["QRCODE 10,90,M,4,A,0,\"first\""]);
    }

    #[test]
    fn test_barcode_degrades_to_text_below_image() {
        let s = scene(json!([
            { "type": "image", "left": 20, "top": 100, "height": 40, "scaleY": 1.5,
              "meta": { "type": "barcode", "data": "PKM-025" } }
        ]));
        let options = scene_to_options(&s, PrintSettings::default());
        let line = &options.text_lines[0];
        assert_eq!(line.text, "PKM-025");
        assert_eq!((line.x, line.y), (20, 162));
        assert!(options.barcodes.is_empty());
    }
}
