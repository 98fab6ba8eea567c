//! # TSPL Command-Stream Renderer
//!
//! Turns a [`TsplOptions`] instruction set into a TSPL program: one command
//! per line, in a fixed order.
//!
//! ```text
//! SIZE 2,1            ─┐
//! GAP 0,0              │
//! DENSITY 10           │ header (always)
//! SPEED 4              │
//! DIRECTION 1          │
//! REFERENCE 0,0        │
//! CLS                 ─┘
//! TEXT ...            ── text_lines, input order
//! QRCODE ...          ── at most one
//! BARCODE ...         ── barcodes, input order
//! BAR ...             ── lines, input order
//! PRINT 1             ── always exactly one
//! ```
//!
//! Later commands may overlap earlier ones; nothing here reorders or detects
//! overlap. [`TsplOptions`] can be filled by hand, from a
//! [`LabelLayout`](crate::layout::LabelLayout) via [`layout_to_tspl`], from
//! the legacy fixed layout via [`label_data_to_tspl`], or from an editor
//! scene via [`crate::scene::fabric_to_tspl`].
//!
//! ## Example
//!
//! ```
//! use cardlabel::tspl::{build_tspl, TextLine, TsplOptions};
//!
//! let options = TsplOptions::new().text(TextLine::new("Charizard").at(10, 10));
//! let program = build_tspl(&options);
//! assert!(program.starts_with("SIZE 2,1\n"));
//! assert!(program.ends_with("PRINT 1\n"));
//! ```

pub mod commands;
mod from_layout;
mod legacy;

pub use from_layout::layout_to_tspl;
pub use legacy::label_data_to_tspl;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{LABEL_HEIGHT_IN, LABEL_WIDTH_IN};
use crate::layout::CodeSize;

/// TSPL built-in font, `"1"` (smallest) through `"5"` (largest).
///
/// These are font slots, not point sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FontSize {
    #[default]
    One,
    Two,
    Three,
    Four,
    Five,
}

impl FontSize {
    pub fn as_u8(self) -> u8 {
        match self {
            FontSize::One => 1,
            FontSize::Two => 2,
            FontSize::Three => 3,
            FontSize::Four => 4,
            FontSize::Five => 5,
        }
    }

    /// Bucket a nominal text height into a font slot.
    ///
    /// | Height | Font |
    /// |--------|------|
    /// | ≤ 12 | 1 |
    /// | ≤ 18 | 2 |
    /// | ≤ 24 | 3 |
    /// | ≤ 32 | 4 |
    /// | otherwise | 5 |
    ///
    /// Boundaries map to the lower bucket. NaN lands in the top bucket.
    pub fn from_points(size: f32) -> Self {
        if size <= 12.0 {
            FontSize::One
        } else if size <= 18.0 {
            FontSize::Two
        } else if size <= 24.0 {
            FontSize::Three
        } else if size <= 32.0 {
            FontSize::Four
        } else {
            FontSize::Five
        }
    }
}

impl TryFrom<u8> for FontSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FontSize::One),
            2 => Ok(FontSize::Two),
            3 => Ok(FontSize::Three),
            4 => Ok(FontSize::Four),
            5 => Ok(FontSize::Five),
            n => Err(format!("font size must be 1-5, got {}", n)),
        }
    }
}

impl From<FontSize> for u8 {
    fn from(size: FontSize) -> u8 {
        size.as_u8()
    }
}

/// Clockwise text rotation. TSPL accepts exactly these four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Snap an arbitrary angle to the nearest quarter turn.
    ///
    /// The angle is normalized into `[0, 360)` first, then bucketed:
    /// `[315, 45) → 0`, `[45, 135) → 90`, `[135, 225) → 180`,
    /// `[225, 315) → 270`. Non-finite input maps to 0.
    pub fn from_degrees(angle: f32) -> Self {
        if !angle.is_finite() {
            return Rotation::R0;
        }
        let normalized = angle.rem_euclid(360.0);
        if !(45.0..315.0).contains(&normalized) {
            Rotation::R0
        } else if normalized < 135.0 {
            Rotation::R90
        } else if normalized < 225.0 {
            Rotation::R180
        } else {
            Rotation::R270
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::R0),
            90 => Ok(Rotation::R90),
            180 => Ok(Rotation::R180),
            270 => Ok(Rotation::R270),
            n => Err(format!("rotation must be 0, 90, 180 or 270, got {}", n)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.degrees()
    }
}

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorLevel {
    pub fn as_char(self) -> char {
        match self {
            ErrorLevel::L => 'L',
            ErrorLevel::M => 'M',
            ErrorLevel::Q => 'Q',
            ErrorLevel::H => 'H',
        }
    }
}

/// How `"` inside text and symbol data is written.
///
/// TSPL has no universal escape; TSPL2 firmware reads `\["]` as a literal
/// double quote inside a quoted argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePolicy {
    /// Replace `"` with `\["]`.
    #[default]
    Escape,
    /// Drop `"` characters.
    Strip,
}

impl QuotePolicy {
    pub fn apply(self, content: &str) -> String {
        match self {
            QuotePolicy::Escape => content.replace('"', "\\[\"]"),
            QuotePolicy::Strip => content.replace('"', ""),
        }
    }
}

fn default_text_x() -> i32 {
    10
}

fn default_text_y() -> i32 {
    20
}

fn default_qr_y() -> i32 {
    80
}

/// One `TEXT` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    pub text: String,
    #[serde(default = "default_text_x")]
    pub x: i32,
    #[serde(default = "default_text_y")]
    pub y: i32,
    #[serde(default)]
    pub font_size: FontSize,
    #[serde(default)]
    pub rotation: Rotation,
}

impl TextLine {
    /// Text at the default position (10, 20), font 1, unrotated.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: default_text_x(),
            y: default_text_y(),
            font_size: FontSize::default(),
            rotation: Rotation::default(),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn font(mut self, font_size: FontSize) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// The single `QRCODE` command of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub data: String,
    #[serde(default = "default_text_x")]
    pub x: i32,
    #[serde(default = "default_qr_y")]
    pub y: i32,
    #[serde(default)]
    pub size: CodeSize,
    #[serde(default)]
    pub error_level: ErrorLevel,
}

impl QrCode {
    /// QR at the default position (10, 80), size M, error level M.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            x: default_text_x(),
            y: default_qr_y(),
            size: CodeSize::default(),
            error_level: ErrorLevel::default(),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn size(mut self, size: CodeSize) -> Self {
        self.size = size;
        self
    }
}

/// One Code 128 `BARCODE` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    pub data: String,
    pub x: i32,
    pub y: i32,
    pub height: i32,
    #[serde(default)]
    pub size: CodeSize,
}

/// One filled `BAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Job-level print parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintSettings {
    /// Gap between labels in inches.
    pub gap_inches: f32,
    /// Darkness, 0–15.
    pub density: u8,
    /// Inches per second, 2–8.
    pub speed: u8,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            gap_inches: 0.0,
            density: 10,
            speed: 4,
        }
    }
}

/// Everything one TSPL job draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TsplOptions {
    pub text_lines: Vec<TextLine>,
    pub qrcode: Option<QrCode>,
    pub barcodes: Vec<Barcode>,
    pub lines: Vec<Bar>,
    #[serde(flatten)]
    pub settings: PrintSettings,
    pub quote_policy: QuotePolicy,
}

impl TsplOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PrintSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn text(mut self, line: TextLine) -> Self {
        self.text_lines.push(line);
        self
    }

    /// Set the job's QR code. A second call replaces the first: a 2×1
    /// label carries one scannable code.
    pub fn qrcode(mut self, qr: QrCode) -> Self {
        self.qrcode = Some(qr);
        self
    }

    pub fn barcode(mut self, barcode: Barcode) -> Self {
        self.barcodes.push(barcode);
        self
    }

    pub fn bar(mut self, bar: Bar) -> Self {
        self.lines.push(bar);
        self
    }

    /// Lower into the ordered command list.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = Vec::with_capacity(
            8 + self.text_lines.len() + self.barcodes.len() + self.lines.len() + 1,
        );

        out.push(Command::Size {
            width_in: LABEL_WIDTH_IN,
            height_in: LABEL_HEIGHT_IN,
        });
        out.push(Command::Gap(self.settings.gap_inches));
        out.push(Command::Density(self.settings.density));
        out.push(Command::Speed(self.settings.speed));
        out.push(Command::Direction);
        out.push(Command::Reference);
        out.push(Command::Cls);

        for line in &self.text_lines {
            out.push(Command::Text {
                x: line.x,
                y: line.y,
                font: line.font_size,
                rotation: line.rotation,
                content: self.quote_policy.apply(&line.text),
            });
        }

        if let Some(qr) = &self.qrcode {
            out.push(Command::QrCode {
                x: qr.x,
                y: qr.y,
                level: qr.error_level,
                cell_width: qr.size.qr_cell_width(),
                data: self.quote_policy.apply(&qr.data),
            });
        }

        for barcode in &self.barcodes {
            out.push(Command::Barcode128 {
                x: barcode.x,
                y: barcode.y,
                height: barcode.height,
                narrow: barcode.size.narrow_bar(),
                data: self.quote_policy.apply(&barcode.data),
            });
        }

        for bar in &self.lines {
            out.push(Command::Bar(*bar));
        }

        out.push(Command::Print);
        out
    }
}

/// One TSPL command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Size { width_in: f32, height_in: f32 },
    Gap(f32),
    Density(u8),
    Speed(u8),
    Direction,
    Reference,
    Cls,
    Text {
        x: i32,
        y: i32,
        font: FontSize,
        rotation: Rotation,
        content: String,
    },
    QrCode {
        x: i32,
        y: i32,
        level: ErrorLevel,
        cell_width: u8,
        data: String,
    },
    Barcode128 {
        x: i32,
        y: i32,
        height: i32,
        narrow: u8,
        data: String,
    },
    Bar(Bar),
    Print,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = match self {
            Command::Size {
                width_in,
                height_in,
            } => commands::size(*width_in, *height_in),
            Command::Gap(gap) => commands::gap(*gap),
            Command::Density(level) => commands::density(*level),
            Command::Speed(ips) => commands::speed(*ips),
            Command::Direction => commands::direction(),
            Command::Reference => commands::reference(),
            Command::Cls => commands::cls(),
            Command::Text {
                x,
                y,
                font,
                rotation,
                content,
            } => commands::text(*x, *y, *font, *rotation, content),
            Command::QrCode {
                x,
                y,
                level,
                cell_width,
                data,
            } => commands::qrcode(*x, *y, *level, *cell_width, data),
            Command::Barcode128 {
                x,
                y,
                height,
                narrow,
                data,
            } => commands::barcode128(*x, *y, *height, *narrow, data),
            Command::Bar(bar) => commands::bar(bar.x, bar.y, bar.width, bar.height),
            Command::Print => commands::print(),
        };
        f.write_str(&line)
    }
}

/// Render the options as a TSPL program, one command per `\n`-terminated line.
pub fn build_tspl(options: &TsplOptions) -> String {
    let mut program = String::new();
    for command in options.commands() {
        program.push_str(&command.to_string());
        program.push('\n');
    }
    program
}
