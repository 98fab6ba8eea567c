//! # TSPL Command Builders
//!
//! Line builders for the TSPL/TSPL2 language spoken by TSC-style thermal
//! label printers. Each function returns exactly one command line without
//! its terminator; [`super::build_tspl`] joins them with `\n`.
//!
//! ## Command Structure
//!
//! ```text
//! KEYWORD arg1,arg2,"quoted string",...
//! ```
//!
//! - Numeric arguments are plain decimal
//! - Font names and string content are double-quoted
//! - Coordinates are dots from the reference origin (top-left)
//!
//! ## Reference
//!
//! Based on "TSPL/TSPL2 Programming Language" by TSC Auto ID Technology.

use super::{ErrorLevel, FontSize, Rotation};

/// Format a decimal without a trailing `.0` for whole numbers.
fn num(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.3}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// # Label Size (SIZE)
///
/// Declares the label width and height in inches. Must be the first line of
/// every job; printers otherwise keep whatever size they used last.
///
/// | Format  | Example |
/// |---------|---------|
/// | ASCII   | `SIZE 2,1` |
///
/// ```
/// use cardlabel::tspl::commands;
///
/// assert_eq!(commands::size(2.0, 1.0), "SIZE 2,1");
/// ```
pub fn size(width_in: f32, height_in: f32) -> String {
    format!("SIZE {},{}", num(width_in), num(height_in))
}

/// # Gap Between Labels (GAP)
///
/// Vertical gap and offset in inches. `0` selects continuous media.
///
/// | Format  | Example |
/// |---------|---------|
/// | ASCII   | `GAP 0.12,0` |
pub fn gap(gap_in: f32) -> String {
    format!("GAP {},0", num(gap_in))
}

/// # Print Darkness (DENSITY)
///
/// Valid range 0–15. Out-of-range values are clamped.
pub fn density(level: u8) -> String {
    format!("DENSITY {}", level.min(15))
}

/// # Print Speed (SPEED)
///
/// Inches per second, valid range 2–8. Out-of-range values are clamped.
pub fn speed(ips: u8) -> String {
    format!("SPEED {}", ips.clamp(2, 8))
}

/// # Print Direction (DIRECTION)
///
/// `1` prints with the label's top edge leaving the printer first.
pub fn direction() -> String {
    "DIRECTION 1".to_string()
}

/// # Reference Point (REFERENCE)
///
/// Moves the coordinate origin. The label always uses `0,0`.
pub fn reference() -> String {
    "REFERENCE 0,0".to_string()
}

/// # Clear Image Buffer (CLS)
///
/// Must precede any drawing command in the job.
pub fn cls() -> String {
    "CLS".to_string()
}

/// # Text (TEXT)
///
/// | Format  | `TEXT x,y,"font",rotation,x-mul,y-mul,"content"` |
/// |---------|---------|
/// | Example | `TEXT 10,20,"2",0,1,1,"Charizard"` |
///
/// `content` is inserted as given. Quote handling happens before this call
/// (see [`super::QuotePolicy`]).
pub fn text(x: i32, y: i32, font: FontSize, rotation: Rotation, content: &str) -> String {
    format!(
        "TEXT {},{},\"{}\",{},1,1,\"{}\"",
        x,
        y,
        font.as_u8(),
        rotation.degrees(),
        content
    )
}

/// # QR Code (QRCODE)
///
/// | Format  | `QRCODE x,y,ECC,cell,mode,rotation,"data"` |
/// |---------|---------|
/// | Example | `QRCODE 10,80,M,4,A,0,"PKM-001"` |
///
/// Mode `A` lets the printer pick the encoding automatically.
pub fn qrcode(x: i32, y: i32, level: ErrorLevel, cell_width: u8, data: &str) -> String {
    format!(
        "QRCODE {},{},{},{},A,0,\"{}\"",
        x,
        y,
        level.as_char(),
        cell_width.clamp(1, 10),
        data
    )
}

/// # Linear Barcode (BARCODE)
///
/// | Format  | `BARCODE x,y,"type",height,hri,rotation,narrow,wide,"data"` |
/// |---------|---------|
/// | Example | `BARCODE 10,100,"128",50,1,0,2,2,"PKM-001"` |
///
/// Always Code 128 with human-readable text below the bars.
pub fn barcode128(x: i32, y: i32, height: i32, narrow: u8, data: &str) -> String {
    let narrow = narrow.clamp(1, 10);
    format!(
        "BARCODE {},{},\"128\",{},1,0,{},{},\"{}\"",
        x,
        y,
        height.max(1),
        narrow,
        narrow,
        data
    )
}

/// # Solid Bar (BAR)
///
/// Filled rectangle; used for rules and box outlines.
///
/// | Format  | `BAR x,y,width,height` |
/// |---------|---------|
/// | Example | `BAR 0,100,406,2` |
pub fn bar(x: i32, y: i32, width: i32, height: i32) -> String {
    format!("BAR {},{},{},{}", x, y, width.max(0), height.max(0))
}

/// # Print (PRINT)
///
/// Prints the buffer once. Copy count is controlled by the caller
/// re-submitting the job, never by this command.
pub fn print() -> String {
    "PRINT 1".to_string()
}
