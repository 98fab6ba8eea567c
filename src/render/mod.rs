//! # Raster Renderer
//!
//! Pixel output for labels: the print-ready bitmap/PDF and the on-screen
//! previews.
//!
//! ## Architecture
//!
//! ```text
//! FieldConfig + LabelData ──► render_label_to_canvas ──► LabelSurface ──► PNG
//!                                                            │
//!                                                            └──► generate_label_pdf (2" × 1" page)
//!
//! LabelLayout + LabelData ──► render_layout_preview ──► LabelSurface (editor)
//! ```
//!
//! Two independent paths with different visibility rules: the print-ready
//! label omits hidden fields, the editor preview dims them.
//!
//! ## QR codes
//!
//! By default the QR region is a **placeholder pattern that cannot be
//! scanned**. Set [`FieldConfig::qr`] to [`QrRendering::Encoded`] for a real
//! symbol.
//!
//! ## Example
//!
//! ```
//! use cardlabel::geometry::PreviewScale;
//! use cardlabel::layout::LabelData;
//! use cardlabel::render::{FieldConfig, LabelSurface, render_label_to_canvas};
//!
//! let mut surface = LabelSurface::new(PreviewScale::DOTS);
//! let data = LabelData { title: "Gengar".into(), sku: "PKM-094".into(), ..Default::default() };
//! render_label_to_canvas(&mut surface, &FieldConfig::default(), &data, true).unwrap();
//! let png = surface.to_png().unwrap();
//! assert!(!png.is_empty());
//! ```

pub mod barcode;
pub mod editor;
pub mod fit;
pub mod font;
pub mod label;
pub mod pdf;
pub mod surface;

pub use barcode::QrRendering;
pub use editor::render_layout_preview;
pub use fit::{shrink_to_fit, wrap_words};
pub use label::{FieldConfig, FieldToggle, render_label_to_canvas};
pub use pdf::{generate_label_pdf, generate_label_pdf_async};
pub use surface::LabelSurface;
