//! # cardlabel - Trading Card Label Toolkit
//!
//! Layout model, printer command generation and raster rendering for
//! 2" × 1" thermal labels (203 DPI) on trading-card inventory. It provides:
//!
//! - **Layout model**: five text fields and one barcode region on a dot grid
//! - **TSPL generation**: byte-exact command streams for TSC-style printers
//! - **Scene translation**: freeform editor shapes to TSPL
//! - **Raster rendering**: PNG previews and single-page PDFs
//! - **Token templates**: `{{name}}` substitution in pasted ZPL/TSPL
//! - **Dispatch**: PrintNode and local print bridge clients, batch accounting
//!
//! ## Quick Start
//!
//! ```
//! use cardlabel::{
//!     layout::{LabelData, LabelLayout},
//!     tspl::{build_tspl, layout_to_tspl, PrintSettings},
//! };
//!
//! let data = LabelData {
//!     title: "Charizard Base Set".into(),
//!     sku: "PKM-004".into(),
//!     price: "350".into(),
//!     ..Default::default()
//! };
//!
//! let options = layout_to_tspl(&LabelLayout::default(), &data, PrintSettings::default());
//! let program = build_tspl(&options);
//!
//! assert!(program.starts_with("SIZE 2,1\n"));
//! assert!(program.ends_with("PRINT 1\n"));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`geometry`] | Inches, dots and preview scaling |
//! | [`layout`] | Label layout and data model |
//! | [`tspl`] | TSPL command builders and program generation |
//! | [`scene`] | Editor scene to TSPL translation |
//! | [`render`] | Raster label, editor preview, PDF |
//! | [`template`] | Raw ZPL/TSPL token templates |
//! | [`dispatch`] | Print backends and batch printing |
//! | [`store`] | Saved layouts |
//! | [`server`] | Print bridge and label HTTP API |
//! | [`error`] | Error types |

pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod render;
pub mod scene;
pub mod server;
pub mod store;
pub mod template;
pub mod tspl;

// Re-exports for convenience
pub use error::CardLabelError;
pub use layout::{LabelData, LabelLayout};
