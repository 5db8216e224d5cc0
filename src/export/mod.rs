//! The export policy — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` / AVIF container metadata |
//! | **Resize** | Lanczos3, one mode per export (exact / max / box / none) |
//! | **Decode AVIF** | `avif-parse` + `rav1d` + custom YUV→RGB |
//! | **EXIF carry-over** | raw APP1 splice (JPEG only) |
//! | **Write** | encode to memory, temp file + rename |
//!
//! The module is split into:
//! - **Calculations**: pure functions for dimension math (unit testable)
//! - **Parameters**: data structures describing one export
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: high-level functions combining planning + backend

pub mod backend;
mod calculations;
mod avif;
mod exif;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, ExportError, ImageBackend};
pub use operations::{
    ExportPlan, export_box, export_default, export_exact, export_image, export_max_bound,
    plan_export,
};
pub use params::{ExportParams, ExportSettings, Focus, OutputFormat, Quality, ResizeMode};
pub use rust_backend::{RustBackend, supported_input_extensions};
