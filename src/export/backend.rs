//! Export backend trait and the typed error surface.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and export. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked. The trait exists so the policy layer ([`operations`](super::operations))
//! and the intake sweep can be tested against a mock without encoding pixels.

use super::params::ExportParams;
use std::path::Path;
use thiserror::Error;

/// Failures reported synchronously to the caller. Nothing is retried here;
/// batch callers decide whether to continue with the next file.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Unreadable, corrupt, or unsupported source image.
    #[error("failed to decode image: {0}")]
    Decode(String),
    /// A parameter the type system could not rule out (empty max bounds,
    /// zero dimensions, malformed focus).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Output format that this policy refuses to write.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    /// Destination unwritable, disk full, or encoding failure. The output
    /// path is guaranteed not to hold a partial file.
    #[error("failed to write image: {0}")]
    Write(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for export backends.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, ExportError>;

    /// Execute one export: decode, apply the resize mode, normalize color,
    /// encode, and write atomically.
    fn export(&self, params: &ExportParams) -> Result<(), ExportError>;
}
