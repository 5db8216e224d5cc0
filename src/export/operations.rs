//! High-level export operations.
//!
//! These functions are the export policy's public face: they validate the
//! mode, resolve the output format and path (pure planning, no I/O), and
//! hand a fully resolved [`ExportParams`] to the backend. One resize
//! transform per export, always followed by format/color normalization and
//! an atomic write — that sequencing lives in the backend; the planning
//! lives here.

use super::backend::{ExportError, ImageBackend};
use super::params::{ExportParams, ExportSettings, Focus, ResizeMode};
use crate::naming;
use std::path::{Path, PathBuf};

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Resolved format and destination for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub format: super::params::OutputFormat,
    pub output: PathBuf,
}

/// Plan an export without executing it: validate the mode, resolve the
/// output format (explicit override, else input extension), and derive the
/// output path when none was supplied. Pure — no filesystem access.
pub fn plan_export(
    source: &Path,
    mode: &ResizeMode,
    settings: &ExportSettings,
) -> Result<ExportPlan> {
    mode.validate().map_err(ExportError::InvalidParameter)?;

    let format = naming::resolve_format(source, settings.format)?;
    let output = match &settings.output {
        Some(path) => path.clone(),
        None => naming::derive_output_path(source, &mode.suffix(), format),
    };

    Ok(ExportPlan { format, output })
}

/// Run one export end to end and return the written path.
pub fn export_image(
    backend: &impl ImageBackend,
    source: &Path,
    mode: ResizeMode,
    settings: &ExportSettings,
) -> Result<PathBuf> {
    let plan = plan_export(source, &mode, settings)?;

    backend.export(&ExportParams {
        source: source.to_path_buf(),
        output: plan.output.clone(),
        mode,
        format: plan.format,
        quality: settings.quality,
        keep_metadata: settings.keep_metadata,
    })?;

    Ok(plan.output)
}

/// Crop-and-scale to exactly `width x height`, anchored at `focus`.
pub fn export_exact(
    backend: &impl ImageBackend,
    source: &Path,
    width: u32,
    height: u32,
    focus: Focus,
    settings: &ExportSettings,
) -> Result<PathBuf> {
    export_image(
        backend,
        source,
        ResizeMode::Exact {
            width,
            height,
            focus,
        },
        settings,
    )
}

/// Scale preserving aspect ratio so no dimension exceeds its bound.
/// At least one bound is required.
pub fn export_max_bound(
    backend: &impl ImageBackend,
    source: &Path,
    max_width: Option<u32>,
    max_height: Option<u32>,
    settings: &ExportSettings,
) -> Result<PathBuf> {
    export_image(
        backend,
        source,
        ResizeMode::MaxBound {
            max_width,
            max_height,
        },
        settings,
    )
}

/// Fit entirely inside `width x height`, aspect preserved, no crop.
pub fn export_box(
    backend: &impl ImageBackend,
    source: &Path,
    width: u32,
    height: u32,
    settings: &ExportSettings,
) -> Result<PathBuf> {
    export_image(backend, source, ResizeMode::Box { width, height }, settings)
}

/// Passthrough: no resize, re-encode only.
pub fn export_default(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &ExportSettings,
) -> Result<PathBuf> {
    export_image(backend, source, ResizeMode::Passthrough, settings)
}
