//! Pure filename and format derivation.
//!
//! Nothing here touches the filesystem. The export policy and the intake
//! sweep both derive names through these functions so the conventions stay
//! in one place:
//!
//! - Export outputs: `{stem}_{suffix}.{ext}` next to the source, where
//!   `suffix` is the target resolution (`1584x396`) when fully known, else
//!   the mode name (`max`, `default`).
//! - Intake filing: `{yymmdd-HHMMSS}_{n}.{ext}` — one run timestamp shared
//!   by every file in the sweep, with a 1-based counter.

use crate::export::{ExportError, OutputFormat};
use std::path::{Path, PathBuf};

/// Resolve the output format: an explicit override wins, otherwise it is
/// inferred from the input path's extension, case-insensitively.
///
/// Extensions outside the closed format set are rejected with a clear error
/// instead of being passed through to an unchecked write.
pub fn resolve_format(
    source: &Path,
    explicit: Option<OutputFormat>,
) -> Result<OutputFormat, ExportError> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    OutputFormat::from_extension(&ext).ok_or_else(|| {
        ExportError::UnsupportedFormat(format!(
            "cannot infer an output format from '.{ext}'; pass jpg or png explicitly"
        ))
    })
}

/// Derive an output path next to the source: `{stem}_{suffix}.{ext}`.
pub fn derive_output_path(source: &Path, suffix: &str, format: OutputFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    source.with_file_name(format!("{stem}_{suffix}.{}", format.extension()))
}

/// Filing name for one intake file: `{stamp}_{index}.{ext}`.
///
/// The extension is lower-cased so `IMG_0001.AVIF` files away as `..._1.avif`.
pub fn intake_file_name(stamp: &str, index: usize, ext: &str) -> String {
    format!("{stamp}_{index}.{}", ext.to_lowercase())
}

/// Run timestamp in the `%y%m%d-%H%M%S` form the original automation used,
/// e.g. `260827-142501`.
pub fn run_stamp(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("%y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn explicit_format_wins_over_extension() {
        let format = resolve_format(Path::new("photo.png"), Some(OutputFormat::Jpeg)).unwrap();
        assert_eq!(format, OutputFormat::Jpeg);
    }

    #[test]
    fn format_inferred_case_insensitively() {
        assert_eq!(
            resolve_format(Path::new("photo.JPG"), None).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            resolve_format(Path::new("photo.jpeg"), None).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            resolve_format(Path::new("photo.PNG"), None).unwrap(),
            OutputFormat::Png
        );
    }

    #[test]
    fn unknown_extension_without_override_is_rejected() {
        let result = resolve_format(Path::new("phone.avif"), None);
        assert!(matches!(result, Err(ExportError::UnsupportedFormat(_))));

        let result = resolve_format(Path::new("noext"), None);
        assert!(matches!(result, Err(ExportError::UnsupportedFormat(_))));
    }

    #[test]
    fn derived_path_sits_next_to_source() {
        let path = derive_output_path(
            Path::new("/photos/drug-launch.png"),
            "1584x396",
            OutputFormat::Jpeg,
        );
        assert_eq!(path, Path::new("/photos/drug-launch_1584x396.jpg"));
    }

    #[test]
    fn derived_path_for_bare_filename() {
        let path = derive_output_path(Path::new("photo.jpg"), "default", OutputFormat::Jpeg);
        assert_eq!(path, Path::new("photo_default.jpg"));
    }

    #[test]
    fn derived_path_uses_normalized_extension() {
        let path = derive_output_path(Path::new("photo.JPEG"), "max", OutputFormat::Jpeg);
        assert_eq!(path, Path::new("photo_max.jpg"));
    }

    #[test]
    fn intake_name_lowercases_extension() {
        assert_eq!(intake_file_name("260827-142501", 3, "AVIF"), "260827-142501_3.avif");
        assert_eq!(intake_file_name("260827-142501", 1, "jpg"), "260827-142501_1.jpg");
    }

    #[test]
    fn run_stamp_format() {
        let now = chrono::Local.with_ymd_and_hms(2026, 8, 27, 14, 25, 1).unwrap();
        assert_eq!(run_stamp(now), "260827-142501");
    }
}
