//! Parameter types for the export policy.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which resolves formats and output paths) and the
//! [`backend`](super::backend) (which does the actual pixel work). The
//! separation allows swapping backends (e.g. for testing with a mock)
//! without changing policy logic.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
///
/// The field is private: construction goes through [`Quality::new`] so the
/// range invariant holds everywhere a `Quality` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Crop anchor for exact-dimension exports.
///
/// The horizontal anchor is always centered; the focus selects the vertical
/// anchor: which band of the source survives when the target box is shorter
/// (relatively) than the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Center,
    Top,
    Bottom,
    /// Vertical anchor as a fraction: `0.0` = top edge, `1.0` = bottom edge.
    Percentage(f32),
}

impl Focus {
    /// Build a percentage focus, clamping into `[0, 1]`.
    pub fn percentage(p: f32) -> Self {
        Self::Percentage(p.clamp(0.0, 1.0))
    }

    /// Vertical anchor in `[0, 1]`.
    pub fn anchor_y(self) -> f32 {
        match self {
            Focus::Center => 0.5,
            Focus::Top => 0.0,
            Focus::Bottom => 1.0,
            // Clamp again: the tuple variant is public and may carry raw values
            Focus::Percentage(p) => p.clamp(0.0, 1.0),
        }
    }
}

impl Default for Focus {
    fn default() -> Self {
        Self::Center
    }
}

impl FromStr for Focus {
    type Err = String;

    /// Parse `center`, `top`, `bottom`, or a percentage like `45%`.
    ///
    /// Unrecognized input is an error, not a silent fallback to center.
    /// Out-of-range percentages still clamp into `[0, 1]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Ok(Focus::Center),
            "top" => Ok(Focus::Top),
            "bottom" => Ok(Focus::Bottom),
            other => match other.strip_suffix('%') {
                Some(num) => num
                    .parse::<f32>()
                    .map(|p| Focus::percentage(p / 100.0))
                    .map_err(|_| format!("invalid focus percentage '{s}'")),
                None => Err(format!(
                    "invalid focus '{s}' (expected center, top, bottom, or a percentage like 45%)"
                )),
            },
        }
    }
}

/// The resize strategy applied before writing — exactly one per export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    /// Crop-and-scale to exactly `width x height`, anchored at `focus`.
    /// Aspect ratio is not preserved; excess content is cropped.
    Exact { width: u32, height: u32, focus: Focus },
    /// Scale preserving aspect ratio so neither dimension exceeds its bound.
    /// With both bounds: fit inside the box, never upscaling past the source.
    /// With one bound: scale the other dimension proportionally.
    MaxBound {
        max_width: Option<u32>,
        max_height: Option<u32>,
    },
    /// Fit entirely inside `width x height`, aspect preserved, no crop.
    Box { width: u32, height: u32 },
    /// No resize; re-encode only.
    Passthrough,
}

impl ResizeMode {
    /// Mode name as used in derived filenames and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            ResizeMode::Exact { .. } => "exact",
            ResizeMode::MaxBound { .. } => "max",
            ResizeMode::Box { .. } => "box",
            ResizeMode::Passthrough => "default",
        }
    }

    /// Filename suffix: `{width}x{height}` when the target box is fully
    /// known, else the mode name.
    pub fn suffix(&self) -> String {
        match self {
            ResizeMode::Exact { width, height, .. } | ResizeMode::Box { width, height } => {
                format!("{width}x{height}")
            }
            ResizeMode::MaxBound {
                max_width: Some(w),
                max_height: Some(h),
            } => format!("{w}x{h}"),
            ResizeMode::MaxBound { .. } => "max".to_string(),
            ResizeMode::Passthrough => "default".to_string(),
        }
    }

    /// Check mode parameters that the type system cannot rule out.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ResizeMode::Exact { width: 0, .. }
            | ResizeMode::Exact { height: 0, .. }
            | ResizeMode::Box { width: 0, .. }
            | ResizeMode::Box { height: 0, .. } => {
                Err("target dimensions must be non-zero".to_string())
            }
            ResizeMode::MaxBound {
                max_width: None,
                max_height: None,
            } => Err("max mode requires at least one of max width / max height".to_string()),
            ResizeMode::MaxBound {
                max_width: Some(0), ..
            }
            | ResizeMode::MaxBound {
                max_height: Some(0),
                ..
            } => Err("max bounds must be non-zero".to_string()),
            _ => Ok(()),
        }
    }
}

/// Normalized output format. Anything else is rejected up front with a clear
/// error instead of attempting an unchecked write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Normalize a file extension, case-insensitively.
    /// `jpg`/`jpeg` → JPEG, `png` → PNG.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    /// Lower-cased output extension (`jpg` for JPEG).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => write!(f, "JPEG"),
            OutputFormat::Png => write!(f, "PNG"),
        }
    }
}

/// Per-export settings around the resize mode itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSettings {
    /// Explicit output format; when unset, inferred from the input extension.
    pub format: Option<OutputFormat>,
    /// Lossy encoding quality (JPEG only; PNG is lossless).
    pub quality: Quality,
    /// Explicit output path, used verbatim (silent overwrite). When unset,
    /// the path is derived next to the source.
    pub output: Option<PathBuf>,
    /// Carry the source's EXIF segment into the output (JPEG → JPEG only).
    /// Default false: intake exists to strip metadata.
    pub keep_metadata: bool,
}

/// Fully resolved specification for one export, handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub mode: ResizeMode,
    pub format: OutputFormat,
    pub quality: Quality,
    pub keep_metadata: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(85).value(), 85);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn focus_parses_named_anchors() {
        assert_eq!("center".parse::<Focus>().unwrap(), Focus::Center);
        assert_eq!("Top".parse::<Focus>().unwrap(), Focus::Top);
        assert_eq!(" bottom ".parse::<Focus>().unwrap(), Focus::Bottom);
    }

    #[test]
    fn focus_parses_percentages() {
        assert_eq!("45%".parse::<Focus>().unwrap(), Focus::Percentage(0.45));
        assert_eq!("0%".parse::<Focus>().unwrap(), Focus::Percentage(0.0));
    }

    #[test]
    fn focus_clamps_out_of_range_percentages() {
        assert_eq!("150%".parse::<Focus>().unwrap(), Focus::Percentage(1.0));
        assert_eq!("-10%".parse::<Focus>().unwrap(), Focus::Percentage(0.0));
    }

    #[test]
    fn focus_rejects_garbage() {
        assert!("middle".parse::<Focus>().is_err());
        assert!("abc%".parse::<Focus>().is_err());
    }

    #[test]
    fn focus_anchor_values() {
        assert_eq!(Focus::Top.anchor_y(), 0.0);
        assert_eq!(Focus::Center.anchor_y(), 0.5);
        assert_eq!(Focus::Bottom.anchor_y(), 1.0);
        assert_eq!(Focus::Percentage(0.45).anchor_y(), 0.45);
        assert_eq!(Focus::Percentage(7.0).anchor_y(), 1.0);
    }

    #[test]
    fn mode_suffix_uses_dimensions_when_known() {
        let exact = ResizeMode::Exact {
            width: 1584,
            height: 396,
            focus: Focus::Center,
        };
        assert_eq!(exact.suffix(), "1584x396");

        let boxed = ResizeMode::Box {
            width: 1600,
            height: 2133,
        };
        assert_eq!(boxed.suffix(), "1600x2133");

        let both = ResizeMode::MaxBound {
            max_width: Some(800),
            max_height: Some(600),
        };
        assert_eq!(both.suffix(), "800x600");
    }

    #[test]
    fn mode_suffix_falls_back_to_mode_name() {
        let one_bound = ResizeMode::MaxBound {
            max_width: Some(800),
            max_height: None,
        };
        assert_eq!(one_bound.suffix(), "max");
        assert_eq!(ResizeMode::Passthrough.suffix(), "default");
    }

    #[test]
    fn mode_validate_rejects_empty_max_bound() {
        let mode = ResizeMode::MaxBound {
            max_width: None,
            max_height: None,
        };
        assert!(mode.validate().is_err());
    }

    #[test]
    fn mode_validate_rejects_zero_dimensions() {
        let mode = ResizeMode::Exact {
            width: 0,
            height: 396,
            focus: Focus::Center,
        };
        assert!(mode.validate().is_err());

        let mode = ResizeMode::MaxBound {
            max_width: Some(0),
            max_height: Some(600),
        };
        assert!(mode.validate().is_err());
    }

    #[test]
    fn mode_validate_accepts_single_bound() {
        let mode = ResizeMode::MaxBound {
            max_width: Some(800),
            max_height: None,
        };
        assert!(mode.validate().is_ok());
    }

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(OutputFormat::from_extension("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("PNG"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("webp"), None);
    }

    #[test]
    fn format_extension_lowercases_jpeg_to_jpg() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
    }
}
