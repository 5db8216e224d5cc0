//! Intake configuration module.
//!
//! Handles loading and validating `photochute.toml`. Configuration is
//! sparse: every field has a default, user files only override what they
//! want, and unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = ""            # Drop folder the phone exports into (required)
//! output_dir = ""           # Where processed JPEGs land (required)
//! raw_subdir = "raw"        # Originals are filed under {input_dir}/{raw_subdir}
//!
//! max_width = 1600          # Box-fit canvas for processed images
//! max_height = 2133
//! quality = 85              # JPEG quality (1-100)
//! keep_metadata = false     # Carry EXIF into processed images
//!
//! # Extensions picked up by a sweep (defaults to every decodable format)
//! extensions = ["jpg", "jpeg", "png", "tif", "tiff", "webp", "avif"]
//! ```
//!
//! ## Environment overrides
//!
//! `INPUT_FOLDER` and `OUTPUT_FOLDER` override the directories when set —
//! the same contract the original dotenv-driven automation used, so an
//! existing Hazel/cron hook keeps working without a config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::supported_input_extensions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config file not found: {0}")]
    Missing(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Intake configuration loaded from `photochute.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Drop folder the phone exports into.
    pub input_dir: PathBuf,
    /// Where processed JPEGs land.
    pub output_dir: PathBuf,
    /// Subdirectory of `input_dir` where originals are filed away.
    pub raw_subdir: String,
    /// Box-fit canvas width for processed images.
    pub max_width: u32,
    /// Box-fit canvas height for processed images.
    pub max_height: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
    /// Carry the EXIF segment into processed images instead of stripping.
    pub keep_metadata: bool,
    /// File extensions a sweep picks up, matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            raw_subdir: "raw".to_string(),
            // The original watcher's canvas: portrait-ish 3:4 at 1600 wide
            max_width: 1600,
            max_height: 2133,
            quality: 85,
            keep_metadata: false,
            extensions: supported_input_extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl IntakeConfig {
    /// Load config from a TOML file, then apply environment overrides.
    ///
    /// The file must exist — a typo'd `--config` path should fail loudly,
    /// not fall back to defaults. For the optional default-location lookup
    /// use [`load_or_default`](Self::load_or_default).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let mut config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the default config location, falling back to defaults plus
    /// environment overrides when no file is present.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// `INPUT_FOLDER` / `OUTPUT_FOLDER` beat the file, matching the original
    /// automation's dotenv contract.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("INPUT_FOLDER") {
            if !dir.is_empty() {
                self.input_dir = PathBuf::from(dir);
            }
        }
        if let Ok(dir) = std::env::var("OUTPUT_FOLDER") {
            if !dir.is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
    }

    /// Validate values are usable before a sweep starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "input_dir must be set (config file or INPUT_FOLDER)".into(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must be set (config file or OUTPUT_FOLDER)".into(),
            ));
        }
        if self.input_dir == self.output_dir {
            return Err(ConfigError::Validation(
                "input_dir and output_dir must differ".into(),
            ));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::Validation(
                "max_width and max_height must be non-zero".into(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Directory originals are filed into.
    pub fn raw_dir(&self) -> PathBuf {
        self.input_dir.join(&self.raw_subdir)
    }
}

/// A stock `photochute.toml` with every option documented.
pub fn stock_config_toml() -> String {
    let exts = supported_input_extensions()
        .iter()
        .map(|e| format!("\"{e}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"# photochute configuration
# All options are optional except the two directories.

# Drop folder the phone exports into. INPUT_FOLDER overrides.
input_dir = ""

# Where processed JPEGs land. OUTPUT_FOLDER overrides.
output_dir = ""

# Originals are filed under {{input_dir}}/{{raw_subdir}} with timestamped names.
raw_subdir = "raw"

# Box-fit canvas for processed images (aspect ratio is preserved,
# images already inside the box are not upscaled).
max_width = 1600
max_height = 2133

# JPEG quality (1-100).
quality = 85

# Keep EXIF metadata in processed images. Off by default: the point of
# intake is publishing images without camera/location data.
keep_metadata = false

# Extensions a sweep picks up, matched case-insensitively.
extensions = [{exts}]
"#
    )
}
