//! The intake sweep — the folder-watcher glue around the export policy.
//!
//! One run is one sweep of the drop folder (an external trigger — Hazel,
//! cron, a launchd watch — decides *when* to run; there is no daemon here):
//!
//! ```text
//! input/IMG_0001.avif  →  output/260827-142501_1.jpg   (box-fit, compressed)
//!                      →  input/raw/260827-142501_1.avif (original, filed away)
//! ```
//!
//! Files are processed strictly one at a time, sorted by name. A file that
//! fails to decode or write is recorded in the report and the sweep moves on
//! to the next file — its original stays in the drop folder untouched. Only
//! setup failures (missing input directory, cannot create output
//! directories) abort the run.

use crate::config::IntakeConfig;
use crate::export::{ExportParams, ImageBackend, OutputFormat, Quality, ResizeMode};
use crate::naming;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input directory does not exist: {0}")]
    MissingInput(PathBuf),
}

/// What happened to one file during a sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Exported {
        output: PathBuf,
        raw: PathBuf,
        width: u32,
        height: u32,
        bytes: u64,
    },
    Failed {
        reason: String,
    },
}

/// One swept file and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeEntry {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Result of one sweep, serializable for the `--json` report.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReport {
    /// Run timestamp shared by every file processed in this sweep.
    pub stamp: String,
    pub entries: Vec<IntakeEntry>,
}

impl IntakeReport {
    pub fn exported(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Exported { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.exported()
    }
}

/// Sweep the drop folder once.
pub fn run(backend: &impl ImageBackend, config: &IntakeConfig) -> Result<IntakeReport, IntakeError> {
    if !config.input_dir.is_dir() {
        return Err(IntakeError::MissingInput(config.input_dir.clone()));
    }

    let raw_dir = config.raw_dir();
    std::fs::create_dir_all(&config.output_dir)?;
    std::fs::create_dir_all(&raw_dir)?;

    let stamp = naming::run_stamp(chrono::Local::now());
    let candidates = collect_candidates(&config.input_dir, &config.extensions);

    let mut entries = Vec::with_capacity(candidates.len());
    for (index, source) in candidates.iter().enumerate() {
        let outcome = process_one(backend, config, &raw_dir, &stamp, index + 1, source);
        entries.push(IntakeEntry {
            source: source.clone(),
            outcome,
        });
    }

    Ok(IntakeReport { stamp, entries })
}

/// Direct children of the drop folder with a matching extension, sorted by
/// name for a deterministic processing order. The raw subdirectory (and any
/// other directory) is never descended into.
fn collect_candidates(input_dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|w| w.eq_ignore_ascii_case(ext)))
        })
        .collect();
    files.sort();
    files
}

/// Export one file and file the original away. Any failure is folded into
/// the outcome; the original is only moved after a successful export.
fn process_one(
    backend: &impl ImageBackend,
    config: &IntakeConfig,
    raw_dir: &Path,
    stamp: &str,
    index: usize,
    source: &Path,
) -> Outcome {
    let output = config
        .output_dir
        .join(naming::intake_file_name(stamp, index, "jpg"));

    let result = backend.export(&ExportParams {
        source: source.to_path_buf(),
        output: output.clone(),
        mode: ResizeMode::Box {
            width: config.max_width,
            height: config.max_height,
        },
        format: OutputFormat::Jpeg,
        quality: Quality::new(config.quality),
        keep_metadata: config.keep_metadata,
    });
    if let Err(e) = result {
        return Outcome::Failed {
            reason: e.to_string(),
        };
    }

    let source_ext = source.extension().and_then(|e| e.to_str()).unwrap_or("bin");
    let raw = raw_dir.join(naming::intake_file_name(stamp, index, source_ext));
    if let Err(e) = move_file(source, &raw) {
        return Outcome::Failed {
            reason: format!("exported, but could not file original away: {e}"),
        };
    }

    let (width, height) = backend
        .identify(&output)
        .map(|d| (d.width, d.height))
        .unwrap_or((0, 0));
    let bytes = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);

    Outcome::Exported {
        output,
        raw,
        width,
        height,
        bytes,
    }
}

/// Rename, falling back to copy + remove for cross-device moves.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
