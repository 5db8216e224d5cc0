//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! The intake report follows a two-level pattern: a header line per file
//! (positional index + filename) with indented context lines underneath:
//!
//! ```text
//! 001 IMG_0001.avif
//!     Saved: 260827-142501_1.jpg (1600x1200, 412.3 KB)
//!     Original: raw/260827-142501_1.avif
//! 002 IMG_0002.avif
//!     Failed: failed to decode image: ...
//! Processed 1 of 2 files
//! ```

use crate::intake::{IntakeReport, Outcome};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable size: KB below one MB, MB above.
fn human_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb >= 1024.0 {
        format!("{:.2} MB", kb / 1024.0)
    } else {
        format!("{:.1} KB", kb)
    }
}

/// Just the filename portion, or the whole path when there is none.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Single export (the one-shot command)
// ============================================================================

/// Closing report for a one-shot export: where it went, what came out.
pub fn format_export_summary(output: &Path, dims: (u32, u32), bytes: u64) -> Vec<String> {
    vec![
        format!("Saved: {}", output.display()),
        format!("    Dimensions: {}x{}", dims.0, dims.1),
        format!("    Size: {}", human_size(bytes)),
    ]
}

pub fn print_export_summary(output: &Path, dims: (u32, u32), bytes: u64) {
    for line in format_export_summary(output, dims, bytes) {
        println!("{line}");
    }
}

// ============================================================================
// Intake sweep
// ============================================================================

/// Per-file report for one sweep, plus a summary line.
pub fn format_intake_report(report: &IntakeReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (pos, entry) in report.entries.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(pos + 1),
            file_name(&entry.source)
        ));
        match &entry.outcome {
            Outcome::Exported {
                output,
                raw,
                width,
                height,
                bytes,
            } => {
                lines.push(format!(
                    "    Saved: {} ({}x{}, {})",
                    file_name(output),
                    width,
                    height,
                    human_size(*bytes)
                ));
                lines.push(format!("    Original: {}", raw.display()));
            }
            Outcome::Failed { reason } => {
                lines.push(format!("    Failed: {reason}"));
            }
        }
    }

    if report.entries.is_empty() {
        lines.push("Nothing to process".to_string());
    } else {
        lines.push(format!(
            "Processed {} of {} files",
            report.exported(),
            report.entries.len()
        ));
    }

    lines
}

pub fn print_intake_report(report: &IntakeReport) {
    for line in format_intake_report(report) {
        println!("{line}");
    }
}
