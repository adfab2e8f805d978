//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Stat
//!
//! ```text
//! clip.webm
//!     Kind: video (webm)
//!     Size: 1.2 MiB
//!     Dimensions: 640x360
//!     Codec: vp9
//!     Duration: 00:00:12.500
//!     Verdict: format not supported
//! ```
//!
//! `--json` prints the same stat as one JSON object with a `verdict` field.
//!
//! ## Convert
//!
//! ```text
//! IMG_0001.jpg: already sendable
//! scan.tiff → /tmp/sendable_photo_Ab3x.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::classify::Verdict;
use crate::convert::Outcome;
use crate::imaging::format_timestamp;
use crate::stat::MediaStat;
use serde::Serialize;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Human-readable byte count with binary units.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

// ============================================================================
// Stat
// ============================================================================

pub fn format_stat(stat: &MediaStat, verdict: Verdict) -> Vec<String> {
    let pad = indent(1);
    let mut lines = vec![display_name(&stat.path)];

    let container = if stat.container_format.is_empty() {
        "unknown"
    } else {
        stat.container_format.as_str()
    };
    lines.push(format!("{pad}Kind: {} ({container})", stat.declared_kind));
    lines.push(format!("{pad}Size: {}", format_bytes(stat.byte_size)));
    if stat.width > 0 || stat.height > 0 {
        lines.push(format!("{pad}Dimensions: {}x{}", stat.width, stat.height));
    }
    if let Some(codec) = &stat.codec {
        lines.push(format!("{pad}Codec: {codec}"));
    }
    if let Some(duration) = stat.duration {
        lines.push(format!("{pad}Duration: {}", format_timestamp(duration)));
    }
    lines.push(format!("{pad}Verdict: {verdict}"));
    lines
}

pub fn print_stat(stat: &MediaStat, verdict: Verdict) {
    for line in format_stat(stat, verdict) {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct StatReport<'a> {
    #[serde(flatten)]
    stat: &'a MediaStat,
    verdict: Verdict,
}

/// The stat plus its verdict as pretty-printed JSON.
pub fn stat_json(stat: &MediaStat, verdict: Verdict) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StatReport { stat, verdict })
}

// ============================================================================
// Convert
// ============================================================================

pub fn format_outcome(source: &Path, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Original(_) => format!("{}: already sendable", display_name(source)),
        Outcome::Converted(path) => {
            format!("{} → {}", display_name(source), path.display())
        }
    }
}

pub fn print_outcome(source: &Path, outcome: &Outcome) {
    println!("{}", format_outcome(source, outcome));
}

/// Line for a command that wrote to a caller-chosen destination.
pub fn format_written(source: &Path, destination: &Path) -> String {
    format!("{} → {}", display_name(source), destination.display())
}

pub fn print_written(source: &Path, destination: &Path) {
    println!("{}", format_written(source, destination));
}
