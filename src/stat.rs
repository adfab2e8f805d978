//! The probed snapshot of one media file.
//!
//! A [`MediaStat`] is built once by [`probe`](crate::probe) and never mutated;
//! a changed file gets a new stat. It is plain data so classification can be
//! exercised without touching the filesystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What the caller expects a file to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("image"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// General category of a byte stream, as sniffed from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
    Unknown,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Image => f.write_str("image"),
            ContentKind::Video => f.write_str("video"),
            ContentKind::Unknown => f.write_str("unknown"),
        }
    }
}

impl ContentKind {
    pub fn matches(self, expected: MediaKind) -> bool {
        matches!(
            (self, expected),
            (ContentKind::Image, MediaKind::Image) | (ContentKind::Video, MediaKind::Video)
        )
    }
}

/// Structural facts about a file at the time it was probed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStat {
    pub path: PathBuf,
    pub byte_size: u64,
    /// `0` means unknown, not an error by itself.
    pub width: u32,
    pub height: u32,
    /// Lowercase container name from sniffing; empty when not determined.
    pub container_format: String,
    pub declared_kind: ContentKind,
    /// Video codec of the first video stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl MediaStat {
    /// A stat for a file whose content was never probed past its size.
    pub fn unprobed(path: impl Into<PathBuf>, byte_size: u64, declared_kind: ContentKind) -> Self {
        Self {
            path: path.into(),
            byte_size,
            width: 0,
            height: 0,
            container_format: String::new(),
            declared_kind,
            codec: None,
            duration: None,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
