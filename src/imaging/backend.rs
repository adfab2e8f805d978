//! Media backend trait and shared types.
//!
//! The [`MediaBackend`] trait is the seam between conversion policy and the
//! external binaries that actually touch pixels and frames. It defines the
//! five operations the policy needs: identify an image, probe a video,
//! transcode an image, transcode a video, and extract a single frame.
//!
//! The production implementation is
//! [`CommandBackend`](super::command_backend::CommandBackend), which spawns
//! ImageMagick and FFmpeg. Tests use the recording `MockBackend` below.

use super::params::{FrameParams, ImageTranscodeParams, VideoTranscodeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{tool} exited with {status}\noutput:\t{output}")]
    ToolFailed {
        tool: String,
        status: String,
        output: String,
    },
    #[error("could not parse {tool} output: {message}\noutput:\t{output}")]
    Parse {
        tool: String,
        message: String,
        output: String,
    },
}

/// Structural facts about an image, as reported by the image tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Format name as the tool reports it (e.g. `JPEG`).
    pub format: String,
}

/// Structural facts about the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Seconds; `0.0` when the container does not declare one.
    pub duration: f64,
    /// `None` when the file has no video stream.
    pub codec: Option<String>,
}

/// Trait for media processing backends.
///
/// Every operation either succeeds or reports the failing tool with its
/// captured output attached, so callers can surface a diagnosable error.
pub trait MediaBackend: Sync {
    /// Get image dimensions and format.
    fn identify_image(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Get video stream dimensions, codec, and container duration.
    fn probe_video(&self, path: &Path) -> Result<VideoInfo, BackendError>;

    /// Re-encode an image, optionally resizing it.
    fn transcode_image(&self, params: &ImageTranscodeParams) -> Result<(), BackendError>;

    /// Re-encode a video.
    fn transcode_video(&self, params: &VideoTranscodeParams) -> Result<(), BackendError>;

    /// Write one frame of a video as an image.
    fn extract_frame(&self, params: &FrameParams) -> Result<(), BackendError>;
}
