//! Parameter types for external tool invocations.
//!
//! These structs describe *what* to produce, not *how*. They are the
//! interface between the conversion policy in [`convert`](crate::convert)
//! (which decides whether and how a file must change) and the
//! [`backend`](super::backend) (which spawns ImageMagick or FFmpeg). Keeping
//! them plain data lets the policy be tested against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`ImageTranscodeParams`]: Source, output, optional bounding box, quality.
//! - [`VideoTranscodeParams`]: Source, output, codecs and encoder preset.
//! - [`FrameParams`]: Single-frame extraction at a seek offset.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

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
        Self(95)
    }
}

/// Re-encode an image, optionally fitting it into a `width`x`height` box.
///
/// The output format follows the extension of `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTranscodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box; the tool keeps the aspect ratio inside it.
    pub resize: Option<(u32, u32)>,
    pub quality: Quality,
}

/// Re-encode a video into the container implied by `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTranscodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Encoder name as the tool knows it (e.g. `libx264`).
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
}

/// Grab one frame of `source` at `offset` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub offset: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(87).value(), 87);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }
}
