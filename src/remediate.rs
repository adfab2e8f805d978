//! Remediation policy: what to do about each non-sendable verdict.
//!
//! | Verdict | Photo | Video |
//! |---|---|---|
//! | `Sendable` | nothing | nothing |
//! | `Broken` | fatal | fatal |
//! | `AspectRatioExceeded` | unsupported (no cropping) | n/a |
//! | `AspectSizeExceeded` | resize to fit the dimension sum | n/a |
//! | `FileSizeExceeded` | re-encode at the same size, JPEG quality | re-encode |
//! | `FormatUnsupported` | re-encode to JPEG | re-encode to H.264/AAC MP4 |
//!
//! Every transcode writes to a fresh destination, never in place.

use crate::classify::{Constraints, Verdict};
use crate::config::MediaConfig;
use crate::imaging::{
    BackendError, ImageTranscodeParams, MediaBackend, Quality, VideoTranscodeParams,
    fit_dimension_sum,
};
use crate::stat::{MediaKind, MediaStat};
use std::path::{Path, PathBuf};

/// The remediation chosen for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The source is unreadable; nothing can be done.
    Fatal,
    /// Non-conforming, but no remediation is implemented.
    Unsupported,
    Transcode(Transcode),
}

/// A transcode the backend can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transcode {
    /// Fit into a `width`x`height` box and re-encode.
    Resize { width: u32, height: u32 },
    /// Re-encode into the preferred format.
    Reencode,
}

/// A transcode bound to the freshly allocated path it will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationPlan {
    pub transcode: Transcode,
    pub destination: PathBuf,
}

/// Pick the action for `verdict`. `None` means the file is already sendable.
pub fn plan_action(
    stat: &MediaStat,
    verdict: Verdict,
    constraints: &Constraints,
    resize_margin: u32,
) -> Option<Action> {
    let action = match verdict {
        Verdict::Sendable => return None,
        Verdict::Broken => Action::Fatal,
        Verdict::AspectRatioExceeded => Action::Unsupported,
        Verdict::AspectSizeExceeded => match constraints.max_dimension_sum {
            Some(max_sum) => {
                let (width, height) = fit_dimension_sum(stat.dimensions(), max_sum, resize_margin);
                Action::Transcode(Transcode::Resize { width, height })
            }
            None => Action::Unsupported,
        },
        Verdict::FileSizeExceeded => match constraints.expected {
            MediaKind::Image => Action::Transcode(Transcode::Resize {
                width: stat.width,
                height: stat.height,
            }),
            MediaKind::Video => Action::Transcode(Transcode::Reencode),
        },
        Verdict::FormatUnsupported => Action::Transcode(Transcode::Reencode),
    };
    Some(action)
}

/// Run `plan` against `source` with the encoder settings from `config`.
pub fn execute(
    backend: &impl MediaBackend,
    source: &Path,
    kind: MediaKind,
    plan: &RemediationPlan,
    config: &MediaConfig,
) -> Result<(), BackendError> {
    match kind {
        MediaKind::Image => {
            let resize = match plan.transcode {
                Transcode::Resize { width, height } => Some((width, height)),
                Transcode::Reencode => None,
            };
            backend.transcode_image(&ImageTranscodeParams {
                source: source.to_path_buf(),
                output: plan.destination.clone(),
                resize,
                quality: Quality::new(config.photo.jpeg_quality),
            })
        }
        MediaKind::Video => backend.transcode_video(&VideoTranscodeParams {
            source: source.to_path_buf(),
            output: plan.destination.clone(),
            video_codec: config.video.video_codec.clone(),
            audio_codec: config.video.audio_codec.clone(),
            preset: config.video.preset.clone(),
        }),
    }
}
