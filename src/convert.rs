//! Public entry points: make a photo or video sendable, or cut a preview.
//!
//! Each call runs the same linear pipeline:
//!
//! ```text
//! probe → classify → (sendable? return the source as-is)
//!                  → plan → allocate temp → transcode → re-probe + classify
//! ```
//!
//! ## Temp-file ownership
//!
//! Every file a call creates is a [`TempPath`], which deletes itself when
//! dropped. Success hands the path to the caller with [`TempPath::keep`] or
//! moves it into the caller's destination; every error path simply drops it.
//! A call never writes to or removes its input.
//!
//! ## Concurrency
//!
//! A [`Converter`] holds only immutable configuration, so one instance can
//! serve many threads. Each call allocates uniquely named temp files and
//! touches no other call's paths. External tools run without a timeout.

use crate::classify::{Constraints, Verdict, classify};
use crate::config::MediaConfig;
use crate::imaging::sniff::{Sniffed, read_header, sniff};
use crate::imaging::{
    BackendError, CommandBackend, FrameParams, ImageTranscodeParams, MediaBackend, Quality,
    preview_offset,
};
use crate::probe::probe;
use crate::remediate::{Action, RemediationPlan, execute, plan_action};
use crate::stat::{MediaKind, MediaStat};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("given {expected} is broken: {}", path.display())]
    Broken { path: PathBuf, expected: MediaKind },
    #[error("{verdict}: unsupported for now: {}", path.display())]
    Unsupported { path: PathBuf, verdict: Verdict },
    #[error("probe failed: {0}")]
    Backend(#[from] BackendError),
    #[error("conversion for '{verdict}' failed: {source}")]
    RemediationFailed {
        verdict: Verdict,
        #[source]
        source: BackendError,
    },
    #[error("preview {step} failed: {source}")]
    PreviewFailed {
        /// `frame extraction` or `thumbnail encoding`.
        step: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("converted, but non sendable still: {verdict}")]
    ConvertedBadly {
        /// What the converted file still fails.
        verdict: Verdict,
        /// What made the source need converting, if it was a remediation.
        trigger: Option<Verdict>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not keep converted file: {0}")]
    Persist(#[from] tempfile::PathPersistError),
}

impl ConvertError {
    /// Whether the same call might succeed later: only external tool
    /// failures qualify. Nothing here retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConvertError::Backend(_)
                | ConvertError::RemediationFailed { .. }
                | ConvertError::PreviewFailed { .. }
        )
    }
}

/// Where a sendable file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The source already conformed; nothing was created.
    Original(PathBuf),
    /// A new file the caller now owns and must remove.
    Converted(PathBuf),
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Original(p) | Outcome::Converted(p) => p,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Outcome::Converted(_))
    }
}

/// Result of the pipeline before ownership of a converted file is decided.
enum Prepared {
    Original,
    Converted(TempPath),
}

/// Photo/video converter bound to one backend and one configuration.
pub struct Converter<B = CommandBackend> {
    backend: B,
    config: MediaConfig,
    photo_rules: Constraints,
    video_rules: Constraints,
}

impl Converter<CommandBackend> {
    /// Converter that runs the tools named in `config.tools`.
    pub fn new(config: MediaConfig) -> Self {
        let backend = CommandBackend::new(config.tools.clone());
        Self::with_backend(backend, config)
    }
}

impl<B: MediaBackend> Converter<B> {
    /// Converter using a specific backend (allows testing with a mock).
    pub fn with_backend(backend: B, config: MediaConfig) -> Self {
        Self {
            photo_rules: Constraints::photo(&config.photo),
            video_rules: Constraints::video(&config.video),
            backend,
            config,
        }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn constraints(&self, kind: MediaKind) -> &Constraints {
        match kind {
            MediaKind::Image => &self.photo_rules,
            MediaKind::Video => &self.video_rules,
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Probe a file as `kind` without classifying it.
    pub fn stat(&self, path: &Path, kind: MediaKind) -> Result<MediaStat, ConvertError> {
        Ok(probe(&self.backend, path, kind)?)
    }

    pub fn photo_stat(&self, path: &Path) -> Result<MediaStat, ConvertError> {
        self.stat(path, MediaKind::Image)
    }

    pub fn video_stat(&self, path: &Path) -> Result<MediaStat, ConvertError> {
        self.stat(path, MediaKind::Video)
    }

    /// Probe and classify a file as `kind`.
    pub fn check(&self, path: &Path, kind: MediaKind) -> Result<(MediaStat, Verdict), ConvertError> {
        let stat = self.stat(path, kind)?;
        let verdict = classify(&stat, self.constraints(kind));
        Ok((stat, verdict))
    }

    fn sniff_file(path: &Path) -> Option<Sniffed> {
        read_header(path).ok().map(|header| sniff(&header))
    }

    /// Whether the file's header identifies an image.
    pub fn is_photo(&self, path: &Path) -> bool {
        Self::sniff_file(path).is_some_and(|s| s.is_image())
    }

    /// Whether the file's header identifies a video.
    pub fn is_video(&self, path: &Path) -> bool {
        Self::sniff_file(path).is_some_and(|s| s.is_video())
    }

    /// Whether the file is an image in an accepted photo format.
    pub fn is_photo_format_supported(&self, path: &Path) -> bool {
        Self::sniff_file(path)
            .is_some_and(|s| s.is_image() && self.photo_rules.accepts_format(s.container))
    }

    /// Whether the file is a video in an accepted container.
    pub fn is_video_format_supported(&self, path: &Path) -> bool {
        Self::sniff_file(path)
            .is_some_and(|s| s.is_video() && self.video_rules.accepts_format(s.container))
    }

    /// Codec of the first video stream, `None` if there is none.
    pub fn video_codec(&self, path: &Path) -> Result<Option<String>, ConvertError> {
        Ok(self.backend.probe_video(path)?.codec)
    }

    pub fn is_video_codec_supported(&self, path: &Path) -> Result<bool, ConvertError> {
        let codec = self.video_codec(path)?;
        Ok(codec.is_some() && self.video_rules.accepts_codec(codec.as_deref()))
    }

    /// Case-insensitive comparison of the first video stream's codec.
    pub fn is_video_encoded_with(&self, path: &Path, codec: &str) -> Result<bool, ConvertError> {
        Ok(self
            .video_codec(path)?
            .is_some_and(|c| c.eq_ignore_ascii_case(codec)))
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Make a photo sendable.
    ///
    /// Returns the source path untouched when it already conforms, otherwise
    /// a new JPEG in the temp directory. On error nothing is left behind and
    /// the source is still the caller's to use.
    pub fn photo(&self, path: &Path) -> Result<Outcome, ConvertError> {
        self.to_outcome(path, MediaKind::Image)
    }

    /// Make a photo sendable and place the result at `destination`.
    ///
    /// A conforming source is copied, never moved; when `destination` is the
    /// source itself nothing is written.
    pub fn photo_to(&self, path: &Path, destination: &Path) -> Result<(), ConvertError> {
        self.to_destination(path, destination, MediaKind::Image)
    }

    /// Make a video sendable: accepted container and codec, else an H.264 MP4.
    pub fn video(&self, path: &Path) -> Result<Outcome, ConvertError> {
        self.to_outcome(path, MediaKind::Video)
    }

    /// Make a video sendable and place the result at `destination`.
    pub fn video_to(&self, path: &Path, destination: &Path) -> Result<(), ConvertError> {
        self.to_destination(path, destination, MediaKind::Video)
    }

    /// Cut a thumbnail from the middle of `video` into a new temp file.
    pub fn generate_preview(&self, video: &Path) -> Result<PathBuf, ConvertError> {
        Ok(self.render_preview(video)?.keep()?)
    }

    /// Cut a thumbnail from the middle of `video` and move it to `destination`.
    ///
    /// `destination` is only written once the thumbnail has been verified.
    pub fn generate_preview_to(&self, video: &Path, destination: &Path) -> Result<(), ConvertError> {
        move_into(self.render_preview(video)?, destination)
    }

    /// Extract the midpoint frame, shrink it into the preview box, and verify
    /// the result as a photo. The full-size frame is removed on every path.
    fn render_preview(&self, video: &Path) -> Result<TempPath, ConvertError> {
        let (stat, verdict) = self.check(video, MediaKind::Video)?;
        if verdict == Verdict::Broken {
            return Err(ConvertError::Broken {
                path: video.to_path_buf(),
                expected: MediaKind::Video,
            });
        }

        let offset = preview_offset(stat.duration.unwrap_or(0.0));
        let frame = self.allocate("sendable_preview_frame_", ".jpg")?;
        debug!(video = %video.display(), offset, "extracting preview frame");
        self.backend
            .extract_frame(&FrameParams {
                source: video.to_path_buf(),
                output: frame.to_path_buf(),
                offset,
            })
            .map_err(|source| ConvertError::PreviewFailed {
                step: "frame extraction",
                source,
            })?;

        let thumbnail = self.allocate("sendable_preview_", ".jpg")?;
        let size = self.config.preview.size;
        self.backend
            .transcode_image(&ImageTranscodeParams {
                source: frame.to_path_buf(),
                output: thumbnail.to_path_buf(),
                resize: Some((size, size)),
                quality: Quality::new(self.config.preview.quality),
            })
            .map_err(|source| ConvertError::PreviewFailed {
                step: "thumbnail encoding",
                source,
            })?;

        self.verify(&thumbnail, MediaKind::Image, None)?;
        Ok(thumbnail)
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn to_outcome(&self, path: &Path, kind: MediaKind) -> Result<Outcome, ConvertError> {
        match self.prepare(path, kind)? {
            Prepared::Original => Ok(Outcome::Original(path.to_path_buf())),
            Prepared::Converted(temp) => Ok(Outcome::Converted(temp.keep()?)),
        }
    }

    fn to_destination(
        &self,
        path: &Path,
        destination: &Path,
        kind: MediaKind,
    ) -> Result<(), ConvertError> {
        match self.prepare(path, kind)? {
            Prepared::Original if same_file(path, destination) => Ok(()),
            Prepared::Original => {
                std::fs::copy(path, destination)?;
                Ok(())
            }
            Prepared::Converted(temp) => move_into(temp, destination),
        }
    }

    fn prepare(&self, path: &Path, kind: MediaKind) -> Result<Prepared, ConvertError> {
        let constraints = self.constraints(kind);
        let stat = probe(&self.backend, path, kind)?;
        let verdict = classify(&stat, constraints);
        debug!(path = %path.display(), %verdict, "classified");

        let margin = self.config.photo.resize_margin;
        let transcode = match plan_action(&stat, verdict, constraints, margin) {
            None => return Ok(Prepared::Original),
            Some(Action::Fatal) => {
                return Err(ConvertError::Broken {
                    path: path.to_path_buf(),
                    expected: kind,
                });
            }
            Some(Action::Unsupported) => {
                return Err(ConvertError::Unsupported {
                    path: path.to_path_buf(),
                    verdict,
                });
            }
            Some(Action::Transcode(transcode)) => transcode,
        };

        let temp = match kind {
            MediaKind::Image => self.allocate("sendable_photo_", ".jpg")?,
            MediaKind::Video => self.allocate("sendable_video_", ".mp4")?,
        };
        let plan = RemediationPlan {
            transcode,
            destination: temp.to_path_buf(),
        };

        info!(path = %path.display(), %verdict, ?transcode, "converting");
        execute(&self.backend, path, kind, &plan, &self.config)
            .map_err(|source| ConvertError::RemediationFailed { verdict, source })?;
        self.verify(&plan.destination, kind, Some(verdict))?;
        info!(path = %path.display(), output = %plan.destination.display(), "converted");

        Ok(Prepared::Converted(temp))
    }

    /// Re-probe a freshly written file and require it to be sendable.
    fn verify(
        &self,
        path: &Path,
        kind: MediaKind,
        trigger: Option<Verdict>,
    ) -> Result<MediaStat, ConvertError> {
        let stat = probe(&self.backend, path, kind)?;
        let verdict = classify(&stat, self.constraints(kind));
        if !verdict.is_sendable() {
            warn!(path = %path.display(), %verdict, ?trigger, "output still not sendable");
            return Err(ConvertError::ConvertedBadly { verdict, trigger });
        }
        Ok(stat)
    }

    /// Create an empty, uniquely named file in the configured temp directory.
    fn allocate(&self, prefix: &str, suffix: &str) -> std::io::Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let file = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file.into_temp_path())
    }
}

/// Whether both paths resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rename `temp` to `destination`, copying when a rename is impossible
/// (e.g. across filesystems). The temp file is gone afterwards either way.
fn move_into(temp: TempPath, destination: &Path) -> Result<(), ConvertError> {
    match temp.persist(destination) {
        Ok(()) => Ok(()),
        Err(err) => {
            debug!(error = %err.error, "rename failed, copying instead");
            std::fs::copy(&err.path, destination)?;
            Ok(())
        }
    }
}
