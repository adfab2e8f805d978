//! # Sendable
//!
//! Make photos and videos acceptable to a messaging platform before upload.
//! The platform rejects media that is too large (in pixels or bytes), has an
//! extreme aspect ratio, or uses a format it does not accept. Given a path,
//! this crate either confirms the file already conforms or produces a
//! conforming copy.
//!
//! # Architecture: Probe, Classify, Remediate
//!
//! ```text
//! 1. Probe      file      →  MediaStat   (size, dimensions, container, codec)
//! 2. Classify   MediaStat →  Verdict     (first violated rule wins)
//! 3. Remediate  Verdict   →  new file    (resize / re-encode, then re-check)
//! ```
//!
//! Classification is a pure function of a stat and a constraint table, so the
//! whole policy is testable without media files. Every remediation is
//! verified by probing and classifying its output again; a conversion that
//! is still not sendable is an error, never a silent success.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`stat`] | [`MediaStat`](stat::MediaStat), the probed snapshot of one file |
//! | [`probe`] | Builds a stat from the filesystem, the file header and the backend |
//! | [`classify`] | Ordered rule table producing a [`Verdict`](classify::Verdict) |
//! | [`remediate`] | Maps verdicts to resize / re-encode actions and runs them |
//! | [`convert`] | Public entry points: `photo`, `video`, `generate_preview` and their `_to` forms |
//! | [`imaging`] | Backend trait, ImageMagick/FFmpeg implementation, header sniffing, resize math |
//! | [`config`] | `sendable.toml` loading, stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## External Tools Behind a Trait
//!
//! Pixel and frame work is delegated to ImageMagick (`convert`) and FFmpeg
//! (`ffmpeg`, `ffprobe`) through [`imaging::MediaBackend`]. The policy layer
//! only ever sees that trait, so tests run against a recording mock and the
//! tool names are plain configuration.
//!
//! ## Temp Files Own Themselves
//!
//! Intermediate and output files are [`tempfile::TempPath`]s until the call
//! succeeds. Any early return drops them, which deletes them. A call never
//! modifies or removes its input.
//!
//! ## No Cropping
//!
//! An extreme aspect ratio is reported as unsupported rather than cropped:
//! choosing what to cut away is the caller's decision.

pub mod classify;
pub mod config;
pub mod convert;
pub mod imaging;
pub mod output;
pub mod probe;
pub mod remediate;
pub mod stat;

pub use classify::Verdict;
pub use config::MediaConfig;
pub use convert::{ConvertError, Converter, Outcome};
pub use stat::{MediaKind, MediaStat};
