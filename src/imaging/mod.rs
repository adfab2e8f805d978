//! External media collaborators: everything that touches bytes or spawns a tool.
//!
//! | Operation | Implementation |
//! |---|---|
//! | **Sniff** | first 512 bytes, `image::guess_format` + container signatures |
//! | **Identify image** | ImageMagick `convert json:-` |
//! | **Probe video** | `ffprobe` JSON |
//! | **Transcode image** | ImageMagick `-resize` + `-quality` |
//! | **Transcode video / extract frame** | `ffmpeg` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for resize and seek math (unit testable)
//! - **Parameters**: Data structures describing tool invocations
//! - **Backend**: [`MediaBackend`] trait + [`CommandBackend`]
//! - **Sniff**: Header-only content detection

pub mod backend;
mod calculations;
pub mod command_backend;
mod params;
pub mod sniff;

pub use backend::{BackendError, ImageInfo, MediaBackend, VideoInfo};
pub use calculations::{fit_dimension_sum, format_timestamp, preview_offset};
pub use command_backend::CommandBackend;
pub use params::{FrameParams, ImageTranscodeParams, Quality, VideoTranscodeParams};
pub use sniff::{Sniffed, sniff};
