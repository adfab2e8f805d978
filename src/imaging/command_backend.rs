//! Backend that shells out to ImageMagick and FFmpeg.
//!
//! ## Tool mapping
//!
//! | Operation | Command |
//! |---|---|
//! | Identify image | `convert <src> json:-` |
//! | Probe video | `ffprobe -v error -select_streams v:0 -show_entries stream=width,height,codec_name -show_format -of json <src>` |
//! | Transcode image | `convert <src> [-resize WxH] -quality Q <dst>` |
//! | Transcode video | `ffmpeg -v error -y -i <src> -vcodec C -acodec A -preset P <dst>` |
//! | Extract frame | `ffmpeg -v error -y -i <src> -ss HH:MM:SS.mmm -vframes 1 <dst>` |
//!
//! Every call blocks until the child exits; there is no timeout. A non-zero
//! exit becomes [`BackendError::ToolFailed`] carrying the child's stdout and
//! stderr.
//!
//! Argument lists are built by pure functions so they can be tested without
//! the binaries installed.

use super::backend::{BackendError, ImageInfo, MediaBackend, VideoInfo};
use super::calculations::format_timestamp;
use super::params::{FrameParams, ImageTranscodeParams, VideoTranscodeParams};
use crate::config::ToolsConfig;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Backend driving the binaries named in [`ToolsConfig`].
#[derive(Debug, Clone, Default)]
pub struct CommandBackend {
    tools: ToolsConfig,
}

impl CommandBackend {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }
}

/// Run `tool` to completion, failing on a non-zero exit.
fn run(tool: &str, args: &[OsString]) -> Result<Output, BackendError> {
    debug!(tool, args = ?args, "spawning");
    let output = Command::new(tool).args(args).output()?;
    if !output.status.success() {
        return Err(BackendError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            output: captured(&output),
        });
    }
    Ok(output)
}

fn captured(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (_, true) => stdout.trim().to_string(),
        (true, false) => stderr.trim().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim(), stderr.trim()),
    }
}

fn os(s: impl Into<OsString>) -> OsString {
    s.into()
}

// =============================================================================
// Argument builders
// =============================================================================

pub(crate) fn identify_args(path: &Path) -> Vec<OsString> {
    vec![os(path), os("json:-")]
}

pub(crate) fn probe_args(path: &Path) -> Vec<OsString> {
    [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height,codec_name",
        "-show_format",
        "-of",
        "json",
    ]
    .into_iter()
    .map(os)
    .chain([os(path)])
    .collect()
}

pub(crate) fn image_transcode_args(params: &ImageTranscodeParams) -> Vec<OsString> {
    let mut args = vec![os(&params.source)];
    if let Some((width, height)) = params.resize {
        args.push(os("-resize"));
        args.push(os(format!("{width}x{height}")));
    }
    args.push(os("-quality"));
    args.push(os(params.quality.value().to_string()));
    args.push(os(&params.output));
    args
}

pub(crate) fn video_transcode_args(params: &VideoTranscodeParams) -> Vec<OsString> {
    vec![
        os("-v"),
        os("error"),
        os("-y"),
        os("-i"),
        os(&params.source),
        os("-vcodec"),
        os(&params.video_codec),
        os("-acodec"),
        os(&params.audio_codec),
        os("-preset"),
        os(&params.preset),
        os(&params.output),
    ]
}

pub(crate) fn frame_args(params: &FrameParams) -> Vec<OsString> {
    vec![
        os("-v"),
        os("error"),
        os("-y"),
        os("-i"),
        os(&params.source),
        os("-ss"),
        os(format_timestamp(params.offset)),
        os("-vframes"),
        os("1"),
        os(&params.output),
    ]
}

// =============================================================================
// Output parsers
// =============================================================================

#[derive(Debug, Deserialize)]
struct ConvertEntry {
    image: ConvertImage,
}

#[derive(Debug, Deserialize)]
struct ConvertImage {
    #[serde(default)]
    format: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    width: u32,
    height: u32,
}

/// ImageMagick 7 wraps entries in an array; ImageMagick 6 prints bare objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConvertJson {
    Many(Vec<ConvertEntry>),
    One(ConvertEntry),
}

/// Parse `convert <src> json:-`, taking the first frame.
pub(crate) fn parse_convert_json(json: &str) -> Result<ImageInfo, String> {
    let first = serde_json::Deserializer::from_str(json)
        .into_iter::<ConvertJson>()
        .next()
        .ok_or_else(|| "stat was not found".to_string())?
        .map_err(|e| e.to_string())?;

    let entry = match first {
        ConvertJson::Many(entries) => entries
            .into_iter()
            .next()
            .ok_or_else(|| "stat was not found".to_string())?,
        ConvertJson::One(entry) => entry,
    };

    Ok(ImageInfo {
        width: entry.image.geometry.width,
        height: entry.image.geometry.height,
        format: entry.image.format,
    })
}

#[derive(Debug, Default, Deserialize)]
struct ProbeJson {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    /// ffprobe prints durations as strings.
    #[serde(default)]
    duration: Option<String>,
}

/// Parse ffprobe JSON restricted to the first video stream.
pub(crate) fn parse_ffprobe_json(json: &str) -> Result<VideoInfo, String> {
    let parsed: ProbeJson = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let stream = parsed.streams.into_iter().next().unwrap_or_default();
    let duration = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width: stream.width,
        height: stream.height,
        duration,
        codec: stream.codec_name.filter(|c| !c.is_empty()),
    })
}

impl MediaBackend for CommandBackend {
    fn identify_image(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let tool = &self.tools.convert;
        let output = run(tool, &identify_args(path))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = parse_convert_json(&stdout).map_err(|message| BackendError::Parse {
            tool: tool.clone(),
            message,
            output: stdout.to_string(),
        })?;
        debug!(path = %path.display(), width = info.width, height = info.height, format = %info.format, "identified image");
        Ok(info)
    }

    fn probe_video(&self, path: &Path) -> Result<VideoInfo, BackendError> {
        let tool = &self.tools.ffprobe;
        let output = run(tool, &probe_args(path))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = parse_ffprobe_json(&stdout).map_err(|message| BackendError::Parse {
            tool: tool.clone(),
            message,
            output: stdout.to_string(),
        })?;
        debug!(path = %path.display(), codec = ?info.codec, duration = info.duration, "probed video");
        Ok(info)
    }

    fn transcode_image(&self, params: &ImageTranscodeParams) -> Result<(), BackendError> {
        run(&self.tools.convert, &image_transcode_args(params)).map(drop)
    }

    fn transcode_video(&self, params: &VideoTranscodeParams) -> Result<(), BackendError> {
        run(&self.tools.ffmpeg, &video_transcode_args(params)).map(drop)
    }

    fn extract_frame(&self, params: &FrameParams) -> Result<(), BackendError> {
        run(&self.tools.ffmpeg, &frame_args(params)).map(drop)
    }
}
