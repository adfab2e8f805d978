//! Converter configuration.
//!
//! Tool paths, platform limits, and encoder settings live in one immutable
//! [`MediaConfig`] value handed to [`Converter`](crate::convert::Converter) at
//! construction. Two converters with different configs can run side by side.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # temp_dir = "/var/tmp"   # Where converted files are allocated (default: OS temp dir)
//!
//! [tools]
//! convert = "convert"       # ImageMagick
//! ffmpeg = "ffmpeg"
//! ffprobe = "ffprobe"
//!
//! [photo]
//! max_file_size = 10485760  # Bytes; a file of exactly this size fails
//! max_dimension_sum = 9999  # width + height
//! max_aspect_ratio = 20.0   # Either orientation
//! formats = ["jpg", "png", "jpeg"]
//! jpeg_quality = 95         # Quality of converted photos (1-100)
//! resize_margin = 5         # Pixels taken off each axis when shrinking
//!
//! [video]
//! formats = ["mp4", "mov"]
//! codecs = ["h264", "hevc", "h265"]
//! video_codec = "libx264"   # Encoder used for conversion
//! audio_codec = "aac"
//! preset = "fast"
//! # max_file_size = 52428800  # No byte cap unless set
//!
//! [preview]
//! size = 320                # Bounding box of the thumbnail
//! quality = 87
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a converter needs to know besides the file itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Directory for converted files and intermediate frames.
    /// When absent, the OS temp directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    /// External binaries.
    pub tools: ToolsConfig,
    /// Photo limits and conversion quality.
    pub photo: PhotoConfig,
    /// Video containers, codecs, and encoder settings.
    pub video: VideoConfig,
    /// Video thumbnail settings.
    pub preview: PreviewConfig,
}

impl MediaConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tools = [
            ("tools.convert", &self.tools.convert),
            ("tools.ffmpeg", &self.tools.ffmpeg),
            ("tools.ffprobe", &self.tools.ffprobe),
        ];
        for (key, value) in tools {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !(1..=100).contains(&self.photo.jpeg_quality) {
            return Err(ConfigError::Validation(
                "photo.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&self.preview.quality) {
            return Err(ConfigError::Validation(
                "preview.quality must be 1-100".into(),
            ));
        }
        if self.photo.max_dimension_sum == 0 {
            return Err(ConfigError::Validation(
                "photo.max_dimension_sum must be non-zero".into(),
            ));
        }
        let ratio = self.photo.max_aspect_ratio;
        if ratio.is_nan() || ratio <= 1.0 {
            return Err(ConfigError::Validation(
                "photo.max_aspect_ratio must be greater than 1".into(),
            ));
        }
        if self.photo.formats.is_empty() || self.video.formats.is_empty() {
            return Err(ConfigError::Validation(
                "photo.formats and video.formats must not be empty".into(),
            ));
        }
        if self.preview.size == 0 {
            return Err(ConfigError::Validation(
                "preview.size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Paths (or bare names looked up on `PATH`) of the external binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// ImageMagick `convert`, used to identify and re-encode photos.
    pub convert: String,
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            convert: "convert".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Photo upload limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotoConfig {
    pub max_file_size: u64,
    pub max_dimension_sum: u32,
    pub max_aspect_ratio: f64,
    /// Accepted containers (case-insensitive).
    pub formats: Vec<String>,
    /// JPEG quality of converted photos.
    pub jpeg_quality: u32,
    /// Pixels subtracted from each axis when shrinking to fit `max_dimension_sum`.
    pub resize_margin: u32,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_dimension_sum: 9999,
            max_aspect_ratio: 20.0,
            formats: vec!["jpg".into(), "png".into(), "jpeg".into()],
            jpeg_quality: 95,
            resize_margin: 5,
        }
    }
}

/// Video acceptance and conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Accepted containers (case-insensitive).
    pub formats: Vec<String>,
    /// Accepted codecs of the first video stream; empty accepts any.
    pub codecs: Vec<String>,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            formats: vec!["mp4".into(), "mov".into()],
            codecs: vec!["h264".into(), "hevc".into(), "h265".into()],
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "fast".to_string(),
            max_file_size: None,
        }
    }
}

/// Video thumbnail settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// The thumbnail fits inside a `size`x`size` box.
    pub size: u32,
    pub quality: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            size: 320,
            quality: 87,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(MediaConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse TOML text, merge it over the stock defaults, and validate.
pub fn parse_config(content: &str) -> Result<MediaConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: MediaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<MediaConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sendable configuration
# ======================
#
# Every key is optional; anything left out keeps the value shown here.
# Unknown keys are rejected.

# Directory for converted files and intermediate preview frames.
# Defaults to the OS temp directory.
# temp_dir = "/var/tmp"

[tools]
# ImageMagick binary used to identify and re-encode photos.
convert = "convert"
# FFmpeg binaries used to re-encode videos and grab preview frames.
ffmpeg = "ffmpeg"
ffprobe = "ffprobe"

[photo]
# Largest accepted file in bytes. A file of exactly this size is rejected.
max_file_size = 10485760
# Largest accepted width + height.
max_dimension_sum = 9999
# Largest accepted long-side / short-side ratio.
max_aspect_ratio = 20.0
# Accepted formats (case-insensitive).
formats = ["jpg", "png", "jpeg"]
# JPEG quality of converted photos (1-100).
jpeg_quality = 95
# Pixels taken off each side when shrinking a photo to fit max_dimension_sum,
# so the converter's own rounding cannot push it back over the limit.
resize_margin = 5

[video]
# Accepted containers (case-insensitive).
formats = ["mp4", "mov"]
# Accepted codecs of the first video stream. An empty list accepts any.
codecs = ["h264", "hevc", "h265"]
# Encoders used when a video has to be converted.
video_codec = "libx264"
audio_codec = "aac"
preset = "fast"
# Largest accepted file in bytes. No limit unless set.
# max_file_size = 52428800

[preview]
# Thumbnails fit inside a size x size box.
size = 320
# JPEG quality of thumbnails (1-100).
quality = 87
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        MediaConfig::default().validate().unwrap();
    }

    #[test]
    fn default_limits_match_platform() {
        let config = MediaConfig::default();
        assert_eq!(config.photo.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.photo.max_dimension_sum, 9999);
        assert_eq!(config.photo.max_aspect_ratio, 20.0);
        assert_eq!(config.video.formats, vec!["mp4", "mov"]);
        assert_eq!(config.preview.size, 320);
        assert_eq!(config.preview.quality, 87);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, MediaConfig::default());
    }

    #[test]
    fn sparse_config_overrides_only_named_keys() {
        let config = parse_config(
            r#"
            [tools]
            convert = "/opt/im/bin/convert"

            [photo]
            jpeg_quality = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.tools.convert, "/opt/im/bin/convert");
        assert_eq!(config.tools.ffmpeg, "ffmpeg");
        assert_eq!(config.photo.jpeg_quality, 80);
        assert_eq!(config.photo.max_dimension_sum, 9999);
    }

    #[test]
    fn video_byte_cap_is_optional() {
        let config = parse_config("[video]\nmax_file_size = 52428800\n").unwrap();
        assert_eq!(config.video.max_file_size, Some(52428800));
        assert_eq!(MediaConfig::default().video.max_file_size, None);
    }

    #[test]
    fn temp_dir_is_read() {
        let config = parse_config(r#"temp_dir = "/var/tmp/media""#).unwrap();
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp/media")));
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = parse_config("[photo]\nmax_width = 100\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_quality_rejected() {
        let result = parse_config("[photo]\njpeg_quality = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let result = parse_config("[preview]\nquality = 101\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn degenerate_limits_rejected() {
        assert!(parse_config("[photo]\nmax_aspect_ratio = 1.0\n").is_err());
        assert!(parse_config("[photo]\nmax_dimension_sum = 0\n").is_err());
        assert!(parse_config("[photo]\nformats = []\n").is_err());
        assert!(parse_config("[tools]\nffmpeg = \"  \"\n").is_err());
    }

    #[test]
    fn merge_toml_overlays_nested_tables() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("sendable.toml");
        std::fs::write(&path, "[preview]\nsize = 160\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.preview.size, 160);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/sendable.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
