//! End-to-end conversions against the real ImageMagick and FFmpeg binaries.
//!
//! Each test skips itself (with a note on stderr) when a tool it needs is not
//! on PATH, so the suite stays green on machines without them.
//!
//! Run with: cargo test --test pipeline -- --nocapture

use sendable::imaging::sniff::{read_header, sniff};
use sendable::{ConvertError, Converter, MediaConfig, MediaKind, Outcome, Verdict};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn tools_available(names: &[&str]) -> bool {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| which::which(name).is_err())
        .collect();
    if !missing.is_empty() {
        eprintln!("skipping: {missing:?} not on PATH");
    }
    missing.is_empty()
}

struct Workspace {
    dir: TempDir,
    work: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        Self { dir, work }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> MediaConfig {
        MediaConfig {
            temp_dir: Some(self.work.clone()),
            ..MediaConfig::default()
        }
    }

    fn temp_files(&self) -> usize {
        std::fs::read_dir(&self.work).unwrap().count()
    }
}

fn gradient(width: u32, height: u32, path: &Path) {
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
    .save(path)
    .unwrap();
}

/// Two-second synthetic clip in an AVI container with MPEG-4 Part 2 video.
fn test_clip(path: &Path) {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i"])
        .arg("testsrc=duration=2:size=160x120:rate=10")
        .args(["-c:v", "mpeg4"])
        .arg(path)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "ffmpeg failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

fn has_libx264() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains("libx264"))
        .unwrap_or(false)
}

fn container_of(path: &Path) -> &'static str {
    sniff(&read_header(path).unwrap()).container
}

#[test]
fn conforming_jpeg_is_left_alone() {
    if !tools_available(&["convert"]) {
        return;
    }
    let ws = Workspace::new();
    let src = ws.path("small.jpg");
    gradient(640, 480, &src);
    let before = std::fs::read(&src).unwrap();
    let converter = Converter::new(ws.config());

    let outcome = converter.photo(&src).unwrap();

    assert_eq!(outcome, Outcome::Original(src.clone()));
    assert_eq!(std::fs::read(&src).unwrap(), before);
    assert_eq!(ws.temp_files(), 0);
}

#[test]
fn tiff_is_reencoded_to_jpeg() {
    if !tools_available(&["convert"]) {
        return;
    }
    let ws = Workspace::new();
    let src = ws.path("scan.tiff");
    gradient(64, 48, &src);
    let converter = Converter::new(ws.config());

    let outcome = converter.photo(&src).unwrap();

    assert!(outcome.is_converted());
    assert_eq!(container_of(outcome.path()), "jpeg");
    let (stat, verdict) = converter.check(outcome.path(), MediaKind::Image).unwrap();
    assert_eq!(verdict, Verdict::Sendable);
    assert_eq!(stat.dimensions(), (64, 48));
    assert!(src.exists());
}

#[test]
fn oversized_png_is_shrunk_below_dimension_sum() {
    if !tools_available(&["convert"]) {
        return;
    }
    let ws = Workspace::new();
    let src = ws.path("big.png");
    gradient(800, 600, &src);
    let mut config = ws.config();
    config.photo.max_dimension_sum = 999;
    let converter = Converter::new(config);

    let outcome = converter.photo(&src).unwrap();

    let stat = converter.photo_stat(outcome.path()).unwrap();
    assert!(stat.width + stat.height <= 999, "{}x{}", stat.width, stat.height);
}

#[test]
fn photo_to_writes_destination_and_keeps_source() {
    if !tools_available(&["convert"]) {
        return;
    }
    let ws = Workspace::new();
    let src = ws.path("scan.tiff");
    let dest = ws.path("out.jpg");
    gradient(32, 32, &src);
    let converter = Converter::new(ws.config());

    converter.photo_to(&src, &dest).unwrap();

    assert_eq!(container_of(&dest), "jpeg");
    assert!(src.exists());
    assert_eq!(ws.temp_files(), 0);
}

#[test]
fn text_file_is_broken() {
    let ws = Workspace::new();
    let src = ws.path("notes.jpg");
    std::fs::write(&src, "not a photo").unwrap();
    let converter = Converter::new(ws.config());

    assert!(matches!(
        converter.photo(&src),
        Err(ConvertError::Broken { .. })
    ));
    assert_eq!(ws.temp_files(), 0);
}

#[test]
fn missing_tool_is_reported_and_leaves_no_temp_files() {
    let ws = Workspace::new();
    let src = ws.path("scan.tiff");
    gradient(16, 16, &src);
    let mut config = ws.config();
    config.tools.convert = "sendable-no-such-convert".into();
    let converter = Converter::new(config);

    let err = converter.photo(&src).unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(ws.temp_files(), 0);
}

#[test]
fn preview_is_a_sendable_thumbnail() {
    if !tools_available(&["convert", "ffmpeg", "ffprobe"]) {
        return;
    }
    let ws = Workspace::new();
    let clip = ws.path("clip.avi");
    test_clip(&clip);
    let converter = Converter::new(ws.config());

    let thumb = converter.generate_preview(&clip).unwrap();

    let (stat, verdict) = converter.check(&thumb, MediaKind::Image).unwrap();
    assert_eq!(verdict, Verdict::Sendable);
    assert!(stat.width <= 320 && stat.height <= 320);
    // Only the thumbnail remains; the extracted frame is gone
    assert_eq!(ws.temp_files(), 1);
}

#[test]
fn avi_is_reencoded_to_h264_mp4() {
    if !tools_available(&["ffmpeg", "ffprobe"]) || !has_libx264() {
        return;
    }
    let ws = Workspace::new();
    let clip = ws.path("clip.avi");
    test_clip(&clip);
    let converter = Converter::new(ws.config());

    let outcome = converter.video(&clip).unwrap();

    assert!(outcome.is_converted());
    assert!(converter.is_video_format_supported(outcome.path()));
    assert!(converter.is_video_encoded_with(outcome.path(), "h264").unwrap());
    let stat = converter.video_stat(outcome.path()).unwrap();
    assert!(stat.duration.is_some_and(|d| d > 1.0));
}
