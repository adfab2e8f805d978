//! Build a [`MediaStat`] for a file on disk.
//!
//! Probing is read-only: file size from the filesystem, content kind and
//! container from the first bytes, and dimensions (plus codec and duration
//! for videos) from the backend. Files that are empty or sniff as the wrong
//! kind are never handed to an external tool; their stat keeps unknown
//! dimensions and classifies as broken.

use crate::imaging::sniff::{read_header, sniff};
use crate::imaging::{BackendError, MediaBackend};
use crate::stat::{MediaKind, MediaStat};
use std::path::Path;
use tracing::debug;

/// Probe `path`, expecting it to be `expected`.
pub fn probe(
    backend: &impl MediaBackend,
    path: &Path,
    expected: MediaKind,
) -> Result<MediaStat, BackendError> {
    let byte_size = std::fs::metadata(path)?.len();
    let sniffed = sniff(&read_header(path)?);

    let mut stat = MediaStat::unprobed(path, byte_size, sniffed.kind);
    stat.container_format = sniffed.container.to_string();

    if byte_size == 0 || !sniffed.kind.matches(expected) {
        debug!(path = %path.display(), kind = ?sniffed.kind, %expected, "skipping tool probe");
        return Ok(stat);
    }

    match expected {
        MediaKind::Image => {
            let info = backend.identify_image(path)?;
            stat.width = info.width;
            stat.height = info.height;
        }
        MediaKind::Video => {
            let info = backend.probe_video(path)?;
            stat.width = info.width;
            stat.height = info.height;
            stat.codec = info.codec;
            stat.duration = Some(info.duration);
        }
    }
    Ok(stat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{
        JPEG_STUB, MockBackend, RecordedOp, WEBM_STUB, image, video,
    };
    use crate::stat::ContentKind;

    #[test]
    fn photo_stat_combines_sniff_and_identify() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.bin");
        std::fs::write(&path, JPEG_STUB).unwrap();
        let backend = MockBackend::with_images(vec![image(1920, 1080)]);

        let stat = probe(&backend, &path, MediaKind::Image).unwrap();

        assert_eq!(stat.byte_size, JPEG_STUB.len() as u64);
        assert_eq!(stat.dimensions(), (1920, 1080));
        assert_eq!(stat.container_format, "jpeg");
        assert_eq!(stat.declared_kind, ContentKind::Image);
    }

    #[test]
    fn video_stat_carries_codec_and_duration() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("clip.webm");
        std::fs::write(&path, WEBM_STUB).unwrap();
        let backend = MockBackend::with_videos(vec![video("vp9", 8.0)]);

        let stat = probe(&backend, &path, MediaKind::Video).unwrap();

        assert_eq!(stat.container_format, "webm");
        assert_eq!(stat.codec.as_deref(), Some("vp9"));
        assert_eq!(stat.duration, Some(8.0));
    }

    #[test]
    fn wrong_kind_is_not_sent_to_tools() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"just some text").unwrap();
        let backend = MockBackend::new();

        let stat = probe(&backend, &path, MediaKind::Image).unwrap();

        assert_eq!(stat.declared_kind, ContentKind::Unknown);
        assert_eq!(stat.dimensions(), (0, 0));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn empty_file_is_not_sent_to_tools() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        let backend = MockBackend::new();

        let stat = probe(&backend, &path, MediaKind::Image).unwrap();

        assert_eq!(stat.byte_size, 0);
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn identify_failure_propagates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        std::fs::write(&path, JPEG_STUB).unwrap();
        let backend = MockBackend::new();

        let result = probe(&backend, &path, MediaKind::Image);

        assert!(matches!(result, Err(BackendError::Parse { .. })));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::IdentifyImage(path.to_string_lossy().to_string())]
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let backend = MockBackend::new();
        let result = probe(&backend, Path::new("/nonexistent/a.jpg"), MediaKind::Image);
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
