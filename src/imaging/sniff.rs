//! Content sniffing from the first bytes of a file.
//!
//! Images are recognized by the `image` crate's magic-byte table
//! ([`image::guess_format`]) plus the HEIF brands it does not know. Videos are
//! recognized by their container signature: ISO-BMFF `ftyp` brands
//! (MP4/QuickTime/3GP), bare QuickTime atoms, EBML (Matroska/WebM), RIFF AVI,
//! FLV, and MPEG program/transport streams.

use crate::stat::ContentKind;
use image::ImageFormat;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How many leading bytes sniffing looks at.
pub const SNIFF_LEN: usize = 512;

const TS_PACKET_LEN: usize = 188;
const TS_SYNC_BYTE: u8 = 0x47;

/// Result of sniffing a byte prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub kind: ContentKind,
    /// Lowercase container name (`jpeg`, `png`, `mp4`, `mov`, `webm`, …);
    /// empty when unknown.
    pub container: &'static str,
}

impl Sniffed {
    const UNKNOWN: Sniffed = Sniffed {
        kind: ContentKind::Unknown,
        container: "",
    };

    fn image(container: &'static str) -> Self {
        Self {
            kind: ContentKind::Image,
            container,
        }
    }

    fn video(container: &'static str) -> Self {
        Self {
            kind: ContentKind::Video,
            container,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == ContentKind::Image
    }

    pub fn is_video(&self) -> bool {
        self.kind == ContentKind::Video
    }

    /// Case-insensitive container match against a single name.
    pub fn matches_container(&self, name: &str) -> bool {
        !self.container.is_empty() && self.container.eq_ignore_ascii_case(name)
    }
}

/// Read up to [`SNIFF_LEN`] bytes from the start of `path`.
///
/// Short files yield a short buffer; an empty file yields an empty one.
pub fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut buf)?;
    Ok(buf)
}

/// Sniff the content kind and container from a header prefix.
pub fn sniff(header: &[u8]) -> Sniffed {
    if let Some(video) = sniff_video(header) {
        return video;
    }
    if let Some(image) = sniff_heif(header) {
        return image;
    }
    if let Ok(format) = image::guess_format(header) {
        return Sniffed::image(image_container(format));
    }
    // After images: every GIF also starts with the sync byte
    if is_transport_stream(header) {
        return Sniffed::video("ts");
    }
    Sniffed::UNKNOWN
}

/// MPEG-TS: a 0x47 sync byte at the start of three consecutive 188-byte packets.
fn is_transport_stream(header: &[u8]) -> bool {
    header.len() > 2 * TS_PACKET_LEN
        && (0..3).all(|i| header[i * TS_PACKET_LEN] == TS_SYNC_BYTE)
}

fn image_container(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Ico => "ico",
        ImageFormat::Avif => "avif",
        ImageFormat::Qoi => "qoi",
        ImageFormat::OpenExr => "exr",
        ImageFormat::Hdr => "hdr",
        ImageFormat::Pnm => "pnm",
        ImageFormat::Dds => "dds",
        ImageFormat::Tga => "tga",
        ImageFormat::Farbfeld => "farbfeld",
        _ => "image",
    }
}

fn ftyp_brand(header: &[u8]) -> Option<&[u8]> {
    (header.len() >= 12 && &header[4..8] == b"ftyp").then(|| &header[8..12])
}

fn sniff_heif(header: &[u8]) -> Option<Sniffed> {
    match ftyp_brand(header)? {
        b"heic" | b"heix" | b"heim" | b"heis" | b"hevc" | b"hevx" => Some(Sniffed::image("heic")),
        b"heif" | b"mif1" | b"msf1" => Some(Sniffed::image("heif")),
        _ => None,
    }
}

fn sniff_video(header: &[u8]) -> Option<Sniffed> {
    if let Some(brand) = ftyp_brand(header) {
        return match brand {
            b"qt  " => Some(Sniffed::video("mov")),
            b"3gp4" | b"3gp5" | b"3gp6" | b"3g2a" | b"3ge6" | b"3gg6" => {
                Some(Sniffed::video("3gp"))
            }
            b"M4V " | b"M4VH" | b"M4VP" => Some(Sniffed::video("m4v")),
            b"isom" | b"iso2" | b"iso4" | b"iso5" | b"iso6" | b"mp41" | b"mp42" | b"avc1"
            | b"iso3" | b"mp4v" | b"mp71" | b"dash" | b"MSNV" | b"NDAS" | b"NDSC" | b"NDSH"
            | b"NDSM" | b"NDSP" | b"NDSS" | b"NDXC" | b"NDXH" | b"NDXM" | b"NDXP" | b"NDXS"
            | b"F4V " | b"F4P " | b"mmp4" => Some(Sniffed::video("mp4")),
            _ => None,
        };
    }
    if header.len() >= 8 {
        // QuickTime files written without an ftyp box start with a bare atom
        match &header[4..8] {
            b"moov" | b"mdat" | b"wide" | b"free" | b"skip" | b"pnot" => {
                return Some(Sniffed::video("mov"));
            }
            _ => {}
        }
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        let is_webm = header.windows(4).any(|w| w == b"webm");
        return Some(Sniffed::video(if is_webm { "webm" } else { "mkv" }));
    }
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"AVI " {
        return Some(Sniffed::video("avi"));
    }
    if header.starts_with(b"FLV\x01") {
        return Some(Sniffed::video("flv"));
    }
    if header.starts_with(&[0x00, 0x00, 0x01, 0xBA]) || header.starts_with(&[0x00, 0x00, 0x01, 0xB3])
    {
        return Some(Sniffed::video("mpeg"));
    }
    None
}
