//! Sendability classification.
//!
//! A [`MediaStat`] is checked against a [`Constraints`] table by walking the
//! ordered [`RULES`] list; the first violated rule names the [`Verdict`]. The
//! order is part of the contract:
//!
//! | # | Verdict | Violated when |
//! |---|---|---|
//! | 1 | `Broken` | empty file, content kind ≠ expected kind, image without dimensions, video without a video stream |
//! | 2 | `AspectSizeExceeded` | `width + height > max_dimension_sum` |
//! | 3 | `AspectRatioExceeded` | `w/h >= max_ratio` or `h/w >= max_ratio` |
//! | 4 | `FileSizeExceeded` | `byte_size >= max_file_size` |
//! | 5 | `FormatUnsupported` | container (or video codec) outside the accepted set |
//!
//! Broken short-circuits everything else. A fixable size problem is
//! reported ahead of an unfixable ratio problem.
//!
//! Classification is a pure function of the stat and the constraints.

use crate::config::{PhotoConfig, VideoConfig};
use crate::stat::{MediaKind, MediaStat};
use serde::Serialize;
use std::fmt;

/// Outcome of classifying one stat. Exactly one variant applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Sendable,
    Broken,
    AspectSizeExceeded,
    AspectRatioExceeded,
    FormatUnsupported,
    FileSizeExceeded,
}

impl Verdict {
    pub fn is_sendable(self) -> bool {
        self == Verdict::Sendable
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Sendable => "sendable",
            Verdict::Broken => "broken",
            Verdict::AspectSizeExceeded => "width + height too large",
            Verdict::AspectRatioExceeded => "aspect ratio too extreme",
            Verdict::FormatUnsupported => "format not supported",
            Verdict::FileSizeExceeded => "file too large",
        };
        f.write_str(s)
    }
}

/// Platform limits a file must satisfy. `None` disables a check.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub expected: MediaKind,
    pub max_dimension_sum: Option<u32>,
    pub max_aspect_ratio: Option<f64>,
    /// Bytes; a file of exactly this size already fails.
    pub max_file_size: Option<u64>,
    /// Accepted containers, compared case-insensitively.
    pub formats: Vec<String>,
    /// Accepted video codecs; empty accepts any.
    pub codecs: Vec<String>,
}

impl Constraints {
    pub fn photo(config: &PhotoConfig) -> Self {
        Self {
            expected: MediaKind::Image,
            max_dimension_sum: Some(config.max_dimension_sum),
            max_aspect_ratio: Some(config.max_aspect_ratio),
            max_file_size: Some(config.max_file_size),
            formats: config.formats.clone(),
            codecs: Vec::new(),
        }
    }

    /// Videos are only checked for container, codec, and (optionally) byte size.
    pub fn video(config: &VideoConfig) -> Self {
        Self {
            expected: MediaKind::Video,
            max_dimension_sum: None,
            max_aspect_ratio: None,
            max_file_size: config.max_file_size,
            formats: config.formats.clone(),
            codecs: config.codecs.clone(),
        }
    }

    pub fn accepts_format(&self, container: &str) -> bool {
        contains_ignore_case(&self.formats, container)
    }

    pub fn accepts_codec(&self, codec: Option<&str>) -> bool {
        self.codecs.is_empty() || codec.is_some_and(|c| contains_ignore_case(&self.codecs, c))
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    !value.is_empty() && list.iter().any(|v| v.eq_ignore_ascii_case(value))
}

/// One row of the rule table.
pub struct Rule {
    pub verdict: Verdict,
    pub violated: fn(&MediaStat, &Constraints) -> bool,
}

/// The rule table in evaluation order. First violated rule wins.
pub const RULES: [Rule; 5] = [
    Rule {
        verdict: Verdict::Broken,
        violated: is_broken,
    },
    Rule {
        verdict: Verdict::AspectSizeExceeded,
        violated: exceeds_dimension_sum,
    },
    Rule {
        verdict: Verdict::AspectRatioExceeded,
        violated: exceeds_aspect_ratio,
    },
    Rule {
        verdict: Verdict::FileSizeExceeded,
        violated: exceeds_file_size,
    },
    Rule {
        verdict: Verdict::FormatUnsupported,
        violated: unsupported_format,
    },
];

/// Classify a stat against the constraints.
pub fn classify(stat: &MediaStat, constraints: &Constraints) -> Verdict {
    RULES
        .iter()
        .find(|rule| (rule.violated)(stat, constraints))
        .map_or(Verdict::Sendable, |rule| rule.verdict)
}

fn is_broken(stat: &MediaStat, c: &Constraints) -> bool {
    if stat.byte_size == 0 || !stat.declared_kind.matches(c.expected) {
        return true;
    }
    match c.expected {
        MediaKind::Image => stat.width == 0 || stat.height == 0,
        MediaKind::Video => stat.codec.is_none(),
    }
}

fn exceeds_dimension_sum(stat: &MediaStat, c: &Constraints) -> bool {
    c.max_dimension_sum
        .is_some_and(|max| stat.width as u64 + stat.height as u64 > max as u64)
}

fn exceeds_aspect_ratio(stat: &MediaStat, c: &Constraints) -> bool {
    let Some(max) = c.max_aspect_ratio else {
        return false;
    };
    if stat.width == 0 || stat.height == 0 {
        return false;
    }
    // `w/h >= max || h/w >= max`, computed one way so both orientations agree
    let long = stat.width.max(stat.height) as f64;
    let short = stat.width.min(stat.height) as f64;
    long / short >= max
}

fn exceeds_file_size(stat: &MediaStat, c: &Constraints) -> bool {
    c.max_file_size.is_some_and(|max| stat.byte_size >= max)
}

fn unsupported_format(stat: &MediaStat, c: &Constraints) -> bool {
    if !c.accepts_format(&stat.container_format) {
        return true;
    }
    c.expected == MediaKind::Video && !c.accepts_codec(stat.codec.as_deref())
}
