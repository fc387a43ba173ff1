//! Format detection and dispatch to the per-platform danmaku parsers.
//! Every parser produces the canonical [`Comment`] model.

use crate::comment::{CharCount, Comment, Position, TextMetrics};
use crate::error::{Error, Result};
use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;
use tracing::trace;

mod acfun;
mod bilibili;
mod niconico;
mod xml;

/// Number of leading bytes the probe looks at.
pub const PROBE_LEN: usize = 100;

/// Font size the Bilibili and AcFun exports use as their reference.
pub const REFERENCE_FONT_SIZE: f64 = 25.0;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Source encodings we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// XML with an `<i>` root and `<d p="...">` records.
    Bilibili,
    /// XML with `<chat>` records.
    Niconico,
    /// A JSON array of comment objects.
    Acfun,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Bilibili => "bilibili",
            Format::Niconico => "niconico",
            Format::Acfun => "acfun",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bilibili" => Ok(Format::Bilibili),
            "niconico" => Ok(Format::Niconico),
            "acfun" => Ok(Format::Acfun),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Classify content from its first bytes.
/// Only the first [`PROBE_LEN`] bytes are inspected and the rest is not validated.
pub fn detect_format(content: &[u8]) -> Result<Format> {
    let prefix = &content[..content.len().min(PROBE_LEN)];
    let prefix = prefix.strip_prefix(UTF8_BOM).unwrap_or(prefix);
    if prefix.starts_with(b"<?xml") {
        if contains(prefix, b"<i>") {
            return Ok(Format::Bilibili);
        }
        if contains(prefix, b"<chat>") || contains(prefix, b"<chat ") {
            return Ok(Format::Niconico);
        }
    } else if prefix.starts_with(b"[") {
        return Ok(Format::Acfun);
    }
    Err(Error::UnrecognizedFormat)
}

/// Probe a seekable stream without consuming it.
/// The way this works is by reading a bounded prefix and seeking back to
/// where the stream was before returning, also on failure.
pub fn probe_format<R: Read + Seek>(reader: &mut R) -> Result<Format> {
    let start = reader.stream_position()?;
    let mut prefix = Vec::with_capacity(PROBE_LEN);
    let read = reader.by_ref().take(PROBE_LEN as u64).read_to_end(&mut prefix);
    reader.seek(SeekFrom::Start(start))?;
    read?;
    trace!("probe_format read {} bytes", prefix.len());
    detect_format(&prefix)
}

/// Parse `content` as `format`, measuring text by character count.
pub fn parse(content: &str, format: Format, font_size: f64) -> Result<Vec<Comment>> {
    parse_with(content, format, font_size, &CharCount)
}

/// Parse `content` as `format` using the given text metrics.
/// A malformed document fails as a whole; unmappable records are skipped.
pub fn parse_with(
    content: &str,
    format: Format,
    font_size: f64,
    metrics: &dyn TextMetrics,
) -> Result<Vec<Comment>> {
    trace!("parse format={} font_size={}", format, font_size);
    match format {
        Format::Bilibili => bilibili::parse(content, font_size, metrics),
        Format::Niconico => niconico::parse(content, font_size, metrics),
        Format::Acfun => acfun::parse(content, font_size, metrics),
    }
}

/// Lookup table from a platform's numeric mode code to a canonical position.
#[derive(Debug, Clone, Copy)]
pub struct ModeTable {
    entries: &'static [(i64, Position)],
}

impl ModeTable {
    /// Build a table, rejecting duplicate codes. Only called from `const`
    /// items, so a duplicate is a compile error.
    pub(crate) const fn new(entries: &'static [(i64, Position)]) -> Self {
        let mut i = 0;
        while i < entries.len() {
            let mut j = i + 1;
            while j < entries.len() {
                if entries[i].0 == entries[j].0 {
                    panic!("duplicate mode code in mode table");
                }
                j += 1;
            }
            i += 1;
        }
        Self { entries }
    }

    /// `None` means the record should be skipped.
    pub fn position(&self, code: i64) -> Option<Position> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, p)| *p)
    }
}

/// Mode codes shared by Bilibili and AcFun.
pub const SCROLLING_MODES: ModeTable = ModeTable::new(&[
    (1, Position::Scroll),
    (4, Position::Bottom),
    (5, Position::Top),
    (6, Position::ReverseScroll),
]);

/// Scale a platform size relative to [`REFERENCE_FONT_SIZE`].
pub(crate) fn scale_size(raw_size: f64, font_size: f64) -> f64 {
    raw_size * font_size / REFERENCE_FONT_SIZE
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
