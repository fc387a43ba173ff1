//! Canonical comment model shared by every platform parser.

use serde::{Deserialize, Serialize};

/// Packed RGB white, used when a source does not carry a color.
pub const DEFAULT_COLOR: u32 = 0xFF_FFFF;

/// How a comment travels across the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Scroll = 0,
    Top = 1,
    Bottom = 2,
    ReverseScroll = 3,
}

/// A single danmaku comment after platform-specific decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Seconds from the start of the video.
    pub timeline: f64,
    /// UNIX seconds when the comment was posted, 0 when unknown.
    pub timestamp: i64,
    pub sequence: i64,
    pub text: String,
    pub position: Position,
    pub color: u32,
    pub size: f64,
    pub height: f64,
    pub width: f64,
}

/// Estimates the rendered width of a text run in units of font size.
pub trait TextMetrics {
    fn measure(&self, text: &str) -> f64;
}

/// Counts characters. Not a real glyph metric.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharCount;

impl TextMetrics for CharCount {
    fn measure(&self, text: &str) -> f64 {
        text.chars().count() as f64
    }
}

/// Fields a parser extracted from one record, before measurement.
#[derive(Debug, Clone)]
pub(crate) struct RawComment<'a> {
    pub timeline: f64,
    pub timestamp: i64,
    pub sequence: i64,
    pub text: &'a str,
    pub position: Position,
    pub color: u32,
    pub size: f64,
}

impl Comment {
    /// Build a canonical comment, normalizing `/n` markers and measuring the text.
    /// Width and height are computed here once and never revisited.
    pub(crate) fn measured(raw: RawComment<'_>, metrics: &dyn TextMetrics) -> Self {
        let text = normalize_line_breaks(raw.text);
        let lines = text.matches('\n').count() + 1;
        let height = lines as f64 * raw.size;
        let width = metrics.measure(&text) * raw.size;
        Self {
            timeline: raw.timeline,
            timestamp: raw.timestamp,
            sequence: raw.sequence,
            text,
            position: raw.position,
            color: raw.color,
            size: raw.size,
            height,
            width,
        }
    }
}

/// Replace the literal two-character `/n` marker with a real line break.
pub fn normalize_line_breaks(text: &str) -> String {
    text.replace("/n", "\n")
}
