//! Bilibili XML exports: `<i>` root with `<d p="time,mode,size,color,timestamp,...">text</d>`.

use super::xml::collect_elements;
use super::{scale_size, SCROLLING_MODES};
use crate::comment::{Comment, RawComment, TextMetrics};
use crate::error::Result;
use tracing::debug;

/// Leading fields of the `p` attribute we care about.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Attributes {
    time: f64,
    mode: i64,
    size: i64,
    color: u32,
    timestamp: i64,
}

impl Attributes {
    /// Parse `time,mode,size,color,timestamp` followed by any number of extra fields.
    fn parse(p: &str) -> Option<Self> {
        let mut fields = p.split(',').map(str::trim);
        let time = fields.next()?.parse().ok()?;
        let mode = fields.next()?.parse().ok()?;
        let size = fields.next()?.parse().ok()?;
        let color = fields.next()?.parse().ok()?;
        let timestamp = fields.next()?.parse().ok()?;
        Some(Self {
            time,
            mode,
            size,
            color,
            timestamp,
        })
    }
}

pub(super) fn parse(
    content: &str,
    font_size: f64,
    metrics: &dyn TextMetrics,
) -> Result<Vec<Comment>> {
    let records = collect_elements(content, "d")?;
    let total = records.len();
    let mut comments = Vec::with_capacity(total);
    for record in &records {
        let Some(attrs) = record.attribute("p").and_then(Attributes::parse) else {
            continue;
        };
        let Some(position) = SCROLLING_MODES.position(attrs.mode) else {
            continue;
        };
        let raw = RawComment {
            timeline: attrs.time,
            timestamp: attrs.timestamp,
            sequence: comments.len() as i64,
            text: &record.text,
            position,
            color: attrs.color,
            size: scale_size(attrs.size as f64, font_size),
        };
        comments.push(Comment::measured(raw, metrics));
    }
    debug!(
        "bilibili: {} comments kept, {} records skipped",
        comments.len(),
        total - comments.len()
    );
    Ok(comments)
}
