//! AcFun JSON exports: a top-level array of `{time, mode, size, color, content}` objects.

use super::{scale_size, SCROLLING_MODES};
use crate::comment::{Comment, RawComment, TextMetrics, DEFAULT_COLOR};
use crate::error::Result;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Record {
    time: f64,
    mode: i64,
    size: i64,
    color: u32,
    content: String,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            time: 0.0,
            mode: 0,
            size: 0,
            color: DEFAULT_COLOR,
            content: String::new(),
        }
    }
}

pub(super) fn parse(
    content: &str,
    font_size: f64,
    metrics: &dyn TextMetrics,
) -> Result<Vec<Comment>> {
    let records: Vec<Record> = serde_json::from_str(content)?;
    let comments: Vec<Comment> = records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let position = SCROLLING_MODES.position(record.mode)?;
            let raw = RawComment {
                timeline: record.time,
                // the export carries no post time
                timestamp: 0,
                sequence: i as i64,
                text: &record.content,
                position,
                color: record.color,
                size: scale_size(record.size as f64, font_size),
            };
            Some(Comment::measured(raw, metrics))
        })
        .collect();
    debug!(
        "acfun: {} comments kept, {} records skipped",
        comments.len(),
        records.len() - comments.len()
    );
    Ok(comments)
}
