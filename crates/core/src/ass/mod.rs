//! This module turns canonical comments into an ASS subtitle track.
//! It sorts comments into timed events and writes the header and dialogue lines.

use crate::comment::{Comment, Position};
use std::io::{self, Write};
use tracing::trace;

pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 240;
pub const DEFAULT_FONT_NAME: &str = "MS PGothic";
pub const DEFAULT_FONT_SIZE: f64 = 48.0;
pub const DEFAULT_ALPHA: f64 = 0.8;
/// Seconds every comment stays on screen.
pub const DEFAULT_DURATION: f64 = 5.0;
pub const DEFAULT_MARGIN_START: f64 = 5.0;

/// Style names in the order they are declared in the header.
pub const STYLE_NAMES: [&str; 3] = ["R2L", "Top", "Bottom"];

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Output settings for one generated track.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub width: u32,
    pub height: u32,
    pub font_name: String,
    pub font_size: f64,
    /// Opacity between 0 and 1, stored in the high byte of the style colors.
    pub alpha: f64,
    /// Fixed display time of every comment, in seconds.
    pub duration: f64,
    pub margin_start: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            alpha: DEFAULT_ALPHA,
            duration: DEFAULT_DURATION,
            margin_start: DEFAULT_MARGIN_START,
        }
    }
}

impl GeneratorConfig {
    /// Packed `&HAABBGGRR` value with the alpha in the high byte.
    pub fn alpha_color(&self) -> u32 {
        let alpha = (self.alpha.clamp(0.0, 1.0) * 255.0) as u32;
        alpha << 24
    }
}

/// One dialogue line of the output track.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start: f64,
    pub end: f64,
    pub style: &'static str,
    pub text: String,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

/// Style used for a canonical position.
/// Reverse scrolling comments have no style yet, so they produce no event.
pub fn style_for(position: Position) -> Option<&'static str> {
    match position {
        Position::Scroll => Some(STYLE_NAMES[0]),
        Position::Top => Some(STYLE_NAMES[1]),
        Position::Bottom => Some(STYLE_NAMES[2]),
        Position::ReverseScroll => None,
    }
}

/// Build events from the merged comments.
/// The way this works is by stable sorting on the timeline, so comments that
/// share a timestamp keep their input order, and giving every comment the same
/// fixed `duration`. No lane assignment happens here.
pub fn synthesize(mut comments: Vec<Comment>, duration: f64) -> Vec<Event> {
    trace!("synthesize comments={} duration={}", comments.len(), duration);
    comments.sort_by(|a, b| sort_key(a.timeline).total_cmp(&sort_key(b.timeline)));
    comments
        .into_iter()
        .filter_map(|comment| {
            let style = style_for(comment.position)?;
            Some(Event {
                start: comment.timeline,
                end: comment.timeline + duration,
                style,
                text: comment.text,
                margin_l: 0,
                margin_r: 0,
                margin_v: 0,
            })
        })
        .collect()
}

/// `-0.0` and `0.0` must compare equal so ties keep their order.
fn sort_key(timeline: f64) -> f64 {
    if timeline == 0.0 {
        0.0
    } else {
        timeline
    }
}

/// Format seconds as `H:MM:SS.cc`.
/// Hours are unbounded and centiseconds are truncated, never rounded. The value
/// is first rounded to whole microseconds so that exact centisecond inputs such
/// as `12.34` do not lose a centisecond to float error.
pub fn format_time(seconds: f64) -> String {
    let micros = (seconds.max(0.0) * 1_000_000.0).round() as u64;
    let cs = (micros % 1_000_000) / 10_000;
    let whole = micros / 1_000_000;
    let h = whole / 3600;
    let m = (whole % 3600) / 60;
    let s = whole % 60;
    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

/// Write the `[Script Info]`, `[V4+ Styles]` and `[Events]` headers.
pub fn write_header<W: Write>(out: &mut W, config: &GeneratorConfig) -> io::Result<()> {
    writeln!(out, "[Script Info]")?;
    writeln!(out, "ScriptType: v4.00+")?;
    writeln!(out, "PlayResX: {}", config.width)?;
    writeln!(out, "PlayResY: {}", config.height)?;
    writeln!(
        out,
        "Aspect Ratio: {:.6}",
        config.width as f64 / config.height as f64
    )?;
    writeln!(out, "Collisions: Normal")?;
    writeln!(out, "WrapStyle: 2")?;
    writeln!(out, "ScaledBorderAndShadow: yes")?;
    writeln!(out)?;

    writeln!(out, "[V4+ Styles]")?;
    writeln!(out, "{STYLE_FORMAT}")?;
    let color = config.alpha_color();
    for name in STYLE_NAMES {
        writeln!(
            out,
            "Style: {},{},{:.6},&H{:X},&H{:X},&H000000,&H000000,0,0,0,0,100,100,0,0,1,2,0,2,20,20,2,0",
            name, config.font_name, config.font_size, color, color
        )?;
    }
    writeln!(out)?;

    writeln!(out, "[Events]")?;
    writeln!(out, "{EVENT_FORMAT}")
}

/// Write one `Dialogue:` line per event. Text is written verbatim.
pub fn write_events<W: Write>(out: &mut W, events: &[Event]) -> io::Result<()> {
    for event in events {
        writeln!(
            out,
            "Dialogue: 0,{},{},{},,{},{},{},,{}",
            format_time(event.start),
            format_time(event.end),
            event.style,
            event.margin_l,
            event.margin_r,
            event.margin_v,
            event.text
        )?;
    }
    Ok(())
}

/// Synthesize events from `comments` and write the whole track to `out`.
/// Returns the number of dialogue lines written.
pub fn generate<W: Write>(
    comments: Vec<Comment>,
    out: &mut W,
    config: &GeneratorConfig,
) -> io::Result<usize> {
    trace!(
        "generate comments={} size={}x{} margin_start={}",
        comments.len(),
        config.width,
        config.height,
        config.margin_start
    );
    let events = synthesize(comments, config.duration);
    write_header(out, config)?;
    write_events(out, &events)?;
    Ok(events.len())
}
