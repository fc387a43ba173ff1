//! Core library for converting danmaku comment exports into ASS subtitles.
//! It exposes format detection, the per-platform parsers and the ASS writer.

pub mod ass;
pub mod comment;
pub mod convert;
pub mod error;
pub mod parser;

pub use comment::{CharCount, Comment, Position, TextMetrics};
pub use error::{Error, Result};
pub use parser::{detect_format, parse, parse_with, probe_format, Format};
