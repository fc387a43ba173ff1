//! Niconico XML exports: `<packet>` root with `<chat vpos no date mail>` records.
//! Styling lives in the space separated `mail` command string.

use super::xml::{collect_elements, Element};
use crate::comment::{Comment, Position, RawComment, TextMetrics, DEFAULT_COLOR};
use crate::error::Result;
use std::str::FromStr;
use tracing::debug;

/// `vpos` is expressed in hundredths of a second.
const VPOS_PER_SECOND: f64 = 100.0;

const BIG_SCALE: f64 = 1.5;
const SMALL_SCALE: f64 = 0.5;

#[derive(Debug)]
struct Record<'a> {
    vpos: i64,
    no: i64,
    date: i64,
    mail: &'a str,
    content: &'a str,
}

impl<'a> Record<'a> {
    /// Missing numeric attributes read as 0; a present but non-numeric one
    /// rejects the record.
    fn from_element(element: &'a Element) -> Option<Self> {
        Some(Self {
            vpos: numeric(element, "vpos")?,
            no: numeric(element, "no")?,
            date: numeric(element, "date")?,
            mail: element.attribute("mail").unwrap_or_default(),
            content: &element.text,
        })
    }
}

fn numeric<T: FromStr + Default>(element: &Element, name: &str) -> Option<T> {
    match element.attribute(name) {
        Some(value) => value.trim().parse().ok(),
        None => Some(T::default()),
    }
}

/// One token of the `mail` command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Top,
    Bottom,
    Big,
    Small,
    Color(u32),
}

impl Command {
    /// Unknown tokens yield `None` and are ignored by the caller.
    fn parse(token: &str) -> Option<Self> {
        match token {
            "ue" => Some(Command::Top),
            "shita" => Some(Command::Bottom),
            "big" => Some(Command::Big),
            "small" => Some(Command::Small),
            _ if token.len() == 6 && token.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(token, 16).ok().map(Command::Color)
            }
            _ => None,
        }
    }
}

/// Per-comment style, built by applying commands left to right.
/// Later commands override earlier ones only for the attribute they target.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Style {
    position: Position,
    color: u32,
    size: f64,
}

impl Style {
    fn new(font_size: f64) -> Self {
        Self {
            position: Position::Scroll,
            color: DEFAULT_COLOR,
            size: font_size,
        }
    }

    fn apply(&mut self, command: Command, font_size: f64) {
        match command {
            Command::Top => self.position = Position::Top,
            Command::Bottom => self.position = Position::Bottom,
            Command::Big => self.size = font_size * BIG_SCALE,
            Command::Small => self.size = font_size * SMALL_SCALE,
            Command::Color(rgb) => self.color = rgb,
        }
    }

    fn from_mail(mail: &str, font_size: f64) -> Self {
        let mut style = Self::new(font_size);
        for command in mail.split(' ').filter_map(Command::parse) {
            style.apply(command, font_size);
        }
        style
    }
}

pub(super) fn parse(
    content: &str,
    font_size: f64,
    metrics: &dyn TextMetrics,
) -> Result<Vec<Comment>> {
    let elements = collect_elements(content, "chat")?;
    let comments: Vec<Comment> = elements
        .iter()
        .filter_map(Record::from_element)
        .map(|record| {
            let style = Style::from_mail(record.mail, font_size);
            let raw = RawComment {
                timeline: record.vpos as f64 / VPOS_PER_SECOND,
                timestamp: record.date,
                sequence: record.no,
                text: record.content,
                position: style.position,
                color: style.color,
                size: style.size,
            };
            Comment::measured(raw, metrics)
        })
        .collect();
    debug!(
        "niconico: {} comments kept, {} records skipped",
        comments.len(),
        elements.len() - comments.len()
    );
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CharCount;
    use crate::error::Error;

    /// Ensure positioning and size commands compose.
    #[test]
    fn composes_position_and_size() {
        let style = Style::from_mail("ue big", 48.0);
        assert_eq!(style.position, Position::Top);
        assert_eq!(style.size, 72.0);
        assert_eq!(style.color, DEFAULT_COLOR);
    }

    /// Ensure a three character token is never read as a color.
    #[test]
    fn ignores_short_numeric_tokens() {
        let style = Style::from_mail("184", 48.0);
        assert_eq!(style, Style::new(48.0));
        assert_eq!(style.position, Position::Scroll);
    }

    /// Ensure the last command wins for each attribute.
    #[test]
    fn last_command_wins_per_attribute() {
        let style = Style::from_mail("ue big ff0000 shita small 00ff00", 40.0);
        assert_eq!(style.position, Position::Bottom);
        assert_eq!(style.size, 20.0);
        assert_eq!(style.color, 0x00FF00);
    }

    /// Verify color tokens must be six hex digits.
    #[test]
    fn parses_color_tokens() {
        assert_eq!(Command::parse("FFcc00"), Some(Command::Color(0xFFCC00)));
        assert_eq!(Command::parse("+12345"), None);
        assert_eq!(Command::parse("fffff"), None);
        assert_eq!(Command::parse("zzzzzz"), None);
        assert_eq!(Command::parse("mincho"), None);
        assert_eq!(Command::parse(""), None);
    }

    /// Ensure records convert vpos to seconds and keep their platform numbering.
    #[test]
    fn parses_chat_records() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<packet>
  <thread thread="1" last_res="2"/>
  <chat thread="1" no="10" vpos="1234" date="1500000000" mail="184 shita" user_id="u1">bottom</chat>
  <chat thread="1" no="11" vpos="50" date="1500000001" user_id="u2">plain</chat>
</packet>"#;
        let comments = parse(xml, 48.0, &CharCount).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].timeline, 12.34);
        assert_eq!(comments[0].sequence, 10);
        assert_eq!(comments[0].timestamp, 1_500_000_000);
        assert_eq!(comments[0].position, Position::Bottom);
        assert_eq!(comments[0].width, 6.0 * 48.0);
        assert_eq!(comments[1].timeline, 0.5);
        assert_eq!(comments[1].position, Position::Scroll);
        assert_eq!(comments[1].size, 48.0);
    }

    /// Ensure chats spread across several threads are all kept.
    #[test]
    fn parses_interleaved_threads() {
        let xml = r#"<?xml version="1.0"?><packet><chat vpos="1" no="1">a</chat><thread thread="1"/><chat vpos="2" no="2">b</chat></packet>"#;
        let comments = parse(xml, 48.0, &CharCount).unwrap();
        let seq: Vec<i64> = comments.iter().map(|c| c.sequence).collect();
        assert_eq!(seq, vec![1, 2]);
    }

    /// Ensure comment text keeps surrounding spaces and width counts them.
    #[test]
    fn keeps_padding_in_text() {
        let xml = r#"<?xml version="1.0"?><packet><chat vpos="1"> x </chat></packet>"#;
        let comments = parse(xml, 10.0, &CharCount).unwrap();
        assert_eq!(comments[0].text, " x ");
        assert_eq!(comments[0].width, 30.0);
    }

    /// Ensure a non-numeric vpos drops only that record.
    #[test]
    fn skips_records_with_bad_numbers() {
        let xml = r#"<?xml version="1.0"?><packet><chat vpos="soon">a</chat><chat vpos="100">b</chat></packet>"#;
        let comments = parse(xml, 48.0, &CharCount).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].timeline, 1.0);
    }

    /// Ensure a malformed document fails as a whole.
    #[test]
    fn fails_on_malformed_xml() {
        let broken = r#"<?xml version="1.0"?><packet><chat vpos="1">x</packet>"#;
        assert!(matches!(parse(broken, 48.0, &CharCount), Err(Error::Xml(_))));
    }
}
