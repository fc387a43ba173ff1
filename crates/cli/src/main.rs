//! Binary entry point for the danmaku to ASS converter.

use anyhow::Result;
use clap::Parser;
use danmaku2ass_core::ass::{
    GeneratorConfig, DEFAULT_ALPHA, DEFAULT_DURATION, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE,
    DEFAULT_MARGIN_START,
};
use danmaku2ass_core::convert::{convert_files, default_output_path};
use danmaku2ass_core::Format;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SIZE: &str = "320x240";

/// Command line options for the binary.
#[derive(Parser)]
#[command(about = "Convert Bilibili, Niconico and AcFun danmaku into ASS subtitles")]
struct Cli {
    /// Output file. Defaults to the first input's name with an `.ass` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Video frame size as WIDTHxHEIGHT.
    #[arg(short, long, value_parser = parse_size, default_value = DEFAULT_SIZE)]
    size: (u32, u32),

    #[arg(long, default_value = DEFAULT_FONT_NAME)]
    font_name: String,

    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    font_size: f64,

    /// Text opacity between 0 and 1.
    #[arg(short, long, default_value_t = DEFAULT_ALPHA)]
    alpha: f64,

    /// Seconds every comment stays on screen.
    #[arg(long, default_value_t = DEFAULT_DURATION)]
    duration: f64,

    #[arg(long, default_value_t = DEFAULT_MARGIN_START)]
    duration_margin: f64,

    /// Read every input as this format (bilibili, niconico, acfun) instead of detecting it.
    #[arg(long)]
    format: Option<String>,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,

    /// Danmaku files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

/// Parse a `WIDTHxHEIGHT` frame size.
fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("invalid screen size format: {s}"))?;
    let width: u32 = w
        .parse()
        .map_err(|_| format!("invalid screen width: {w}"))?;
    let height: u32 = h
        .parse()
        .map_err(|_| format!("invalid screen height: {h}"))?;
    if width == 0 || height == 0 {
        return Err(format!("screen size must be positive: {s}"));
    }
    Ok((width, height))
}

/// Application entry point which parses CLI args and runs the conversion.
/// A failure to write the output is returned from `main`, giving a nonzero exit status.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("danmaku2ass=trace".parse()?)
            .add_directive("danmaku2ass_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("danmaku2ass=info".parse()?)
            .add_directive("danmaku2ass_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let forced = cli.format.as_deref().map(str::parse::<Format>).transpose()?;
    let output = match cli.output {
        Some(path) => path,
        None => default_output_path(&cli.inputs[0]),
    };
    let (width, height) = cli.size;
    let config = GeneratorConfig {
        width,
        height,
        font_name: cli.font_name,
        font_size: cli.font_size,
        alpha: cli.alpha,
        duration: cli.duration,
        margin_start: cli.duration_margin,
    };

    let summary = convert_files(&cli.inputs, &output, &config, forced)?;
    if summary.files_skipped > 0 {
        info!("{} input file(s) skipped", summary.files_skipped);
    }
    info!("successfully converted to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use danmaku2ass_core::ass::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

    /// Ensure frame sizes parse and reject malformed values.
    #[test]
    fn parses_frame_size() {
        assert_eq!(parse_size("1920x1080").unwrap(), (1920, 1080));
        assert!(parse_size("1920").is_err());
        assert!(parse_size("axb").is_err());
        assert!(parse_size("0x240").is_err());
    }

    /// Ensure defaults match the library configuration.
    #[test]
    fn uses_library_defaults() {
        let cli = Cli::try_parse_from(["danmaku2ass", "in.xml"]).unwrap();
        assert_eq!(cli.size, (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(cli.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(cli.duration, DEFAULT_DURATION);
        assert_eq!(cli.font_name, GeneratorConfig::default().font_name);
        assert_eq!(cli.alpha, DEFAULT_ALPHA);
        assert!(cli.output.is_none());
    }

    /// Ensure at least one input is required.
    #[test]
    fn requires_inputs() {
        assert!(Cli::try_parse_from(["danmaku2ass"]).is_err());
    }
}
