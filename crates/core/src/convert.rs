//! Batch conversion driver.
//! This module wires probing, parsing and ASS generation over a list of files.

use crate::ass::{generate, GeneratorConfig};
use crate::comment::Comment;
use crate::parser::{self, Format};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Outcome of a batch conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertSummary {
    pub files_converted: usize,
    pub files_skipped: usize,
    pub comments: usize,
    pub lines_written: usize,
}

/// Output path used when none is given: the first input's stem with `.ass`,
/// in the current directory.
pub fn default_output_path(first_input: &Path) -> PathBuf {
    let stem = first_input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    PathBuf::from(format!("{stem}.ass"))
}

/// Read and parse one input file.
/// The way this works is by probing the open file (unless `forced` names the
/// format), then reading the whole file from the restored position.
pub fn load_comments(
    path: &Path,
    font_size: f64,
    forced: Option<Format>,
) -> crate::Result<Vec<Comment>> {
    trace!("load_comments path={}", path.display());
    let mut file = File::open(path)?;
    let format = match forced {
        Some(format) => format,
        None => parser::probe_format(&mut file)?,
    };
    debug!("{}: reading as {}", path.display(), format);
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    parser::parse(&content, format, font_size)
}

/// Convert every input into a single ASS track at `output`.
/// A file that cannot be opened, recognized or parsed is reported and skipped;
/// only a failure to write the output aborts the run.
pub fn convert_files(
    inputs: &[PathBuf],
    output: &Path,
    config: &GeneratorConfig,
    forced: Option<Format>,
) -> Result<ConvertSummary> {
    trace!("convert_files inputs={} output={}", inputs.len(), output.display());
    let mut summary = ConvertSummary::default();
    let mut comments = Vec::new();
    for input in inputs {
        match load_comments(input, config.font_size, forced) {
            Ok(parsed) => {
                info!("{}: {} comments", input.display(), parsed.len());
                summary.files_converted += 1;
                comments.extend(parsed);
            }
            Err(err) => {
                warn!("skipping {}: {}", input.display(), err);
                summary.files_skipped += 1;
            }
        }
    }
    summary.comments = comments.len();

    info!("writing output to {}", output.display());
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    summary.lines_written = generate(comments, &mut writer, config)
        .with_context(|| format!("failed to write {}", output.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "wrote {} dialogue lines to {}",
        summary.lines_written,
        output.display()
    );
    Ok(summary)
}
