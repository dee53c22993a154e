use crate::config::{self, ProjectConfig};
use crate::error::NovelsubResult;
use crate::input;
use crate::store::SubtitleStore;
use crate::subtitle::render::TextEncoding;
use crate::subtitle::{self, GenerateOptions};
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Structured result from generating one subtitle file.
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub input: String,
    pub filename: String,
    pub output_path: String,
    pub format: String,
    pub encoding: TextEncoding,
    pub segments_count: usize,
    pub total_duration_ms: u64,
    pub file_size: u64,
}

/// CLI overrides applied on top of `novelsub.toml`.
#[derive(Debug, Default, Clone)]
pub struct GenerateOverrides {
    pub format: Option<String>,
    pub encoding: Option<String>,
    pub output: Option<PathBuf>,
}

/// Resolve options and output directory from a loaded project config plus overrides.
pub fn resolve_options(
    config: &ProjectConfig,
    project: &Path,
    overrides: &GenerateOverrides,
) -> NovelsubResult<(GenerateOptions, PathBuf)> {
    let mut options = config.subtitles.clone();
    if let Some(ref format) = overrides.format {
        options.format = format.parse()?;
    }
    if let Some(ref encoding) = overrides.encoding {
        options.encoding = encoding.parse()?;
    }
    let output_dir = overrides
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir(project));
    Ok((options, output_dir))
}

/// Programmatic entry point: load a script, render it, and write the file.
pub fn generate_file(
    input_path: &Path,
    options: &GenerateOptions,
    output_dir: &Path,
) -> NovelsubResult<GenerateResult> {
    let segments = input::load_segments(input_path)?;
    let result = subtitle::generate_subtitles(&segments, options)?;

    let store = SubtitleStore::new(output_dir);
    let saved = store.save(&result.file_content, result.format, options.encoding)?;
    info!(
        "Generated {} blocks from {} into {}",
        result.segments_count,
        input_path.display(),
        saved.filename
    );

    Ok(GenerateResult {
        input: input_path.display().to_string(),
        filename: saved.filename,
        output_path: saved.path.display().to_string(),
        format: result.format.to_string(),
        encoding: options.encoding,
        segments_count: result.segments_count,
        total_duration_ms: result.total_duration_ms,
        file_size: saved.size,
    })
}

/// CLI entry point: delegates to `generate_file()`.
pub fn run(
    input_path: &Path,
    project: &Path,
    overrides: GenerateOverrides,
    json: bool,
) -> NovelsubResult<()> {
    let config = config::load_or_default(project)?;
    config.validate()?;
    let (options, output_dir) = resolve_options(&config, project, &overrides)?;
    eprintln!(
        "{} {} ({}, {} chars x {} lines)",
        "generate:".cyan().bold(),
        input_path.display(),
        options.format,
        options.max_chars_per_line,
        options.max_lines
    );

    let result = generate_file(input_path, &options, &output_dir)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).unwrap_or_default()
        );
    } else {
        eprintln!(
            "{} {} subtitles, {:.1}s total → {}",
            "done:".green().bold(),
            result.segments_count,
            result.total_duration_ms as f64 / 1000.0,
            result.output_path
        );
    }
    Ok(())
}
