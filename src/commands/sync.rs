use crate::config;
use crate::error::NovelsubResult;
use crate::input;
use crate::store::{SubtitleFile, SubtitleStore};
use crate::subtitle::render::{SubtitleFormat, TextEncoding};
use crate::subtitle::validate::ValidationReport;
use crate::subtitle::{self, SyncOptions};
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Structured result from a TTS-synchronized run.
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub input: String,
    pub mode: subtitle::SyncMode,
    pub files: Vec<SubtitleFile>,
    pub segments_count: usize,
    pub total_duration_ms: u64,
    pub validation: ValidationReport,
}

/// CLI overrides applied on top of `novelsub.toml`.
#[derive(Debug, Default, Clone)]
pub struct SyncOverrides {
    pub mode: Option<String>,
    pub format: Option<String>,
    pub offset: Option<f64>,
    pub output: Option<PathBuf>,
}

/// Parse a format selection; `both` expands to SRT and VTT.
pub fn parse_formats(value: &str) -> NovelsubResult<Vec<SubtitleFormat>> {
    if value.eq_ignore_ascii_case("both") {
        Ok(vec![SubtitleFormat::Srt, SubtitleFormat::Vtt])
    } else {
        Ok(vec![value.parse()?])
    }
}

/// Apply CLI mode and offset overrides to the configured sync options.
pub fn apply_overrides(options: &mut SyncOptions, overrides: &SyncOverrides) -> NovelsubResult<()> {
    if let Some(ref mode) = overrides.mode {
        options.mode = mode.parse()?;
    }
    if let Some(offset) = overrides.offset {
        options.start_time_offset = offset;
    }
    Ok(())
}

/// Programmatic entry point: load TTS results, synchronize, validate, and write each format.
pub fn sync_file(
    input_path: &Path,
    options: &SyncOptions,
    formats: &[SubtitleFormat],
    encoding: TextEncoding,
    output_dir: &Path,
) -> NovelsubResult<SyncResult> {
    let segments = input::load_tts_results(input_path)?;
    let synced = subtitle::generate_from_tts(&segments, options)?;
    if !synced.validation.is_accurate {
        warn!(
            "{} overlapping subtitle pairs in {}",
            synced.validation.statistics.overlaps.len(),
            input_path.display()
        );
    }

    let store = SubtitleStore::new(output_dir);
    let mut files = Vec::with_capacity(formats.len());
    for &format in formats {
        let rendered = synced.render(format);
        files.push(store.save(&rendered.file_content, format, encoding)?);
    }

    Ok(SyncResult {
        input: input_path.display().to_string(),
        mode: options.mode,
        files,
        segments_count: synced.blocks.len(),
        total_duration_ms: synced.total_duration_ms,
        validation: synced.validation,
    })
}

/// CLI entry point: delegates to `sync_file()`.
pub fn run(
    input_path: &Path,
    project: &Path,
    overrides: SyncOverrides,
    json: bool,
) -> NovelsubResult<()> {
    let mut config = config::load_or_default(project)?;
    apply_overrides(&mut config.sync, &overrides)?;
    config.validate()?;
    let options = config.sync.clone();
    let formats = match overrides.format {
        Some(ref f) => parse_formats(f)?,
        None => vec![config.subtitles.format],
    };
    let output_dir = overrides
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir(project));

    eprintln!(
        "{} {} (mode: {:?})",
        "sync:".cyan().bold(),
        input_path.display(),
        options.mode
    );

    let result = sync_file(
        input_path,
        &options,
        &formats,
        config.subtitles.encoding,
        &output_dir,
    )?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).unwrap_or_default()
        );
        return Ok(());
    }

    let stats = &result.validation.statistics;
    for file in &result.files {
        eprintln!(
            "{} {} subtitles, {:.2}s total → {}",
            "done:".green().bold(),
            result.segments_count,
            result.total_duration_ms as f64 / 1000.0,
            file.path.display()
        );
    }
    for gap in &stats.gaps {
        eprintln!(
            "  {} {:.2}s gap between #{} and #{}",
            "gap:".yellow(),
            gap.gap,
            gap.from,
            gap.to
        );
    }
    for overlap in &stats.overlaps {
        eprintln!(
            "  {} #{} and #{} overlap by {:.2}s",
            "overlap:".red(),
            overlap.segment1,
            overlap.segment2,
            overlap.overlap
        );
    }
    if result.validation.is_accurate {
        eprintln!("{} timeline has no overlaps", "check:".green().bold());
    } else {
        eprintln!(
            "{} timeline has {} overlaps",
            "check:".red().bold(),
            stats.overlaps.len()
        );
    }
    Ok(())
}
