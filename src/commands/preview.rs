use crate::config;
use crate::error::NovelsubResult;
use crate::store::SubtitleStore;
use crate::subtitle::parse::{self, PreviewCue};
use crate::subtitle::render::{format_timestamp, SubtitleFormat};
use colored::*;
use std::path::Path;

/// Load a stored file and shift its cues by `offset` seconds at `speed`.
pub fn preview_file(
    store: &SubtitleStore,
    filename: &str,
    offset: f64,
    speed: f64,
) -> NovelsubResult<Vec<PreviewCue>> {
    let content = store.read(filename)?;
    let cues = parse::parse_content(&content)?;
    parse::preview(&cues, offset, speed)
}

pub fn run(
    project: &Path,
    filename: &str,
    offset: f64,
    speed: f64,
    json: bool,
) -> NovelsubResult<()> {
    let config = config::load_or_default(project)?;
    let store = SubtitleStore::new(config.output_dir(project));
    let cues = preview_file(&store, filename, offset, speed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cues).unwrap_or_default());
        return Ok(());
    }

    eprintln!(
        "{} {} ({} cues, offset {:+.2}s, speed {}x)",
        "preview:".cyan().bold(),
        filename,
        cues.len(),
        offset,
        speed
    );
    for (i, cue) in cues.iter().enumerate() {
        println!(
            "{:>4}  {} --> {}  {}",
            cue.index.unwrap_or(i + 1),
            format_timestamp(cue.start_ms, SubtitleFormat::Srt),
            format_timestamp(cue.end_ms, SubtitleFormat::Srt),
            cue.text.replace('\n', " / ")
        );
    }
    Ok(())
}
