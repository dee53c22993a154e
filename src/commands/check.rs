use crate::error::{NovelsubError, NovelsubResult};
use crate::store;
use crate::subtitle::parse::{self, ContentCheck};
use colored::*;
use std::path::Path;

/// Read a subtitle file from disk and check its structure.
pub fn check_file(path: &Path) -> NovelsubResult<ContentCheck> {
    let bytes = std::fs::read(path)?;
    let content = store::decode_text(&bytes).ok_or_else(|| {
        NovelsubError::Other(format!("{} is not valid UTF-8 or UTF-16 text", path.display()))
    })?;
    Ok(parse::check_content(&content))
}

pub fn run(path: &Path, json: bool) -> NovelsubResult<()> {
    let check = check_file(path)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&check).unwrap_or_default()
        );
    } else if check.valid {
        eprintln!(
            "{} {} is a valid {} file with {} subtitles",
            "ok:".green().bold(),
            path.display(),
            check.format,
            check.subtitle_count
        );
    }

    match check.error {
        Some(error) if !check.valid => Err(NovelsubError::Other(format!(
            "{} is not a valid {} file: {error}",
            path.display(),
            check.format
        ))),
        _ => Ok(()),
    }
}
