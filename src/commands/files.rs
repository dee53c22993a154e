use crate::cli::FilesAction;
use crate::config;
use crate::error::NovelsubResult;
use crate::store::SubtitleStore;
use colored::*;
use std::path::Path;

pub fn run(project: &Path, action: FilesAction) -> NovelsubResult<()> {
    let config = config::load_or_default(project)?;
    let store = SubtitleStore::new(config.output_dir(project));

    match action {
        FilesAction::List { json } => {
            let files = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&files).unwrap_or_default());
                return Ok(());
            }
            if files.is_empty() {
                eprintln!("No subtitle files in {}", store.dir().display());
                return Ok(());
            }
            for file in &files {
                println!("{:<48} {:>4} {:>10}", file.filename, file.format, human_size(file.size));
            }
        }
        FilesAction::Stats => {
            let stats = store.stats()?;
            eprintln!("{} {}", "files:".cyan().bold(), store.dir().display());
            eprintln!("  total:  {} ({})", stats.total_files, human_size(stats.total_size));
            for (format, count) in &stats.formats {
                eprintln!("  {format}:    {count}");
            }
            let dist = &stats.size_distribution;
            eprintln!(
                "  sizes:  {} under 1 KB, {} under 10 KB, {} larger",
                dist.small, dist.medium, dist.large
            );
        }
        FilesAction::Delete { filename } => {
            store.delete(&filename)?;
            eprintln!("{} Deleted {}", "done:".green().bold(), filename);
        }
    }
    Ok(())
}

fn human_size(bytes: u64) -> String {
    match bytes {
        0..=1023 => format!("{bytes} B"),
        1024..=1_048_575 => format!("{:.1} KB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MB", bytes as f64 / 1_048_576.0),
    }
}
