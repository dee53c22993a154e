use crate::commands::generate::{self, GenerateOverrides, GenerateResult};
use crate::config;
use crate::error::{NovelsubError, NovelsubResult};
use crate::subtitle::GenerateOptions;
use colored::*;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_PARALLEL_JOBS: usize = 4;

/// Outcome of one script in a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub input: PathBuf,
    pub result: NovelsubResult<GenerateResult>,
}

/// Generate subtitles for every script with at most `max_parallel` in flight.
///
/// Results come back in input order. A failing script does not stop the others.
pub async fn generate_all(
    inputs: &[PathBuf],
    options: GenerateOptions,
    output_dir: PathBuf,
    max_parallel: usize,
) -> Vec<BatchItem> {
    let options = Arc::new(options);
    let output_dir = Arc::new(output_dir);

    let finished: Vec<(usize, NovelsubResult<GenerateResult>)> = stream::iter(0..inputs.len())
        .map(|i| {
            let input = inputs[i].clone();
            let options = Arc::clone(&options);
            let output_dir = Arc::clone(&output_dir);
            async move {
                let joined = tokio::task::spawn_blocking(move || {
                    generate::generate_file(&input, &options, &output_dir)
                })
                .await;
                let result = joined.unwrap_or_else(|e| {
                    Err(NovelsubError::Other(format!("generation task failed: {e}")))
                });
                (i, result)
            }
        })
        .buffer_unordered(max_parallel.max(1))
        .collect()
        .await;

    let mut slots: Vec<Option<NovelsubResult<GenerateResult>>> =
        (0..inputs.len()).map(|_| None).collect();
    for (i, result) in finished {
        slots[i] = Some(result);
    }
    inputs
        .iter()
        .zip(slots)
        .map(|(input, slot)| BatchItem {
            input: input.clone(),
            result: slot.unwrap_or_else(|| {
                Err(NovelsubError::Other("generation task produced no result".into()))
            }),
        })
        .collect()
}

pub async fn run(
    inputs: &[PathBuf],
    project: &Path,
    parallel: Option<usize>,
) -> NovelsubResult<()> {
    let config = config::load_or_default(project)?;
    config.validate()?;
    let (options, output_dir) =
        generate::resolve_options(&config, project, &GenerateOverrides::default())?;
    let max_parallel = parallel
        .or(config.output.parallel_jobs)
        .unwrap_or(DEFAULT_PARALLEL_JOBS);
    if max_parallel == 0 {
        return Err(NovelsubError::Other(
            "--parallel must be at least 1".into(),
        ));
    }

    eprintln!(
        "{} {} scripts (max {} concurrent)",
        "batch:".cyan().bold(),
        inputs.len(),
        max_parallel
    );

    let items = generate_all(inputs, options, output_dir, max_parallel).await;
    let mut failed = 0;
    for item in &items {
        match &item.result {
            Ok(r) => eprintln!(
                "  {} {} → {} ({} subtitles)",
                "ok".green(),
                item.input.display(),
                r.output_path,
                r.segments_count
            ),
            Err(e) => {
                failed += 1;
                eprintln!("  {} {}: {}", "failed".red(), item.input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(NovelsubError::Other(format!(
            "{failed} of {} scripts failed",
            items.len()
        )));
    }
    eprintln!("{} {} files written", "done:".green().bold(), items.len());
    Ok(())
}
