use crate::error::{NovelsubError, NovelsubResult};
use crate::subtitle::{ContentSegment, TimedSegment, TtsResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Script files hold either a bare list or a list under a named key.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Segments { segments: Vec<T> },
    TtsResults {
        #[serde(rename = "ttsResults", alias = "tts_results")]
        tts_results: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(v) => v,
            Listing::Segments { segments } => segments,
            Listing::TtsResults { tts_results } => tts_results,
        }
    }
}

/// Load content segments for the standalone path.
pub fn load_segments(path: &Path) -> NovelsubResult<Vec<ContentSegment>> {
    load_listing(path)
}

/// Load TTS result records and pair each segment with its reported timing.
pub fn load_tts_results(path: &Path) -> NovelsubResult<Vec<TimedSegment>> {
    let results: Vec<TtsResult> = load_listing(path)?;
    Ok(results.into_iter().map(TimedSegment::from).collect())
}

fn load_listing<T: DeserializeOwned>(path: &Path) -> NovelsubResult<Vec<T>> {
    let content = std::fs::read_to_string(path)?;
    let listing: Listing<T> = parse_by_extension(path, &content)?;
    let items = listing.into_vec();
    if items.is_empty() {
        return Err(NovelsubError::EmptyInput);
    }
    Ok(items)
}

fn parse_by_extension<T: DeserializeOwned>(path: &Path, content: &str) -> NovelsubResult<T> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| e.to_string()),
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        other => Err(format!(
            "unsupported input extension '.{other}' (expected .json, .yaml or .yml)"
        )),
    };
    parsed.map_err(|message| NovelsubError::InputParse {
        path: path.to_path_buf(),
        message,
    })
}
