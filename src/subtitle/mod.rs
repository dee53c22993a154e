pub mod duration;
pub mod parse;
pub mod render;
pub mod segmenter;
pub mod timeline;
pub mod validate;

use crate::error::{NovelsubError, NovelsubResult};
use duration::{CharsPerMinute, CharsPerSecond};
use render::{SubtitleFormat, TextEncoding};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validate::ValidationReport;

/// How a segment is voiced in the script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    #[default]
    Narration,
    Dialogue,
    Monologue,
}

/// One unit of narration or dialogue attributed to a character.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentSegment {
    pub id: String,
    /// Kept optional so a missing field can be reported against the segment id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default = "default_character")]
    pub character: String,
    #[serde(default = "default_emotion")]
    pub emotion: String,
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: SegmentKind,
    /// Known duration in seconds, 0 when unknown.
    #[serde(default)]
    pub duration: f64,
}

fn default_character() -> String {
    "narrator".into()
}
fn default_emotion() -> String {
    "neutral".into()
}

impl ContentSegment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            character: default_character(),
            emotion: default_emotion(),
            kind: SegmentKind::default(),
            duration: 0.0,
        }
    }

    /// The segment text, or `InvalidSegment` when it is missing or blank.
    pub fn require_text(&self) -> NovelsubResult<&str> {
        match self.text.as_deref() {
            Some(t) if !t.trim().is_empty() => Ok(t),
            Some(_) => Err(NovelsubError::InvalidSegment {
                id: self.id.clone(),
                reason: "text is empty".into(),
            }),
            None => Err(NovelsubError::InvalidSegment {
                id: self.id.clone(),
                reason: "missing text".into(),
            }),
        }
    }
}

/// Largest timing value, in seconds, accepted from TTS results or as an offset.
pub const MAX_TIMING_SECS: f64 = 1_000_000_000.0;

/// Audio timing reported by the TTS stage for one segment, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTiming {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
}

impl ExternalTiming {
    /// Reject values that cannot describe a point on an audio timeline.
    pub fn check(&self, segment_id: &str) -> NovelsubResult<()> {
        let fields = [
            ("startTime", self.start_time),
            ("endTime", self.end_time),
            ("duration", self.duration),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(NovelsubError::InvalidSegment {
                        id: segment_id.to_string(),
                        reason: format!("{name} must be a non-negative number of seconds, got {v}"),
                    });
                }
                if v > MAX_TIMING_SECS {
                    return Err(NovelsubError::InvalidSegment {
                        id: segment_id.to_string(),
                        reason: format!("{name} exceeds {MAX_TIMING_SECS} seconds, got {v}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Reported duration, derived from `endTime - startTime` when not given directly.
    pub fn effective_duration(&self) -> f64 {
        match (self.duration, self.start_time, self.end_time) {
            (Some(d), _, _) if d > 0.0 => d,
            (_, Some(start), Some(end)) if end > start => end - start,
            (Some(d), _, _) => d,
            _ => 0.0,
        }
    }
}

/// A content segment paired with whatever timing the TTS stage reported for it.
#[derive(Debug, Clone)]
pub struct TimedSegment {
    pub segment: ContentSegment,
    pub timing: Option<ExternalTiming>,
}

/// One TTS result record as emitted by the synthesis stage (flat camelCase layout).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsResult {
    pub segment_id: String,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_character")]
    pub character: String,
    #[serde(default = "default_emotion")]
    pub emotion: String,
    #[serde(default, rename = "type")]
    pub kind: SegmentKind,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub audio_file: Option<String>,
}

impl From<TtsResult> for TimedSegment {
    fn from(r: TtsResult) -> Self {
        let text = r
            .original_text
            .filter(|t| !t.trim().is_empty())
            .or(r.text);
        TimedSegment {
            segment: ContentSegment {
                id: r.segment_id,
                text,
                character: r.character,
                emotion: r.emotion,
                kind: r.kind,
                duration: r.duration.unwrap_or(0.0),
            },
            timing: Some(ExternalTiming {
                start_time: r.start_time,
                end_time: r.end_time,
                duration: r.duration,
                audio_file: r.audio_file,
            }),
        }
    }
}

/// Where a subtitle block came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSource {
    pub segment_id: String,
    /// 0-based position of this block within its segment.
    pub block_index: usize,
    pub total_blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_start_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_duration_secs: Option<f64>,
}

/// One timed, screen-sized piece of subtitle text. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleBlock {
    pub id: usize,
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,
    pub character: String,
    pub emotion: String,
    pub kind: SegmentKind,
    pub source: BlockSource,
}

/// Options for the standalone path. Durations are milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateOptions {
    #[serde(default)]
    pub format: SubtitleFormat,
    #[serde(default)]
    pub encoding: TextEncoding,
    #[serde(default = "default_max_chars")]
    pub max_chars_per_line: usize,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
    #[serde(default = "default_reading_speed")]
    pub reading_speed: CharsPerSecond,
}

fn default_max_chars() -> usize {
    40
}
fn default_max_lines() -> usize {
    2
}
fn default_min_duration_ms() -> u64 {
    1000
}
fn default_max_duration_ms() -> u64 {
    7000
}
fn default_reading_speed() -> CharsPerSecond {
    CharsPerSecond(4.0)
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: SubtitleFormat::default(),
            encoding: TextEncoding::default(),
            max_chars_per_line: default_max_chars(),
            max_lines: default_max_lines(),
            min_duration_ms: default_min_duration_ms(),
            max_duration_ms: default_max_duration_ms(),
            reading_speed: default_reading_speed(),
        }
    }
}

impl GenerateOptions {
    pub fn limits(&self) -> segmenter::SegmentLimits {
        segmenter::SegmentLimits {
            max_chars_per_line: self.max_chars_per_line,
            max_lines: self.max_lines,
        }
    }

    pub fn display_timing(&self) -> duration::DisplayTiming {
        duration::DisplayTiming {
            min_ms: self.min_duration_ms,
            max_ms: self.max_duration_ms,
            reading_speed: self.reading_speed,
        }
    }
}

/// Timing reconciliation policy for TTS-synchronized subtitles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Trust the TTS-reported timings.
    Accurate,
    /// Ignore TTS timings and estimate from text length.
    Estimated,
    /// Prefer TTS timings, estimating per segment where they are missing.
    #[default]
    Hybrid,
}

impl std::str::FromStr for SyncMode {
    type Err = NovelsubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accurate" => Ok(SyncMode::Accurate),
            "estimated" => Ok(SyncMode::Estimated),
            "hybrid" => Ok(SyncMode::Hybrid),
            other => Err(NovelsubError::Other(format!(
                "Unknown sync mode: '{other}'. Supported: accurate, estimated, hybrid"
            ))),
        }
    }
}

/// Options for the TTS-synchronized path. Durations and offsets are seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub mode: SyncMode,
    #[serde(default)]
    pub start_time_offset: f64,
    #[serde(default = "default_sync_min_duration")]
    pub min_duration: f64,
    #[serde(default = "default_sync_max_duration")]
    pub max_duration: f64,
    #[serde(default = "default_speech_rate")]
    pub reading_speed: CharsPerMinute,
    #[serde(default = "default_sync_max_chars")]
    pub max_chars_per_line: usize,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

fn default_sync_min_duration() -> f64 {
    1.0
}
fn default_sync_max_duration() -> f64 {
    7.0
}
fn default_speech_rate() -> CharsPerMinute {
    CharsPerMinute(200.0)
}
fn default_sync_max_chars() -> usize {
    42
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            start_time_offset: 0.0,
            min_duration: default_sync_min_duration(),
            max_duration: default_sync_max_duration(),
            reading_speed: default_speech_rate(),
            max_chars_per_line: default_sync_max_chars(),
            max_lines: default_max_lines(),
        }
    }
}

impl SyncOptions {
    pub fn limits(&self) -> segmenter::SegmentLimits {
        segmenter::SegmentLimits {
            max_chars_per_line: self.max_chars_per_line,
            max_lines: self.max_lines,
        }
    }
}

/// Rendered subtitle file content plus summary numbers.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub file_content: String,
    pub segments_count: usize,
    pub total_duration_ms: u64,
    pub format: SubtitleFormat,
}

/// A synchronized TTS timeline with its validation report, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct SyncedSubtitles {
    pub blocks: Vec<SubtitleBlock>,
    pub total_duration_ms: u64,
    pub validation: ValidationReport,
}

impl SyncedSubtitles {
    pub fn render(&self, format: SubtitleFormat) -> GenerationResult {
        GenerationResult {
            file_content: render::render(&self.blocks, format),
            segments_count: self.blocks.len(),
            total_duration_ms: self.total_duration_ms,
            format,
        }
    }
}

/// Standalone path: segment, estimate, lay out back to back, render.
pub fn generate_subtitles(
    segments: &[ContentSegment],
    options: &GenerateOptions,
) -> NovelsubResult<GenerationResult> {
    let blocks = timeline::build_timeline(segments, options)?;
    let total_duration_ms = blocks.last().map(|b| b.end_ms).unwrap_or(0);
    debug!(
        "Generated {} subtitle blocks from {} segments ({} ms)",
        blocks.len(),
        segments.len(),
        total_duration_ms
    );
    Ok(GenerationResult {
        file_content: render::render(&blocks, options.format),
        segments_count: blocks.len(),
        total_duration_ms,
        format: options.format,
    })
}

/// TTS path: reconcile reported timings, then validate the resulting timeline.
pub fn generate_from_tts(
    segments: &[TimedSegment],
    options: &SyncOptions,
) -> NovelsubResult<SyncedSubtitles> {
    let synced = timeline::sync_with_tts(segments, options)?;
    let validation = validate::validate_timing(&synced.blocks);
    Ok(SyncedSubtitles {
        total_duration_ms: synced.end_ms,
        blocks: synced.blocks,
        validation,
    })
}
