use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NovelsubError {
    #[error("Unsupported subtitle format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid segment '{id}': {reason}")]
    InvalidSegment { id: String, reason: String },

    #[error("Invalid start time offset: {0}")]
    InvalidOffset(f64),

    #[error("No segments supplied")]
    EmptyInput,

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Input file error in {path}: {message}")]
    InputParse { path: PathBuf, message: String },

    #[error("Subtitle content error at line {line}: {message}")]
    SubtitleParse { line: usize, message: String },

    #[error("Subtitle file not found: {0}")]
    SubtitleFileNotFound(String),

    #[error("Invalid subtitle file name: {0}")]
    InvalidFileName(String),

    #[error("Already initialized: {0} already exists")]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl NovelsubError {
    /// Return an actionable hint for the user, if applicable.
    pub fn hint(&self) -> Option<String> {
        match self {
            NovelsubError::InvalidFormat(_) => {
                Some("Supported subtitle formats: srt, vtt (the sync command also accepts 'both').".into())
            }
            NovelsubError::InvalidEncoding(_) => {
                Some("Supported encodings: utf-8, utf-16.".into())
            }
            NovelsubError::InvalidSegment { reason, .. } => {
                if reason.contains("text") {
                    Some("Every segment needs a non-empty 'text' field.".into())
                } else {
                    Some("TTS timings (startTime, endTime, duration) must be finite, non-negative numbers of seconds.".into())
                }
            }
            NovelsubError::InvalidOffset(_) => Some(format!(
                "The start time offset (--offset or sync.start_time_offset) must be a finite number of seconds within ±{}.",
                crate::subtitle::MAX_TIMING_SECS
            )),
            NovelsubError::EmptyInput => Some(
                "The input file must contain at least one segment, either as a top-level array or under a 'segments' key.".into(),
            ),
            NovelsubError::ConfigNotFound(_) => Some(
                "Run 'novelsub init <path>' to create a novelsub.toml, or omit --project to use defaults.".into(),
            ),
            NovelsubError::ConfigParse(_) => Some(
                "Check novelsub.toml syntax. Run 'novelsub init <path>' to generate a valid example config.".into(),
            ),
            NovelsubError::ConfigInvalid(_) => Some(
                "Allowed ranges: max_chars_per_line 20-80, max_lines 1-4, min_duration_ms 500-3000, max_duration_ms 3000-15000, reading_speed 2-10.".into(),
            ),
            NovelsubError::InputParse { .. } => Some(
                "Input files are JSON (.json) or YAML (.yaml/.yml) lists of segments.".into(),
            ),
            NovelsubError::SubtitleFileNotFound(_) => Some(
                "Run 'novelsub files list' to see the subtitle files in the output directory.".into(),
            ),
            NovelsubError::InvalidFileName(_) => Some(
                "Pass a bare file name from 'novelsub files list', without directories.".into(),
            ),
            NovelsubError::AlreadyInitialized(_) => Some(
                "Use a different path, or delete the existing novelsub.toml first.".into(),
            ),
            _ => None,
        }
    }
}

pub type NovelsubResult<T> = Result<T, NovelsubError>;
