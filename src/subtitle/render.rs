use super::SubtitleBlock;
use crate::error::NovelsubError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Subtitle file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
}

impl SubtitleFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }

    /// Separator between seconds and milliseconds in a time code.
    fn ms_separator(self) -> char {
        match self {
            SubtitleFormat::Srt => ',',
            SubtitleFormat::Vtt => '.',
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = NovelsubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            _ => Err(NovelsubError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.extension())
    }
}

/// Byte encoding used when a rendered file is written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// Little-endian with a byte-order mark.
    #[serde(rename = "utf-16", alias = "utf16")]
    Utf16,
}

impl TextEncoding {
    pub fn encode(self, content: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => content.as_bytes().to_vec(),
            TextEncoding::Utf16 => {
                let mut bytes = Vec::with_capacity(2 + content.len() * 2);
                bytes.extend_from_slice(&[0xFF, 0xFE]);
                for unit in content.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                bytes
            }
        }
    }
}

impl FromStr for TextEncoding {
    type Err = NovelsubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-16" | "utf16" | "utf-16le" => Ok(TextEncoding::Utf16),
            _ => Err(NovelsubError::InvalidEncoding(s.to_string())),
        }
    }
}

/// Serialize blocks as SRT or WebVTT text.
///
/// SRT sequence numbers are reassigned from 1 in block order. Trailing
/// whitespace is trimmed from the result.
pub fn render(blocks: &[SubtitleBlock], format: SubtitleFormat) -> String {
    let mut out = String::new();
    if format == SubtitleFormat::Vtt {
        out.push_str("WEBVTT\n\n");
    }
    for (i, block) in blocks.iter().enumerate() {
        if format == SubtitleFormat::Srt {
            out.push_str(&format!("{}\n", i + 1));
        }
        out.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(block.start_ms, format),
            format_timestamp(block.end_ms, format),
        ));
        out.push_str(&block.text);
        out.push_str("\n\n");
    }
    out.truncate(out.trim_end().len());
    out
}

/// Format milliseconds as `HH:MM:SS,mmm` (SRT) or `HH:MM:SS.mmm` (VTT).
pub fn format_timestamp(total_ms: u64, format: SubtitleFormat) -> String {
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let s = total_s % 60;
    let total_m = total_s / 60;
    let m = total_m % 60;
    let h = total_m / 60;
    let sep = format.ms_separator();
    format!("{h:02}:{m:02}:{s:02}{sep}{ms:03}")
}
