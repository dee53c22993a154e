use super::render::SubtitleFormat;
use crate::error::{NovelsubError, NovelsubResult};
use serde::Serialize;

/// Outcome of a structural check of subtitle file content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentCheck {
    pub valid: bool,
    pub format: SubtitleFormat,
    pub subtitle_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A cue read back from a subtitle file. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// A cue shifted and scaled for preview, with its original timing kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewCue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub start_ms: u64,
    pub end_ms: u64,
    pub original_start_ms: u64,
    pub original_end_ms: u64,
    pub text: String,
}

/// Guess the format from content: a leading `WEBVTT` line means VTT.
pub fn detect_format(content: &str) -> SubtitleFormat {
    let first = content.trim_start_matches('\u{feff}').lines().next().unwrap_or("");
    if first.trim_end().starts_with("WEBVTT") {
        SubtitleFormat::Vtt
    } else {
        SubtitleFormat::Srt
    }
}

/// Check that content is a well-formed sequence of cues.
///
/// Blank lines are ignored. SRT content must repeat sequence number, time
/// line, text; VTT content starts with `WEBVTT` and repeats time line, text.
/// The first problem found is reported with its line number among the
/// non-blank lines.
pub fn check_content(content: &str) -> ContentCheck {
    let format = detect_format(content);
    match parse_cues(content, format) {
        Ok(cues) if cues.is_empty() => ContentCheck {
            valid: false,
            format,
            subtitle_count: 0,
            error: Some("file content is empty".into()),
        },
        Ok(cues) => ContentCheck {
            valid: true,
            format,
            subtitle_count: cues.len(),
            error: None,
        },
        Err(e) => ContentCheck {
            valid: false,
            format,
            subtitle_count: 0,
            error: Some(e.to_string()),
        },
    }
}

/// Parse content into cues, detecting the format from the header.
pub fn parse_content(content: &str) -> NovelsubResult<Vec<Cue>> {
    parse_cues(content, detect_format(content))
}

/// Parse cues in the given format. Consecutive text lines are joined with `\n`.
pub fn parse_cues(content: &str, format: SubtitleFormat) -> NovelsubResult<Vec<Cue>> {
    let lines: Vec<&str> = content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut i = 0;
    if format == SubtitleFormat::Vtt {
        match lines.first() {
            Some(l) if l.starts_with("WEBVTT") => i = 1,
            _ => return Err(parse_error(1, "missing WEBVTT header")),
        }
    }

    let mut cues = Vec::new();
    while i < lines.len() {
        let index = if format == SubtitleFormat::Srt {
            let n = lines[i]
                .parse::<usize>()
                .map_err(|_| parse_error(i + 1, "invalid sequence number"))?;
            i += 1;
            Some(n)
        } else {
            None
        };

        let time_line = lines
            .get(i)
            .ok_or_else(|| parse_error(i, "missing time line"))?;
        let (start_ms, end_ms) = parse_time_line(time_line, format)
            .ok_or_else(|| parse_error(i + 1, "invalid time line"))?;
        i += 1;

        let mut text_lines = Vec::new();
        while i < lines.len() && !starts_next_cue(&lines, i, format) {
            text_lines.push(lines[i]);
            i += 1;
        }
        if text_lines.is_empty() {
            return Err(parse_error(i, "missing subtitle text"));
        }

        cues.push(Cue {
            index,
            start_ms,
            end_ms,
            text: text_lines.join("\n"),
        });
    }

    Ok(cues)
}

/// Whether line `i` begins another cue rather than continuing the text.
fn starts_next_cue(lines: &[&str], i: usize, format: SubtitleFormat) -> bool {
    match format {
        SubtitleFormat::Srt => {
            lines[i].parse::<usize>().is_ok()
                && lines
                    .get(i + 1)
                    .is_some_and(|next| parse_time_line(next, format).is_some())
        }
        SubtitleFormat::Vtt => parse_time_line(lines[i], format).is_some(),
    }
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm` (dot separator for VTT).
pub fn parse_time_line(line: &str, format: SubtitleFormat) -> Option<(u64, u64)> {
    let (start, end) = line.split_once(" --> ")?;
    Some((
        parse_timestamp(start, format)?,
        parse_timestamp(end, format)?,
    ))
}

/// Parse a single zero-padded time code into milliseconds.
pub fn parse_timestamp(s: &str, format: SubtitleFormat) -> Option<u64> {
    let sep = match format {
        SubtitleFormat::Srt => ',',
        SubtitleFormat::Vtt => '.',
    };
    let (clock, ms) = s.split_once(sep)?;
    let mut parts = clock.split(':');
    let (h, m, sec) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || ms.len() != 3 || m.len() != 2 || sec.len() != 2 || h.len() < 2 {
        return None;
    }
    let digits = |p: &str| -> Option<u64> {
        if p.bytes().all(|b| b.is_ascii_digit()) {
            p.parse().ok()
        } else {
            None
        }
    };
    let (h, m, sec, ms) = (digits(h)?, digits(m)?, digits(sec)?, digits(ms)?);
    if m >= 60 || sec >= 60 {
        return None;
    }
    h.checked_mul(3_600_000)?
        .checked_add(m * 60_000 + sec * 1000 + ms)
}

/// Shift cues by `offset_secs` and divide by `playback_speed`, flooring at zero.
pub fn preview(cues: &[Cue], offset_secs: f64, playback_speed: f64) -> NovelsubResult<Vec<PreviewCue>> {
    if !(playback_speed.is_finite() && playback_speed > 0.0) {
        return Err(NovelsubError::Other(format!(
            "Playback speed must be a positive number, got {playback_speed}"
        )));
    }
    if !offset_secs.is_finite() {
        return Err(NovelsubError::Other(format!(
            "Time offset must be a finite number of seconds, got {offset_secs}"
        )));
    }
    let adjust = |ms: u64| -> u64 {
        let shifted = (ms as f64 + offset_secs * 1000.0) / playback_speed;
        shifted.max(0.0).round() as u64
    };
    Ok(cues
        .iter()
        .map(|cue| PreviewCue {
            index: cue.index,
            start_ms: adjust(cue.start_ms),
            end_ms: adjust(cue.end_ms),
            original_start_ms: cue.start_ms,
            original_end_ms: cue.end_ms,
            text: cue.text.clone(),
        })
        .collect())
}

fn parse_error(line: usize, message: &str) -> NovelsubError {
    NovelsubError::SubtitleParse {
        line,
        message: message.into(),
    }
}
