use serde::{Deserialize, Serialize};

/// Reading speed for on-screen display, in characters per second.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CharsPerSecond(pub f64);

/// Speaking rate used when estimating TTS audio length, in characters per minute.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CharsPerMinute(pub f64);

/// Display-time bounds and reading speed for one subtitle block.
#[derive(Debug, Clone, Copy)]
pub struct DisplayTiming {
    pub min_ms: u64,
    pub max_ms: u64,
    pub reading_speed: CharsPerSecond,
}

/// Estimate how long a chunk should stay on screen, in milliseconds.
///
/// `chars / reading_speed` seconds, clamped to `[min_ms, max_ms]` and rounded.
/// A non-positive reading speed yields `max_ms`.
pub fn estimate_duration(text: &str, timing: &DisplayTiming) -> u64 {
    let chars = text.chars().count() as f64;
    let computed = chars / timing.reading_speed.0 * 1000.0;
    clamp_ms(computed, timing.min_ms, timing.max_ms)
}

/// Estimate how long TTS would take to speak `text`, in milliseconds. Unclamped.
pub fn estimate_speech_ms(text: &str, rate: CharsPerMinute) -> u64 {
    let chars = text.chars().count() as f64;
    if rate.0 <= 0.0 || !rate.0.is_finite() {
        return 0;
    }
    (chars / rate.0 * 60_000.0).round() as u64
}

/// Clamp a millisecond value to `[min, max]` and round. NaN and infinities land on the bounds.
pub fn clamp_ms(value: f64, min: u64, max: u64) -> u64 {
    let (min, max) = (min as f64, max.max(min) as f64);
    if value.is_nan() {
        return max as u64;
    }
    value.min(max).max(min).round() as u64
}

/// Convert seconds from the TTS boundary to whole milliseconds. Negative and non-finite input maps to 0.
pub fn secs_to_ms(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).round() as u64
}
