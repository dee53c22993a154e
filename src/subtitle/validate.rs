use super::SubtitleBlock;
use serde::Serialize;
use tracing::warn;

/// Silences longer than this between adjacent blocks are reported.
const GAP_THRESHOLD_MS: i64 = 500;
/// Overlaps up to this much are tolerated.
const OVERLAP_TOLERANCE_MS: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingGap {
    pub from: usize,
    pub to: usize,
    /// Seconds of silence between the two blocks.
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingOverlap {
    pub segment1: usize,
    pub segment2: usize,
    /// Seconds the two blocks overlap.
    pub overlap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStatistics {
    pub total_segments: usize,
    /// Seconds, end of the latest block.
    pub total_duration: f64,
    pub average_duration: f64,
    pub gaps: Vec<TimingGap>,
    pub overlaps: Vec<TimingOverlap>,
}

/// Result of scanning a timeline for gaps and overlaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_accurate: bool,
    pub statistics: TimingStatistics,
}

/// Check adjacent blocks for gaps over 0.5 s and overlaps over 0.1 s.
///
/// Gaps are informational. Any overlap marks the timeline as inaccurate.
pub fn validate_timing(blocks: &[SubtitleBlock]) -> ValidationReport {
    let mut gaps = Vec::new();
    let mut overlaps = Vec::new();
    let mut end_ms = 0u64;

    for (i, block) in blocks.iter().enumerate() {
        end_ms = end_ms.max(block.end_ms);
        if i == 0 {
            continue;
        }
        let prev = &blocks[i - 1];
        let gap_ms = block.start_ms as i64 - prev.end_ms as i64;
        if gap_ms > GAP_THRESHOLD_MS {
            gaps.push(TimingGap {
                from: prev.id,
                to: block.id,
                gap: ms_to_secs(gap_ms),
            });
        } else if gap_ms < -OVERLAP_TOLERANCE_MS {
            warn!(
                "Subtitle blocks {} and {} overlap by {} ms",
                prev.id, block.id, -gap_ms
            );
            overlaps.push(TimingOverlap {
                segment1: prev.id,
                segment2: block.id,
                overlap: ms_to_secs(-gap_ms),
            });
        }
    }

    let total_duration = end_ms as f64 / 1000.0;
    let average_duration = if blocks.is_empty() {
        0.0
    } else {
        total_duration / blocks.len() as f64
    };

    ValidationReport {
        is_accurate: overlaps.is_empty(),
        statistics: TimingStatistics {
            total_segments: blocks.len(),
            total_duration,
            average_duration,
            gaps,
            overlaps,
        },
    }
}

fn ms_to_secs(ms: i64) -> f64 {
    ms as f64 / 1000.0
}
