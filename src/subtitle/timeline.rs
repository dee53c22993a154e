use super::duration::{clamp_ms, estimate_duration, estimate_speech_ms, secs_to_ms};
use super::segmenter::segment;
use super::{
    BlockSource, ContentSegment, ExternalTiming, GenerateOptions, SubtitleBlock, SyncMode,
    SyncOptions, TimedSegment, MAX_TIMING_SECS,
};
use crate::error::{NovelsubError, NovelsubResult};
use tracing::{debug, trace};

/// Lay segments out back to back from time zero, one block per chunk.
///
/// Every block starts where the previous one ended, so the result is contiguous.
pub fn build_timeline(
    segments: &[ContentSegment],
    options: &GenerateOptions,
) -> NovelsubResult<Vec<SubtitleBlock>> {
    if segments.is_empty() {
        return Err(NovelsubError::EmptyInput);
    }
    let limits = options.limits();
    let timing = options.display_timing();

    let (blocks, end_ms) = segments.iter().try_fold(
        (Vec::<SubtitleBlock>::new(), 0u64),
        |(mut blocks, mut cursor), seg| -> NovelsubResult<_> {
            let chunks = segment(seg.require_text()?, &limits);
            let total_blocks = chunks.len();
            for (block_index, chunk) in chunks.into_iter().enumerate() {
                let duration_ms = estimate_duration(&chunk, &timing).min(options.max_duration_ms);
                blocks.push(SubtitleBlock {
                    id: blocks.len() + 1,
                    text: chunk,
                    start_ms: cursor,
                    end_ms: cursor + duration_ms,
                    duration_ms,
                    character: seg.character.clone(),
                    emotion: seg.emotion.clone(),
                    kind: seg.kind,
                    source: BlockSource {
                        segment_id: seg.id.clone(),
                        block_index,
                        total_blocks,
                        audio_file: None,
                        original_start_secs: None,
                        original_duration_secs: None,
                    },
                });
                cursor += duration_ms;
            }
            Ok((blocks, cursor))
        },
    )?;

    trace!("Standalone timeline ends at {end_ms} ms");
    Ok(blocks)
}

/// How one segment's start and duration are decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingStrategy {
    /// Use the TTS-reported timing. A missing start anchors at the running cursor.
    External {
        start_secs: Option<f64>,
        duration_secs: f64,
    },
    /// Anchor at the running cursor and estimate from the text length.
    Estimated,
}

impl TimingStrategy {
    /// Pick the strategy for one segment under `mode`.
    pub fn resolve(mode: SyncMode, timing: Option<&ExternalTiming>) -> Self {
        let start_secs = timing.and_then(|t| t.start_time);
        let duration_secs = timing.map(ExternalTiming::effective_duration).unwrap_or(0.0);
        match mode {
            SyncMode::Accurate => TimingStrategy::External {
                start_secs,
                duration_secs,
            },
            SyncMode::Estimated => TimingStrategy::Estimated,
            SyncMode::Hybrid if start_secs.is_some() && duration_secs > 0.0 => {
                TimingStrategy::External {
                    start_secs,
                    duration_secs,
                }
            }
            SyncMode::Hybrid => TimingStrategy::Estimated,
        }
    }
}

/// Output of [`sync_with_tts`].
#[derive(Debug, Clone)]
pub struct SyncedTimeline {
    pub blocks: Vec<SubtitleBlock>,
    /// Final value of the running cursor.
    pub end_ms: u64,
}

/// Reconcile segments with TTS-reported timings.
///
/// All arithmetic is in milliseconds; the seconds in `options` and in each
/// [`ExternalTiming`] are converted once on entry. A segment split into several
/// chunks divides its duration equally between them, with any rounding
/// remainder going to the last chunk so the segment still ends on time.
pub fn sync_with_tts(
    segments: &[TimedSegment],
    options: &SyncOptions,
) -> NovelsubResult<SyncedTimeline> {
    if segments.is_empty() {
        return Err(NovelsubError::EmptyInput);
    }
    let offset_secs = options.start_time_offset;
    if !offset_secs.is_finite() || offset_secs.abs() > MAX_TIMING_SECS {
        return Err(NovelsubError::InvalidOffset(offset_secs));
    }
    let limits = options.limits();
    let min_ms = secs_to_ms(options.min_duration);
    let max_ms = secs_to_ms(options.max_duration);

    let (blocks, end_ms) = segments.iter().try_fold(
        (Vec::<SubtitleBlock>::new(), secs_to_ms(offset_secs)),
        |(mut blocks, global_ms), timed| -> NovelsubResult<_> {
            let seg = &timed.segment;
            let text = seg.require_text()?;
            if let Some(timing) = &timed.timing {
                timing.check(&seg.id)?;
            }

            let strategy = TimingStrategy::resolve(options.mode, timed.timing.as_ref());
            let (start_ms, raw_ms) = match strategy {
                TimingStrategy::External {
                    start_secs,
                    duration_secs,
                } => (
                    start_secs.map_or(global_ms, |s| secs_to_ms(s + offset_secs)),
                    secs_to_ms(duration_secs) as f64,
                ),
                TimingStrategy::Estimated => (
                    global_ms,
                    estimate_speech_ms(text, options.reading_speed) as f64,
                ),
            };
            let duration_ms = clamp_ms(raw_ms, min_ms, max_ms);
            let segment_end_ms = start_ms.checked_add(duration_ms).ok_or_else(|| {
                NovelsubError::InvalidSegment {
                    id: seg.id.clone(),
                    reason: "timing is outside the representable range".into(),
                }
            })?;
            trace!(
                "Segment {}: {:?} -> start {} ms, duration {} ms",
                seg.id,
                strategy,
                start_ms,
                duration_ms
            );

            let chunks = segment(text, &limits);
            let total_blocks = chunks.len();
            let share = duration_ms / total_blocks.max(1) as u64;
            for (block_index, chunk) in chunks.into_iter().enumerate() {
                let block_start = start_ms + share * block_index as u64;
                let block_duration = if block_index + 1 == total_blocks {
                    duration_ms - share * block_index as u64
                } else {
                    share
                };
                blocks.push(SubtitleBlock {
                    id: blocks.len() + 1,
                    text: chunk,
                    start_ms: block_start,
                    end_ms: block_start + block_duration,
                    duration_ms: block_duration,
                    character: seg.character.clone(),
                    emotion: seg.emotion.clone(),
                    kind: seg.kind,
                    source: BlockSource {
                        segment_id: seg.id.clone(),
                        block_index,
                        total_blocks,
                        audio_file: timed.timing.as_ref().and_then(|t| t.audio_file.clone()),
                        original_start_secs: timed.timing.as_ref().and_then(|t| t.start_time),
                        original_duration_secs: timed.timing.as_ref().and_then(|t| t.duration),
                    },
                });
            }

            Ok((blocks, global_ms.max(segment_end_ms)))
        },
    )?;

    debug!(
        "Timeline synchronized: {} subtitle blocks, ends at {:.2}s",
        blocks.len(),
        end_ms as f64 / 1000.0
    );
    Ok(SyncedTimeline { blocks, end_ms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::duration::CharsPerMinute;

    fn timed(id: &str, text: &str, start: Option<f64>, duration: Option<f64>) -> TimedSegment {
        TimedSegment {
            segment: ContentSegment::new(id, text),
            timing: Some(ExternalTiming {
                start_time: start,
                duration,
                ..Default::default()
            }),
        }
    }

    fn sync_opts(mode: SyncMode) -> SyncOptions {
        SyncOptions {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_timeline_contiguous() {
        let segments = vec![
            ContentSegment::new("1", "第一段很短。"),
            ContentSegment::new("2", &"长".repeat(100)),
            ContentSegment::new("3", "结束"),
        ];
        let blocks = build_timeline(&segments, &GenerateOptions::default()).unwrap();
        assert_eq!(blocks[0].start_ms, 0);
        for i in 1..blocks.len() {
            assert_eq!(blocks[i].start_ms, blocks[i - 1].end_ms);
        }
        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(b.id, i + 1);
            assert_eq!(b.end_ms, b.start_ms + b.duration_ms);
            assert!((1000..=7000).contains(&b.duration_ms));
        }
    }

    #[test]
    fn test_build_timeline_splits_long_segment() {
        let segments = vec![ContentSegment::new("long", &"长".repeat(100))];
        let blocks = build_timeline(&segments, &GenerateOptions::default()).unwrap();
        // budget 80 -> 80 + 20
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].duration_ms, 7000);
        assert_eq!(blocks[1].duration_ms, 5000);
        assert_eq!(blocks[1].source.segment_id, "long");
        assert_eq!(blocks[1].source.block_index, 1);
        assert_eq!(blocks[1].source.total_blocks, 2);
    }

    #[test]
    fn test_build_timeline_carries_metadata() {
        let mut seg = ContentSegment::new("d1", "你来了？");
        seg.character = "林黛玉".into();
        seg.emotion = "happy".into();
        seg.kind = crate::subtitle::SegmentKind::Dialogue;
        let blocks = build_timeline(&[seg], &GenerateOptions::default()).unwrap();
        assert_eq!(blocks[0].character, "林黛玉");
        assert_eq!(blocks[0].emotion, "happy");
        assert_eq!(blocks[0].kind, crate::subtitle::SegmentKind::Dialogue);
    }

    #[test]
    fn test_build_timeline_empty_input() {
        let result = build_timeline(&[], &GenerateOptions::default());
        assert!(matches!(result, Err(NovelsubError::EmptyInput)));
    }

    #[test]
    fn test_build_timeline_missing_text_names_segment() {
        let mut bad = ContentSegment::new("broken-7", "");
        bad.text = None;
        let segments = vec![ContentSegment::new("ok", "好"), bad];
        let err = build_timeline(&segments, &GenerateOptions::default()).unwrap_err();
        match err {
            NovelsubError::InvalidSegment { id, .. } => assert_eq!(id, "broken-7"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_strategy() {
        let full = ExternalTiming {
            start_time: Some(1.0),
            duration: Some(2.0),
            ..Default::default()
        };
        let no_duration = ExternalTiming {
            start_time: Some(1.0),
            duration: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            TimingStrategy::resolve(SyncMode::Hybrid, Some(&full)),
            TimingStrategy::External {
                start_secs: Some(1.0),
                duration_secs: 2.0
            }
        );
        assert_eq!(
            TimingStrategy::resolve(SyncMode::Hybrid, Some(&no_duration)),
            TimingStrategy::Estimated
        );
        assert_eq!(
            TimingStrategy::resolve(SyncMode::Hybrid, None),
            TimingStrategy::Estimated
        );
        assert_eq!(
            TimingStrategy::resolve(SyncMode::Estimated, Some(&full)),
            TimingStrategy::Estimated
        );
        assert_eq!(
            TimingStrategy::resolve(SyncMode::Accurate, None),
            TimingStrategy::External {
                start_secs: None,
                duration_secs: 0.0
            }
        );
    }

    #[test]
    fn test_accurate_uses_external_timing_with_offset() {
        let segments = vec![
            timed("a", "第一句。", Some(0.0), Some(2.0)),
            timed("b", "第二句。", Some(2.5), Some(3.25)),
        ];
        let opts = SyncOptions {
            start_time_offset: 1.0,
            ..sync_opts(SyncMode::Accurate)
        };
        let synced = sync_with_tts(&segments, &opts).unwrap();
        assert_eq!(synced.blocks[0].start_ms, 1000);
        assert_eq!(synced.blocks[0].duration_ms, 2000);
        assert_eq!(synced.blocks[1].start_ms, 3500);
        assert_eq!(synced.blocks[1].end_ms, 6750);
        assert_eq!(synced.end_ms, 6750);
    }

    #[test]
    fn test_accurate_clamps_duration() {
        let segments = vec![
            timed("a", "短", Some(0.0), Some(0.2)),
            timed("b", "长", Some(1.0), Some(30.0)),
        ];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Accurate)).unwrap();
        assert_eq!(synced.blocks[0].duration_ms, 1000);
        assert_eq!(synced.blocks[1].duration_ms, 7000);
    }

    #[test]
    fn test_estimated_ignores_external_timing() {
        // 20 chars at 200 chars/min = 6 s
        let segments = vec![
            timed("a", &"字".repeat(20), Some(50.0), Some(1.0)),
            timed("b", &"字".repeat(10), Some(90.0), Some(1.0)),
        ];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Estimated)).unwrap();
        assert_eq!(synced.blocks[0].start_ms, 0);
        assert_eq!(synced.blocks[0].duration_ms, 6000);
        assert_eq!(synced.blocks[1].start_ms, 6000);
        assert_eq!(synced.blocks[1].duration_ms, 3000);
    }

    #[test]
    fn test_hybrid_falls_back_at_global_cursor() {
        let segments = vec![
            timed("a", "第一句话。", Some(2.0), Some(3.0)),
            timed("b", &"字".repeat(10), None, Some(0.0)),
        ];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Hybrid)).unwrap();
        assert_eq!(synced.blocks[0].start_ms, 2000);
        assert_eq!(synced.blocks[0].end_ms, 5000);
        // b anchors at the cursor left by a, not at zero
        assert_eq!(synced.blocks[1].start_ms, 5000);
        assert_eq!(synced.blocks[1].duration_ms, 3000);
    }

    #[test]
    fn test_hybrid_decides_per_segment() {
        let segments = vec![
            timed("a", "甲", None, None),
            timed("b", "乙", Some(10.0), Some(2.0)),
            timed("c", "丙", None, None),
        ];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Hybrid)).unwrap();
        assert_eq!(synced.blocks[0].start_ms, 0);
        assert_eq!(synced.blocks[1].start_ms, 10_000);
        assert_eq!(synced.blocks[2].start_ms, 12_000);
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        let segments = vec![
            timed("a", "甲", Some(10.0), Some(5.0)),
            timed("b", "乙", Some(1.0), Some(2.0)),
            timed("c", "丙", None, None),
        ];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Hybrid)).unwrap();
        assert_eq!(synced.blocks[1].start_ms, 1000);
        assert_eq!(synced.blocks[2].start_ms, 15_000);
        assert_eq!(synced.end_ms, 16_000);
    }

    #[test]
    fn test_multi_chunk_segment_splits_equally() {
        let text = format!("{}{}", "甲".repeat(84), "乙".repeat(40));
        let segments = vec![timed("long", &text, Some(0.0), Some(6.0))];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Accurate)).unwrap();
        // budget 42 * 2 = 84 -> two chunks of unequal length, equal time
        assert_eq!(synced.blocks.len(), 2);
        assert_eq!(synced.blocks[0].duration_ms, 3000);
        assert_eq!(synced.blocks[1].start_ms, 3000);
        assert_eq!(synced.blocks[1].duration_ms, 3000);
        assert_eq!(synced.blocks[1].source.total_blocks, 2);
    }

    #[test]
    fn test_equal_split_remainder_goes_to_last_block() {
        let text = "字".repeat(84 * 2 + 1);
        let segments = vec![timed("r", &text, Some(0.0), Some(7.0))];
        let synced = sync_with_tts(&segments, &sync_opts(SyncMode::Accurate)).unwrap();
        assert_eq!(synced.blocks.len(), 3);
        assert_eq!(synced.blocks[0].duration_ms, 2333);
        assert_eq!(synced.blocks[1].start_ms, 2333);
        assert_eq!(synced.blocks[2].start_ms, 4666);
        assert_eq!(synced.blocks[2].end_ms, 7000);
    }

    #[test]
    fn test_sync_keeps_audio_reference() {
        let mut seg = timed("a", "你好", Some(0.0), Some(1.2));
        if let Some(t) = seg.timing.as_mut() {
            t.audio_file = Some("audio/a.mp3".into());
        }
        let synced = sync_with_tts(&[seg], &SyncOptions::default()).unwrap();
        let source = &synced.blocks[0].source;
        assert_eq!(source.audio_file.as_deref(), Some("audio/a.mp3"));
        assert_eq!(source.original_start_secs, Some(0.0));
        assert_eq!(source.original_duration_secs, Some(1.2));
    }

    #[test]
    fn test_sync_rejects_bad_timing() {
        let segments = vec![timed("bad", "文本", Some(f64::NAN), Some(1.0))];
        let err = sync_with_tts(&segments, &SyncOptions::default()).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_sync_rejects_start_beyond_range() {
        let segments = vec![timed("far", "你好", Some(1e300), Some(2.0))];
        let err = sync_with_tts(&segments, &sync_opts(SyncMode::Accurate)).unwrap_err();
        match err {
            NovelsubError::InvalidSegment { id, .. } => assert_eq!(id, "far"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sync_accepts_largest_start() {
        let segments = vec![timed("edge", "你好", Some(MAX_TIMING_SECS), Some(2.0))];
        let opts = SyncOptions {
            start_time_offset: MAX_TIMING_SECS,
            ..sync_opts(SyncMode::Accurate)
        };
        let synced = sync_with_tts(&segments, &opts).unwrap();
        assert_eq!(synced.blocks[0].start_ms, 2_000_000_000_000);
        assert_eq!(synced.end_ms, 2_000_000_002_000);
    }

    #[test]
    fn test_sync_rejects_non_finite_offset() {
        let segments = vec![timed("a", "你好", Some(3.0), Some(1.0))];
        for offset in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 2.0 * MAX_TIMING_SECS] {
            let opts = SyncOptions {
                start_time_offset: offset,
                ..sync_opts(SyncMode::Accurate)
            };
            assert!(matches!(
                sync_with_tts(&segments, &opts),
                Err(NovelsubError::InvalidOffset(_))
            ));
        }
    }

    #[test]
    fn test_sync_empty_input() {
        assert!(matches!(
            sync_with_tts(&[], &SyncOptions::default()),
            Err(NovelsubError::EmptyInput)
        ));
    }

    #[test]
    fn test_estimated_uses_configured_rate() {
        let segments = vec![timed("a", &"字".repeat(30), None, None)];
        let opts = SyncOptions {
            mode: SyncMode::Estimated,
            reading_speed: CharsPerMinute(600.0),
            ..Default::default()
        };
        let synced = sync_with_tts(&segments, &opts).unwrap();
        assert_eq!(synced.blocks[0].duration_ms, 3000);
    }
}
