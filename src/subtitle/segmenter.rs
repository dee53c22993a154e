/// Punctuation that ends a sentence or clause and makes a good cut point.
pub const SENTENCE_ENDINGS: [char; 5] = ['。', '！', '？', '；', '：'];

/// How far back from the budget boundary to look for a sentence ending.
const SEARCH_WINDOW: usize = 10;

/// Screen-size limits for one subtitle block.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLimits {
    pub max_chars_per_line: usize,
    pub max_lines: usize,
}

impl SegmentLimits {
    /// Maximum characters in one block. Never zero.
    pub fn budget(&self) -> usize {
        self.max_chars_per_line
            .saturating_mul(self.max_lines)
            .max(1)
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into subtitle-sized chunks of at most `limits.budget()` characters.
///
/// Cuts prefer the first sentence ending found in the last ten characters before
/// the budget boundary and fall back to a hard cut at the boundary. Lengths are
/// counted in `char`s so CJK text is never cut inside a code point.
pub fn segment(text: &str, limits: &SegmentLimits) -> Vec<String> {
    let cleaned = normalize_whitespace(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let budget = limits.budget();
    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() <= budget {
        return vec![cleaned];
    }

    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let remaining = &chars[pos..];
        if remaining.len() <= budget {
            chunks.push(remaining.iter().collect());
            break;
        }

        let window_start = budget.saturating_sub(SEARCH_WINDOW);
        let cut = remaining[window_start..budget]
            .iter()
            .position(|c| SENTENCE_ENDINGS.contains(c))
            .map(|offset| window_start + offset + 1)
            .unwrap_or(budget);

        let head: String = remaining[..cut].iter().collect();
        let head = head.trim();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }

        let before = remaining.len();
        pos += cut;
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
        }

        // zero-progress guard
        if cut == 0 && chars.len() - pos >= before {
            let rest: String = chars[pos..].iter().collect();
            let rest = rest.trim();
            if !rest.is_empty() {
                chunks.push(rest.to_string());
            }
            break;
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_chars_per_line: usize, max_lines: usize) -> SegmentLimits {
        SegmentLimits {
            max_chars_per_line,
            max_lines,
        }
    }

    fn strip_spaces(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(segment("", &limits(40, 2)).is_empty());
        assert!(segment(" \n\t ", &limits(40, 2)).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = segment("  Hello \n\n  world  ", &limits(40, 2));
        assert_eq!(chunks, vec!["Hello world"]);
    }

    #[test]
    fn test_text_exactly_at_budget() {
        let text = "一".repeat(20);
        let chunks = segment(&text, &limits(10, 2));
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_cuts_after_sentence_ending() {
        let chunks = segment(
            "这是第一句。这是第二句，略长一些需要换行处理。",
            &limits(10, 1),
        );
        assert_eq!(chunks, vec!["这是第一句。", "这是第二句，略长一些", "需要换行处理。"]);
    }

    #[test]
    fn test_picks_first_ending_in_window() {
        // budget 20, window covers indices 10..20
        let text = format!("{}！{}？{}", "甲".repeat(11), "乙".repeat(3), "丙".repeat(10));
        let chunks = segment(&text, &limits(20, 1));
        assert_eq!(chunks[0], format!("{}！", "甲".repeat(11)));
    }

    #[test]
    fn test_ending_before_window_is_ignored() {
        // the only ending sits at index 2, outside the 10..20 window
        let text = format!("甲乙。{}", "丙".repeat(30));
        let chunks = segment(&text, &limits(20, 1));
        assert_eq!(chunks[0].chars().count(), 20);
        assert!(chunks[0].starts_with("甲乙。"));
    }

    #[test]
    fn test_hard_cut_without_punctuation() {
        let text = "a".repeat(95);
        let chunks = segment(&text, &limits(20, 2));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 40);
        assert_eq!(chunks[1].len(), 40);
        assert_eq!(chunks[2].len(), 15);
    }

    #[test]
    fn test_chunks_within_budget_and_lossless() {
        let text = "第一章  开始了。 他走进房间，看见桌上有一封信：信里写着一些奇怪的话！\
                    她问道：这是谁写的？没有人回答； 窗外的风越来越大了。然后故事继续向前发展，\
                    直到所有人都明白了真相。";
        for (per_line, lines) in [(10, 1), (12, 2), (20, 1), (7, 3)] {
            let lim = limits(per_line, lines);
            let chunks = segment(text, &lim);
            for chunk in &chunks {
                assert!(chunk.chars().count() <= lim.budget(), "chunk too long: {chunk}");
                assert_eq!(chunk.trim(), chunk);
                assert!(!chunk.is_empty());
            }
            assert_eq!(strip_spaces(&chunks.concat()), strip_spaces(text));
        }
    }

    #[test]
    fn test_space_at_cut_point_is_dropped() {
        let chunks = segment("aaaaa bbbbb", &limits(5, 1));
        assert_eq!(chunks, vec!["aaaaa", "bbbbb"]);
    }

    #[test]
    fn test_tiny_budget_still_progresses() {
        let chunks = segment("abc", &limits(1, 1));
        assert_eq!(chunks, vec!["a", "b", "c"]);
        let chunks = segment("abc", &limits(0, 4));
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n\nc "), "a b c");
        assert_eq!(normalize_whitespace("你好\u{3000}世界"), "你好 世界");
    }
}
