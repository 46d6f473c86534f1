//! Measurement-driven line wrapping and frame clipping

/// Wrap text into lines no wider than `max_width`
///
/// Explicit line breaks are honoured first; each paragraph is then filled
/// greedily word by word. A word wider than `max_width` gets a line of its
/// own and is never broken. A paragraph that already fits is returned as
/// its trimmed self. Blank paragraphs produce no lines.
///
/// # Arguments
/// * `text` - Text to wrap
/// * `measure` - Width of a string at a font size, in the same units as `max_width`
/// * `font_size` - Font size passed through to `measure`
/// * `max_width` - Maximum line width
pub fn wrap<F>(text: &str, measure: F, font_size: f32, max_width: f32) -> Vec<String>
where
    F: Fn(&str, f32) -> f32,
{
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if measure(paragraph, font_size) <= max_width {
            lines.push(paragraph.to_string());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{current} {word}");
            if measure(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Lines that fit a frame, plus how many were cut
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameFit {
    pub kept: Vec<String>,
    pub clipped_count: usize,
}

/// Number of whole lines of `line_height` that fit in `max_height`
pub fn max_lines(line_height: f32, max_height: f32) -> usize {
    if !(line_height.is_finite() && line_height > 0.0) || !(max_height > 0.0) {
        return 0;
    }
    let lines = (max_height / line_height).floor();
    if lines >= usize::MAX as f32 {
        usize::MAX
    } else {
        lines as usize
    }
}

/// Keep the lines that fit in a frame of `max_height`
pub fn truncate_to_frame(mut lines: Vec<String>, line_height: f32, max_height: f32) -> FrameFit {
    let max = max_lines(line_height, max_height);
    let clipped_count = lines.len().saturating_sub(max);
    lines.truncate(max);
    FrameFit {
        kept: lines,
        clipped_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Every character is half the font size wide
    fn half_em(text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap("", half_em, 10.0, 100.0).is_empty());
        assert!(wrap("   \n\t  ", half_em, 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(
            wrap("  12 Church Street  ", half_em, 10.0, 100.0),
            vec!["12 Church Street"]
        );
    }

    #[test]
    fn test_wrap_greedy() {
        // 5pt per char, 60pt = 12 chars per line
        let lines = wrap("North Car Street Palayamkottai", half_em, 10.0, 60.0);
        assert_eq!(lines, vec!["North Car", "Street", "Palayamkottai"]);
    }

    #[test]
    fn test_wrap_long_word_not_broken() {
        let lines = wrap("a Thirunelveli b", half_em, 10.0, 20.0);
        assert_eq!(lines, vec!["a", "Thirunelveli", "b"]);
    }

    #[test]
    fn test_wrap_explicit_breaks() {
        let lines = wrap("Door 4\r\nMain Road\n\nTown", half_em, 10.0, 100.0);
        assert_eq!(lines, vec!["Door 4", "Main Road", "Town"]);
    }

    #[test]
    fn test_wrap_collapses_inner_whitespace_when_wrapping() {
        let lines = wrap("aaa    bbb   ccc", half_em, 10.0, 40.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_truncate_to_frame() {
        let lines: Vec<String> = ["one", "two", "three", "four"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let fit = truncate_to_frame(lines, 12.0, 36.0);
        assert_eq!(fit.kept, vec!["one", "two", "three"]);
        assert_eq!(fit.clipped_count, 1);
    }

    #[test]
    fn test_truncate_to_frame_partial_line_dropped() {
        let lines = vec!["a".to_string(), "b".to_string()];
        let fit = truncate_to_frame(lines, 12.0, 23.9);
        assert_eq!(fit.kept, vec!["a"]);
        assert_eq!(fit.clipped_count, 1);
    }

    #[test]
    fn test_truncate_to_frame_degenerate_line_height() {
        let lines = vec!["a".to_string()];
        assert_eq!(truncate_to_frame(lines.clone(), 0.0, 50.0).clipped_count, 1);
        assert_eq!(truncate_to_frame(lines.clone(), f32::NAN, 50.0).clipped_count, 1);
        assert_eq!(truncate_to_frame(lines, 10.0, -5.0).kept.len(), 0);
    }

    #[test]
    fn test_max_lines() {
        assert_eq!(max_lines(12.0, 36.0), 3);
        assert_eq!(max_lines(12.0, 11.0), 0);
        assert_eq!(max_lines(12.0, f32::INFINITY), usize::MAX);
    }

    fn word() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9]{1,8}"
    }

    proptest! {
        #[test]
        fn prop_wrapped_lines_fit_and_keep_words(
            words in prop::collection::vec(word(), 0..30),
            max_width in 40.0f32..200.0,
        ) {
            let text = words.join(" ");
            let lines = wrap(&text, half_em, 10.0, max_width);

            for line in &lines {
                prop_assert!(half_em(line, 10.0) <= max_width);
            }
            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            let original: Vec<&str> = text.split_whitespace().collect();
            prop_assert_eq!(rejoined, original);
        }

        #[test]
        fn prop_explicit_breaks_are_line_boundaries(
            paragraphs in prop::collection::vec(prop::collection::vec(word(), 1..6), 1..5),
        ) {
            let text = paragraphs
                .iter()
                .map(|p| p.join(" "))
                .collect::<Vec<_>>()
                .join("\n");
            let lines = wrap(&text, half_em, 10.0, 1000.0);
            let expected: Vec<String> = paragraphs.iter().map(|p| p.join(" ")).collect();
            prop_assert_eq!(lines, expected);
        }

        #[test]
        fn prop_short_text_is_one_trimmed_line(text in "[ ]{0,3}[a-z]{1,5}( [a-z]{1,5}){0,3}[ ]{0,3}") {
            let width = half_em(text.trim(), 10.0);
            let lines = wrap(&text, half_em, 10.0, width);
            prop_assert_eq!(lines, vec![text.trim().to_string()]);
        }

        #[test]
        fn prop_frame_clip_invariant(
            count in 0usize..40,
            line_height in 1.0f32..30.0,
            max_height in 0.0f32..400.0,
        ) {
            let lines: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            let fit = truncate_to_frame(lines, line_height, max_height);
            let limit = (max_height / line_height).floor() as usize;
            prop_assert!(fit.kept.len() <= limit);
            prop_assert_eq!(fit.kept.len() + fit.clipped_count, count);
        }
    }
}
