//! Greedy word wrap without hyphenation.
//!
//! Candidate lines are measured as whole strings (not summed per word) so
//! kerning-aware providers are honored. A word is never split: a single word
//! wider than the line sits alone on its line and raises `too_wide`.

use serde::{Deserialize, Serialize};

/// Lines produced by `wrap_no_break`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wrapped {
    pub lines: Vec<String>,
    /// At least one word is wider than `max_width` on its own.
    pub too_wide: bool,
}

/// Wraps `text` at `font_size` into lines no wider than `max_width`.
///
/// `measure(font_size, text)` returns the rendered width of `text`.
/// Whitespace-only input yields zero lines.
pub fn wrap_no_break<F>(measure: &mut F, font_size: f32, text: &str, max_width: f32) -> Wrapped
where
    F: FnMut(f32, &str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut too_wide = false;

    for word in text.split_whitespace() {
        if measure(font_size, word) > max_width {
            too_wide = true;
        }

        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };

        if measure(font_size, &candidate) <= max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    Wrapped { lines, too_wide }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Every character is half an em wide.
    fn mono(size: f32, text: &str) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    #[test]
    fn test_empty_and_blank_text_yield_no_lines() {
        let mut measure = mono;
        assert_eq!(wrap_no_break(&mut measure, 20.0, "", 100.0), Wrapped::default());
        assert!(wrap_no_break(&mut measure, 20.0, "   \n\t ", 100.0)
            .lines
            .is_empty());
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        let mut measure = mono;
        let wrapped = wrap_no_break(&mut measure, 10.0, "Launch Faster", 200.0);
        assert_eq!(wrapped.lines, vec!["Launch Faster"]);
        assert!(!wrapped.too_wide);
    }

    #[test]
    fn test_breaks_on_overflow() {
        let mut measure = mono;
        // 5px per char, 60px → 12 chars per line
        let wrapped = wrap_no_break(&mut measure, 10.0, "Ship automated layouts in seconds", 60.0);
        assert_eq!(wrapped.lines, vec!["Ship", "automated", "layouts in", "seconds"]);
        for line in &wrapped.lines {
            assert!(mono(10.0, line) <= 60.0);
        }
    }

    #[test]
    fn test_single_long_word_is_flagged_not_split() {
        let mut measure = mono;
        let wrapped = wrap_no_break(&mut measure, 10.0, "a supercalifragilistic b", 50.0);
        assert_eq!(wrapped.lines, vec!["a", "supercalifragilistic", "b"]);
        assert!(wrapped.too_wide);
    }

    #[test]
    fn test_rejoined_lines_preserve_word_sequence() {
        let mut measure = mono;
        let text = "  Turn   rough ideas\ninto polished\tsocial cards without a designer ";
        let wrapped = wrap_no_break(&mut measure, 12.0, text, 90.0);
        let normalized: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(wrapped.lines.join(" "), normalized.join(" "));
    }

    #[test]
    fn test_lines_fit_unless_single_word() {
        let mut measure = mono;
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda";
        for width in [30.0, 55.0, 80.0, 140.0] {
            let wrapped = wrap_no_break(&mut measure, 10.0, text, width);
            for line in &wrapped.lines {
                let single_word = !line.contains(' ');
                assert!(mono(10.0, line) <= width || single_word, "{line} @ {width}");
            }
        }
    }

    // ── Properties ──────────────────────────────────────────────────────────

    /// Words joined by arbitrary runs of whitespace.
    fn spaced_words() -> impl Strategy<Value = (Vec<String>, String)> {
        prop::collection::vec(("[a-zA-Z]{1,14}", "[ \t\n]{1,3}"), 0..40).prop_map(|pairs| {
            let words = pairs.iter().map(|(w, _)| w.clone()).collect();
            let text = pairs.into_iter().map(|(w, gap)| format!("{gap}{w}")).collect();
            (words, text)
        })
    }

    proptest! {
        #[test]
        fn test_wrap_keeps_words_and_widths((words, text) in spaced_words(), size in 8.0f32..48.0, max_width in 10.0f32..600.0) {
            let mut measure = mono;
            let wrapped = wrap_no_break(&mut measure, size, &text, max_width);

            prop_assert_eq!(wrapped.lines.join(" "), words.join(" "));
            for line in &wrapped.lines {
                prop_assert!(!line.is_empty());
                prop_assert!(mono(size, line) <= max_width || !line.contains(' '), "{} @ {}", line, max_width);
            }
            let any_too_wide = words.iter().any(|w| mono(size, w) > max_width);
            prop_assert_eq!(wrapped.too_wide, any_too_wide);
        }
    }
}
