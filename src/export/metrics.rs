//! Text measurement and word wrapping for the standard Helvetica face.
//!
//! Widths cover printable ASCII only. The builtin PDF fonts are WinAnsi
//! encoded, so anything outside that range is measured at a fallback width
//! and may not render at all.

use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;

/// Points to millimetres.
const PT_TO_MM: f32 = 25.4 / 72.0;

/// Helvetica advance widths (1/1000 em) for printable ASCII, starting at space.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

/// Width used for anything outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

fn char_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in millimetres at `size_pt`.
pub fn text_width(text: &str, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c) as u32).sum();
    units as f32 / 1000.0 * size_pt * PT_TO_MM
}

/// One measured word, as seen by the wrapping algorithm.
#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    width: f64,
    whitespace: f64,
}

impl Fragment for Word<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Break `text` into lines no wider than `max_width` millimetres.
///
/// Lines break at whitespace and at explicit newlines. A word is only split
/// when it is wider than a full line on its own. Always returns at least one
/// line.
pub fn wrap_text(text: &str, max_width: f32, size_pt: f32) -> Vec<String> {
    let space = text_width(" ", size_pt) as f64;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut words = Vec::new();
        for word in paragraph.split_whitespace() {
            let width = text_width(word, size_pt);
            if width > max_width {
                break_word(word, max_width, size_pt, space, &mut words);
            } else {
                words.push(Word { text: word, width: width as f64, whitespace: space });
            }
        }

        for line in wrap_first_fit(&words, &[max_width as f64]) {
            let mut out = String::new();
            for (i, word) in line.iter().enumerate() {
                if i > 0 && line[i - 1].whitespace > 0.0 {
                    out.push(' ');
                }
                out.push_str(word.text);
            }
            lines.push(out);
        }
    }

    lines
}

/// Split an over-long word into pieces that each fit `max_width`. Only the
/// last piece is followed by a space.
fn break_word<'a>(word: &'a str, max_width: f32, size_pt: f32, space: f64, out: &mut Vec<Word<'a>>) {
    let mut start = 0;
    let mut width = 0.0;
    for (idx, c) in word.char_indices() {
        let w = text_width(c.encode_utf8(&mut [0; 4]), size_pt);
        if idx > start && width + w > max_width {
            out.push(Word { text: &word[start..idx], width: width as f64, whitespace: 0.0 });
            start = idx;
            width = 0.0;
        }
        width += w;
    }
    out.push(Word { text: &word[start..], width: width as f64, whitespace: space });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_scales_with_size() {
        // "a" is 556/1000 em; at 10pt that is 5.56pt.
        let w = text_width("a", 10.0);
        assert!((w - 5.56 * PT_TO_MM).abs() < 1e-4);
        assert!((text_width("aa", 20.0) - 4.0 * w).abs() < 1e-4);
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Plan the week", 100.0, 11.0), vec!["Plan the week"]);
    }

    #[test]
    fn test_empty_text_yields_one_empty_line() {
        assert_eq!(wrap_text("", 100.0, 11.0), vec![String::new()]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let lines = wrap_text(text, 40.0, 11.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 11.0) <= 40.0, "{line:?} too wide");
        }
        // Rejoining the lines gives back every word in order.
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_explicit_newlines_are_kept() {
        let lines = wrap_text("one\n\nthree", 100.0, 11.0);
        assert_eq!(lines, vec!["one", "", "three"]);
    }

    #[test]
    fn test_only_oversized_words_are_split() {
        let long = "x".repeat(200);
        let text = format!("start {long} end");
        let lines = wrap_text(&text, 50.0, 11.0);
        assert_eq!(lines[0], "start");
        for line in &lines {
            assert!(text_width(line, 11.0) <= 50.0);
        }
        let joined: String = lines.concat();
        assert_eq!(joined.matches('x').count(), 200);
        assert!(lines.last().unwrap().ends_with("end"));
    }

    #[test]
    fn test_narrow_letters_fit_more_per_line() {
        // Same character count, different advance widths.
        let narrow = "iiii iiii iiii iiii iiii iiii iiii iiii";
        let wide = "WWWW WWWW WWWW WWWW WWWW WWWW WWWW WWWW";
        let narrow_lines = wrap_text(narrow, 30.0, 11.0);
        let wide_lines = wrap_text(wide, 30.0, 11.0);
        assert!(narrow_lines.len() < wide_lines.len());
        for line in narrow_lines.iter().chain(&wide_lines) {
            assert!(text_width(line, 11.0) <= 30.0, "{line:?} too wide");
        }
    }
}
