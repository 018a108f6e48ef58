use std::collections::VecDeque;

use super::measure::TextMeasure;
use crate::units::Pt;

/// One line of wrapped output, guaranteed to fit the width it was wrapped to.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Horizontal offset from the start of the column. Non-zero for every line
    /// of a bulleted item.
    pub indent: Pt,
}

impl WrappedLine {
    pub fn new<S: Into<String>>(text: S, indent: Pt) -> WrappedLine {
        WrappedLine {
            text: text.into(),
            indent,
        }
    }

    /// The single empty line produced for empty input
    pub fn blank() -> WrappedLine {
        WrappedLine::new("", Pt::ZERO)
    }
}

/// Input text for the wrapping functions. Absent text wraps exactly like an
/// empty string, so record fields can be passed straight through.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TextBlock<'a>(Option<&'a str>);

impl<'a> TextBlock<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0.unwrap_or("")
    }
}

impl<'a> From<&'a str> for TextBlock<'a> {
    fn from(text: &'a str) -> Self {
        TextBlock(Some(text))
    }
}

impl<'a> From<&'a String> for TextBlock<'a> {
    fn from(text: &'a String) -> Self {
        TextBlock(Some(text.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for TextBlock<'a> {
    fn from(text: Option<&'a str>) -> Self {
        TextBlock(text)
    }
}

impl<'a> From<&'a Option<String>> for TextBlock<'a> {
    fn from(text: &'a Option<String>) -> Self {
        TextBlock(text.as_deref())
    }
}

fn is_word_break(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Lazily wraps a single paragraph into lines no wider than `max_width`.
///
/// Words are separated by spaces (tabs and line breaks count as spaces here; use
/// [wrap_text] to keep hard line breaks). A word is only ever split when it is
/// wider than `max_width` on its own, in which case it is cut into chunks that
/// each fit. The iterator is [Clone], so it can be restarted from any point and
/// always yields the same lines for the same input.
///
/// Empty or whitespace-only input yields exactly one empty line.
#[derive(Clone)]
pub struct WordWrap<'t, M> {
    words: std::str::Split<'t, fn(char) -> bool>,
    measure: M,
    max_width: Pt,
    current: String,
    pending: VecDeque<String>,
    emitted: bool,
    finished: bool,
}

/// Start wrapping `text` to `max_width`, see [WordWrap]
pub fn wrap_words<M: TextMeasure>(text: &str, max_width: Pt, measure: M) -> WordWrap<'_, M> {
    WordWrap {
        words: text.split(is_word_break as fn(char) -> bool),
        measure,
        max_width,
        current: String::new(),
        pending: VecDeque::new(),
        emitted: false,
        finished: false,
    }
}

impl<M: TextMeasure> WordWrap<'_, M> {
    fn fits(&self, text: &str) -> bool {
        self.measure.width_or_estimate(text) <= self.max_width
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.pending.push_back(std::mem::take(&mut self.current));
        }
    }

    fn push_word(&mut self, word: &str) {
        if !self.fits(word) {
            self.flush();
            self.pending
                .extend(chunk_word(word, self.max_width, &self.measure));
            return;
        }

        if self.current.is_empty() {
            self.current.push_str(word);
            return;
        }

        let candidate = format!("{} {}", self.current, word);
        if self.fits(&candidate) {
            self.current = candidate;
        } else {
            self.flush();
            self.current.push_str(word);
        }
    }
}

impl<M: TextMeasure> Iterator for WordWrap<'_, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                self.emitted = true;
                return Some(line);
            }
            if self.finished {
                return None;
            }

            match self.words.next() {
                Some("") => continue,
                Some(word) => self.push_word(word),
                None => {
                    self.finished = true;
                    self.flush();
                    if self.pending.is_empty() && !self.emitted {
                        self.pending.push_back(String::new());
                    }
                }
            }
        }
    }
}

/// Cut a word that is too wide for a line into pieces that fit.
///
/// The first guess at the chunk length assumes every character is as wide as the
/// widest common glyph; each chunk is then re-measured and shortened until it fits.
/// A single character wider than `max_width` is emitted on its own.
fn chunk_word<M: TextMeasure>(word: &str, max_width: Pt, measure: &M) -> Vec<String> {
    let char_width = measure.widest_char_width().max(Pt(0.01));
    let per_chunk = ((max_width / char_width).floor() as usize).max(1);

    let chars: Vec<char> = word.chars().collect();
    let mut chunks = Vec::with_capacity(chars.len() / per_chunk + 1);
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + per_chunk).min(chars.len());
        let mut chunk: String = chars[start..end].iter().collect();
        while end - start > 1 && measure.width_or_estimate(&chunk) > max_width {
            end -= 1;
            chunk.pop();
        }
        chunks.push(chunk);
        start = end;
    }
    chunks
}

/// Wrap a block of text to `max_width`, keeping hard line breaks.
///
/// Each line of the input is wrapped on its own; blank lines between paragraphs
/// are kept as empty lines. All output lines have zero indent. Empty,
/// whitespace-only and absent input produce a single empty line, so a caller can
/// always draw at least one row.
pub fn wrap_text<'a, T, M>(text: T, max_width: Pt, measure: M) -> Vec<WrappedLine>
where
    T: Into<TextBlock<'a>>,
    M: TextMeasure,
{
    let text = text.into().as_str();
    if text.trim().is_empty() {
        return vec![WrappedLine::blank()];
    }

    text.trim_end_matches(['\n', '\r'])
        .split('\n')
        .flat_map(|paragraph| wrap_words(paragraph, max_width, &measure))
        .map(|line| WrappedLine::new(line, Pt::ZERO))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Monospace;

    fn ten() -> Monospace {
        Monospace::new(Pt(10.0))
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn no_two_words_fit_together() {
        let lines = wrap_text("alpha beta gamma", Pt(50.0), ten());
        assert_eq!(texts(&lines), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn words_share_lines_when_they_fit() {
        let lines = wrap_text("a bb ccc dddd", Pt(60.0), ten());
        assert_eq!(texts(&lines), vec!["a bb", "ccc", "dddd"]);
    }

    #[test]
    fn empty_input_is_one_blank_line() {
        assert_eq!(wrap_text("", Pt(50.0), ten()), vec![WrappedLine::blank()]);
        assert_eq!(wrap_text("   \n\t ", Pt(50.0), ten()), vec![WrappedLine::blank()]);
        assert_eq!(
            wrap_text(None::<&str>, Pt(50.0), ten()),
            vec![WrappedLine::blank()]
        );
        assert_eq!(wrap_words("  ", Pt(50.0), ten()).count(), 1);
    }

    #[test]
    fn long_word_is_chunked() {
        let word = "x".repeat(20);
        let lines = wrap_text(word.as_str(), Pt(50.0), ten());
        assert!(lines.len() >= 4);
        for line in &lines {
            assert!(ten().width_or_estimate(&line.text) <= Pt(50.0));
        }
        let joined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, word);
    }

    #[test]
    fn long_word_flushes_pending_line_first() {
        let lines = wrap_text("ab cdefghijkl mn", Pt(50.0), ten());
        assert_eq!(texts(&lines), vec!["ab", "cdefg", "hijkl", "mn"]);
    }

    #[test]
    fn chunks_are_remeasured() {
        // 'W' is three times wider than anything else, so the first guess overshoots
        struct Wide;
        impl TextMeasure for Wide {
            fn text_width(&self, text: &str) -> Option<Pt> {
                Some(text.chars().map(|c| if c == 'W' { Pt(30.0) } else { Pt(10.0) }).sum())
            }
            fn fallback_char_width(&self) -> Pt {
                Pt(30.0)
            }
            fn widest_char_width(&self) -> Pt {
                Pt(10.0)
            }
        }

        let lines = wrap_text("WWWWWWWW", Pt(50.0), Wide);
        for line in &lines {
            assert!(Wide.width_or_estimate(&line.text) <= Pt(50.0), "{line:?}");
        }
        assert_eq!(lines.iter().map(|l| l.text.len()).sum::<usize>(), 8);
    }

    #[test]
    fn glyph_wider_than_column_is_emitted_alone() {
        let lines = wrap_text("abc", Pt(5.0), ten());
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
    }

    #[test]
    fn hard_breaks_and_blank_lines_are_kept() {
        let lines = wrap_text("one two\n\nthree\n", Pt(100.0), ten());
        assert_eq!(texts(&lines), vec!["one two", "", "three"]);
    }

    #[test]
    fn repeated_spaces_are_collapsed() {
        let lines = wrap_text("  one   two  ", Pt(100.0), ten());
        assert_eq!(texts(&lines), vec!["one two"]);
    }

    #[test]
    fn word_order_is_preserved() {
        let text = "o rato roeu a roupa do rei de roma e a rainha com raiva resolveu remendar";
        let lines = wrap_text(text, Pt(120.0), ten());
        let words: Vec<&str> = lines.iter().flat_map(|l| l.text.split(' ')).collect();
        assert_eq!(words, text.split(' ').collect::<Vec<_>>());
        for line in &lines {
            assert!(ten().width_or_estimate(&line.text) <= Pt(120.0));
        }
    }

    #[test]
    fn wrapping_is_restartable() {
        let wrap = wrap_words("um dois tres quatro cinco seis", Pt(90.0), ten());
        let mut partial = wrap.clone();
        partial.next();
        let first: Vec<String> = wrap.clone().collect();
        let second: Vec<String> = wrap.collect();
        assert_eq!(first, second);
        assert_eq!(partial.count(), first.len() - 1);
    }
}
