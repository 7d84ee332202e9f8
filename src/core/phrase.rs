//! Sentence Context Extraction
//!
//! Builds the context sent with a language-mode query: the sentence that
//! encloses a selected word, with the word wrapped in `<b>` tags.
//!
//! The page text arrives as an ordered list of segments (one per text node).
//! Expansion starts from the selection, scans a small budget on each side for
//! a sentence boundary, then keeps walking through neighbouring segments until
//! one is found or the text runs out.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Characters scanned on each side of the selection before walking segments
pub const DEFAULT_CONTEXT_BUDGET: usize = 50;

lazy_static! {
    /// Terminator, whitespace, then the capital that opens the next sentence
    static ref SENTENCE_START_RE: Regex =
        Regex::new(r"[.!?]\s+(\p{Lu})").expect("sentence start pattern is valid");
    static ref SENTENCE_END_RE: Regex =
        Regex::new(r"[.!?](?:\s|$)").expect("sentence end pattern is valid");
}

/// Ordered text-bearing segments of a document fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegments {
    segments: Vec<String>,
}

/// A character position: segment index plus byte offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextPosition {
    pub segment: usize,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(segment: usize, offset: usize) -> Self {
        Self { segment, offset }
    }
}

/// Sentence-scoped excerpt around a word, word marked with `<b>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    pub phrase: String,
}

impl TextSegments {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Single-segment document
    pub fn from_text(text: &str) -> Self {
        Self {
            segments: vec![text.to_string()],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, idx: usize) -> &str {
        self.segments.get(idx).map(String::as_str).unwrap_or("")
    }

    /// All segments joined, as the page would render them
    pub fn flattened(&self) -> String {
        self.segments.concat()
    }

    /// Map a byte offset in the flattened text to a position.
    ///
    /// An offset that falls exactly between two segments resolves to the
    /// start of the later one.
    pub fn locate(&self, flat_offset: usize) -> TextPosition {
        self.locate_with(flat_offset, false)
    }

    /// Like [`locate`](Self::locate) but a boundary offset resolves to the end
    /// of the earlier segment, which is what a range end wants.
    pub fn locate_end(&self, flat_offset: usize) -> TextPosition {
        self.locate_with(flat_offset, true)
    }

    fn locate_with(&self, flat_offset: usize, prefer_earlier: bool) -> TextPosition {
        let mut consumed = 0;
        for (idx, segment) in self.segments.iter().enumerate() {
            let end = consumed + segment.len();
            if flat_offset < end || (prefer_earlier && flat_offset == end) {
                return TextPosition::new(idx, flat_offset - consumed);
            }
            consumed = end;
        }
        let last = self.segments.len().saturating_sub(1);
        TextPosition::new(last, self.segment(last).len())
    }

    /// Clamp a position onto an existing segment and a char boundary
    fn clamp(&self, pos: TextPosition) -> TextPosition {
        if self.segments.is_empty() {
            return TextPosition::new(0, 0);
        }
        let segment = pos.segment.min(self.segments.len() - 1);
        let text = self.segment(segment);
        TextPosition::new(segment, floor_char_boundary(text, pos.offset))
    }

    /// Text from `from` to `to`, slicing the first and last segments
    fn slice(&self, from: TextPosition, to: TextPosition) -> String {
        if from.segment == to.segment {
            let text = self.segment(from.segment);
            return text[from.offset..to.offset.max(from.offset)].to_string();
        }

        let mut out = String::new();
        out.push_str(&self.segment(from.segment)[from.offset..]);
        for idx in from.segment + 1..to.segment {
            out.push_str(self.segment(idx));
        }
        out.push_str(&self.segment(to.segment)[..to.offset]);
        out
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Positions where a sentence begins, at the opening capital
fn sentence_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    SENTENCE_START_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.start())
}

/// Positions just past a sentence terminator
fn sentence_ends(text: &str) -> impl Iterator<Item = usize> + '_ {
    SENTENCE_END_RE.find_iter(text).map(|m| m.start() + 1)
}

fn last_start_in(text: &str, from: usize, to: usize) -> Option<usize> {
    sentence_starts(text)
        .filter(|&pos| pos >= from && pos <= to)
        .last()
}

fn first_end_in(text: &str, from: usize, to: usize) -> Option<usize> {
    sentence_ends(text).find(|&pos| pos >= from && pos <= to)
}

/// Walk left from the selection start to the nearest sentence start
fn expand_left(segments: &TextSegments, start: TextPosition, budget: usize) -> TextPosition {
    let text = segments.segment(start.segment);
    let seed = start.offset.saturating_sub(budget);

    if let Some(pos) = last_start_in(text, seed, start.offset) {
        return TextPosition::new(start.segment, pos);
    }
    if let Some(pos) = last_start_in(text, 0, seed.saturating_sub(1)) {
        return TextPosition::new(start.segment, pos);
    }

    let mut segment = start.segment;
    while segment > 0 {
        segment -= 1;
        let text = segments.segment(segment);
        if let Some(pos) = last_start_in(text, 0, text.len()) {
            return TextPosition::new(segment, pos);
        }
    }

    debug!("No sentence start found, context runs to the beginning");
    TextPosition::new(0, 0)
}

/// Walk right from the selection end to the nearest sentence end
fn expand_right(segments: &TextSegments, end: TextPosition, budget: usize) -> TextPosition {
    let text = segments.segment(end.segment);
    let seed = (end.offset + budget).min(text.len());

    if let Some(pos) = first_end_in(text, end.offset, seed) {
        return TextPosition::new(end.segment, pos);
    }
    if let Some(pos) = first_end_in(text, seed, text.len()) {
        return TextPosition::new(end.segment, pos);
    }

    let last = segments.len().saturating_sub(1);
    let mut segment = end.segment;
    while segment < last {
        segment += 1;
        let text = segments.segment(segment);
        if let Some(pos) = sentence_ends(text).next() {
            return TextPosition::new(segment, pos);
        }
    }

    debug!("No sentence end found, context runs to the end");
    TextPosition::new(last, segments.segment(last).len())
}

/// Extract the sentence enclosing `start..end` and mark `word` in it.
///
/// Never fails: without boundaries the whole available text is used, and a
/// word that does not occur is simply left unmarked.
pub fn extract_phrase(
    segments: &TextSegments,
    start: TextPosition,
    end: TextPosition,
    word: &str,
    budget: usize,
) -> ContextWindow {
    if segments.is_empty() {
        return ContextWindow::default();
    }

    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let start = segments.clamp(start);
    let end = segments.clamp(end);

    let left = expand_left(segments, start, budget);
    let right = expand_right(segments, end, budget);
    let sentence = segments.slice(left, right);

    debug!(
        "Context window {:?}..{:?} ({} bytes)",
        left,
        right,
        sentence.len()
    );

    ContextWindow {
        phrase: mark_word(sentence.trim(), word),
    }
}

/// Find the first whole-word occurrence of `word` and extract around it
pub fn context_for_word(
    segments: &TextSegments,
    word: &str,
    budget: usize,
) -> Option<ContextWindow> {
    let re = word_pattern(word)?;
    let flat = segments.flattened();
    let found = re.find(&flat)?;

    let start = segments.locate(found.start());
    let end = segments.locate_end(found.end());
    Some(extract_phrase(segments, start, end, word, budget))
}

/// Wrap every case-insensitive whole-word match of `word` in `<b>…</b>`
pub fn mark_word(phrase: &str, word: &str) -> String {
    match word_pattern(word) {
        Some(re) => re.replace_all(phrase, "<b>$0</b>").into_owned(),
        None => phrase.to_string(),
    }
}

/// Case-insensitive whole-word matcher. Word boundaries are only required on
/// sides where the word itself starts or ends with a word character, so terms
/// like `C++` still match.
fn word_pattern(word: &str) -> Option<Regex> {
    let word = word.trim();
    let first = word.chars().next()?;
    let last = word.chars().last()?;
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';

    let pattern = format!(
        "(?i){}{}{}",
        if is_word_char(first) { r"\b" } else { "" },
        regex::escape(word),
        if is_word_char(last) { r"\b" } else { "" },
    );

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("⚠️ Could not build word pattern for '{}': {}", word, e);
            None
        }
    }
}
