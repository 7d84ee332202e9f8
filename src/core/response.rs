//! Model Response Parsing
//!
//! Turns the raw text a model sends back into study records. Two markups are
//! understood:
//!
//! - tagged: `<T>…</T>`, `<Q>…</Q>`, `<A>…</A>` in any order, bodies may span
//!   several lines. This is what the bundled prompts ask for.
//! - line-prefixed: `Q:` / `A:` lines for flashcards, and blank-line separated
//!   `Label: value` blocks for language cards. Older prompts produced this.
//!
//! Parsing never fails. Missing fields become empty strings and unrecognised
//! text is skipped.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FlashError;

lazy_static! {
    /// One alternation so matches come back in source order and never overlap
    static ref TAG_RE: Regex =
        Regex::new(r"(?s)<T>(.*?)</T>|<Q>(.*?)</Q>|<A>(.*?)</A>").expect("tag pattern is valid");
    /// Any run of blank lines separates two legacy language blocks
    static ref BLANK_LINE_RE: Regex = Regex::new(r"\n\s*\n").expect("blank line pattern is valid");
}

/// Label shown in place of a question for explanation records
pub const EXPLANATION_LABEL: &str = "Explanation";

/// Generation mode, selects the prompt and the record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Flashcard,
    Explain,
    Language,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Flashcard, Mode::Explain, Mode::Language];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Flashcard => "flashcard",
            Mode::Explain => "explain",
            Mode::Language => "language",
        }
    }

    /// Name of the persisted collection this mode's records belong to.
    ///
    /// Flashcards and explanations share one list, language cards have their own.
    pub fn collection_key(&self) -> &'static str {
        match self {
            Mode::Flashcard | Mode::Explain => "flashcard",
            Mode::Language => "language",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = FlashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flashcard" | "flashcards" => Ok(Mode::Flashcard),
            "explain" | "explanation" => Ok(Mode::Explain),
            "language" => Ok(Mode::Language),
            other => Err(FlashError::InvalidMode(other.to_string())),
        }
    }
}

/// One generated study unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CardFields", into = "CardFields")]
pub enum FlashcardRecord {
    /// Question/answer pair (flashcard mode)
    Basic { question: String, answer: String },
    /// Plain-language explanation (explain mode)
    Explanation { answer: String },
    /// Vocabulary card (language mode)
    LanguageEntry {
        word: String,
        translation: String,
        example: String,
        meaning: String,
    },
}

impl FlashcardRecord {
    /// Question side as displayed: the example sentence for language cards
    pub fn question(&self) -> &str {
        match self {
            FlashcardRecord::Basic { question, .. } => question,
            FlashcardRecord::Explanation { .. } => EXPLANATION_LABEL,
            FlashcardRecord::LanguageEntry { example, .. } => example,
        }
    }

    /// Answer side as displayed: the meaning for language cards
    pub fn answer(&self) -> &str {
        match self {
            FlashcardRecord::Basic { answer, .. } | FlashcardRecord::Explanation { answer } => {
                answer
            }
            FlashcardRecord::LanguageEntry { meaning, .. } => meaning,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            FlashcardRecord::Basic { .. } => Mode::Flashcard,
            FlashcardRecord::Explanation { .. } => Mode::Explain,
            FlashcardRecord::LanguageEntry { .. } => Mode::Language,
        }
    }

    /// Flat field view shared by the wire format, the store and CSV export
    pub fn fields(&self) -> CardFields {
        CardFields::from(self.clone())
    }
}

/// Flat `{word, translation, question, answer}` shape used on the wire.
///
/// `word` and `translation` are only present for language cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl From<FlashcardRecord> for CardFields {
    fn from(record: FlashcardRecord) -> Self {
        match record {
            FlashcardRecord::Basic { question, answer } => CardFields {
                question,
                answer,
                ..Default::default()
            },
            FlashcardRecord::Explanation { answer } => CardFields {
                question: EXPLANATION_LABEL.to_string(),
                answer,
                ..Default::default()
            },
            FlashcardRecord::LanguageEntry {
                word,
                translation,
                example,
                meaning,
            } => CardFields {
                word: Some(word),
                translation: Some(translation),
                question: example,
                answer: meaning,
            },
        }
    }
}

/// Variant is inferred from the fields: `word`/`translation` mean a language
/// card, and a question of exactly `"Explanation"` means an explanation. A
/// `Basic` card with that literal question therefore comes back as an
/// `Explanation`; its question and answer text are unchanged.
impl From<CardFields> for FlashcardRecord {
    fn from(fields: CardFields) -> Self {
        if fields.word.is_some() || fields.translation.is_some() {
            FlashcardRecord::LanguageEntry {
                word: fields.word.unwrap_or_default(),
                translation: fields.translation.unwrap_or_default(),
                example: fields.question,
                meaning: fields.answer,
            }
        } else if fields.question == EXPLANATION_LABEL {
            FlashcardRecord::Explanation {
                answer: fields.answer,
            }
        } else {
            FlashcardRecord::Basic {
                question: fields.question,
                answer: fields.answer,
            }
        }
    }
}

/// Record under construction while scanning
#[derive(Debug, Default)]
struct PendingRecord {
    translation: Option<String>,
    question: Option<String>,
    answer: Option<String>,
}

impl PendingRecord {
    /// A flashcard needs its answer; a language card is opened by its translation
    fn is_complete(&self, mode: Mode) -> bool {
        match mode {
            Mode::Flashcard | Mode::Explain => self.answer.is_some(),
            Mode::Language => self.translation.is_some() || self.answer.is_some(),
        }
    }

    fn into_record(self, mode: Mode, word: &str) -> FlashcardRecord {
        match mode {
            Mode::Flashcard => FlashcardRecord::Basic {
                question: self.question.unwrap_or_default(),
                answer: self.answer.unwrap_or_default(),
            },
            Mode::Explain => FlashcardRecord::Explanation {
                answer: self.answer.unwrap_or_default(),
            },
            Mode::Language => FlashcardRecord::LanguageEntry {
                word: word.to_string(),
                translation: self.translation.unwrap_or_default(),
                example: self.question.unwrap_or_default(),
                meaning: self.answer.unwrap_or_default(),
            },
        }
    }
}

fn flush(pending: PendingRecord, mode: Mode, word: &str, out: &mut Vec<FlashcardRecord>) {
    if pending.is_complete(mode) {
        out.push(pending.into_record(mode, word));
    } else {
        debug!("Dropping incomplete {} record: {:?}", mode, pending);
    }
}

/// Parse one model response into records for `mode`.
///
/// `word` is the queried term and is stamped onto language cards; it is
/// ignored for the other modes.
pub fn parse_response(content: &str, mode: Mode, word: &str) -> Vec<FlashcardRecord> {
    let mut records = parse_tagged(content, mode, word);

    if records.is_empty() {
        records = match mode {
            Mode::Flashcard => parse_prefixed_flashcards(content),
            Mode::Language => parse_prefixed_language(content),
            Mode::Explain => Vec::new(),
        };
        if !records.is_empty() {
            debug!("Parsed {} records with line-prefixed markup", records.len());
        }
    }

    if records.is_empty() && mode == Mode::Explain {
        records.push(FlashcardRecord::Explanation {
            answer: content.to_string(),
        });
    }

    records
}

/// Tagged markup: `<T>` opens a record, `<Q>` fills the question, `<A>` closes it
pub fn parse_tagged(content: &str, mode: Mode, word: &str) -> Vec<FlashcardRecord> {
    let mut records = Vec::new();
    let mut pending: Option<PendingRecord> = None;

    for caps in TAG_RE.captures_iter(content) {
        if let Some(translation) = caps.get(1) {
            if let Some(open) = pending.take() {
                flush(open, mode, word, &mut records);
            }
            pending = Some(PendingRecord {
                translation: Some(translation.as_str().trim().to_string()),
                ..Default::default()
            });
        } else if let Some(question) = caps.get(2) {
            pending.get_or_insert_with(PendingRecord::default).question =
                Some(question.as_str().trim().to_string());
        } else if let Some(answer) = caps.get(3) {
            let mut open = pending.take().unwrap_or_default();
            open.answer = Some(answer.as_str().trim().to_string());
            flush(open, mode, word, &mut records);
        }
    }

    if let Some(open) = pending {
        flush(open, mode, word, &mut records);
    }

    records
}

/// Legacy `Q:` / `A:` lines
pub fn parse_prefixed_flashcards(content: &str) -> Vec<FlashcardRecord> {
    let mut records = Vec::new();
    let mut question: Option<String> = None;

    for line in content.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("Q:") {
            question = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("A:") {
            records.push(FlashcardRecord::Basic {
                question: question.take().unwrap_or_default(),
                answer: rest.trim().to_string(),
            });
        }
    }

    records
}

/// Legacy language blocks: word, translation, example and meaning lines,
/// each `Label: value`, blocks separated by blank lines
pub fn parse_prefixed_language(content: &str) -> Vec<FlashcardRecord> {
    let normalized = content.replace("\r\n", "\n");

    BLANK_LINE_RE
        .split(normalized.trim())
        .filter_map(|entry| {
            let lines: Vec<&str> = entry.lines().collect();
            let value = |idx: usize| -> String {
                lines
                    .get(idx)
                    .and_then(|line| line.split_once(": "))
                    .map(|(_, v)| v.trim().to_string())
                    .unwrap_or_default()
            };

            let (word, translation, example, meaning) = (value(0), value(1), value(2), value(3));
            if word.is_empty() && translation.is_empty() && example.is_empty() && meaning.is_empty()
            {
                return None;
            }
            Some(FlashcardRecord::LanguageEntry {
                word,
                translation,
                example,
                meaning,
            })
        })
        .collect()
}
