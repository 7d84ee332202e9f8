//! CSV Export
//!
//! Header depends on the collection: `Question,Answer` for flashcards and
//! explanations, `Word,Translation,Question,Answer` for language cards.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{FlashcardRecord, Mode};
use crate::error::FlashResult;

pub fn headers(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Flashcard | Mode::Explain => &["Question", "Answer"],
        Mode::Language => &["Word", "Translation", "Question", "Answer"],
    }
}

/// File name used when the user does not pick one
pub fn default_file_name(mode: Mode) -> String {
    format!("{}_flashcards.csv", mode)
}

/// Quote a field when it holds a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

pub fn to_csv(mode: Mode, records: &[FlashcardRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, headers(mode));

    for record in records {
        let fields = record.fields();
        match mode {
            Mode::Language => push_row(
                &mut out,
                &[
                    fields.word.as_deref().unwrap_or(""),
                    fields.translation.as_deref().unwrap_or(""),
                    fields.question.as_str(),
                    fields.answer.as_str(),
                ],
            ),
            Mode::Flashcard | Mode::Explain => {
                push_row(&mut out, &[fields.question.as_str(), fields.answer.as_str()])
            }
        }
    }

    out
}

/// Write a collection to `path`, or to the default file name in the
/// current directory
pub fn write_csv(
    mode: Mode,
    records: &[FlashcardRecord],
    path: Option<&Path>,
) -> FlashResult<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_file_name(mode)));
    std::fs::write(&path, to_csv(mode, records))?;
    info!("📤 Exported {} record(s) to {:?}", records.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_csv() {
        let records = vec![
            FlashcardRecord::Basic {
                question: "What is 2+2?".to_string(),
                answer: "4".to_string(),
            },
            FlashcardRecord::Explanation {
                answer: "It means \"X\", roughly.".to_string(),
            },
        ];
        assert_eq!(
            to_csv(Mode::Flashcard, &records),
            "Question,Answer\nWhat is 2+2?,4\nExplanation,\"It means \"\"X\"\", roughly.\"\n"
        );
    }

    #[test]
    fn test_language_csv() {
        let records = vec![FlashcardRecord::LanguageEntry {
            word: "run".to_string(),
            translation: "courir".to_string(),
            example: "I run,\nfast.".to_string(),
            meaning: "move".to_string(),
        }];
        assert_eq!(
            to_csv(Mode::Language, &records),
            "Word,Translation,Question,Answer\nrun,courir,\"I run,\nfast.\",move\n"
        );
    }

    #[test]
    fn test_empty_collection_has_header_only() {
        assert_eq!(to_csv(Mode::Explain, &[]), "Question,Answer\n");
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name(Mode::Language), "language_flashcards.csv");
        assert_eq!(default_file_name(Mode::Explain), "explain_flashcards.csv");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let written = write_csv(Mode::Flashcard, &[], Some(&path)).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Question,Answer\n");
    }
}
