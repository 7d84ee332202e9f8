use flashgen::core::{context_for_word, extract_phrase, parse_response, Mode, TextPosition, TextSegments};

const GARBAGE: [&str; 10] = [
    "",
    " ",
    "asdfghjkl",
    "!!! @@@ ###",
    "<Q><A></Q></A><T>",
    "<A>only an answer</A>",
    "Q:\nA:\nQ:",
    "Word: \nTranslation: \n\n\n",
    "ünïcödé… 日本語のテキスト。 ¿Qué? ¡Sí!",
    "extremely long string that doesn't mean anything to the system at all but might \
     cause buffer issues if we were in C but we are in Rust so it's just a long string",
];

#[test]
fn test_parser_survives_garbage() {
    for content in GARBAGE {
        for mode in Mode::ALL {
            let records = parse_response(content, mode, "word");
            for record in &records {
                assert_eq!(record.mode(), mode, "record shape must follow the mode");
            }
            if mode == Mode::Explain {
                assert!(!records.is_empty(), "explain always yields a record");
            }
        }
    }
}

#[test]
fn test_extraction_survives_garbage() {
    let segments = TextSegments::new(GARBAGE.iter().map(|s| s.to_string()).collect());

    for segment in 0..segments.len() {
        let len = segments.segment(segment).len();
        // Offsets past the end and inside multi-byte characters are clamped
        for offset in [0, 1, 2, len / 2, len, len + 7] {
            for budget in [0, 1, 50, 10_000] {
                let start = TextPosition::new(segment, offset);
                let end = TextPosition::new(segment, offset + 3);
                let window = extract_phrase(&segments, start, end, "", budget);
                assert_eq!(window.phrase, window.phrase.trim());
            }
        }
    }

    assert!(context_for_word(&segments, "C", 50).is_some());
    assert!(context_for_word(&segments, "zebra", 50).is_none());
}
