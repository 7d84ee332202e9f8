//! Core processing modules
//!
//! Pure text logic: sentence context extraction around a selected word and
//! parsing of model output into study records. No I/O, no shared state.

pub mod phrase;
pub mod response;

pub use phrase::{
    context_for_word, extract_phrase, mark_word, ContextWindow, TextPosition, TextSegments,
    DEFAULT_CONTEXT_BUDGET,
};
pub use response::{parse_response, CardFields, FlashcardRecord, Mode};
