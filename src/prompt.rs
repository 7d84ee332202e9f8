//! Prompt Templates
//!
//! One template per mode. Templates ask the model to answer with `<T>`, `<Q>`
//! and `<A>` tags so the response parser can split the reply into records.
//! Users may replace any template from the settings; placeholders are filled
//! the same way for built-in and custom templates.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;
use crate::core::Mode;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid");
}

const FLASHCARD_TEMPLATE: &str = r#"Generate concise flashcards based on the following text. Create 3-5 flashcards. The questions should test key concepts, and the answers should be brief but complete.

Wrap each question in <Q></Q> tags and each answer in <A></A> tags, for example:
<Q>What is the capital of France?</Q>
<A>Paris</A>

Text: {text}"#;

const EXPLAIN_TEMPLATE: &str = r#"Explain the following text in simple terms, focusing on the main concepts. Use clear and concise language, and break down complex ideas into easily understandable parts.

Wrap the whole explanation in <A></A> tags.

Text: {text}"#;

const LANGUAGE_TEMPLATE: &str = r#"You are helping someone who speaks {target_language} learn vocabulary. For the word "{word}" as it is used in the sentence below, reply with:
<T>the translation of "{word}" into {translation_language}</T>
<Q>a short example sentence in {target_language} that uses "{word}"</Q>
<A>a concise explanation of what "{word}" means in this sentence</A>

Sentence: {context}"#;

/// Values substituted into a template
#[derive(Debug, Clone, Default)]
pub struct PromptVars<'a> {
    pub text: &'a str,
    pub word: &'a str,
    pub context: &'a str,
    pub translation_language: &'a str,
    pub target_language: &'a str,
}

/// Built-in template for a mode
pub fn default_template(mode: Mode) -> &'static str {
    match mode {
        Mode::Flashcard => FLASHCARD_TEMPLATE,
        Mode::Explain => EXPLAIN_TEMPLATE,
        Mode::Language => LANGUAGE_TEMPLATE,
    }
}

/// Fill `{placeholders}` in a template in one pass; unknown names are kept
pub fn render(template: &str, vars: &PromptVars<'_>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match &caps[1] {
                "text" => vars.text,
                "word" => vars.word,
                "context" => vars.context,
                "translation_language" => vars.translation_language,
                "target_language" => vars.target_language,
                _ => &caps[0],
            }
            .to_string()
        })
        .into_owned()
}

/// Build the prompt for a request, honouring the user's template override
pub fn build_prompt(config: &Config, mode: Mode, vars: &PromptVars<'_>) -> String {
    let template = config
        .prompt_override(mode)
        .unwrap_or_else(|| default_template(mode));
    let mut prompt = render(template, vars);

    // Custom templates written without {text} still need the selection.
    if !template.contains("{text}") && !template.contains("{word}") && !vars.text.is_empty() {
        prompt.push_str("\n\nText: ");
        prompt.push_str(vars.text);
    }

    prompt
}
