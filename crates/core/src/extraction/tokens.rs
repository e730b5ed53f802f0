//! Text and token types for the extraction pipeline, plus the word tokenizer used by the
//! built-in annotator.

use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};

/// Free text as submitted by a user.
///
/// Guaranteed to contain at least one non-whitespace character. Unlike a trimmed string type the
/// original text is kept verbatim, since it is what gets handed to the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    pub fn new(input: impl Into<String>) -> TriageResult<Self> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TriageError::InvalidInput("text cannot be empty".into()));
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A token produced by an annotation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub text: String,
    pub lower: String,
    /// Entity category such as `SYMPTOM` or `DISEASE`, when the engine assigned one.
    pub entity: Option<String>,
}

impl AnnotatedToken {
    pub fn new(text: impl Into<String>, entity: Option<String>) -> Self {
        let text = text.into();
        let lower = text.to_lowercase();
        Self {
            text,
            lower,
            entity: entity.filter(|e| !e.is_empty()),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }
}

const CLITICS: [&str; 6] = ["s", "m", "re", "ve", "ll", "d"];

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Split text into word and punctuation tokens.
///
/// Whitespace separates chunks. Leading and trailing non-alphanumeric characters of a chunk
/// become single-character tokens, and English clitics (`n't`, `'s`, `'m`, `'re`, `'ve`, `'ll`,
/// `'d`) are split off the word they attach to. Inner punctuation such as the hyphen in
/// `covid-19` stays inside the word.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in text.split_whitespace() {
        split_chunk(chunk, &mut tokens);
    }
    tokens
}

fn split_chunk(chunk: &str, out: &mut Vec<String>) {
    let Some(start) = chunk.find(|c: char| c.is_alphanumeric()) else {
        out.extend(chunk.chars().map(String::from));
        return;
    };
    let end = chunk
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(chunk.len());

    out.extend(chunk[..start].chars().map(String::from));
    split_clitic(&chunk[start..end], out);
    out.extend(chunk[end..].chars().map(String::from));
}

fn split_clitic(word: &str, out: &mut Vec<String>) {
    if let Some(pos) = word.rfind(is_apostrophe) {
        let apostrophe_len = word[pos..].chars().next().map_or(1, char::len_utf8);
        let rest = word[pos + apostrophe_len..].to_lowercase();
        let head = &word[..pos];

        if rest == "t" && head.len() > 1 && (head.ends_with('n') || head.ends_with('N')) {
            let split = pos - 1;
            out.push(word[..split].to_string());
            out.push(word[split..].to_string());
            return;
        }
        if !head.is_empty() && CLITICS.contains(&rest.as_str()) {
            out.push(head.to_string());
            out.push(word[pos..].to_string());
            return;
        }
    }
    out.push(word.to_string());
}
