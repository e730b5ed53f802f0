//! Symptom lexicon and the built-in annotator that tags tokens against it.
//!
//! The lexicon maps token sequences (single words or phrases like `shortness of breath`) to an
//! entity label. Matching is greedy and longest-first, so `chest pain` wins over a shorter entry
//! starting at the same token. Every token covered by a match carries the label, the same way a
//! multi-token entity is reported by a statistical NER engine.

use super::annotate::Annotate;
use super::tokens::{tokenize, AnnotatedToken};
use crate::{TriageError, TriageResult};
use std::collections::HashMap;
use std::path::Path;

pub const SYMPTOM_LABEL: &str = "SYMPTOM";
pub const DISEASE_LABEL: &str = "DISEASE";

const BUILTIN_SYMPTOMS: &[&str] = &[
    "abdominal pain",
    "back pain",
    "bleeding",
    "blurred vision",
    "body ache",
    "body pain",
    "breathlessness",
    "chest pain",
    "chills",
    "congestion",
    "constipation",
    "cough",
    "cramps",
    "diarrhea",
    "diarrhoea",
    "dizziness",
    "ear pain",
    "fatigue",
    "fever",
    "headache",
    "headaches",
    "high temperature",
    "insomnia",
    "itching",
    "joint pain",
    "loss of appetite",
    "loss of smell",
    "loss of taste",
    "muscle pain",
    "nausea",
    "numbness",
    "palpitations",
    "rash",
    "runny nose",
    "shortness of breath",
    "sneezing",
    "sore throat",
    "stomach ache",
    "stomach pain",
    "stomachache",
    "sweating",
    "swelling",
    "tingling",
    "toothache",
    "vomiting",
    "weakness",
    "weight loss",
    "wheezing",
];

const BUILTIN_DISEASES: &[&str] = &[
    "allergy",
    "anaemia",
    "anemia",
    "arthritis",
    "asthma",
    "bronchitis",
    "chickenpox",
    "cholera",
    "common cold",
    "covid",
    "covid-19",
    "dengue",
    "diabetes",
    "flu",
    "hypertension",
    "influenza",
    "jaundice",
    "malaria",
    "measles",
    "migraine",
    "pneumonia",
    "sinusitis",
    "tuberculosis",
    "typhoid",
];

/// Phrase-to-label table. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    entries: HashMap<Vec<String>, String>,
    longest: usize,
}

impl Lexicon {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in symptom and disease terms.
    pub fn builtin() -> Self {
        let mut lexicon = Self::empty();
        for term in BUILTIN_SYMPTOMS {
            lexicon.insert(term, SYMPTOM_LABEL);
        }
        for term in BUILTIN_DISEASES {
            lexicon.insert(term, DISEASE_LABEL);
        }
        lexicon
    }

    /// Add a term. Terms are tokenized and lowercased; blank terms are ignored.
    pub fn insert(&mut self, term: &str, label: &str) {
        let key: Vec<String> = tokenize(term).iter().map(|t| t.to_lowercase()).collect();
        if key.is_empty() {
            return;
        }
        self.longest = self.longest.max(key.len());
        self.entries.insert(key, label.to_string());
    }

    /// Extend the lexicon from TSV text: `term<TAB>LABEL` per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line without a label is a
    /// `SYMPTOM` entry.
    pub fn extend_from_tsv(&mut self, contents: &str) -> TriageResult<()> {
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '\t');
            let term = parts.next().unwrap_or_default().trim();
            let label = parts.next().map(str::trim).unwrap_or(SYMPTOM_LABEL);
            if term.is_empty() {
                return Err(TriageError::LexiconEntry {
                    line: index + 1,
                    reason: "missing term".into(),
                });
            }
            if label.is_empty() || label.chars().any(char::is_whitespace) {
                return Err(TriageError::LexiconEntry {
                    line: index + 1,
                    reason: format!("invalid label {label:?}"),
                });
            }
            self.insert(term, &label.to_ascii_uppercase());
        }
        Ok(())
    }

    /// Built-in terms plus the entries of a TSV file.
    pub fn builtin_with_file(path: &Path) -> TriageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(TriageError::LexiconRead)?;
        let mut lexicon = Self::builtin();
        lexicon.extend_from_tsv(&contents)?;
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label tokens in place, longest match first.
    pub fn tag(&self, tokens: &mut [AnnotatedToken]) {
        let lowers: Vec<String> = tokens.iter().map(|t| t.lower.clone()).collect();
        let mut i = 0;
        while i < tokens.len() {
            let max = self.longest.min(tokens.len() - i);
            let matched = (1..=max)
                .rev()
                .find_map(|len| self.entries.get(&lowers[i..i + len]).map(|label| (len, label)));
            match matched {
                Some((len, label)) => {
                    for token in &mut tokens[i..i + len] {
                        token.entity = Some(label.clone());
                    }
                    i += len;
                }
                None => i += 1,
            }
        }
    }
}

/// Annotator backed by [`tokenize`] and a [`Lexicon`]. Runs in-process.
#[derive(Clone, Debug)]
pub struct LexiconAnnotator {
    lexicon: Lexicon,
}

impl LexiconAnnotator {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn annotate_sync(&self, text: &str) -> Vec<AnnotatedToken> {
        let mut tokens: Vec<AnnotatedToken> =
            tokenize(text).into_iter().map(AnnotatedToken::plain).collect();
        self.lexicon.tag(&mut tokens);
        tokens
    }
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

#[async_trait::async_trait]
impl Annotate for LexiconAnnotator {
    async fn annotate(&self, text: &str) -> TriageResult<Vec<AnnotatedToken>> {
        Ok(self.annotate_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(tokens: &[AnnotatedToken]) -> Vec<(&str, Option<&str>)> {
        tokens
            .iter()
            .map(|t| (t.text.as_str(), t.entity.as_deref()))
            .collect()
    }

    #[test]
    fn tags_single_words_case_insensitively() {
        let tokens = LexiconAnnotator::default().annotate_sync("High FEVER since Monday");
        assert_eq!(
            entities(&tokens),
            vec![
                ("High", None),
                ("FEVER", Some("SYMPTOM")),
                ("since", None),
                ("Monday", None),
            ]
        );
    }

    #[test]
    fn prefers_longest_phrase() {
        let tokens = LexiconAnnotator::default().annotate_sync("severe shortness of breath.");
        assert_eq!(
            entities(&tokens),
            vec![
                ("severe", None),
                ("shortness", Some("SYMPTOM")),
                ("of", Some("SYMPTOM")),
                ("breath", Some("SYMPTOM")),
                (".", None),
            ]
        );
    }

    #[test]
    fn diseases_carry_disease_label() {
        let tokens = LexiconAnnotator::default().annotate_sync("maybe dengue");
        assert_eq!(tokens[1].entity.as_deref(), Some("DISEASE"));
    }

    #[test]
    fn tsv_extension_adds_terms_and_defaults_label() {
        let mut lexicon = Lexicon::empty();
        lexicon
            .extend_from_tsv("# local terms\nbukhar\nsir dard\tsymptom\n\nthyroid\tDISEASE\n")
            .expect("valid tsv");
        assert_eq!(lexicon.len(), 3);

        let tokens = LexiconAnnotator::new(lexicon).annotate_sync("sir dard aur bukhar");
        assert_eq!(
            entities(&tokens),
            vec![
                ("sir", Some("SYMPTOM")),
                ("dard", Some("SYMPTOM")),
                ("aur", None),
                ("bukhar", Some("SYMPTOM")),
            ]
        );
    }

    #[test]
    fn tsv_rejects_bad_labels() {
        let err = Lexicon::empty()
            .extend_from_tsv("fever\tSYMP TOM\n")
            .expect_err("label with space");
        match err {
            TriageError::LexiconEntry { line, .. } => assert_eq!(line, 1),
            other => panic!("expected LexiconEntry, got {other:?}"),
        }
    }

    #[test]
    fn reads_lexicon_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lexicon.tsv");
        std::fs::write(&path, "khansi\tSYMPTOM\n").expect("write lexicon");

        let lexicon = Lexicon::builtin_with_file(&path).expect("load lexicon");
        assert_eq!(lexicon.len(), Lexicon::builtin().len() + 1);
    }
}
