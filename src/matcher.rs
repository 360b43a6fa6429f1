//! Symptom extraction from normalized text
//!
//! Each vocabulary entry is tested on its own:
//! 1. exact phrase, bounded by non-word characters
//! 2. otherwise every phrase token present anywhere in the text
//!
//! The token fallback trades precision for recall; scattered and reordered
//! words still match a multi-word symptom.

use crate::error::ScreenerError;
use crate::vocabulary::Vocabulary;
use crate::Result;
use regex::Regex;
use std::collections::HashSet;

/// Compiled matcher for one vocabulary entry
#[derive(Debug)]
struct PhraseMatcher {
    symptom: String,
    pattern: Regex,
    tokens: Vec<String>,
}

/// Matches normalized text against a fixed vocabulary
#[derive(Debug)]
pub struct SymptomMatcher {
    phrases: Vec<PhraseMatcher>,
}

impl SymptomMatcher {
    /// Compile phrase patterns for every vocabulary entry
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let mut phrases = Vec::with_capacity(vocabulary.len());

        for symptom in vocabulary.terms() {
            let phrase = symptom_phrase(symptom);
            let tokens: Vec<String> = phrase.split(' ').map(str::to_string).collect();

            // An identifier with no words can never be present in text
            if phrase.is_empty() {
                continue;
            }

            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&phrase))).map_err(|e| {
                ScreenerError::InternalError(format!(
                    "cannot compile pattern for '{}': {}",
                    symptom, e
                ))
            })?;

            phrases.push(PhraseMatcher {
                symptom: symptom.clone(),
                pattern,
                tokens,
            });
        }

        Ok(Self { phrases })
    }

    /// Symptoms present in `text`, in vocabulary order, without duplicates
    pub fn extract(&self, text: &str) -> Vec<String> {
        let text_tokens: HashSet<&str> = text.split_whitespace().collect();

        self.phrases
            .iter()
            .filter(|phrase| {
                phrase.pattern.is_match(text)
                    || phrase
                        .tokens
                        .iter()
                        .all(|token| text_tokens.contains(token.as_str()))
            })
            .map(|phrase| phrase.symptom.clone())
            .collect()
    }
}

/// `joint_pain` → `joint pain`
fn symptom_phrase(symptom: &str) -> String {
    symptom
        .replace('_', " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
