//! Feeding phrases into a dictionary and checking text against it.
use serde::{Deserialize, Serialize};

use crate::dictionary::{Dictionary, Suggestion};
use crate::tokenizer::WordSplitter;

/// Text to be learnt by a dictionary, every word carrying the same weight.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Phrase {
    /// word or phrase to add
    pub text: String,
    /// importance of each word; zero counts as one
    #[serde(default)]
    pub weight: u32,
}

/// Kind of problem found in a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    /// no possible correction was found
    UnknownWord,
    /// the word can be corrected with one of the suggestions
    InvalidWord,
}

/// A misspelled word of a text, located by character offsets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Fix {
    /// index of the first character of the word
    pub start: usize,
    /// index one past the last character of the word
    pub end: usize,
    /// corrections, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    /// what is wrong with the word
    pub error: FixKind,
}

/// Adds the words of every phrase, returning how many words were submitted.
pub fn add_phrases<D: Dictionary>(
    dictionary: &D,
    splitter: &WordSplitter,
    phrases: &[Phrase],
) -> usize {
    let mut count = 0;

    for phrase in phrases {
        let words: Vec<&str> = splitter.words(&phrase.text).collect();
        if words.is_empty() {
            continue;
        }

        dictionary.add_weighted(phrase.weight.max(1), &words);
        count += words.len();
    }

    count
}

/// Reports every word of `text` the dictionary does not know.
pub fn fix_text<D: Dictionary>(
    dictionary: &D,
    splitter: &WordSplitter,
    text: &str,
    limit: usize,
) -> Vec<Fix> {
    splitter
        .word_spans(text)
        .filter_map(|span| {
            let result = dictionary.suggest(span.word, limit);
            if result.exact_match {
                return None;
            }

            let error = if result.suggestions.is_empty() {
                FixKind::UnknownWord
            } else {
                FixKind::InvalidWord
            };

            Some(Fix {
                start: span.start,
                end: span.end,
                suggestions: result.suggestions,
                error,
            })
        })
        .collect()
}
