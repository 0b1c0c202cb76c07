//! Suggestion for a spelling correction.
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;
use std::cmp::Ordering::Equal;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
/// Suggestion for a spelling correction
pub struct Suggestion {
    /// the suggested word-form
    #[serde(rename = "text")]
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub value: SmolStr,
    /// confidence of the suggestion, higher is better
    pub score: f64,
}

impl Suggestion {
    /// creates a spelling correction suggestion
    pub fn new(value: SmolStr, score: f64) -> Suggestion {
        Suggestion { value, score }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the confidence score of the suggestion
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Result of looking a word up in a dictionary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    /// the word itself is known to the dictionary
    pub exact_match: bool,
    /// corrections, best first
    pub suggestions: Vec<Suggestion>,
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Best score first, ties broken alphabetically.
impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        let x = other.score.partial_cmp(&self.score).unwrap_or(Equal);

        if let Equal = x {
            return self.value.cmp(&other.value);
        }

        x
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.score == other.score
    }
}

impl Eq for Suggestion {}
