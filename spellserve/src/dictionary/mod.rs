//! Dictionary engines.
//!
//! The registry never looks inside a dictionary. It only needs the
//! [`Dictionary`] capability: build one from [`DictionaryOptions`], turn it
//! into bytes and back, feed it weighted words and ask it for corrections.
use serde::{Deserialize, Serialize};

pub use self::error::DictionaryError;
pub use self::fuzzy::FuzzyDictionary;
pub use self::suggestion::{Suggestion, Suggestions};

pub mod error;
mod fuzzy;
pub mod suggestion;

/// Construction parameters of a dictionary, persisted next to its state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryOptions {
    /// Every character a dictionary word may contain, each exactly once.
    pub alphabet: String,
    /// Maximum edit distance of a suggestion. Zero selects the engine default.
    #[serde(default)]
    pub max_errors: u32,
}

impl DictionaryOptions {
    /// Creates options for the given alphabet and edit distance.
    pub fn new(alphabet: impl Into<String>, max_errors: u32) -> DictionaryOptions {
        DictionaryOptions {
            alphabet: alphabet.into(),
            max_errors,
        }
    }
}

/// A spellchecking engine the registry can own, persist and share.
///
/// Handles are shared between concurrent callers as `Arc<Self>`, so
/// implementations synchronise their own mutable state.
pub trait Dictionary: Send + Sync + Sized {
    /// Builds an empty dictionary, rejecting options the engine cannot use.
    fn new(options: &DictionaryOptions) -> Result<Self, DictionaryError>;

    /// Restores a dictionary from bytes produced by [`Dictionary::to_bytes`].
    fn from_bytes(bytes: &[u8]) -> Result<Self, DictionaryError>;

    /// Serializes the complete engine state.
    fn to_bytes(&self) -> Result<Vec<u8>, DictionaryError>;

    /// Adds `weight` to each of `words`.
    fn add_weighted(&self, weight: u32, words: &[&str]);

    /// Looks `word` up, returning at most `limit` corrections when it is unknown.
    fn suggest(&self, word: &str, limit: usize) -> Suggestions;
}
