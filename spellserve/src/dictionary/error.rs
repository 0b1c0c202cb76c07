//! Error types for dictionary engines.

/// Errors raised while constructing, encoding or restoring a dictionary.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DictionaryError {
    /// Alphabet is empty or repeats a character
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),

    /// Serialized state contained no bytes
    #[error("Unable to restore a dictionary from an empty state")]
    Empty,

    /// Serialized state could not be decoded
    #[error("Malformed dictionary state")]
    Malformed(#[source] serde_json::Error),

    /// Serialized state was written by an unknown format version
    #[error("Unsupported dictionary state version {0}")]
    UnsupportedVersion(u32),

    /// Dictionary state could not be encoded
    #[error("Failed to encode dictionary state")]
    Encode(#[source] serde_json::Error),
}
