//! Registry errors and their classification.
use std::fmt;
use std::path::PathBuf;

use smol_str::SmolStr;

use crate::dictionary::DictionaryError;
use crate::storage::StorageError;

/// Broad class of a [`RegistryError`], for callers that translate errors
/// into another protocol's status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// a dictionary or alias does not exist
    NotFound,
    /// a dictionary with the same code exists
    AlreadyExists,
    /// the request itself cannot be satisfied, e.g. a malformed alphabet
    InvalidArgument,
    /// persisted data is corrupt
    Decode,
    /// the filesystem failed
    Io,
    /// anything else
    Internal,
}

/// Errors returned by [`Registry`](super::Registry) operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// No dictionary is registered under this code
    #[error("Dictionary '{0}' not found")]
    NotFound(SmolStr),

    /// No such alias
    #[error("Alias '{0}' not found")]
    AliasNotFound(SmolStr),

    /// Alias cannot point at a dictionary that does not exist
    #[error("Cannot point alias '{alias}' at unknown dictionary '{code}'")]
    AliasTargetNotFound {
        /// alias being set
        alias: SmolStr,
        /// missing dictionary code
        code: SmolStr,
    },

    /// A dictionary is already registered under this code
    #[error("Dictionary '{0}' already exists")]
    AlreadyExists(SmolStr),

    /// Code or alias cannot be used as a name
    #[error("Invalid name {0:?}")]
    InvalidName(String),

    /// Dictionary engine rejected the options
    #[error("Failed to initialize dictionary")]
    Initialization(#[source] DictionaryError),

    /// Persisted file could not be decoded
    #[error("Failed to decode '{}'", .path.display())]
    Decode {
        /// corrupt file
        path: PathBuf,
        /// underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// In-memory state could not be serialized
    #[error("Failed to encode {0}")]
    Encode(String, #[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage directory could not be read or written
    #[error(transparent)]
    Io(#[from] StorageError),
}

impl RegistryError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NotFound(_)
            | RegistryError::AliasNotFound(_)
            | RegistryError::AliasTargetNotFound { .. } => ErrorKind::NotFound,
            RegistryError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RegistryError::InvalidName(_) | RegistryError::Initialization(_) => {
                ErrorKind::InvalidArgument
            }
            RegistryError::Decode { .. } => ErrorKind::Decode,
            RegistryError::Io(_) => ErrorKind::Io,
            RegistryError::Encode(..) => ErrorKind::Internal,
        }
    }
}

/// Displays an error followed by each of its sources.
pub struct Chain<'a>(pub &'a (dyn std::error::Error + 'static));

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;

        let mut source = self.0.source();
        while let Some(e) = source {
            write!(f, ": {}", e)?;
            source = e.source();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(RegistryError::NotFound("en".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            RegistryError::AliasTargetNotFound {
                alias: "eng".into(),
                code: "en".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistryError::Initialization(DictionaryError::Empty).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            RegistryError::AlreadyExists("en".into()).kind(),
            ErrorKind::AlreadyExists
        );
    }

    #[test]
    fn chain_includes_sources() {
        let err = RegistryError::Initialization(DictionaryError::InvalidAlphabet(
            "alphabet is empty".into(),
        ));

        assert_eq!(
            Chain(&err).to_string(),
            "Failed to initialize dictionary: Invalid alphabet: alphabet is empty"
        );
    }
}
