use fetap_dial_core::PhoneNumber;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for phone book operations
pub type PhoneBookResult<T> = Result<T, PhoneBookError>;

/// Errors that can occur when reading or editing the phone book
#[derive(Debug, Error)]
pub enum PhoneBookError {
    #[error("Number {number} is already assigned")]
    NumberExists { number: PhoneNumber },

    #[error("Address {address} already has a number")]
    AddressExists { address: String },

    /// A dialing error could connect to one of these instead
    #[error("Number {number} is too easily confused with {similar:?}")]
    SimilarNumberExists {
        number: PhoneNumber,
        similar: Vec<PhoneNumber>,
    },

    #[error("Number {number} is not in the phone book")]
    NumberNotFound { number: PhoneNumber },

    #[error("Address {address} is not in the phone book")]
    AddressNotFound { address: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("Malformed phone book {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PhoneBookError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
