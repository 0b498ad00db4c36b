//! Error type definitions for the UAS classifier

use thiserror::Error;

/// Top-level classifier error type
///
/// Unmatched user agents are never errors: they classify to the all-default
/// result. Only input validation, database compilation, transport and storage
/// failures surface here.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Empty or missing user agent passed to `classify`
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Signature text is missing a section or references an unknown entry
    #[error("Malformed database: {message}")]
    MalformedDatabase { message: String },

    /// Transport failure while downloading the signature text
    #[error("Fetch error: {url} - {message}")]
    Fetch { url: String, message: String },

    /// A refresh attempt failed; the previously loaded table stays active
    #[error("Refresh failed: {source}")]
    RefreshFailed {
        #[source]
        source: Box<ClassifierError>,
    },

    /// Persisted table could not be loaded, decoded or saved
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience methods for creating common error types
impl ClassifierError {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a malformed database error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedDatabase {
            message: message.into(),
        }
    }

    /// Create a fetch error for the given URL
    pub fn fetch<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Wrap the cause of a failed refresh
    pub fn refresh_failed(cause: ClassifierError) -> Self {
        Self::RefreshFailed {
            source: Box::new(cause),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The error that caused a refresh to fail, if this is a refresh error
    pub fn refresh_cause(&self) -> Option<&ClassifierError> {
        match self {
            Self::RefreshFailed { source } => Some(source),
            _ => None,
        }
    }
}
