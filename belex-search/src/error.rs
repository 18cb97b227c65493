//! Error types for the `belex-search` crate.

use thiserror::Error;

/// Errors that can occur in BELEX search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error propagated from the Gemini API client.
    #[error(transparent)]
    Gemini(#[from] belex_gemini::Error),

    /// An upload was rejected because it exceeds the size ceiling.
    #[error("File too large: {size_bytes} bytes (limit {limit_bytes})")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size_bytes: u64,
        /// The enforced ceiling in bytes.
        limit_bytes: u64,
    },
}

/// A convenience result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
