//! Error types for docoutline library.

use std::io;
use thiserror::Error;

/// Result type alias for docoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction.
///
/// Timeouts and encoding repairs are not errors: they surface as a degraded
/// [`ProcessingStatus`](crate::render::ProcessingStatus) and as counters in
/// [`ProcessingStats`](crate::render::ProcessingStats).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed run document or configuration file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source document is encrypted or protected.
    #[error("Document is encrypted")]
    Encrypted,

    /// The source document could not be read by the document model.
    #[error("Document is unreadable: {0}")]
    Unreadable(String),

    /// The document has more pages than the configured limit.
    #[error("Document has {pages} pages, exceeding the limit of {limit}")]
    PageLimitExceeded {
        /// Pages found in the document
        pages: usize,
        /// Configured page limit
        limit: usize,
    },

    /// Configuration rejected at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error rejects the input document itself.
    ///
    /// Fatal input errors are not retried and never produce an outline.
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Error::Encrypted | Error::Unreadable(_) | Error::PageLimitExceeded { .. }
        )
    }
}
