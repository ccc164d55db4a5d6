//! Error types for EML parsing.

use crate::encoding::TransferEncoding;

/// Result type alias for EML operations.
pub type Result<T> = std::result::Result<T, Error>;

/// EML error types.
///
/// Every variant returned from a parse means no [`Message`](crate::Message)
/// was produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source file could not be opened or read as text.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `Date` header is present but does not parse.
    #[error("Invalid Date header {value:?}: {source}")]
    InvalidDate {
        /// The offending header value.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// The message has no `Date` header and the parser was configured to reject it.
    #[error("Missing Date header")]
    MissingDate,

    /// The body cannot be decoded under its transfer encoding.
    #[error("Invalid {encoding} payload: {reason}")]
    InvalidEncodingPayload {
        /// Transfer encoding the body was decoded with.
        encoding: TransferEncoding,
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),
}

impl Error {
    /// Builds an [`Error::InvalidEncodingPayload`].
    pub(crate) fn payload(encoding: TransferEncoding, reason: impl Into<String>) -> Self {
        Self::InvalidEncodingPayload {
            encoding,
            reason: reason.into(),
        }
    }
}
