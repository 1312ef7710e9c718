//! Error types for the finance tracker.
//!
//! Internal plumbing uses `anyhow` (see `Res`). Anything that crosses the public API is converted
//! into an `Error`, which carries an `ErrorType` so that callers can react to the kind of failure
//! without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Result type used for internal plumbing.
pub(crate) type Res<T> = anyhow::Result<T>;

/// Result type returned by public operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure that occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The amount was missing, non-numeric, or not greater than zero.
    InvalidAmount,
    /// The transaction targeted for deletion does not exist.
    NotFound,
    /// The remote store could not be reached or read.
    ConnectionFailed,
    /// The remote store rejected, or did not answer, a create or delete.
    WriteFailed,
    /// The configuration is missing, unreadable or invalid.
    Config,
    /// A file or terminal operation failed.
    Io,
    /// The user typed something that could not be understood.
    Usage,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// A public error: an `ErrorType` together with the underlying `anyhow` context chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(
        error_type: ErrorType,
        message: impl Display + Debug + Send + Sync + 'static,
    ) -> Self {
        Self::new(error_type, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn is(&self, error_type: ErrorType) -> bool {
        self.error_type == error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

// `Display` already renders the whole chain, so `source` is left as `None` to keep the chain from
// being printed twice when an `Error` is wrapped again.
impl std::error::Error for Error {}

/// Converts an internal result into a public one by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
