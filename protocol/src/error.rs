//! Crate-wide error type.
//!
//! Every failure in this crate is local and synchronous: a constructor
//! rejecting its input, a decoder rejecting a payload, a resolver missing a
//! receipt entry. There is no transient failure mode, so there is nothing to
//! retry. The four kinds below are the whole vocabulary; the crypto layer's
//! own errors are wrapped transparently and classified through
//! [`Error::kind`].

use thiserror::Error;

use crate::crypto::encryption::EncryptionError;
use crate::crypto::keys::KeyError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by construction, decoding, signing and resolution.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed constructor input: negative words, wrong-length keys or
    /// hex, oversized payloads, deadlines outside the policy window.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Decode-time failure: short payload, unknown type/version tag,
    /// checksum mismatch, corrupted size fields.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Alias resolution found no applicable receipt entry, or the
    /// transaction was never confirmed.
    #[error("resolution not found: {0}")]
    ResolutionNotFound(String),

    /// The operation does not apply to this kind of transaction.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

/// Coarse classification matching the four documented error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidFormat,
    ResolutionNotFound,
    UnsupportedOperation,
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub(crate) fn resolution_not_found(msg: impl Into<String>) -> Self {
        Self::ResolutionNotFound(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// Returns which of the four error kinds this error belongs to.
    ///
    /// Key errors are argument errors (bad key material handed in by the
    /// caller). Encryption errors are format errors, since they surface when
    /// a ciphertext or recovered plaintext does not have the expected shape.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Key(_) => ErrorKind::InvalidArgument,
            Self::InvalidFormat(_) | Self::Encryption(_) => ErrorKind::InvalidFormat,
            Self::ResolutionNotFound(_) => ErrorKind::ResolutionNotFound,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
        }
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Self::InvalidArgument(format!("hex decode failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_classified() {
        assert_eq!(
            Error::invalid_argument("x").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(Error::invalid_format("x").kind(), ErrorKind::InvalidFormat);
        assert_eq!(
            Error::resolution_not_found("x").kind(),
            ErrorKind::ResolutionNotFound
        );
        assert_eq!(
            Error::unsupported("x").kind(),
            ErrorKind::UnsupportedOperation
        );
        assert_eq!(
            Error::from(KeyError::InvalidPublicKey).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            Error::from(EncryptionError::DecryptFailed).kind(),
            ErrorKind::InvalidFormat
        );
    }

    #[test]
    fn hex_errors_are_argument_errors() {
        let err: Error = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("hex decode failed"));
    }
}
