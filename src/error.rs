//! Error types for the sandfs library.

use thiserror::Error;

use crate::store::{StoreError, StoreErrorKind};

/// Classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path segment does not exist.
    NotFound,
    /// The path resolved to a node of the wrong kind.
    TypeMismatch,
    /// The path string is malformed.
    InvalidPath,
    /// An application-level guard rejected the operation.
    InvalidOperation,
    /// The session has no root yet.
    Uninitialized,
    /// The store refused to grant quota.
    QuotaNotGranted,
    /// Any other store or decoding failure.
    Other,
}

/// Main error type for sandfs operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// Requested entry does not exist.
    #[error("{message} Call: {call}")]
    NotFound { message: String, call: String },

    /// Entry exists but is a file where a directory was expected, or vice versa.
    #[error("{message} Call: {call}")]
    TypeMismatch { message: String, call: String },

    /// Any other error reported by the backing store.
    #[error("{message} Call: {call}")]
    Store {
        kind: StoreErrorKind,
        message: String,
        call: String,
    },

    /// Malformed path string.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Application-level guard violation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Root accessed before `init`.
    #[error("Filesystem not initialized.")]
    Uninitialized,

    /// Quota request came back empty.
    #[error("Quota not granted (requested: {requested}, granted: {granted})")]
    QuotaNotGranted { requested: u64, granted: u64 },

    /// File content is not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

impl FsError {
    /// Annotate a store error with the call that produced it.
    ///
    /// The store's classification is preserved.
    pub(crate) fn from_store(err: StoreError, call: String) -> Self {
        let StoreError { kind, message } = err;
        match kind {
            StoreErrorKind::NotFound => FsError::NotFound { message, call },
            StoreErrorKind::TypeMismatch => FsError::TypeMismatch { message, call },
            kind => FsError::Store {
                kind,
                message,
                call,
            },
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound { .. } => ErrorKind::NotFound,
            FsError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            FsError::InvalidPath(_) => ErrorKind::InvalidPath,
            FsError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            FsError::Uninitialized => ErrorKind::Uninitialized,
            FsError::QuotaNotGranted { .. } => ErrorKind::QuotaNotGranted,
            FsError::Store { .. } | FsError::Utf8(_) | FsError::Custom(_) => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.kind() == ErrorKind::TypeMismatch
    }
}

/// Result type alias for sandfs operations.
pub type Result<T> = std::result::Result<T, FsError>;
