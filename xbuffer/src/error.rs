//! Error types shared by both buffers.

use core::fmt;

/// Why a buffer operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backing storage could not be reserved.
    AllocationFailed,
    /// Zero or unrepresentable capacity requested.
    InvalidCapacity,
    /// A put does not fit and the buffer may not grow.
    InsufficientSpace,
    /// Nothing is available to read.
    InsufficientData,
}

/// Error returned by buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates an error of the given kind.
    pub const fn new(kind: ErrorKind) -> Self {
        Error { kind }
    }

    /// Returns the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::AllocationFailed => write!(f, "Buffer allocation failed"),
            ErrorKind::InvalidCapacity => write!(f, "Invalid buffer capacity"),
            ErrorKind::InsufficientSpace => write!(f, "Insufficient space in buffer"),
            ErrorKind::InsufficientData => write!(f, "Insufficient data in buffer"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        let kind = match err.kind {
            ErrorKind::AllocationFailed => std::io::ErrorKind::OutOfMemory,
            ErrorKind::InvalidCapacity => std::io::ErrorKind::InvalidInput,
            ErrorKind::InsufficientSpace => std::io::ErrorKind::WriteZero,
            ErrorKind::InsufficientData => std::io::ErrorKind::UnexpectedEof,
        };
        std::io::Error::new(kind, err)
    }
}

/// Result type for buffer operations.
pub type Result<T> = core::result::Result<T, Error>;
