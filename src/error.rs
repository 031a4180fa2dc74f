//! Error types.

use std::fmt;
use std::io;
use std::result;

/// Error that occurred while decoding a container.
///
/// `NotAnArchive`, `UnexpectedEnd`, `DataError` and `Cancelled` classify the
/// input and are folded into an [`Outcome`](crate::Outcome) by the extractor.
/// `IoError` and `MemoryLimit` are fatal and always surface as `Err`.
#[derive(Debug)]
pub enum Error {
    /// The output sink failed, or reading the input failed for a reason other
    /// than reaching its end.
    IoError(io::Error),
    /// The signature, version or reserved bits do not match the format.
    NotAnArchive(String),
    /// The input ended before the container was complete.
    UnexpectedEnd(String),
    /// The compressed data is corrupted.
    DataError(String),
    /// Decoding would need more memory than the configured limit.
    MemoryLimit(String),
    /// The progress callback asked to stop.
    Cancelled,
}

/// Library result alias.
pub type Result<T> = result::Result<T, Error>;

impl Error {
    /// Classify a failed read of the compressed input.
    ///
    /// Running out of bytes is a property of the input, anything else is a
    /// failure of the stream itself.
    pub(crate) fn from_input(what: &str, e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEnd(format!("{}: {}", what, e))
        } else {
            Error::IoError(e)
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::IoError(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IoError(e) => write!(fmt, "io error: {}", e),
            Error::NotAnArchive(e) => write!(fmt, "not an archive: {}", e),
            Error::UnexpectedEnd(e) => write!(fmt, "unexpected end of input: {}", e),
            Error::DataError(e) => write!(fmt, "data error: {}", e),
            Error::MemoryLimit(e) => write!(fmt, "memory limit exceeded: {}", e),
            Error::Cancelled => write!(fmt, "cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}
