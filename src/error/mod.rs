//! Error types for segbuf.

use std::io;

/// Errors that can occur while reading, writing or transferring buffered bytes.
#[derive(Debug, thiserror::Error)]
pub enum BufError {
    /// An I/O error occurred in the wrapped endpoint.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A read asked for more bytes than the buffer holds.
    #[error("buffer underflow: requested {requested} bytes, {available} available")]
    Underflow {
        /// Bytes the caller asked for.
        requested: usize,
        /// Bytes that were buffered.
        available: usize,
    },

    /// The endpoint ran out of bytes before a read could be satisfied.
    #[error("unexpected end of stream: requested {requested} bytes, {available} available")]
    EndOfStream {
        /// Bytes the caller asked for.
        requested: usize,
        /// Bytes that were buffered when the endpoint was exhausted.
        available: usize,
    },

    /// The named text encoding is not supported.
    #[error("unsupported charset: {charset}")]
    Encoding {
        /// The name that failed to resolve.
        charset: String,
    },

    /// The sink or source was already closed.
    #[error("closed")]
    Closed,

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = BufError> = std::result::Result<T, E>;

impl From<BufError> for io::Error {
    fn from(e: BufError) -> Self {
        match e {
            BufError::Io(e) => e,
            BufError::Underflow { .. } | BufError::EndOfStream { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, e)
            }
            BufError::Encoding { .. } | BufError::InvalidConfig { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            BufError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, e),
        }
    }
}
