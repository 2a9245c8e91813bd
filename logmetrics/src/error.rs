//! Errors surfaced by generation and serialization.

use thiserror::Error;

/// Boxed error for client and bootstrap plumbing.
pub type StdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while generating or serializing a request.
///
/// Generation never retries and never logs; these are returned to whoever
/// called `generate()` or `serialize()`.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Bad configuration or a bad argument to a state operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The write request could not be serialized.
    #[error("encoding error: {0}")]
    Encoding(#[from] prost::EncodeError),

    /// A payload could not be parsed back into a write request.
    #[error("decoding error: {0}")]
    Decoding(#[from] prost::DecodeError),

    /// Snappy block compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(#[from] snap::Error),
}

impl GeneratorError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
