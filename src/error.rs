//! Error types shared across the crate.

use crate::iter::Method;

/// Convenience alias for results produced by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while configuring or driving progress tracking.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sample window settings are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A collection handed to the iteration helper cannot be walked with the requested method.
    #[error("collection does not support `{0}`")]
    UnsupportedCollection(Method),

    /// An average was requested over zero samples.
    #[error("cannot average an empty sequence of samples")]
    EmptyInput,

    /// Writing to an output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
