use std::error::Error as StdError;

/// Crate-wide result type for host capability operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors surfaced by host-supplied services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host session has no reachable service for this capability.
    #[error("host service unavailable: {message}")]
    Unavailable { message: String },

    /// The remote end of a channel is gone; the handle will never accept
    /// bytes again.
    #[error("output channel closed by the host")]
    Closed,

    /// Wrapped source error from a host-specific service implementation.
    #[error("host service operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// I/O failure while moving bytes to the host.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
