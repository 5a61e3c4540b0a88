use outpane_broker::Error as BrokerError;

/// Crate-wide result type for console operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for console operations.
///
/// A host session without output-channel support is deliberately not an
/// error: the channel store reports it as an absent channel and the console
/// holds output until a later write succeeds in creating one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host could not supply the output-channel store.
    #[error("output channel provider unavailable: {source}")]
    Provider {
        #[source]
        source: BrokerError,
    },

    /// The channel store failed to create the requested channel.
    #[error("creating output channel '{channel_id}' failed: {source}")]
    CreateChannel {
        channel_id: String,
        #[source]
        source: BrokerError,
    },

    /// Writing to the open channel failed.
    #[error("write to output channel failed: {source}")]
    Write {
        #[source]
        source: BrokerError,
    },

    /// Flushing the open channel failed.
    #[error("flush of output channel failed: {source}")]
    Flush {
        #[source]
        source: BrokerError,
    },

    /// Delegating to the host output-window pane failed.
    #[error("output window pane operation failed: {source}")]
    Pane {
        #[source]
        source: BrokerError,
    },

    /// The console was disposed; only disposal itself remains callable.
    #[error("console already disposed")]
    Disposed,

    /// The operation is not supported by this console implementation.
    #[error("console operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    /// No registered host provider matches the requested name.
    #[error("unknown command host provider: {name}")]
    UnknownHost { name: String },
}

impl Error {
    #[must_use]
    pub fn provider(source: BrokerError) -> Self {
        Self::Provider { source }
    }

    #[must_use]
    pub fn create_channel(channel_id: impl Into<String>, source: BrokerError) -> Self {
        Self::CreateChannel {
            channel_id: channel_id.into(),
            source,
        }
    }

    #[must_use]
    pub fn write(source: BrokerError) -> Self {
        Self::Write { source }
    }

    #[must_use]
    pub fn flush(source: BrokerError) -> Self {
        Self::Flush { source }
    }

    #[must_use]
    pub fn pane(source: BrokerError) -> Self {
        Self::Pane { source }
    }

    #[must_use]
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    #[must_use]
    pub fn unknown_host(name: impl Into<String>) -> Self {
        Self::UnknownHost { name: name.into() }
    }
}
