use async_trait::async_trait;

use crate::{Result, sink::ByteSink};

/// Factory for host output channels.
#[async_trait]
pub trait OutputChannelStore: Send + Sync {
    /// Create the channel named `display_name` under the stable `channel_id`.
    ///
    /// `Ok(None)` means the host session does not support output channels
    /// right now. That is a designed outcome, not an error: callers hold
    /// their output and retry on a later write.
    async fn create_channel(
        &self,
        channel_id: &str,
        display_name: &str,
    ) -> Result<Option<Box<dyn ByteSink>>>;
}

/// Store for host sessions without output-channel support.
pub struct NoopChannelStore;

#[async_trait]
impl OutputChannelStore for NoopChannelStore {
    async fn create_channel(
        &self,
        _channel_id: &str,
        _display_name: &str,
    ) -> Result<Option<Box<dyn ByteSink>>> {
        Ok(None)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_store_never_supports_channels() {
        let store = NoopChannelStore;
        assert!(store.create_channel("any", "Any").await.unwrap().is_none());
    }
}
