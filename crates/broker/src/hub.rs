use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result, store::OutputChannelStore, window::OutputWindow};

/// Locator for the host services the console layer depends on.
///
/// Injected at construction; there is no global registry. Each accessor may
/// involve host RPC and is therefore async and fallible.
#[async_trait]
pub trait ServiceHub: Send + Sync {
    /// The output-channel store, if this host publishes one.
    async fn channel_store(&self) -> Result<Arc<dyn OutputChannelStore>>;

    /// The legacy output window.
    async fn output_window(&self) -> Result<Arc<dyn OutputWindow>>;
}

/// Hub serving fixed capability instances.
///
/// Slots left unset report [`Error::Unavailable`], matching a host session
/// that never published the service.
#[derive(Default)]
pub struct StaticServiceHub {
    channel_store: Option<Arc<dyn OutputChannelStore>>,
    output_window: Option<Arc<dyn OutputWindow>>,
}

impl StaticServiceHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_channel_store(mut self, store: Arc<dyn OutputChannelStore>) -> Self {
        self.channel_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_output_window(mut self, window: Arc<dyn OutputWindow>) -> Self {
        self.output_window = Some(window);
        self
    }
}

#[async_trait]
impl ServiceHub for StaticServiceHub {
    async fn channel_store(&self) -> Result<Arc<dyn OutputChannelStore>> {
        self.channel_store
            .clone()
            .ok_or_else(|| Error::unavailable("no output channel store published"))
    }

    async fn output_window(&self) -> Result<Arc<dyn OutputWindow>> {
        self.output_window
            .clone()
            .ok_or_else(|| Error::unavailable("no output window published"))
    }
}
