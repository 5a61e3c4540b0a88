//! Console construction and caching.

use std::sync::Arc;

use {tokio::sync::OnceCell, tracing::debug};

use outpane_broker::{OutputWindow, ServiceHub};

use crate::{
    channel::ChannelConsole,
    config::ProviderConfig,
    error::{Error, Result},
    host::HostProvider,
    window::WindowConsole,
};

/// Creates and caches the output consoles of an embedding host session.
///
/// One shared [`ChannelConsole`] exists per provider, and the host output
/// window is resolved at most once, on first use; concurrent first uses
/// collapse into a single resolution.
pub struct ConsoleProvider {
    hub: Arc<dyn ServiceHub>,
    config: ProviderConfig,
    host_providers: Vec<Arc<dyn HostProvider>>,
    window: OnceCell<Arc<dyn OutputWindow>>,
    shared: OnceCell<Arc<ChannelConsole>>,
}

impl ConsoleProvider {
    pub fn new(
        hub: Arc<dyn ServiceHub>,
        config: ProviderConfig,
        host_providers: Vec<Arc<dyn HostProvider>>,
    ) -> Self {
        Self {
            hub,
            config,
            host_providers,
            window: OnceCell::new(),
            shared: OnceCell::new(),
        }
    }

    /// Console writing inline into the host build output pane.
    pub async fn build_console(&self) -> Result<WindowConsole> {
        let window = self
            .window
            .get_or_try_init(|| async { self.hub.output_window().await.map_err(Error::provider) })
            .await?;
        Ok(WindowConsole::new(
            Arc::clone(window),
            self.config.build_pane_id.clone(),
        ))
    }

    /// The session's shared channel console, created on first use.
    pub async fn shared_console(&self) -> Arc<ChannelConsole> {
        let console = self
            .shared
            .get_or_init(|| async {
                Arc::new(ChannelConsole::new(
                    Arc::clone(&self.hub),
                    self.config.shared_channel.clone(),
                ))
            })
            .await;
        Arc::clone(console)
    }

    /// The shared console with a command host attached, for interactive use.
    ///
    /// The host comes from the registered [`HostProvider`] named `host_name`
    /// and is attached once; later calls reuse it.
    pub async fn interactive_console(&self, host_name: &str) -> Result<Arc<ChannelConsole>> {
        let console = self.shared_console().await;
        if console.host().is_none() {
            let provider = self
                .host_providers
                .iter()
                .find(|p| p.host_name() == host_name)
                .ok_or_else(|| Error::unknown_host(host_name))?;
            console.set_host(provider.create_host(false));
            debug!(host = host_name, "command host attached to shared console");
        }
        Ok(console)
    }
}
