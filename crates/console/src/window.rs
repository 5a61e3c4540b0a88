//! Output console over a shared host window pane.

use std::sync::Arc;

use {async_trait::async_trait, tokio::sync::OnceCell, tracing::debug};

use outpane_broker::{OutputWindow, WindowPane};

use crate::{
    console::OutputConsole,
    error::{Error, Result},
};

/// Console that writes inline into a pane of the host's shared output
/// window.
///
/// The pane is shared with other producers and not owned by this console:
/// it is resolved on [`activate`](OutputConsole::activate), and invasive
/// operations like clearing are not performed on it.
pub struct WindowConsole {
    window: Arc<dyn OutputWindow>,
    pane_id: String,
    pane: OnceCell<Arc<dyn WindowPane>>,
}

impl WindowConsole {
    pub fn new(window: Arc<dyn OutputWindow>, pane_id: impl Into<String>) -> Self {
        Self {
            window,
            pane_id: pane_id.into(),
            pane: OnceCell::new(),
        }
    }
}

#[async_trait]
impl OutputConsole for WindowConsole {
    async fn activate(&self) -> Result<()> {
        if self.pane.get().is_none()
            && let Some(pane) = self.window.pane(&self.pane_id).await.map_err(Error::pane)?
        {
            // A concurrent activate may have resolved it first; either
            // instance is the same host pane.
            let _ = self.pane.set(pane);
        }
        if let Some(pane) = self.pane.get() {
            pane.activate().await.map_err(Error::pane)?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        // The pane is shared with other producers; erasing it is not this
        // console's call.
        Ok(())
    }

    async fn write(&self, text: &str) -> Result<()> {
        match self.pane.get() {
            Some(pane) => pane.output(text).await.map_err(Error::pane),
            None => {
                // The shared pane only exists after activation; output
                // written before then has nowhere to go.
                debug!(pane_id = %self.pane_id, "window pane not resolved, dropping output");
                Ok(())
            },
        }
    }
}
