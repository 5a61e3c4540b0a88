use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// A single pane inside the host output window.
#[async_trait]
pub trait WindowPane: Send + Sync {
    /// Append `text` to the pane.
    async fn output(&self, text: &str) -> Result<()>;

    /// Bring the pane to the foreground.
    async fn activate(&self) -> Result<()>;

    /// Erase the pane contents.
    async fn clear(&self) -> Result<()>;
}

/// The host's legacy output window: named panes shared between components.
#[async_trait]
pub trait OutputWindow: Send + Sync {
    /// Look up a pane by id. `Ok(None)` when the host has no such pane.
    async fn pane(&self, pane_id: &str) -> Result<Option<Arc<dyn WindowPane>>>;
}
