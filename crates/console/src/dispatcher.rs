use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;

/// Lifecycle surface an interactive front end drives on a console.
///
/// [`start`](Self::start) makes the console ready to accept output and fires
/// the start-completed signal exactly once; every later call is a no-op.
#[async_trait]
pub trait ConsoleDispatcher: Send + Sync {
    /// Make the console ready. Idempotent.
    async fn start(&self) -> Result<()>;

    /// Whether [`start`](Self::start) has completed.
    fn is_start_completed(&self) -> bool;

    /// Whether a command is currently executing in the attached host.
    fn is_executing_command(&self) -> bool;

    /// Subscribe to the start-completed signal. The receiver observes `true`
    /// once the console has started.
    fn start_completed(&self) -> watch::Receiver<bool>;

    /// Clear the console surface.
    async fn clear_console(&self) -> Result<()>;
}
