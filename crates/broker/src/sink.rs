use async_trait::async_trait;

use crate::Result;

/// An open byte-stream handle to a host output channel.
///
/// Returned by [`OutputChannelStore::create_channel`](crate::store::OutputChannelStore::create_channel)
/// and owned exclusively by one writer; the host drains the other end into
/// its output UI.
#[async_trait]
pub trait ByteSink: Send {
    /// Append `bytes` to the channel.
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Force previously written bytes out to the host.
    async fn flush(&mut self) -> Result<()>;

    /// Abort an in-flight [`flush`](Self::flush), if any. Best effort.
    fn cancel_pending_flush(&mut self);

    /// Release the handle. The sink must not be used afterwards.
    async fn complete(&mut self);
}
