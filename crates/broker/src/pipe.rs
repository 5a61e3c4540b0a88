//! Pipe-backed byte sink.
//!
//! The writer half buffers bytes and ships one chunk per flush over a
//! bounded mpsc channel; the embedding host drains the receiver into its
//! real output surface.

use {
    async_trait::async_trait, tokio::sync::mpsc, tokio_util::sync::CancellationToken,
    tracing::debug,
};

use crate::{Error, Result, sink::ByteSink};

/// Writer half of an in-process output pipe.
pub struct PipeSink {
    tx: mpsc::Sender<Vec<u8>>,
    buffer: Vec<u8>,
    cancel: CancellationToken,
}

impl PipeSink {
    /// Create a sink and the receiver the host drains. `capacity` bounds the
    /// number of flushed chunks queued between writer and drain task.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                buffer: Vec::new(),
                cancel: CancellationToken::new(),
            },
            rx,
        )
    }
}

#[async_trait]
impl ByteSink for PipeSink {
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let permit = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                // Aborted by cancel_pending_flush. The buffered bytes stay
                // put for a later flush; the token re-arms so one applies.
                debug!(buffered = self.buffer.len(), "flush aborted by cancellation");
                self.cancel = CancellationToken::new();
                return Ok(());
            }
            permit = self.tx.reserve() => permit.map_err(|_| Error::Closed)?,
        };
        permit.send(std::mem::take(&mut self.buffer));
        Ok(())
    }

    fn cancel_pending_flush(&mut self) {
        self.cancel.cancel();
    }

    async fn complete(&mut self) {
        self.buffer.clear();
        self.cancel.cancel();
    }
}
