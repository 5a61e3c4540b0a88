//! In-memory host services for embedding demos and tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, RwLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    Error, Result,
    sink::ByteSink,
    store::OutputChannelStore,
    window::{OutputWindow, WindowPane},
};

// ── Byte sink ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct SinkState {
    chunks: Mutex<Vec<Vec<u8>>>,
    flushes: AtomicUsize,
    completes: AtomicUsize,
    closed: AtomicBool,
}

/// Byte sink writing into process memory.
///
/// Each `write_bytes` call is recorded as its own chunk, so observers can
/// tell whether two writers' bytes ever interleaved.
pub struct MemorySink {
    state: Arc<SinkState>,
}

impl MemorySink {
    /// Create a sink and the probe that observes it.
    #[must_use]
    pub fn new() -> (Self, SinkProbe) {
        let state = Arc::new(SinkState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            SinkProbe { state },
        )
    }
}

#[async_trait]
impl ByteSink for MemorySink {
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        self.state
            .chunks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(bytes.to_vec());
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        self.state.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn cancel_pending_flush(&mut self) {}

    async fn complete(&mut self) {
        self.state.completes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Read-side probe for a [`MemorySink`] handed to a writer.
#[derive(Clone)]
pub struct SinkProbe {
    state: Arc<SinkState>,
}

impl SinkProbe {
    /// Every `write_bytes` call in order, one entry per call.
    #[must_use]
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.state
            .chunks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// All received bytes decoded as UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.chunks().concat()).into_owned()
    }

    /// Number of completed `flush` calls.
    #[must_use]
    pub fn flushes(&self) -> usize {
        self.state.flushes.load(Ordering::SeqCst)
    }

    /// Number of `complete` calls on the sink.
    #[must_use]
    pub fn completes(&self) -> usize {
        self.state.completes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes and flushes fail with [`Error::Closed`].
    pub fn close_remote(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

// ── Channel store ───────────────────────────────────────────────────────────

/// A channel created through [`MemoryChannelStore`].
#[derive(Clone)]
pub struct CreatedChannel {
    pub channel_id: String,
    pub display_name: String,
    pub probe: SinkProbe,
}

/// Channel store handing out [`MemorySink`]s and recording every request.
///
/// Channel support can be toggled to exercise the host-session-without-
/// channels path.
pub struct MemoryChannelStore {
    supported: AtomicBool,
    create_calls: AtomicUsize,
    channels: Mutex<Vec<CreatedChannel>>,
}

impl Default for MemoryChannelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChannelStore {
    /// Store with channel support enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: AtomicBool::new(true),
            create_calls: AtomicUsize::new(0),
            channels: Mutex::new(Vec::new()),
        }
    }

    /// Store reporting channel support unavailable until toggled.
    #[must_use]
    pub fn unsupported() -> Self {
        let store = Self::new();
        store.supported.store(false, Ordering::SeqCst);
        store
    }

    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    /// Number of `create_channel` calls, including unsupported ones.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Every channel created so far, in creation order.
    #[must_use]
    pub fn channels(&self) -> Vec<CreatedChannel> {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Probe of the most recently created channel.
    #[must_use]
    pub fn last_probe(&self) -> Option<SinkProbe> {
        self.channels().last().map(|c| c.probe.clone())
    }
}

#[async_trait]
impl OutputChannelStore for MemoryChannelStore {
    async fn create_channel(
        &self,
        channel_id: &str,
        display_name: &str,
    ) -> Result<Option<Box<dyn ByteSink>>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if !self.supported.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let (sink, probe) = MemorySink::new();
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CreatedChannel {
                channel_id: channel_id.to_owned(),
                display_name: display_name.to_owned(),
                probe,
            });
        Ok(Some(Box::new(sink)))
    }
}

// ── Output window ───────────────────────────────────────────────────────────

/// A recording pane of the in-memory output window.
#[derive(Default)]
pub struct MemoryPane {
    text: Mutex<String>,
    activations: AtomicUsize,
    clears: AtomicUsize,
}

impl MemoryPane {
    /// All text written to the pane so far.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[must_use]
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WindowPane for MemoryPane {
    async fn output(&self, text: &str) -> Result<()> {
        self.text
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(text);
        Ok(())
    }

    async fn activate(&self) -> Result<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.text.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }
}

/// In-memory output window with registered panes.
#[derive(Default)]
pub struct MemoryOutputWindow {
    panes: RwLock<HashMap<String, Arc<MemoryPane>>>,
}

impl MemoryOutputWindow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pane under `pane_id` and return it for observation.
    pub fn add_pane(&self, pane_id: &str) -> Arc<MemoryPane> {
        let pane = Arc::new(MemoryPane::default());
        self.panes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pane_id.to_owned(), Arc::clone(&pane));
        pane
    }
}

#[async_trait]
impl OutputWindow for MemoryOutputWindow {
    async fn pane(&self, pane_id: &str) -> Result<Option<Arc<dyn WindowPane>>> {
        let panes = self.panes.read().unwrap_or_else(|e| e.into_inner());
        Ok(panes
            .get(pane_id)
            .cloned()
            .map(|pane| pane as Arc<dyn WindowPane>))
    }
}
