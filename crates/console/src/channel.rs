//! Output console backed by a host output channel.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use {
    async_trait::async_trait,
    tokio::sync::{Mutex, watch},
    tracing::{debug, warn},
};

use outpane_broker::{ByteSink, Error as BrokerError, OutputChannelStore, ServiceHub};

use crate::{
    config::ChannelIdentity,
    console::OutputConsole,
    dispatcher::ConsoleDispatcher,
    error::{Error, Result},
    host::CommandHost,
};

/// State guarded by the single channel lock.
///
/// Every channel-affecting operation holds this state borrowed mutably, so
/// at most one create-and-replay sequence is in flight at a time and sink
/// writes never interleave.
struct ChannelState {
    /// Memoized channel store, acquired from the hub on first use and kept
    /// for the console's lifetime.
    store: Option<Arc<dyn OutputChannelStore>>,
    /// Open channel handle; `None` until creation first succeeds and again
    /// after [`ChannelConsole::close`].
    sink: Option<Box<dyn ByteSink>>,
    /// Messages accepted while the host reported no channel support.
    deferred: Vec<String>,
}

/// Output console that routes text to a host output channel.
///
/// The channel is created lazily on the first write that reaches the host's
/// channel store. While the store reports channel support unavailable,
/// writes succeed immediately and their text is held back; the first write
/// that succeeds in creating the channel delivers every held message in
/// submission order before its own text. Text is encoded as UTF-8.
pub struct ChannelConsole {
    identity: ChannelIdentity,
    hub: Arc<dyn ServiceHub>,
    state: Mutex<ChannelState>,
    disposed: AtomicBool,
    started: watch::Sender<bool>,
    host: RwLock<Option<Arc<dyn CommandHost>>>,
}

impl ChannelConsole {
    /// Console writing to the channel described by `identity`.
    pub fn new(hub: Arc<dyn ServiceHub>, identity: ChannelIdentity) -> Self {
        let (started, _) = watch::channel(false);
        Self {
            identity,
            hub,
            state: Mutex::new(ChannelState {
                store: None,
                sink: None,
                deferred: Vec::new(),
            }),
            disposed: AtomicBool::new(false),
            started,
            host: RwLock::new(None),
        }
    }

    /// The channel identity this console writes to.
    #[must_use]
    pub fn identity(&self) -> &ChannelIdentity {
        &self.identity
    }

    /// The command host attached to this console, if any.
    #[must_use]
    pub fn host(&self) -> Option<Arc<dyn CommandHost>> {
        self.host.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Attach a command host. A later attachment replaces an earlier one.
    pub fn set_host(&self, host: Arc<dyn CommandHost>) {
        *self.host.write().unwrap_or_else(|e| e.into_inner()) = Some(host);
    }

    /// Close the output channel: abort any pending flush and release the
    /// handle. A later write re-runs channel creation. No-op when no channel
    /// is open.
    pub async fn close(&self) -> Result<()> {
        self.ensure_live()?;
        let mut state = self.state.lock().await;
        Self::release_sink(&mut state).await;
        Ok(())
    }

    /// Release the channel and the memoized store handle.
    ///
    /// Idempotent; repeat calls return immediately. Never fails: teardown
    /// problems are logged, not propagated.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock().await;
        Self::release_sink(&mut state).await;
        state.store = None;
        if !state.deferred.is_empty() {
            warn!(
                channel_id = %self.identity.channel_id(),
                dropped = state.deferred.len(),
                "disposing console with undelivered deferred output"
            );
            state.deferred.clear();
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    async fn release_sink(state: &mut ChannelState) {
        if let Some(mut sink) = state.sink.take() {
            sink.cancel_pending_flush();
            sink.complete().await;
            debug!("output channel released");
        }
    }

    async fn send_output(&self, text: &str) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.sink.is_none() {
            let store = match state.store.clone() {
                Some(store) => store,
                None => {
                    let store = self.hub.channel_store().await.map_err(Error::provider)?;
                    state.store = Some(Arc::clone(&store));
                    store
                },
            };

            let created = store
                .create_channel(self.identity.channel_id(), self.identity.display_name())
                .await
                .map_err(|source| Error::create_channel(self.identity.channel_id(), source))?;

            let Some(mut sink) = created else {
                // The host cannot host the channel in this session. Hold the
                // message; a later write retries creation and replays it.
                state.deferred.push(text.to_owned());
                debug!(
                    channel_id = %self.identity.channel_id(),
                    held = state.deferred.len(),
                    "output channel unsupported, holding message"
                );
                return Ok(());
            };

            // Replay held messages in submission order before the text that
            // triggered creation. On failure the queue is kept and the
            // handle dropped, so the next write starts over.
            for message in &state.deferred {
                sink.write_bytes(message.as_bytes())
                    .await
                    .map_err(Error::write)?;
            }
            state.deferred.clear();
            debug!(channel_id = %self.identity.channel_id(), "output channel created");
            state.sink = Some(sink);
        }

        let result = match state.sink.as_mut() {
            Some(sink) => match sink.write_bytes(text.as_bytes()).await {
                Ok(()) => sink.flush().await.map_err(Error::flush),
                Err(source) => Err(Error::write(source)),
            },
            // The unsupported branch above returned already; a sink is
            // always present here.
            None => Ok(()),
        };

        if let Err(err) = &result
            && sink_lost(err)
        {
            // The host side is gone. Drop the handle so the next write
            // re-runs channel creation instead of hitting a dead sink.
            state.sink = None;
        }
        result
    }
}

#[async_trait]
impl OutputConsole for ChannelConsole {
    async fn activate(&self) -> Result<()> {
        // The host brings the channel's pane forward on creation; nothing
        // to do from this side.
        self.ensure_live()
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_live()?;
        // The brokered channel protocol has no erase operation; accepted
        // and ignored.
        debug!(channel_id = %self.identity.channel_id(), "clear ignored on channel console");
        Ok(())
    }

    async fn write(&self, text: &str) -> Result<()> {
        self.ensure_live()?;
        self.send_output(text).await
    }
}

#[async_trait]
impl ConsoleDispatcher for ChannelConsole {
    async fn start(&self) -> Result<()> {
        self.ensure_live()?;
        if *self.started.borrow() {
            return Ok(());
        }
        // Warm the store so the first write can usually skip acquisition; a
        // failure here is not fatal, deferral covers it.
        let mut state = self.state.lock().await;
        if state.store.is_none() {
            match self.hub.channel_store().await {
                Ok(store) => state.store = Some(store),
                Err(err) => debug!(error = %err, "channel store warm-up failed"),
            }
        }
        drop(state);
        self.started.send_replace(true);
        Ok(())
    }

    fn is_start_completed(&self) -> bool {
        *self.started.borrow()
    }

    fn is_executing_command(&self) -> bool {
        // Output-only console; command execution lives in the attached host.
        false
    }

    fn start_completed(&self) -> watch::Receiver<bool> {
        self.started.subscribe()
    }

    async fn clear_console(&self) -> Result<()> {
        self.clear().await
    }
}

/// True when the error proves the channel's host side is gone.
fn sink_lost(err: &Error) -> bool {
    matches!(
        err,
        Error::Write {
            source: BrokerError::Closed
        } | Error::Flush {
            source: BrokerError::Closed
        }
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use outpane_broker::{
        MemoryChannelStore, OutputWindow, Result as BrokerResult, StaticServiceHub,
    };

    use super::*;

    fn console_over(store: Arc<MemoryChannelStore>) -> ChannelConsole {
        let hub = Arc::new(StaticServiceHub::new().with_channel_store(store));
        ChannelConsole::new(hub, ChannelIdentity::new("chan-1", "Test Channel"))
    }

    /// Hub that counts channel-store lookups.
    struct CountingHub {
        store: Arc<MemoryChannelStore>,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl ServiceHub for CountingHub {
        async fn channel_store(&self) -> BrokerResult<Arc<dyn OutputChannelStore>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&self.store) as Arc<dyn OutputChannelStore>)
        }

        async fn output_window(&self) -> BrokerResult<Arc<dyn OutputWindow>> {
            Err(BrokerError::unavailable("no output window"))
        }
    }

    /// Store whose create call always fails.
    struct FailingStore;

    #[async_trait]
    impl OutputChannelStore for FailingStore {
        async fn create_channel(
            &self,
            _channel_id: &str,
            _display_name: &str,
        ) -> BrokerResult<Option<Box<dyn ByteSink>>> {
            Err(BrokerError::external(
                "create_channel",
                std::io::Error::other("refused"),
            ))
        }
    }

    #[tokio::test]
    async fn writes_flow_to_the_open_channel() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));

        console.write("hello").await.unwrap();
        console.write(" world").await.unwrap();

        let probe = store.last_probe().unwrap();
        assert_eq!(probe.text(), "hello world");
        assert_eq!(probe.flushes(), 2);
        // Channel created once, then reused.
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn channel_identity_reaches_the_store() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));
        console.write("x").await.unwrap();

        let channels = store.channels();
        assert_eq!(channels[0].channel_id, "chan-1");
        assert_eq!(channels[0].display_name, "Test Channel");
    }

    #[tokio::test]
    async fn unsupported_store_defers_without_error() {
        let store = Arc::new(MemoryChannelStore::unsupported());
        let console = console_over(Arc::clone(&store));

        console.write("a").await.unwrap();
        assert_eq!(store.create_calls(), 1);
        assert!(store.channels().is_empty());

        store.set_supported(true);
        console.write("b").await.unwrap();

        let probe = store.last_probe().unwrap();
        assert_eq!(
            probe.chunks(),
            vec![b"a".to_vec(), b"b".to_vec()],
            "held message replays before the triggering write"
        );
        // One flush, after the triggering write.
        assert_eq!(probe.flushes(), 1);

        // The queue drained; nothing replays again.
        console.write("c").await.unwrap();
        assert_eq!(probe.text(), "abc");
    }

    #[tokio::test]
    async fn deferred_messages_flush_their_own_text() {
        let store = Arc::new(MemoryChannelStore::unsupported());
        let console = console_over(Arc::clone(&store));

        console.write("one").await.unwrap();
        console.write("two").await.unwrap();
        store.set_supported(true);
        console.write("three").await.unwrap();

        let probe = store.last_probe().unwrap();
        let chunks = probe.chunks();
        assert_eq!(
            chunks,
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
        // Each held message carries its own stored text; the triggering
        // write's content appears exactly once.
        let triggers = chunks.iter().filter(|c| c.as_slice() == b"three").count();
        assert_eq!(triggers, 1);
    }

    #[tokio::test]
    async fn concurrent_writes_never_interleave() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = Arc::new(console_over(Arc::clone(&store)));

        let expected: Vec<String> = (0..8)
            .map(|i| format!("message-{i}-{}", "x".repeat(64)))
            .collect();

        let mut tasks = Vec::new();
        for message in expected.clone() {
            let console = Arc::clone(&console);
            tasks.push(tokio::spawn(async move { console.write(&message).await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Every chunk is one whole message and every message arrived exactly
        // once; the bytes of two writes never interleave.
        let probe = store.last_probe().unwrap();
        let mut received: Vec<String> = probe
            .chunks()
            .into_iter()
            .map(|chunk| String::from_utf8(chunk).unwrap())
            .collect();
        received.sort();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn concurrent_first_writes_acquire_the_store_once() {
        let hub = Arc::new(CountingHub {
            store: Arc::new(MemoryChannelStore::unsupported()),
            lookups: AtomicUsize::new(0),
        });
        let console = Arc::new(ChannelConsole::new(
            Arc::clone(&hub) as Arc<dyn ServiceHub>,
            ChannelIdentity::new("chan-1", "Test Channel"),
        ));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let console = Arc::clone(&console);
            tasks.push(tokio::spawn(
                async move { console.write(&format!("{i}")).await },
            ));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(hub.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_then_write_recreates_the_channel() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));

        console.write("x").await.unwrap();
        let first = store.last_probe().unwrap();

        console.close().await.unwrap();
        assert_eq!(first.completes(), 1);

        console.write("y").await.unwrap();
        assert_eq!(store.create_calls(), 2);
        assert_eq!(store.last_probe().unwrap().text(), "y");
        assert_eq!(first.text(), "x");
    }

    #[tokio::test]
    async fn close_without_a_channel_is_a_noop() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));
        console.close().await.unwrap();
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn dispose_is_idempotent_and_fails_later_calls_fast() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));
        console.write("x").await.unwrap();
        let probe = store.last_probe().unwrap();

        console.dispose().await;
        console.dispose().await;
        assert_eq!(probe.completes(), 1, "sink released exactly once");

        assert!(matches!(console.write("y").await, Err(Error::Disposed)));
        assert!(matches!(console.close().await, Err(Error::Disposed)));
        assert!(matches!(console.clear().await, Err(Error::Disposed)));
    }

    #[tokio::test]
    async fn dispose_drops_undelivered_deferred_output() {
        let store = Arc::new(MemoryChannelStore::unsupported());
        let console = console_over(Arc::clone(&store));
        console.write("held").await.unwrap();
        console.dispose().await;
        assert!(matches!(console.write("more").await, Err(Error::Disposed)));
    }

    #[tokio::test]
    async fn missing_provider_surfaces() {
        let hub = Arc::new(StaticServiceHub::new());
        let console = ChannelConsole::new(hub, ChannelIdentity::new("chan-1", "Test Channel"));
        assert!(matches!(
            console.write("x").await,
            Err(Error::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn create_failure_surfaces() {
        let hub = Arc::new(StaticServiceHub::new().with_channel_store(Arc::new(FailingStore)));
        let console = ChannelConsole::new(hub, ChannelIdentity::new("chan-1", "Test Channel"));
        assert!(matches!(
            console.write("x").await,
            Err(Error::CreateChannel { .. })
        ));
    }

    #[tokio::test]
    async fn lost_sink_clears_the_handle_for_retry() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));

        console.write("a").await.unwrap();
        store.last_probe().unwrap().close_remote();

        assert!(matches!(
            console.write("b").await,
            Err(Error::Write {
                source: BrokerError::Closed
            })
        ));

        // The dead handle was dropped; the next write re-creates.
        console.write("c").await.unwrap();
        assert_eq!(store.create_calls(), 2);
        assert_eq!(store.last_probe().unwrap().text(), "c");
    }

    #[tokio::test]
    async fn write_line_reaches_the_channel_with_a_line_feed() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));
        console.write_line("done").await.unwrap();
        assert_eq!(store.last_probe().unwrap().text(), "done\n");
    }

    #[tokio::test]
    async fn start_completes_once_and_notifies() {
        let store = Arc::new(MemoryChannelStore::new());
        let console = console_over(Arc::clone(&store));
        let rx = console.start_completed();

        assert!(!console.is_start_completed());
        console.start().await.unwrap();
        assert!(console.is_start_completed());
        assert!(*rx.borrow());

        console.start().await.unwrap();
        assert!(console.is_start_completed());
        assert!(!console.is_executing_command());
    }

    #[tokio::test]
    async fn start_warms_the_store() {
        let hub = Arc::new(CountingHub {
            store: Arc::new(MemoryChannelStore::new()),
            lookups: AtomicUsize::new(0),
        });
        let console = ChannelConsole::new(
            Arc::clone(&hub) as Arc<dyn ServiceHub>,
            ChannelIdentity::new("chan-1", "Test Channel"),
        );

        console.start().await.unwrap();
        console.write("x").await.unwrap();
        assert_eq!(hub.lookups.load(Ordering::SeqCst), 1);
    }
}
