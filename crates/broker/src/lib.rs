//! Host capability layer for outpane.
//!
//! Declares the opaque services an embedding host supplies to the console
//! layer: the output-channel store with its byte sinks, the legacy output
//! window with its panes, and the service hub that locates both. Ships
//! noop, in-memory and pipe-backed implementations for embedding and tests.

pub mod error;
pub mod hub;
pub mod memory;
pub mod pipe;
pub mod sink;
pub mod store;
pub mod window;

pub use error::{Error, Result};
pub use hub::{ServiceHub, StaticServiceHub};
pub use memory::{
    CreatedChannel, MemoryChannelStore, MemoryOutputWindow, MemoryPane, MemorySink, SinkProbe,
};
pub use pipe::PipeSink;
pub use sink::ByteSink;
pub use store::{NoopChannelStore, OutputChannelStore};
pub use window::{OutputWindow, WindowPane};
