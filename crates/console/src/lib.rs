//! Output-console routing for embedding hosts.
//!
//! Adapters that route text either to a pane of the host's legacy output
//! window ([`WindowConsole`]) or to its brokered output-channel service
//! ([`ChannelConsole`]), behind one [`OutputConsole`] contract. The channel
//! console creates its channel lazily and defers output written before the
//! host can supply one, delivering it in submission order once channel
//! creation first succeeds.

pub mod channel;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod provider;
pub mod window;

pub use channel::ChannelConsole;
pub use config::{ChannelIdentity, ProviderConfig};
pub use console::{CONSOLE_WIDTH, Color, OutputConsole};
pub use dispatcher::ConsoleDispatcher;
pub use error::{Error, Result};
pub use host::{CommandHost, HostProvider};
pub use provider::ConsoleProvider;
pub use window::WindowConsole;
