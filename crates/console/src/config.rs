use serde::{Deserialize, Serialize};

/// Channel id of the default shared console.
pub const DEFAULT_SHARED_CHANNEL_ID: &str = "outpane.shared-console";

/// Display name the host shows for the shared console channel.
pub const DEFAULT_SHARED_CHANNEL_NAME: &str = "Console";

/// Pane id of the host build output pane.
pub const DEFAULT_BUILD_PANE_ID: &str = "outpane.build-output";

/// Identity of a host output channel: the stable id used to request its
/// creation and the human-readable name the host displays for it.
///
/// Fixed at construction; a console keeps one identity for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelIdentity {
    channel_id: String,
    display_name: String,
}

impl ChannelIdentity {
    #[must_use]
    pub fn new(channel_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Identity with a generated unique channel id.
    #[must_use]
    pub fn generate(display_name: impl Into<String>) -> Self {
        Self {
            channel_id: uuid::Uuid::new_v4().to_string(),
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Console provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Identity of the shared interactive output channel.
    pub shared_channel: ChannelIdentity,
    /// Pane id of the host build output pane.
    pub build_pane_id: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            shared_channel: ChannelIdentity::new(
                DEFAULT_SHARED_CHANNEL_ID,
                DEFAULT_SHARED_CHANNEL_NAME,
            ),
            build_pane_id: DEFAULT_BUILD_PANE_ID.to_owned(),
        }
    }
}
