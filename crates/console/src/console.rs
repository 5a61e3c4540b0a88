use async_trait::async_trait;

use crate::error::{Error, Result};

/// Fixed column width reported by host output consoles.
pub const CONSOLE_WIDTH: u16 = 120;

/// RGB color requested for console text.
///
/// Output channels and shared window panes render plain text, so adapters
/// are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Contract shared by every output console adapter.
///
/// Only [`activate`](Self::activate), [`clear`](Self::clear) and
/// [`write`](Self::write) are adapter-specific; the remaining operations
/// share one behavior across adapters.
#[async_trait]
pub trait OutputConsole: Send + Sync {
    /// Bring the console's output surface to the foreground.
    async fn activate(&self) -> Result<()>;

    /// Erase previously written output, where the surface allows it.
    async fn clear(&self) -> Result<()>;

    /// Append `text` to the console.
    async fn write(&self, text: &str) -> Result<()>;

    /// Append `text` followed by a line feed.
    async fn write_line(&self, text: &str) -> Result<()> {
        self.write(&format!("{text}\n")).await
    }

    /// Append `text`, ignoring the requested colors.
    async fn write_colored(
        &self,
        text: &str,
        _foreground: Option<Color>,
        _background: Option<Color>,
    ) -> Result<()> {
        self.write(text).await
    }

    /// Report long-running operation progress. Plain output surfaces have
    /// nowhere to render it.
    async fn write_progress(&self, _operation: &str, _percent_complete: u8) -> Result<()> {
        Ok(())
    }

    /// Erase the last written character. Not representable on append-only
    /// surfaces.
    async fn write_backspace(&self) -> Result<()> {
        Err(Error::unsupported("write_backspace"))
    }

    /// Column width of the console surface.
    fn width(&self) -> u16 {
        CONSOLE_WIDTH
    }
}
