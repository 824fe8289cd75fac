//! Text display abstraction trait.

use async_trait::async_trait;

use super::Result;

/// A small monochrome display with an in-memory frame buffer.
///
/// Drawing only touches the buffer; nothing reaches the panel until
/// [`flush`](TextDisplay::flush) pushes the whole frame in one transfer.
#[async_trait]
pub trait TextDisplay: Send {
    /// Blank the frame buffer without touching the panel.
    fn clear_buffer(&mut self);

    /// Draw text into the frame buffer at pixel position `(x, y)`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()>;

    /// Push the frame buffer to the panel.
    async fn flush(&mut self) -> Result<()>;
}
