//! Voltage readout rendering.
//!
//! Two lines of text, one per channel, redrawn from scratch on every tick.

use crate::error::{Error, Result};
use crate::hw::TextDisplay;

/// Vertical pixel offset of the second readout line.
const LINE_OFFSET: i32 = 32;

/// Renders channel voltages on the panel.
pub struct DisplaySink {
    display: Box<dyn TextDisplay>,
    precision: usize,
}

impl DisplaySink {
    pub fn new(display: Box<dyn TextDisplay>, precision: usize) -> Self {
        Self { display, precision }
    }

    /// Render both channel readouts and push the frame to the panel.
    pub async fn render(&mut self, v0: f64, v1: f64) -> Result<()> {
        self.display.clear_buffer();
        self.display
            .draw_text(0, 0, &format_line(0, v0, self.precision))
            .map_err(Error::Display)?;
        self.display
            .draw_text(0, LINE_OFFSET, &format_line(1, v1, self.precision))
            .map_err(Error::Display)?;
        self.display.flush().await.map_err(Error::Display)
    }

    /// Blank the panel. Used when sampling stops and on shutdown.
    pub async fn clear(&mut self) -> Result<()> {
        self.display.clear_buffer();
        self.display.flush().await.map_err(Error::Display)
    }
}

/// Format one channel readout line, e.g. `0: 1.6V`.
pub fn format_line(channel: u8, volts: f64, precision: usize) -> String {
    format!("{channel}: {volts:.precision$}V", precision = precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{DisplayOp, MockDisplay};

    #[test]
    fn line_format_one_decimal() {
        assert_eq!(format_line(0, 0.0, 1), "0: 0.0V");
        assert_eq!(format_line(1, 2.6855, 1), "1: 2.7V");
    }

    #[test]
    fn line_format_two_decimals() {
        assert_eq!(format_line(1, 2.6855, 2), "1: 2.69V");
        assert_eq!(format_line(1, 2.75, 2), "1: 2.75V");
    }

    #[tokio::test]
    async fn render_draws_both_lines_then_flushes() {
        let display = MockDisplay::new();
        let ops = display.ops.clone();
        let mut sink = DisplaySink::new(Box::new(display), 1);

        sink.render(0.0, 2.6855).await.unwrap();

        let ops = ops.lock().unwrap();
        assert_eq!(
            ops.as_slice(),
            &[
                DisplayOp::ClearBuffer,
                DisplayOp::Text {
                    x: 0,
                    y: 0,
                    text: "0: 0.0V".into()
                },
                DisplayOp::Text {
                    x: 0,
                    y: LINE_OFFSET,
                    text: "1: 2.7V".into()
                },
                DisplayOp::Flush,
            ]
        );
    }

    #[tokio::test]
    async fn clear_blanks_and_flushes() {
        let display = MockDisplay::new();
        let ops = display.ops.clone();
        let mut sink = DisplaySink::new(Box::new(display), 1);

        sink.clear().await.unwrap();

        let ops = ops.lock().unwrap();
        assert_eq!(ops.as_slice(), &[DisplayOp::ClearBuffer, DisplayOp::Flush]);
    }
}
