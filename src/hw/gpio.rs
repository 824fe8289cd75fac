//! GPIO input and output abstraction traits.

use async_trait::async_trait;

use super::Result;

/// A debounced push button.
#[async_trait]
pub trait Button: Send {
    /// Wait for the next press (falling edge). Edges that queued up while a
    /// previous press was being handled are discarded first.
    async fn wait_for_press(&mut self) -> Result<()>;

    /// Wait for the button to be released (rising edge).
    async fn wait_for_release(&mut self) -> Result<()>;
}

/// A PWM-capable output line.
#[async_trait]
pub trait PwmOutput: Send {
    /// Drive the line with the given carrier frequency and a duty cycle in
    /// `[0.0, 1.0]`.
    async fn set(&mut self, frequency_hz: f64, duty_cycle: f64) -> Result<()>;

    /// Stop the carrier and pull the line low.
    async fn off(&mut self) -> Result<()>;
}
