//! Hardware abstraction layer traits.
//!
//! Everything the daemon touches on the board goes through these seams: the
//! SPI bus to the converter, the OLED panel, the push button, the LED output
//! and host power control. The `linux` module provides the one real
//! implementation per trait; tests substitute mocks.

pub mod display;
pub mod gpio;
pub mod host;
pub mod linux;
pub mod spi;

#[cfg(test)]
pub(crate) mod mock;

// Re-export traits
pub use display::TextDisplay;
pub use gpio::{Button, PwmOutput};
pub use host::HostPower;
pub use spi::SpiBus;

/// Common error type for hardware operations
#[derive(Debug, thiserror::Error)]
pub enum HwError {
    /// I/O error from the underlying device
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter or argument
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Other hardware-specific error
    #[error("hardware error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
