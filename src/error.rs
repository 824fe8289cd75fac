//! Application error types.
//!
//! Recoverable log failures never appear here: a log destination that cannot
//! be opened disables logging for the run, and a failed log write drops the
//! line. Everything below is fatal and terminates the process with its cause.

use thiserror::Error;

use crate::hw::HwError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognized converter model in the static configuration. Raised
    /// before any hardware is opened.
    #[error("unknown ADC model: {0}")]
    UnknownAdcModel(String),

    /// Failure communicating with the converter over the SPI bus.
    #[error("ADC bus error: {0}")]
    Bus(#[source] HwError),

    /// Failure driving the OLED panel.
    #[error("display error: {0}")]
    Display(#[source] HwError),

    /// Failure configuring or driving a GPIO line.
    #[error("GPIO error: {0}")]
    Gpio(#[source] HwError),

    /// Failure invoking the host power-off operation.
    #[error("host power-off failed: {0}")]
    PowerOff(#[source] HwError),

    /// The sampling worker went away without handing back its hardware.
    #[error("sampling worker panicked")]
    WorkerLost,
}
