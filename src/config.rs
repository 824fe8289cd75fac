//! Static configuration.
//!
//! Everything here is fixed at startup; nothing is runtime-reconfigurable.
//! Adjust these constants to match the measurement circuit and wiring:
//! the converter model, the button and LED lines (BCM numbering), and the
//! voltage-divider factor in front of the ADC inputs.

use std::time::Duration;

/// Converter model, resolved against the table in [`crate::adc`] at startup.
pub const ADC_MODEL: &str = "MCP3002";

/// Delay between samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// ADC reference voltage.
pub const REFERENCE_VOLTAGE: f64 = 3.3;

/// Scale factor of the voltage divider in front of the ADC inputs.
pub const DIVIDER_FACTOR: f64 = 5.0 / 3.0;

/// SPI clock for the converter.
pub const SPI_CLOCK_HZ: u32 = 50_000;

/// GPIO line of the start/stop button (BCM numbering).
pub const BUTTON_PIN: u8 = 16;

/// GPIO line of the status LED (BCM numbering).
pub const LED_PIN: u8 = 12;

/// Debounce interval for button edges.
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(50);

/// A press held longer than this powers the host off.
pub const LONG_PRESS: Duration = Duration::from_secs(2);

/// Blink rate of the status LED while sampling runs.
pub const BLINK_FREQUENCY_HZ: f64 = 2.0;

/// Duty cycle of the blink pattern.
pub const BLINK_DUTY_CYCLE: f64 = 0.5;

/// Decimal digits of the voltage readout on the display.
pub const DISPLAY_PRECISION: usize = 1;
