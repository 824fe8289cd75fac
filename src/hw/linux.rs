//! Linux implementations of the hardware capabilities, for the Raspberry Pi.
//!
//! SPI, GPIO edge interrupts and software PWM go through `rppal`. The OLED
//! is an SSD1306 in buffered-graphics mode over I2C, drawn with
//! `embedded-graphics`. Host power-off goes through systemd.
//!
//! GPIO and bus handles reset their hardware state when dropped, which is
//! what releases the pins during shutdown.

use std::time::Duration;

use async_trait::async_trait;
use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use profont::PROFONT_24_POINT;
use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};
use rppal::i2c::I2c;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};
use tokio::sync::mpsc;

use super::{Button, HostPower, HwError, PwmOutput, Result, SpiBus, TextDisplay};

fn hw_err(err: impl std::fmt::Display) -> HwError {
    HwError::Other(err.to_string())
}

/// SPI access to the converter on SPI0/CE0.
pub struct LinuxSpi {
    spi: Spi,
}

impl LinuxSpi {
    pub fn open(clock_hz: u32) -> Result<Self> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock_hz, Mode::Mode0).map_err(hw_err)?;
        Ok(Self { spi })
    }
}

#[async_trait]
impl SpiBus for LinuxSpi {
    async fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        // A three-byte transfer at these clock rates completes in well under
        // a millisecond, so it runs inline.
        self.spi.transfer(read, write).map_err(hw_err)?;
        Ok(())
    }
}

/// Edge kind delivered by the GPIO interrupt thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Falling,
    Rising,
}

/// Push button on a GPIO input with pull-up.
///
/// `rppal` delivers debounced edges on its own interrupt thread; they are
/// forwarded through a channel so the waits below stay async.
pub struct LinuxButton {
    // Held so the interrupt registration stays alive.
    _pin: InputPin,
    edges: mpsc::UnboundedReceiver<Edge>,
}

impl LinuxButton {
    pub fn open(pin: u8, debounce: Duration) -> Result<Self> {
        let gpio = Gpio::new().map_err(hw_err)?;
        let mut pin = gpio.get(pin).map_err(hw_err)?.into_input_pullup();
        let (tx, rx) = mpsc::unbounded_channel();
        pin.set_async_interrupt(Trigger::Both, Some(debounce), move |event| {
            let edge = match event.trigger {
                Trigger::FallingEdge => Edge::Falling,
                _ => Edge::Rising,
            };
            let _ = tx.send(edge);
        })
        .map_err(hw_err)?;
        Ok(Self { _pin: pin, edges: rx })
    }

    async fn wait_for_edge(&mut self, wanted: Edge) -> Result<()> {
        loop {
            match self.edges.recv().await {
                Some(edge) if edge == wanted => return Ok(()),
                Some(_) => {}
                None => return Err(HwError::Other("GPIO interrupt channel closed".into())),
            }
        }
    }
}

#[async_trait]
impl Button for LinuxButton {
    async fn wait_for_press(&mut self) -> Result<()> {
        // Edges queued while the previous press was handled are stale bounce.
        while self.edges.try_recv().is_ok() {}
        self.wait_for_edge(Edge::Falling).await
    }

    async fn wait_for_release(&mut self) -> Result<()> {
        self.wait_for_edge(Edge::Rising).await
    }
}

/// Status LED on a GPIO output, driven with software PWM.
pub struct LinuxPwmLed {
    pin: OutputPin,
}

impl LinuxPwmLed {
    pub fn open(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(hw_err)?;
        let pin = gpio.get(pin).map_err(hw_err)?.into_output_low();
        Ok(Self { pin })
    }
}

#[async_trait]
impl PwmOutput for LinuxPwmLed {
    async fn set(&mut self, frequency_hz: f64, duty_cycle: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(HwError::InvalidParameter(format!(
                "duty cycle {duty_cycle} out of range"
            )));
        }
        self.pin
            .set_pwm_frequency(frequency_hz, duty_cycle)
            .map_err(hw_err)
    }

    async fn off(&mut self) -> Result<()> {
        self.pin.clear_pwm().map_err(hw_err)?;
        self.pin.set_low();
        Ok(())
    }
}

type Oled = Ssd1306<I2CInterface<I2c>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// 128x64 SSD1306 panel on the I2C bus.
pub struct LinuxOled {
    display: Oled,
    style: MonoTextStyle<'static, BinaryColor>,
}

impl LinuxOled {
    pub fn open() -> Result<Self> {
        let i2c = I2c::new().map_err(hw_err)?;
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display
            .init()
            .map_err(|e| HwError::Other(format!("display init failed: {e:?}")))?;
        Ok(Self {
            display,
            style: MonoTextStyle::new(&PROFONT_24_POINT, BinaryColor::On),
        })
    }
}

#[async_trait]
impl TextDisplay for LinuxOled {
    fn clear_buffer(&mut self) {
        // Drawing into the buffer is infallible; errors surface on flush.
        let _ = self.display.clear(BinaryColor::Off);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        let _ = Text::with_baseline(text, Point::new(x, y), self.style, Baseline::Top)
            .draw(&mut self.display);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.display
            .flush()
            .map_err(|e| HwError::Other(format!("display flush failed: {e:?}")))
    }
}

/// Host power control via systemd.
pub struct LinuxHost;

#[async_trait]
impl HostPower for LinuxHost {
    async fn power_off(&mut self) -> Result<()> {
        let status = tokio::process::Command::new("systemctl")
            .arg("poweroff")
            .status()
            .await
            .map_err(HwError::Io)?;
        if status.success() {
            Ok(())
        } else {
            Err(HwError::Other(format!(
                "systemctl poweroff exited with {status}"
            )))
        }
    }
}
