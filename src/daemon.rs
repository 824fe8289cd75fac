//! Daemon lifecycle management.
//!
//! This module handles hardware bring-up, the control tasks, signal
//! handling, and graceful shutdown.

use std::sync::Arc;

use tokio::signal::unix::{self, SignalKind};
use tokio::sync::mpsc;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::adc::{AdcProfile, VoltageSampler};
use crate::config;
use crate::controller::{Flow, ToggleController};
use crate::display::DisplaySink;
use crate::error::Error;
use crate::hw::linux::{LinuxButton, LinuxHost, LinuxOled, LinuxPwmLed, LinuxSpi};
use crate::hw::Button;
use crate::indicator::{idle_pattern, StatusIndicator};
use crate::logger::LogDestination;
use crate::sampler::SamplerContext;
use crate::tracing::prelude::*;

/// The main daemon.
pub struct Daemon {
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl Daemon {
    /// Create a new daemon instance.
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Run the daemon until a termination signal, a fatal component error,
    /// or a long-press shutdown.
    pub async fn run(self, log_dest: Option<LogDestination>) -> anyhow::Result<()> {
        // Resolve the configured converter model before any hardware is
        // opened.
        let profile = AdcProfile::by_name(config::ADC_MODEL)?;

        let spi = LinuxSpi::open(config::SPI_CLOCK_HZ).map_err(Error::Bus)?;
        let oled = LinuxOled::open().map_err(Error::Display)?;
        let button = LinuxButton::open(config::BUTTON_PIN, config::BUTTON_DEBOUNCE)
            .map_err(Error::Gpio)?;
        let led = LinuxPwmLed::open(config::LED_PIN).map_err(Error::Gpio)?;

        let (fatal_tx, mut fatal_rx) = mpsc::channel::<Error>(1);

        let context = SamplerContext {
            sampler: VoltageSampler::new(
                Box::new(spi),
                profile,
                config::REFERENCE_VOLTAGE,
                config::DIVIDER_FACTOR,
            ),
            display: DisplaySink::new(Box::new(oled), config::DISPLAY_PRECISION),
            log_dest,
            interval: config::SAMPLE_INTERVAL,
            fatal_tx: fatal_tx.clone(),
        };

        let mut indicator = StatusIndicator::new(Box::new(led));
        indicator.set_pattern(idle_pattern()).await?;

        let controller = Arc::new(ToggleController::new(
            context,
            indicator,
            Box::new(LinuxHost),
        ));

        self.tracker.spawn(button_task(
            Box::new(button),
            Arc::clone(&controller),
            self.shutdown.clone(),
            fatal_tx,
        ));
        self.tracker.close();

        // Install signal handlers
        let mut sigint = unix::signal(SignalKind::interrupt())?;
        let mut sigterm = unix::signal(SignalKind::terminate())?;

        info!(adc = profile.name, "ready, press the button to start sampling");

        let result: anyhow::Result<()> = tokio::select! {
            _ = sigint.recv() => {
                info!("received SIGINT");
                controller.on_termination().await.map_err(Into::into)
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                controller.on_termination().await.map_err(Into::into)
            }
            Some(err) = fatal_rx.recv() => {
                // Run the stop path anyway so the worker is joined and the
                // display cleared before the process dies.
                if let Err(stop_err) = controller.on_termination().await {
                    warn!(%stop_err, "cleanup after fatal error failed");
                }
                Err(err.into())
            }
            // Long-press shutdown; the controller already cleaned up.
            _ = self.shutdown.cancelled() => Ok(()),
        };

        self.shutdown.cancel();
        self.tracker.wait().await;
        info!("exiting");

        // GPIO and bus handles release their pins on drop.
        result
    }
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward button presses to the controller until shutdown.
async fn button_task(
    mut button: Box<dyn Button>,
    controller: Arc<ToggleController>,
    shutdown: CancellationToken,
    fatal_tx: mpsc::Sender<Error>,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            pressed = button.wait_for_press() => {
                if let Err(err) = pressed {
                    let _ = fatal_tx.try_send(Error::Gpio(err));
                    break;
                }
                match controller.on_button(button.as_mut()).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Shutdown) => {
                        shutdown.cancel();
                        break;
                    }
                    Err(err) => {
                        let _ = fatal_tx.try_send(err);
                        break;
                    }
                }
            }
        }
    }
}
