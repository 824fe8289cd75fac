//! Start/stop state machine for the sampling loop.
//!
//! Two control paths converge here: the button event task and the process
//! termination path. Both go through one async mutex, so a button bounce and
//! a termination signal can never interleave their transitions. A button
//! press that arrives while a transition is in flight fails the `try_lock`
//! and is dropped as bounce; a termination signal always waits for the lock
//! and is never dropped.
//!
//! The worker is a structured task the controller joins on stop: a new
//! worker is only ever spawned from `Idle`, and `Idle` is only entered after
//! the previous worker's join handle has resolved. At most one worker exists
//! at any time.

use std::mem;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config;
use crate::error::{Error, Result};
use crate::hw::{Button, HostPower};
use crate::indicator::{idle_pattern, running_pattern, LedPattern, StatusIndicator};
use crate::sampler::{self, SamplerContext};
use crate::tracing::prelude::*;

/// What triggered a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    ButtonPress,
    Termination,
}

/// Tells the button event loop whether to keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    Continue,
    Shutdown,
}

enum RunState {
    Idle,
    Running {
        stop: CancellationToken,
        worker: JoinHandle<SamplerContext>,
    },
    /// Terminal; entered on a long press, never left.
    ShuttingDown,
}

struct ControlState {
    run: RunState,

    /// Hardware context parked while no worker is running.
    parked: Option<SamplerContext>,

    indicator: StatusIndicator,
    host: Box<dyn HostPower>,
}

pub struct ToggleController {
    state: Mutex<ControlState>,
}

impl ToggleController {
    /// Create a controller in the idle state, holding the sampler context
    /// until the first start.
    pub fn new(
        context: SamplerContext,
        indicator: StatusIndicator,
        host: Box<dyn HostPower>,
    ) -> Self {
        Self {
            state: Mutex::new(ControlState {
                run: RunState::Idle,
                parked: Some(context),
                indicator,
                host,
            }),
        }
    }

    /// Handle a button press edge.
    ///
    /// The press duration is measured with the state lock held: a release
    /// within the long-press threshold toggles sampling, a longer hold
    /// powers the host off.
    pub async fn on_button(&self, button: &mut dyn Button) -> Result<Flow> {
        let Ok(mut state) = self.state.try_lock() else {
            debug!("button press ignored, transition in flight");
            return Ok(Flow::Continue);
        };
        if self.held_past_threshold(button).await? {
            self.shut_down(&mut state).await?;
            Ok(Flow::Shutdown)
        } else {
            self.toggle(&mut state, Trigger::ButtonPress).await?;
            Ok(Flow::Continue)
        }
    }

    /// Handle SIGINT/SIGTERM or cleanup after a fatal worker error: stop
    /// sampling if it is running. Idempotent when already idle.
    pub async fn on_termination(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.toggle(&mut state, Trigger::Termination).await
    }

    /// Wait for the release edge, up to the long-press threshold.
    async fn held_past_threshold(&self, button: &mut dyn Button) -> Result<bool> {
        match timeout(config::LONG_PRESS, button.wait_for_release()).await {
            Ok(released) => {
                released.map_err(Error::Gpio)?;
                Ok(false)
            }
            Err(_) => Ok(true),
        }
    }

    async fn toggle(&self, state: &mut ControlState, trigger: Trigger) -> Result<()> {
        match mem::replace(&mut state.run, RunState::Idle) {
            RunState::Running { stop, worker } => {
                state.indicator.set_pattern(idle_pattern()).await?;
                let mut context = stop_worker(stop, worker).await?;
                context.display.clear().await?;
                state.parked = Some(context);
                info!("sampling stopped");
            }
            RunState::Idle => match trigger {
                Trigger::Termination => {
                    debug!("termination while idle, nothing to stop");
                }
                Trigger::ButtonPress => {
                    let context = state.parked.take().ok_or(Error::WorkerLost)?;
                    state.indicator.set_pattern(running_pattern()).await?;
                    let stop = CancellationToken::new();
                    let worker = tokio::spawn(sampler::run(context, stop.clone()));
                    state.run = RunState::Running { stop, worker };
                    info!("sampling started");
                }
            },
            RunState::ShuttingDown => {
                state.run = RunState::ShuttingDown;
            }
        }
        Ok(())
    }

    /// Long-press branch: stop sampling, blank the display, put the LED out
    /// and power the host off. Terminal; the ordinary toggle path is never
    /// taken afterwards.
    async fn shut_down(&self, state: &mut ControlState) -> Result<()> {
        info!("long press, powering off");
        if let RunState::Running { stop, worker } =
            mem::replace(&mut state.run, RunState::ShuttingDown)
        {
            let context = stop_worker(stop, worker).await?;
            state.parked = Some(context);
        }
        if let Some(context) = state.parked.as_mut() {
            context.display.clear().await?;
        }
        state.indicator.set_pattern(LedPattern::Off).await?;
        state.host.power_off().await.map_err(Error::PowerOff)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn is_running(&self) -> bool {
        matches!(self.state.lock().await.run, RunState::Running { .. })
    }
}

/// Signal the worker to stop and wait for it to hand back its context.
async fn stop_worker(
    stop: CancellationToken,
    worker: JoinHandle<SamplerContext>,
) -> Result<SamplerContext> {
    stop.cancel();
    worker.await.map_err(|_| Error::WorkerLost)
}
