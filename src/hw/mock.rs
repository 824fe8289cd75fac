//! Mock hardware for tests.
//!
//! Each mock records the calls made against it behind an `Arc` so tests can
//! keep a handle after the mock has been moved into the code under test.

use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Button, HostPower, HwError, PwmOutput, Result, SpiBus, TextDisplay};

/// Scripted response for one SPI transfer.
pub enum SpiResponse {
    Bytes([u8; 3]),
    Error,
}

/// Records every transfer and replays scripted responses; once the script
/// runs out, transfers succeed with all-zero data.
pub struct MockSpi {
    pub transfers: Arc<Mutex<Vec<Vec<u8>>>>,
    pub responses: Arc<Mutex<VecDeque<SpiResponse>>>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self {
            transfers: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

#[async_trait]
impl SpiBus for MockSpi {
    async fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.transfers.lock().unwrap().push(write.to_vec());
        match self.responses.lock().unwrap().pop_front() {
            Some(SpiResponse::Bytes(bytes)) => {
                read.copy_from_slice(&bytes);
                Ok(())
            }
            Some(SpiResponse::Error) => Err(HwError::Other("scripted bus failure".into())),
            None => {
                read.fill(0);
                Ok(())
            }
        }
    }
}

/// One recorded display operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    ClearBuffer,
    Text { x: i32, y: i32, text: String },
    Flush,
}

pub struct MockDisplay {
    pub ops: Arc<Mutex<Vec<DisplayOp>>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl TextDisplay for MockDisplay {
    fn clear_buffer(&mut self) {
        self.ops.lock().unwrap().push(DisplayOp::ClearBuffer);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        self.ops.lock().unwrap().push(DisplayOp::Text {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.ops.lock().unwrap().push(DisplayOp::Flush);
        Ok(())
    }
}

/// Button whose presses are scripted as hold durations. Works with paused
/// test time; a hold longer than the long-press threshold never produces a
/// release edge within the controller's timeout.
pub struct MockButton {
    pub hold: Duration,
}

#[async_trait]
impl Button for MockButton {
    async fn wait_for_press(&mut self) -> Result<()> {
        Ok(())
    }

    async fn wait_for_release(&mut self) -> Result<()> {
        tokio::time::sleep(self.hold).await;
        Ok(())
    }
}

/// One recorded PWM call.
#[derive(Debug, Clone, PartialEq)]
pub enum PwmCall {
    Set { frequency_hz: f64, duty_cycle: f64 },
    Off,
}

pub struct MockPwm {
    pub calls: Arc<Mutex<Vec<PwmCall>>>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl PwmOutput for MockPwm {
    async fn set(&mut self, frequency_hz: f64, duty_cycle: f64) -> Result<()> {
        self.calls.lock().unwrap().push(PwmCall::Set {
            frequency_hz,
            duty_cycle,
        });
        Ok(())
    }

    async fn off(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(PwmCall::Off);
        Ok(())
    }
}

/// Counts power-off invocations instead of taking the machine down.
pub struct MockHost {
    pub power_offs: Arc<AtomicUsize>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            power_offs: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl HostPower for MockHost {
    async fn power_off(&mut self) -> Result<()> {
        self.power_offs
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
