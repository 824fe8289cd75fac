//! LED status patterns.

use crate::config;
use crate::error::{Error, Result};
use crate::hw::PwmOutput;

// Carrier used for steady patterns; fast enough to be flicker-free.
const STEADY_FREQUENCY_HZ: f64 = 100.0;

/// LED output pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedPattern {
    Off,
    Blinking { frequency_hz: f64, duty_cycle: f64 },
    SteadyOn { duty_cycle: f64 },
}

/// Pattern shown while the device is idle and ready.
pub fn idle_pattern() -> LedPattern {
    LedPattern::SteadyOn { duty_cycle: 1.0 }
}

/// Pattern shown while sampling runs.
pub fn running_pattern() -> LedPattern {
    LedPattern::Blinking {
        frequency_hz: config::BLINK_FREQUENCY_HZ,
        duty_cycle: config::BLINK_DUTY_CYCLE,
    }
}

/// Drives the status LED.
///
/// Idempotent: re-applying the current pattern performs no hardware call.
pub struct StatusIndicator {
    led: Box<dyn PwmOutput>,
    current: Option<LedPattern>,
}

impl StatusIndicator {
    pub fn new(led: Box<dyn PwmOutput>) -> Self {
        Self { led, current: None }
    }

    pub async fn set_pattern(&mut self, pattern: LedPattern) -> Result<()> {
        if self.current == Some(pattern) {
            return Ok(());
        }
        match pattern {
            LedPattern::Off => self.led.off().await,
            LedPattern::Blinking {
                frequency_hz,
                duty_cycle,
            } => self.led.set(frequency_hz, duty_cycle).await,
            LedPattern::SteadyOn { duty_cycle } => {
                self.led.set(STEADY_FREQUENCY_HZ, duty_cycle).await
            }
        }
        .map_err(Error::Gpio)?;
        self.current = Some(pattern);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{MockPwm, PwmCall};

    #[tokio::test]
    async fn patterns_reach_the_output() {
        let pwm = MockPwm::new();
        let calls = pwm.calls.clone();
        let mut indicator = StatusIndicator::new(Box::new(pwm));

        indicator
            .set_pattern(LedPattern::Blinking {
                frequency_hz: 2.0,
                duty_cycle: 0.5,
            })
            .await
            .unwrap();
        indicator.set_pattern(LedPattern::Off).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[
                PwmCall::Set {
                    frequency_hz: 2.0,
                    duty_cycle: 0.5
                },
                PwmCall::Off,
            ]
        );
    }

    #[tokio::test]
    async fn reapplying_a_pattern_is_a_no_op() {
        let pwm = MockPwm::new();
        let calls = pwm.calls.clone();
        let mut indicator = StatusIndicator::new(Box::new(pwm));

        indicator.set_pattern(running_pattern()).await.unwrap();
        indicator.set_pattern(running_pattern()).await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
