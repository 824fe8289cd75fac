//! The background sampling loop.
//!
//! One worker task at a time samples both channels, appends to the log when
//! enabled, refreshes the display, then waits out the sample interval with a
//! cancellable delay. The worker owns the bus and the display for its whole
//! run and hands them back through its join handle, so exclusive hardware
//! access is an ownership fact rather than a locking convention.

use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adc::VoltageSampler;
use crate::display::DisplaySink;
use crate::error::Error;
use crate::logger::{LogDestination, SampleLog};
use crate::tracing::prelude::*;

/// One converted measurement of both channels.
#[derive(Debug, Clone, Copy)]
pub struct SampleReading {
    pub timestamp: SystemTime,
    pub channel0: f64,
    pub channel1: f64,
}

/// Hardware and configuration owned by the sampling worker while it runs
/// and parked by the controller while idle.
pub struct SamplerContext {
    pub sampler: VoltageSampler,
    pub display: DisplaySink,
    pub log_dest: Option<LogDestination>,
    pub interval: Duration,

    /// Fatal errors are reported here; the daemon terminates on receipt.
    pub fatal_tx: mpsc::Sender<Error>,
}

/// Run the sampling loop until `stop` is cancelled or a fatal error occurs.
///
/// Always returns the context so the controller can reuse the hardware for
/// the next run.
pub async fn run(mut ctx: SamplerContext, stop: CancellationToken) -> SamplerContext {
    let mut log = match &ctx.log_dest {
        Some(dest) => match SampleLog::open(dest).await {
            Ok(log) => Some(log),
            Err(err) => {
                // Sampling and display stay alive; only logging is lost.
                warn!(%err, "failed to open log destination, logging disabled for this run");
                None
            }
        },
        None => None,
    };

    loop {
        if let Err(err) = tick(&mut ctx, log.as_mut()).await {
            error!(%err, "sampling failed");
            let _ = ctx.fatal_tx.try_send(err);
            break;
        }
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(ctx.interval) => {}
        }
    }

    if let Some(log) = log {
        log.close().await;
    }
    ctx
}

/// One sample, log, display cycle.
async fn tick(ctx: &mut SamplerContext, log: Option<&mut SampleLog>) -> crate::error::Result<()> {
    // Taken before the bus is touched so the record reflects the start of
    // the measurement.
    let timestamp = SystemTime::now();
    let (v0, v1) = ctx.sampler.sample().await?;

    if let Some(log) = log {
        let reading = SampleReading {
            timestamp,
            channel0: v0,
            channel1: v1,
        };
        if let Err(err) = log.append(&reading).await {
            // A dropped line is acceptable; the display stays authoritative.
            debug!(%err, "log write failed, sample dropped");
        }
    }

    ctx.display.render(v0, v1).await
}
