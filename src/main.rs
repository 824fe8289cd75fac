mod adc;
mod config;
mod controller;
mod daemon;
mod display;
mod error;
mod hw;
mod indicator;
mod logger;
mod sampler;
mod tracing;

use clap::Parser;

use crate::daemon::Daemon;
use crate::logger::LogDestination;

/// Two-channel ADC voltmeter with OLED readout
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log destination path; `-` logs to stdout. Omit to disable logging.
    logfile: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crate::tracing::init_journald_or_stdout();

    let args = Args::parse();
    let log_dest = args.logfile.as_deref().map(LogDestination::parse);

    Daemon::new().run(log_dest).await
}
