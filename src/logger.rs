//! Optional sample logging to a file or stdout.
//!
//! One line per sample, flushed after every write so a crash or power cut
//! loses at most the line being written.

use std::io;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::sampler::SampleReading;
use crate::tracing::prelude::*;

/// Where log lines go. `-` on the command line selects stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stdout,
    File(PathBuf),
}

impl LogDestination {
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            LogDestination::Stdout
        } else {
            LogDestination::File(PathBuf::from(arg))
        }
    }
}

/// An open log sink.
pub struct SampleLog {
    writer: Box<dyn AsyncWrite + Send + Unpin>,
}

impl SampleLog {
    /// Open the destination. Files are opened append-create; stdout is the
    /// process stream and is never closed.
    pub async fn open(dest: &LogDestination) -> io::Result<SampleLog> {
        let writer: Box<dyn AsyncWrite + Send + Unpin> = match dest {
            LogDestination::Stdout => Box::new(tokio::io::stdout()),
            LogDestination::File(path) => Box::new(
                OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .await?,
            ),
        };
        Ok(SampleLog { writer })
    }

    /// Append one reading and flush.
    pub async fn append(&mut self, reading: &SampleReading) -> io::Result<()> {
        self.writer
            .write_all(format_record(reading).as_bytes())
            .await?;
        self.writer.flush().await
    }

    /// Flush and drop the writer. File handles close here; stdout stays open.
    pub async fn close(mut self) {
        if let Err(err) = self.writer.flush().await {
            debug!(%err, "log flush on close failed");
        }
    }
}

/// `<unix-epoch-seconds>.<microseconds>,<v0>,<v1>` with one decimal digit
/// per voltage.
pub fn format_record(reading: &SampleReading) -> String {
    let epoch = reading
        .timestamp
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "{}.{:06},{:.1},{:.1}\n",
        epoch.as_secs(),
        epoch.subsec_micros(),
        reading.channel0,
        reading.channel1
    )
}
