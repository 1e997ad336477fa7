//! Result collector
//!
//! The collector is the single consumer of the aggregation channel and the
//! only writer of the output streams. Workers can reach it only through an
//! `OutcomeSender`, which can enqueue outcomes but not the shutdown sentinel;
//! the shutdown sentinel is sent by consuming the `CollectorHandle`.

use std::io::Write;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use rnaloops_shared::{
    CollectorMessage, JobOutcome, Stage, stage_debug, stage_error, stage_info, stage_warn,
};

use crate::core::OutputWriter;
use crate::error::{RnaLoopsError, RnaLoopsResult};

/// Worker-side end of the aggregation channel
#[derive(Clone)]
pub struct OutcomeSender {
    tx: mpsc::UnboundedSender<CollectorMessage>,
}

impl OutcomeSender {
    /// Enqueue one outcome; returns false when the collector has already stopped
    pub fn send(&self, outcome: JobOutcome) -> bool {
        let id = outcome.id().to_string();
        match self.tx.send(CollectorMessage::Outcome(outcome)) {
            Ok(()) => true,
            Err(_) => {
                stage_error!(Stage::Worker, "Collector stopped, dropping outcome for {}", id);
                false
            }
        }
    }

    /// Sender wired to a bare receiver, for exercising workers in isolation
    pub fn detached() -> (Self, mpsc::UnboundedReceiver<CollectorMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

/// Orchestrator-side end of the aggregation channel
pub struct CollectorHandle {
    tx: mpsc::UnboundedSender<CollectorMessage>,
}

impl CollectorHandle {
    pub fn outcome_sender(&self) -> OutcomeSender {
        OutcomeSender { tx: self.tx.clone() }
    }

    /// Enqueue the shutdown sentinel. Must only be called once every
    /// submitted job has finished.
    pub fn shutdown(self) -> RnaLoopsResult<()> {
        self.tx.send(CollectorMessage::Shutdown).map_err(|_| {
            RnaLoopsError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "collector stopped before shutdown",
            ))
        })
    }
}

pub struct Collector<O: Write, D: Write> {
    writer: OutputWriter<O, D>,
    inbox: mpsc::UnboundedReceiver<CollectorMessage>,
}

/// Create the aggregation channel around an output writer
pub fn channel<O: Write, D: Write>(
    writer: OutputWriter<O, D>,
) -> (CollectorHandle, Collector<O, D>) {
    let (tx, inbox) = mpsc::unbounded_channel();
    (CollectorHandle { tx }, Collector { writer, inbox })
}

impl<O, D> Collector<O, D>
where
    O: Write + Send + 'static,
    D: Write + Send + 'static,
{
    /// Run the drain loop on a dedicated blocking thread
    pub fn spawn(self) -> JoinHandle<RnaLoopsResult<OutputWriter<O, D>>> {
        tokio::task::spawn_blocking(move || self.run())
    }

    /// Drain the channel until the shutdown sentinel arrives
    ///
    /// Blocks the calling thread; must not be called from async context.
    pub fn run(mut self) -> RnaLoopsResult<OutputWriter<O, D>> {
        stage_debug!(Stage::Collector, "📥 Collector listening");

        loop {
            match self.inbox.blocking_recv() {
                Some(CollectorMessage::Outcome(outcome)) => {
                    self.writer.write_outcome(&outcome)?;
                }
                Some(CollectorMessage::Shutdown) => {
                    stage_debug!(Stage::Collector, "🛑 Shutdown received");
                    break;
                }
                None => {
                    stage_warn!(Stage::Collector, "Aggregation channel closed without shutdown");
                    break;
                }
            }
        }

        self.writer.flush()?;

        let stats = self.writer.stats();
        stage_info!(
            Stage::Collector,
            "📋 Collected {} outcomes: {} succeeded, {} failed, {} rows written",
            stats.outcomes(),
            stats.succeeded,
            stats.failed,
            stats.rows_written
        );

        Ok(self.writer)
    }
}
