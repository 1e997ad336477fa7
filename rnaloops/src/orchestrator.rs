//! Run lifecycle
//!
//! The orchestrator resolves the command template once, then either runs a
//! single inline record directly or fans a sequence file out over the
//! scheduler with the collector draining results.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use rnaloops_shared::logging::{log_startup, log_success};
use rnaloops_shared::{Record, Stage, stage_debug, stage_info, stage_warn};

use crate::collector;
use crate::config::{InputSource, RunConfig};
use crate::core::{InvocationBuilder, OutputStats, OutputWriter};
use crate::error::RnaLoopsResult;
use crate::pool::Scheduler;
use crate::traits::{CommandExecutor, ExecutableLocator, RecordReader};
use crate::worker::Worker;

/// What a finished run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rows_written: usize,
}

impl BatchSummary {
    fn from_stats(submitted: usize, stats: OutputStats) -> Self {
        Self {
            submitted,
            succeeded: stats.succeeded,
            failed: stats.failed,
            rows_written: stats.rows_written,
        }
    }

    /// Every submitted record produced exactly one outcome
    pub fn is_complete(&self) -> bool {
        self.succeeded + self.failed == self.submitted
    }
}

pub struct Orchestrator<E, L, R>
where
    E: CommandExecutor + 'static,
    L: ExecutableLocator,
    R: RecordReader,
{
    config: RunConfig,

    /// Injected services
    executor: Arc<E>,
    locator: L,
    reader: R,
}

impl<E, L, R> Orchestrator<E, L, R>
where
    E: CommandExecutor + 'static,
    L: ExecutableLocator,
    R: RecordReader,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(config: RunConfig, executor: E, locator: L, reader: R) -> Self {
        Self {
            config,
            executor: Arc::new(executor),
            locator,
            reader,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run, writing result rows to `out` and failure lines to
    /// `diagnostics`
    ///
    /// Only configuration and input problems (and failures of the output
    /// streams themselves) are returned as errors; failed jobs are counted in
    /// the summary.
    pub async fn run<O, D>(self, out: O, diagnostics: D) -> RnaLoopsResult<BatchSummary>
    where
        O: Write + Send + 'static,
        D: Write + Send + 'static,
    {
        log_startup(Stage::Orchestrator, &format!("{} run", self.config.algorithm));
        stage_debug!(Stage::Orchestrator, "⚙️ Run configuration: {}", self.config.to_json());

        // Fails before anything is scheduled when the executable is missing
        let builder =
            InvocationBuilder::new(self.config.algorithm, &self.config.options, &self.locator)?;
        let writer = OutputWriter::new(out, diagnostics).with_timing(self.config.timing());

        let summary = match &self.config.input {
            InputSource::Sequence { tag, sequence } => {
                self.run_single(&builder, Record::new(tag.as_str(), sequence.as_str()), writer)
                    .await?
            }
            InputSource::File { path } => self.run_batch(&builder, path, writer).await?,
        };

        if !summary.is_complete() {
            stage_warn!(
                Stage::Orchestrator,
                "{} records submitted but {} outcomes written",
                summary.submitted,
                summary.succeeded + summary.failed
            );
        }
        log_success(
            Stage::Orchestrator,
            &format!(
                "Finished {} records: {} succeeded, {} failed",
                summary.submitted, summary.succeeded, summary.failed
            ),
        );

        Ok(summary)
    }

    /// Inline record: no scheduler and no collector, the outcome is written here
    async fn run_single<O: Write, D: Write>(
        &self,
        builder: &InvocationBuilder,
        record: Record,
        mut writer: OutputWriter<O, D>,
    ) -> RnaLoopsResult<BatchSummary> {
        stage_debug!(Stage::Orchestrator, "Single sequence {}", record.id);

        let worker = Worker::new(Arc::clone(&self.executor));
        let outcome = worker.execute(builder.build(&record)).await;

        writer.write_outcome(&outcome)?;
        writer.flush()?;

        Ok(BatchSummary::from_stats(1, writer.stats()))
    }

    async fn run_batch<O, D>(
        &self,
        builder: &InvocationBuilder,
        path: &Path,
        writer: OutputWriter<O, D>,
    ) -> RnaLoopsResult<BatchSummary>
    where
        O: Write + Send + 'static,
        D: Write + Send + 'static,
    {
        let records = self.reader.read_records(path)?;

        let (handle, collector) = collector::channel(writer);
        let collector_task = collector.spawn();

        let mut scheduler = Scheduler::new(
            Worker::new(Arc::clone(&self.executor)),
            self.config.pool_size(),
            handle.outcome_sender(),
        );
        stage_info!(
            Stage::Scheduler,
            "🏭 Submitting {} records to {} slots",
            records.len(),
            scheduler.size()
        );

        for record in &records {
            scheduler.submit(builder.build(record));
        }

        // Barrier first, sentinel second: nothing can be enqueued after shutdown
        let report = scheduler.join().await;
        let shutdown = handle.shutdown();

        // A collector write error is the more useful one to surface
        let writer = collector_task.await??;
        shutdown?;

        Ok(BatchSummary::from_stats(report.submitted, writer.stats()))
    }
}
